//! Typed decoding of the `name` field for create and update.
//!
//! The field is looked up in the JSON body first, then in the query string,
//! then in a form-encoded body. A JSON body that does not parse is rejected
//! outright.
//!
//! Bodies are taken as a raw [`web::Payload`] and only buffered when a handler
//! asks for them, so checks that come first (the id lookup on update) are not
//! pre-empted by anything the body contains.

use actix_web::{
    http::header,
    web::{self, Bytes, BytesMut},
    HttpRequest,
};
use futures::StreamExt;
use serde_json::Value;

use crate::models::UserRequest;
use crate::utils::{AppError, ValidationError, NAME_REQUIRED};

const NAME: &str = "name";

/// Upper bound for a buffered request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub async fn read_body(mut payload: web::Payload) -> Result<Bytes, AppError> {
    let mut body = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ValidationError::UnreadableBody(e.to_string()))?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(AppError::PayloadTooLarge(MAX_BODY_BYTES));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

enum Lookup {
    Found(String),
    Invalid,
    Absent,
}

impl UserRequest {
    pub fn decode(req: &HttpRequest, body: &[u8]) -> Result<Self, ValidationError> {
        let mut lookup = Lookup::Absent;

        if is_json(req) {
            let json: Value = serde_json::from_slice(body)
                .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
            lookup = json_field(&json, NAME);
        }
        if let Lookup::Absent = lookup {
            lookup = urlencoded_field(req.query_string().as_bytes(), NAME);
        }
        if let Lookup::Absent = lookup {
            if is_form(req) {
                lookup = urlencoded_field(body, NAME);
            }
        }

        match lookup {
            Lookup::Found(name) => Ok(UserRequest { name }),
            Lookup::Invalid | Lookup::Absent => Err(ValidationError::field(NAME, NAME_REQUIRED)),
        }
    }
}

fn json_field(body: &Value, field: &str) -> Lookup {
    match body.get(field) {
        None | Some(Value::Null) => Lookup::Absent,
        Some(Value::String(s)) => Lookup::Found(s.clone()),
        Some(Value::Number(n)) => Lookup::Found(n.to_string()),
        // stored as True / False
        Some(Value::Bool(b)) => Lookup::Found(if *b { "True" } else { "False" }.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => Lookup::Invalid,
    }
}

fn urlencoded_field(raw: &[u8], field: &str) -> Lookup {
    url::form_urlencoded::parse(raw)
        .find(|(key, _)| key == field)
        .map_or(Lookup::Absent, |(_, value)| Lookup::Found(value.into_owned()))
}

fn mime_essence(req: &HttpRequest) -> Option<String> {
    let raw = req.headers().get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = raw.split(';').next().unwrap_or_default().trim();
    Some(essence.to_ascii_lowercase())
}

fn is_json(req: &HttpRequest) -> bool {
    mime_essence(req).is_some_and(|mime| {
        mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
    })
}

fn is_form(req: &HttpRequest) -> bool {
    mime_essence(req).is_some_and(|mime| mime == "application/x-www-form-urlencoded")
}
