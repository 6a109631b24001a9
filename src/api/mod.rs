pub mod health;
pub mod payload;
pub mod swagger;
pub mod users;

use actix_cors::Cors;
use actix_web::{http::header, web};

/// Users routes. `{id}` only matches decimal digits; anything else, including
/// other methods on these paths, falls through to the default 404.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/users", web::get().to(users::list_users))
        .route("/users", web::post().to(users::create_user))
        .route("/users/{id:\\d+}", web::get().to(users::get_user))
        .route("/users/{id:\\d+}", web::put().to(users::update_user));
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}
