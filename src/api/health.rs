use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::store::UserStore;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    /// `up` when a store session could be opened, `down` otherwise.
    #[schema(example = "up")]
    pub database: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
}

/// GET /health - Verifica o serviço e a conexão com o banco
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<dyn UserStore>) -> HttpResponse {
    // opening a session checks out a pooled connection; dropping it gives it back
    let database_up = match store.session().await {
        Ok(_session) => true,
        Err(e) => {
            log::warn!("⚠️ Health check: database unreachable: {}", e);
            false
        }
    };

    let (mut response, status, database) = if database_up {
        (HttpResponse::Ok(), "healthy", "up")
    } else {
        (HttpResponse::ServiceUnavailable(), "unhealthy", "down")
    };

    response.json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
