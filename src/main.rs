mod api;
mod config;
mod database;
mod models;
mod store;
mod utils;

use std::sync::Arc;

use actix_web::{
    middleware::{Compress, Logger},
    web, App, HttpServer,
};
use anyhow::Context;
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Settings;
use crate::database::Database;
use crate::store::UserStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::from_env().context("invalid configuration")?;
    let bind_address = settings.bind_address();

    log::info!("🚀 Starting Users Service...");
    log::info!("📊 Database: {}", settings.database.url);

    let database = Database::connect(&settings.database)
        .await
        .context("failed to connect to database")?;

    log::info!("✅ Database connected successfully");

    let store: Arc<dyn UserStore> = Arc::new(database.user_store());
    let store_data = web::Data::from(store);
    let allowed_origins = settings.cors_allowed_origins.clone();

    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .wrap(api::cors(&allowed_origins))
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await?;

    log::info!("👋 Server stopped, closing database pool");
    database.close().await;

    Ok(())
}
