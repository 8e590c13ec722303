use std::sync::Arc;

use actix_cors::Cors;
use actix_web::web;
use log::info;
use product_inventory::config::Settings;
use product_inventory::{routes, PgProductRepository, ProductService};
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;
use sqlx::postgres::PgPoolOptions;

fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default().allow_any_method().allow_any_header();
    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }
    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] connection_string: String,
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static> {
    info!("Starting the server...");

    let settings =
        Settings::from_secrets(&secrets).map_err(|e| shuttle_runtime::Error::Custom(e.into()))?;
    let connection_string = settings.connection_string(&connection_string);

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&connection_string)
        .await
        .map_err(|e| shuttle_runtime::Error::Database(e.to_string()))?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| shuttle_runtime::Error::Database(e.to_string()))?;
    info!("Migrations applied");

    let repository = Arc::new(PgProductRepository::new(pool));
    let service = web::Data::new(ProductService::new(repository));
    let allowed_origins = settings.allowed_origins;

    let config = move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(service.clone()).service(
            web::scope("")
                .wrap(cors(&allowed_origins))
                .configure(routes::configure),
        );
    };

    Ok(config.into())
}
