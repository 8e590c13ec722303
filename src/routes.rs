use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use log::{info, warn};
use serde_json::{json, Value};

use crate::error::ProductError;
use crate::models::{NewProduct, ProductFilter, StockSale};
use crate::service::ProductService;

#[get("/products")]
async fn list_products(
    service: web::Data<ProductService>,
    filter: web::Query<ProductFilter>,
) -> Result<HttpResponse, ProductError> {
    info!("Received GET /products: {:?}", filter);
    let products = service.list(&filter).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[get("/products/{id}")]
async fn get_product_by_id(
    service: web::Data<ProductService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ProductError> {
    info!("Received GET /products/{}", id);
    let product = service.get_by_id(*id).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[post("/products")]
async fn create_product(
    service: web::Data<ProductService>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ProductError> {
    info!("Received POST /products: {:?}", body);
    let new_product = NewProduct::from_json(body.into_inner())?;
    let product = service.create(new_product).await?;
    info!("Product created: {}", product.id);
    Ok(HttpResponse::Created().json(product))
}

#[put("/products/{id}")]
async fn update_product_by_id(
    service: web::Data<ProductService>,
    id: web::Path<i32>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ProductError> {
    info!("Received PUT /products/{}: {:?}", id, body);
    let updated = NewProduct::from_json(body.into_inner())?;
    let product = service.update(*id, updated).await?;
    Ok(HttpResponse::Ok().json(product))
}

#[delete("/products/{id}")]
async fn delete_product_by_id(
    service: web::Data<ProductService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ProductError> {
    info!("Received DELETE /products/{}", id);
    service.delete(*id).await?;
    info!("Product deleted: {}", id);
    Ok(HttpResponse::NoContent().finish())
}

#[patch("/products/{id}/stock")]
async fn adjust_product_stock(
    service: web::Data<ProductService>,
    id: web::Path<i32>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ProductError> {
    info!("Received PATCH /products/{}/stock: {:?}", id, body);
    let sale = StockSale::from_json(body.into_inner())?;
    let product = service.adjust_stock(*id, sale).await?;
    info!("Stock for product {} is now {}", product.id, product.stock);
    Ok(HttpResponse::Ok().json(product))
}

#[get("/health")]
async fn health(service: web::Data<ProductService>) -> HttpResponse {
    match service.health().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(e) => {
            warn!("Health check failed: {:?}", e);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}

/// Registers the handlers and turns extractor failures (bodies that are not
/// JSON, non-integer ids, bad query strings) into `bad_request` responses.
/// Expects a `web::Data<ProductService>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ProductError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ProductError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ProductError::BadRequest(err.to_string()).into()),
    )
    .service(list_products)
    .service(get_product_by_id)
    .service(create_product)
    .service(update_product_by_id)
    .service(delete_product_by_id)
    .service(adjust_product_stock)
    .service(health);
}
