//! Product inventory HTTP service: actix-web handlers over a PostgreSQL-backed
//! product store.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use repository::{PgProductRepository, ProductRepository};
pub use service::ProductService;
