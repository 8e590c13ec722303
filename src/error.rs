use std::collections::BTreeMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Field name to the list of messages describing what is wrong with it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("product with name '{name}' and brand '{brand}' already exists")]
    Duplicate { name: String, brand: String },

    #[error("product with id {0} not found")]
    NotFound(i32),

    #[error("insufficient stock for product {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: i32,
        requested: i32,
        available: i32,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::BadRequest(_) => "bad_request",
            Self::Duplicate { .. } => "duplicate",
            Self::NotFound(_) => "not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::Database(_) => "internal",
        }
    }
}

impl From<ValidationErrors> for ProductError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self::Validation(fields)
    }
}

/// Maps a failed write to `Duplicate` when it hit the (name, brand) constraint.
pub fn map_write_error(e: sqlx::Error, name: &str, brand: &str) -> ProductError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            ProductError::Duplicate {
                name: name.to_owned(),
                brand: brand.to_owned(),
            }
        }
        _ => ProductError::Database(e),
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl ResponseError for ProductError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::BadRequest(_)
            | Self::Duplicate { .. }
            | Self::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Database(e) => {
                error!("Database failure: {:?}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let fields = match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind(),
            message,
            fields,
        })
    }
}
