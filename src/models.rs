use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::error::{FieldErrors, ProductError, ProductResult};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub unit: String,
    pub stock: i32,
    pub price: Decimal,
    pub supplier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body accepted by create and update.
#[derive(Validate, Debug, Clone)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 40, message = "must be between 1 and 40 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 40, message = "must be between 1 and 40 characters"))]
    pub brand: String,
    #[validate(length(min = 1, max = 10, message = "must be between 1 and 10 characters"))]
    pub unit: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: i32,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(min = 1, max = 40, message = "must be between 1 and 40 characters"))]
    pub supplier: String,
}

impl NewProduct {
    /// Reads the body field by field so that every missing or mistyped field
    /// is reported under its own name. `unitOfMeasure` and `currentStock` are
    /// accepted for `unit` and `stock`.
    pub fn from_json(body: Value) -> ProductResult<Self> {
        let mut object = into_object(body)?;
        let mut errors = FieldErrors::new();
        let name = take_field(&mut object, &["name"], &mut errors);
        let description = take_field(&mut object, &["description"], &mut errors);
        let brand = take_field(&mut object, &["brand"], &mut errors);
        let unit = take_field(&mut object, &["unit", "unitOfMeasure"], &mut errors);
        let stock = take_field(&mut object, &["stock", "currentStock"], &mut errors);
        let price = take_field(&mut object, &["price"], &mut errors);
        let supplier = take_field(&mut object, &["supplier"], &mut errors);

        match (name, description, brand, unit, stock, price, supplier) {
            (
                Some(name),
                Some(description),
                Some(brand),
                Some(unit),
                Some(stock),
                Some(price),
                Some(supplier),
            ) => Ok(Self {
                name,
                description,
                brand,
                unit,
                stock,
                price,
                supplier,
            }),
            _ => Err(ProductError::Validation(errors)),
        }
    }
}

fn into_object(body: Value) -> ProductResult<Map<String, Value>> {
    match body {
        Value::Object(object) => Ok(object),
        _ => Err(ProductError::BadRequest(
            "request body must be a JSON object".to_string(),
        )),
    }
}

/// Removes the first of `keys` present in `object` and deserializes it,
/// recording a problem under `keys[0]` otherwise.
fn take_field<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    keys: &[&str],
    errors: &mut FieldErrors,
) -> Option<T> {
    let field = keys[0];
    let Some(value) = keys.iter().find_map(|key| object.remove(*key)) else {
        errors
            .entry(field.to_string())
            .or_default()
            .push("is required".to_string());
        return None;
    };
    match serde_json::from_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            errors
                .entry(field.to_string())
                .or_default()
                .push(format!("has an invalid value: {}", e));
            None
        }
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    // NUMERIC(10, 2) holds at most eight integer digits.
    let message = if *price < Decimal::ZERO {
        "must not be negative"
    } else if *price >= Decimal::from(100_000_000) {
        "must be lower than 100000000"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("price");
    err.message = Some(Cow::Borrowed(message));
    Err(err)
}

/// Public projection returned by list and get.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub unit: String,
    pub stock: i32,
    pub price: Decimal,
    pub supplier: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            brand: product.brand,
            unit: product.unit,
            stock: product.stock,
            price: product.price,
            supplier: product.supplier,
        }
    }
}

#[derive(Validate, Debug, Clone, Copy)]
pub struct StockSale {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity_sold: i32,
}

impl StockSale {
    pub fn from_json(body: Value) -> ProductResult<Self> {
        let mut object = into_object(body)?;
        let mut errors = FieldErrors::new();
        match take_field(&mut object, &["quantity_sold"], &mut errors) {
            Some(quantity_sold) => Ok(Self { quantity_sold }),
            None => Err(ProductError::Validation(errors)),
        }
    }
}

/// Exact-match filter; unset fields match everything.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub supplier: Option<String>,
}

impl ProductFilter {
    pub fn by_pair(name: &str, brand: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            brand: Some(brand.to_owned()),
            supplier: None,
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.name.as_deref().map_or(true, |n| n == product.name)
            && self.brand.as_deref().map_or(true, |b| b == product.brand)
            && self.supplier.as_deref().map_or(true, |s| s == product.supplier)
    }
}
