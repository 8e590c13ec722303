#![allow(dead_code)]

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use product_inventory::models::{NewProduct, Product, ProductFilter};
use product_inventory::{ProductError, ProductRepository, ProductResult, ProductService};
use rust_decimal::Decimal;

/// Store that keeps rows in a `Vec` and enforces the same constraints as the
/// `product` table.
#[derive(Default)]
pub struct InMemoryProductRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: i32,
    rows: Vec<Product>,
}

impl State {
    fn pair_taken(&self, product: &NewProduct, except: Option<i32>) -> bool {
        self.rows.iter().any(|row| {
            Some(row.id) != except && row.name == product.name && row.brand == product.brand
        })
    }
}

fn duplicate(product: &NewProduct) -> ProductError {
    ProductError::Duplicate {
        name: product.name.clone(),
        brand: product.brand.clone(),
    }
}

impl InMemoryProductRepository {
    pub fn stock_of(&self, id: i32) -> Option<i32> {
        let state = self.state.lock().unwrap();
        state.rows.iter().find(|row| row.id == id).map(|row| row.stock)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let state = self.state.lock().unwrap();
        Ok(state.rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_by(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn insert(&self, product: &NewProduct) -> ProductResult<Product> {
        let mut state = self.state.lock().unwrap();
        if state.pair_taken(product, None) {
            return Err(duplicate(product));
        }
        state.next_id += 1;
        let now = Utc::now();
        let row = Product {
            id: state.next_id,
            name: product.name.clone(),
            description: product.description.clone(),
            brand: product.brand.clone(),
            unit: product.unit.clone(),
            stock: product.stock,
            price: product.price,
            supplier: product.supplier.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, product: &NewProduct) -> ProductResult<Option<Product>> {
        let mut state = self.state.lock().unwrap();
        if state.pair_taken(product, Some(id)) {
            return Err(duplicate(product));
        }
        let Some(row) = state.rows.iter_mut().find(|row| row.id == id) else {
            return Ok(None);
        };
        row.name = product.name.clone();
        row.description = product.description.clone();
        row.brand = product.brand.clone();
        row.unit = product.unit.clone();
        row.stock = product.stock;
        row.price = product.price;
        row.supplier = product.supplier.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> ProductResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.rows.len();
        state.rows.retain(|row| row.id != id);
        Ok((before - state.rows.len()) as u64)
    }

    async fn decrement_stock(&self, id: i32, quantity: i32) -> ProductResult<Option<Product>> {
        let mut state = self.state.lock().unwrap();
        match state.rows.iter_mut().find(|row| row.id == id) {
            Some(row) if row.stock >= quantity => {
                row.stock -= quantity;
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn ping(&self) -> ProductResult<()> {
        Ok(())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn setup() -> (Arc<InMemoryProductRepository>, ProductService) {
    init_logging();
    let repository = Arc::new(InMemoryProductRepository::default());
    let service = ProductService::new(repository.clone());
    (repository, service)
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn new_product(name: &str, brand: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("{} by {}", name, brand),
        brand: brand.to_string(),
        unit: "un".to_string(),
        stock: 10,
        price: dec("12.50"),
        supplier: "Acme Distribution".to_string(),
    }
}
