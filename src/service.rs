use std::sync::Arc;

use log::info;
use rust_decimal::Decimal;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, ProductFilter, ProductView, StockSale};
use crate::repository::ProductRepository;

/// Drops every digit past the second decimal place, `floor(price * 100) / 100`.
pub fn truncate_price(price: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    let mut truncated = (price * hundred).floor() / hundred;
    truncated.rescale(2);
    truncated
}

/// Business rules for products on top of a [`ProductRepository`].
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, mut input: NewProduct) -> ProductResult<Product> {
        input.validate()?;
        self.ensure_pair_is_free(&input.name, &input.brand).await?;
        input.price = truncate_price(input.price);
        self.repository.insert(&input).await
    }

    pub async fn list(&self, filter: &ProductFilter) -> ProductResult<Vec<ProductView>> {
        let products = self.repository.find_by(filter).await?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> ProductResult<ProductView> {
        self.load(id).await.map(ProductView::from)
    }

    pub async fn update(&self, id: i32, mut input: NewProduct) -> ProductResult<Product> {
        let existing = self.load(id).await?;
        input.validate()?;
        if existing.name != input.name || existing.brand != input.brand {
            self.ensure_pair_is_free(&input.name, &input.brand).await?;
        }
        input.price = truncate_price(input.price);
        self.repository
            .update(id, &input)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    pub async fn delete(&self, id: i32) -> ProductResult<()> {
        match self.repository.delete(id).await? {
            0 => {
                info!("Attempt to delete missing product: {}", id);
                Err(ProductError::NotFound(id))
            }
            _ => Ok(()),
        }
    }

    pub async fn adjust_stock(&self, id: i32, sale: StockSale) -> ProductResult<Product> {
        sale.validate()?;
        let product = self.load(id).await?;
        let insufficient = |available| ProductError::InsufficientStock {
            id,
            requested: sale.quantity_sold,
            available,
        };
        if sale.quantity_sold > product.stock {
            return Err(insufficient(product.stock));
        }
        match self.repository.decrement_stock(id, sale.quantity_sold).await? {
            Some(product) => Ok(product),
            // Another sale got there first.
            None => {
                let current = self.load(id).await?;
                Err(insufficient(current.stock))
            }
        }
    }

    pub async fn health(&self) -> ProductResult<()> {
        self.repository.ping().await
    }

    async fn load(&self, id: i32) -> ProductResult<Product> {
        match self.repository.find_by_id(id).await? {
            Some(product) => Ok(product),
            None => {
                info!("Product not found: {}", id);
                Err(ProductError::NotFound(id))
            }
        }
    }

    async fn ensure_pair_is_free(&self, name: &str, brand: &str) -> ProductResult<()> {
        let existing = self
            .repository
            .find_by(&ProductFilter::by_pair(name, brand))
            .await?;
        if existing.is_empty() {
            Ok(())
        } else {
            Err(ProductError::Duplicate {
                name: name.to_owned(),
                brand: brand.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        assert_eq!(truncate_price(dec("9.999")), dec("9.99"));
        assert_eq!(truncate_price(dec("0.015")), dec("0.01"));
        assert_eq!(truncate_price(dec("123.456789")), dec("123.45"));
    }

    #[test]
    fn test_keeps_two_decimal_scale() {
        let price = truncate_price(dec("10"));
        assert_eq!(price, dec("10.00"));
        assert_eq!(price.scale(), 2);
        assert_eq!(truncate_price(dec("4.5")).to_string(), "4.50");
    }

    #[test]
    fn test_already_truncated_price_is_unchanged() {
        assert_eq!(truncate_price(dec("18.90")), dec("18.90"));
        assert_eq!(truncate_price(Decimal::ZERO), Decimal::ZERO);
    }
}
