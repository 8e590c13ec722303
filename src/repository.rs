use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{map_write_error, ProductResult};
use crate::models::{NewProduct, Product, ProductFilter};

/// Row-level access to the `product` table.
///
/// Implementations must reject a second row with an existing (name, brand)
/// pair with `ProductError::Duplicate`, and must never let `stock` go below
/// zero.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Rows matching `filter`, ordered by id.
    async fn find_by(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>>;

    async fn insert(&self, product: &NewProduct) -> ProductResult<Product>;

    /// Replaces every writable column. `None` when the row is gone.
    async fn update(&self, id: i32, product: &NewProduct) -> ProductResult<Option<Product>>;

    /// Number of rows removed.
    async fn delete(&self, id: i32) -> ProductResult<u64>;

    /// Subtracts `quantity` only if enough stock remains. `None` when the row
    /// is gone or the stock is too low.
    async fn decrement_stock(&self, id: i32, quantity: i32) -> ProductResult<Option<Product>>;

    async fn ping(&self) -> ProductResult<()>;
}

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn find_by(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM product");
        let mut separator = " WHERE ";
        for (column, value) in [
            ("name", &filter.name),
            ("brand", &filter.brand),
            ("supplier", &filter.supplier),
        ] {
            if let Some(value) = value {
                query
                    .push(separator)
                    .push(column)
                    .push(" = ")
                    .push_bind(value.clone());
                separator = " AND ";
            }
        }
        query.push(" ORDER BY id");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn insert(&self, product: &NewProduct) -> ProductResult<Product> {
        sqlx::query_as::<_, Product>(
            "INSERT INTO product (name, description, brand, unit, stock, price, supplier) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(&product.unit)
        .bind(product.stock)
        .bind(product.price)
        .bind(&product.supplier)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &product.name, &product.brand))
    }

    async fn update(&self, id: i32, product: &NewProduct) -> ProductResult<Option<Product>> {
        sqlx::query_as::<_, Product>(
            "UPDATE product SET name=$1, description=$2, brand=$3, unit=$4, stock=$5, \
             price=$6, supplier=$7, updated_at=NOW() WHERE id=$8 RETURNING *",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(&product.unit)
        .bind(product.stock)
        .bind(product.price)
        .bind(&product.supplier)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &product.name, &product.brand))
    }

    async fn delete(&self, id: i32) -> ProductResult<u64> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn decrement_stock(&self, id: i32, quantity: i32) -> ProductResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE product SET stock = stock - $1, updated_at = NOW() \
             WHERE id = $2 AND stock >= $1 RETURNING *",
        )
        .bind(quantity)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn ping(&self) -> ProductResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
