//! PostgreSQL Product Repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::product::{Product, ProductDraft, ProductId};
use crate::domain::repository::ProductRepository;
use crate::error::CatalogResult;

const PRODUCT_COLUMNS: &str = "product_id, name, description, category, price, created_at, updated_at";

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for PgProductRepository {
    async fn insert(&self, product: &Product) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                product_id,
                name,
                description,
                category,
                price,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.product_id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> CatalogResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, created_at");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, product_id: &ProductId) -> CatalogResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn find_by_name(&self, name: &str) -> CatalogResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = $1 ORDER BY created_at LIMIT 1"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn replace(
        &self,
        product_id: &ProductId,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> CatalogResult<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products SET
                name = $2,
                description = $3,
                category = $4,
                price = $5,
                updated_at = $6
            WHERE product_id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product_id.as_uuid())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.category)
            .bind(draft.price)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, product_id: &ProductId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: Uuid,
    name: String,
    description: String,
    category: String,
    price: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            product_id: ProductId::from_uuid(row.product_id),
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
