//! Manage Products Use Case

use chrono::Utc;
use std::sync::Arc;

use crate::domain::product::{Product, ProductDraft, ProductId};
use crate::domain::repository::ProductRepository;
use crate::error::{CatalogError, CatalogResult};

/// Raw product fields as received
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: i64,
}

impl ProductInput {
    fn into_draft(self) -> CatalogResult<ProductDraft> {
        ProductDraft::new(&self.name, &self.description, &self.category, self.price)
    }
}

pub struct ManageProductsUseCase<R>
where
    R: ProductRepository,
{
    repo: Arc<R>,
}

impl<R> ManageProductsUseCase<R>
where
    R: ProductRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> CatalogResult<Vec<Product>> {
        self.repo.list().await
    }

    pub async fn get(&self, product_id: &ProductId) -> CatalogResult<Product> {
        self.repo
            .find_by_id(product_id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// The name is used as given, without trimming
    pub async fn get_by_name(&self, name: &str) -> CatalogResult<Product> {
        self.repo
            .find_by_name(name)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    pub async fn create(&self, input: ProductInput) -> CatalogResult<Product> {
        let product = Product::new(input.into_draft()?);
        self.repo.insert(&product).await?;

        tracing::info!(
            product_id = %product.product_id,
            name = %product.name,
            "Product created"
        );

        Ok(product)
    }

    pub async fn update(
        &self,
        product_id: &ProductId,
        input: ProductInput,
    ) -> CatalogResult<Product> {
        let draft = input.into_draft()?;
        let product = self
            .repo
            .replace(product_id, draft, Utc::now())
            .await?
            .ok_or(CatalogError::NotFound)?;

        tracing::info!(product_id = %product_id, "Product updated");
        Ok(product)
    }

    pub async fn delete(&self, product_id: &ProductId) -> CatalogResult<()> {
        if !self.repo.delete(product_id).await? {
            return Err(CatalogError::NotFound);
        }

        tracing::info!(product_id = %product_id, "Product deleted");
        Ok(())
    }
}
