//! Repository Traits

use chrono::{DateTime, Utc};

use crate::domain::product::{Product, ProductDraft, ProductId};
use crate::error::CatalogResult;

#[trait_variant::make(ProductRepository: Send)]
pub trait LocalProductRepository {
    async fn insert(&self, product: &Product) -> CatalogResult<()>;

    /// All products ordered by name
    async fn list(&self) -> CatalogResult<Vec<Product>>;

    async fn find_by_id(&self, product_id: &ProductId) -> CatalogResult<Option<Product>>;

    /// Exact name match; the oldest product wins when names repeat
    async fn find_by_name(&self, name: &str) -> CatalogResult<Option<Product>>;

    /// Replace editable fields; `None` if the product does not exist
    async fn replace(
        &self,
        product_id: &ProductId,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> CatalogResult<Option<Product>>;

    /// `false` if the product did not exist
    async fn delete(&self, product_id: &ProductId) -> CatalogResult<bool>;
}
