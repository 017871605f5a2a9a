//! In-Memory Product Repository

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::product::{Product, ProductDraft, ProductId};
use crate::domain::repository::ProductRepository;
use crate::error::CatalogResult;

#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: &Product) -> CatalogResult<()> {
        self.products
            .write()
            .await
            .insert(product.product_id, product.clone());
        Ok(())
    }

    async fn list(&self) -> CatalogResult<Vec<Product>> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(products)
    }

    async fn find_by_id(&self, product_id: &ProductId) -> CatalogResult<Option<Product>> {
        Ok(self.products.read().await.get(product_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> CatalogResult<Option<Product>> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.name == name)
            .min_by_key(|p| p.created_at)
            .cloned())
    }

    async fn replace(
        &self,
        product_id: &ProductId,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> CatalogResult<Option<Product>> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(product_id).map(|product| {
            product.replace(draft, now);
            product.clone()
        }))
    }

    async fn delete(&self, product_id: &ProductId) -> CatalogResult<bool> {
        Ok(self.products.write().await.remove(product_id).is_some())
    }
}
