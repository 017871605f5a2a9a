//! Product Entity

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};
pub use kernel::id::ProductId;

const MAX_TEXT_LENGTH: usize = 50;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Smallest currency unit
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated product fields for create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: i64,
}

impl ProductDraft {
    /// Trim and validate raw input
    pub fn new(
        name: &str,
        description: &str,
        category: &str,
        price: i64,
    ) -> CatalogResult<Self> {
        if price < 0 {
            return Err(CatalogError::InvalidInput(
                "price must not be negative".to_string(),
            ));
        }

        Ok(Self {
            name: text_field(name, "name")?,
            description: text_field(description, "description")?,
            category: text_field(category, "category")?,
            price,
        })
    }
}

fn text_field(value: &str, field: &str) -> CatalogResult<String> {
    let value = value.trim();
    let len = value.chars().count();

    if len == 0 || len > MAX_TEXT_LENGTH {
        return Err(CatalogError::InvalidInput(format!(
            "{} must be 1-{} characters",
            field, MAX_TEXT_LENGTH
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(CatalogError::InvalidInput(format!(
            "{} contains control characters",
            field
        )));
    }

    Ok(value.to_string())
}

impl Product {
    pub fn new(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            product_id: ProductId::new(),
            name: draft.name,
            description: draft.description,
            category: draft.category,
            price: draft.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace all editable fields
    pub fn replace(&mut self, draft: ProductDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.category = draft.category;
        self.price = draft.price;
        self.updated_at = now;
    }
}

/// Parse a path segment as a product id
pub fn parse_product_id(raw: &str) -> CatalogResult<ProductId> {
    raw.trim().parse().map_err(|_| CatalogError::InvalidId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_trims() {
        let draft = ProductDraft::new("  Mop ", "Cotton mop", "Cleaning Product", 1299).unwrap();
        assert_eq!(draft.name, "Mop");
    }

    #[test]
    fn test_draft_rejects_negative_price() {
        assert!(matches!(
            ProductDraft::new("Mop", "Cotton mop", "Cleaning Product", -1),
            Err(CatalogError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_draft_rejects_blank_and_long_fields() {
        assert!(ProductDraft::new("   ", "Cotton mop", "Cleaning Product", 0).is_err());
        assert!(ProductDraft::new("Mop", &"x".repeat(51), "Cleaning Product", 0).is_err());
        assert!(ProductDraft::new("Mop", "Cotton\u{0}mop", "Cleaning Product", 0).is_err());
    }

    #[test]
    fn test_replace_touches_updated_at() {
        let mut product =
            Product::new(ProductDraft::new("Mop", "Cotton mop", "Cleaning Product", 1299).unwrap());
        let created = product.created_at;
        let later = created + chrono::Duration::seconds(5);

        product.replace(
            ProductDraft::new("Broom", "Straw broom", "Cleaning Product", 899).unwrap(),
            later,
        );

        assert_eq!(product.name, "Broom");
        assert_eq!(product.price, 899);
        assert_eq!(product.created_at, created);
        assert_eq!(product.updated_at, later);
    }

    #[test]
    fn test_parse_product_id() {
        assert!(parse_product_id("not-an-id").is_err());
        let id = ProductId::new();
        assert_eq!(parse_product_id(&id.to_string()).unwrap(), id);
    }
}
