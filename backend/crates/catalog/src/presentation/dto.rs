//! API DTOs

use serde::{Deserialize, Serialize};

use crate::application::ProductInput;
use crate::domain::product::ProductId;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: i64,
}

impl From<ProductRequest> for ProductInput {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            category: req.category,
            price: req.price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProductResponse {
    pub message: String,
    pub new_product_id: ProductId,
}

/// Update and delete acknowledgement
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAckResponse {
    pub message: String,
    pub product_id: ProductId,
}
