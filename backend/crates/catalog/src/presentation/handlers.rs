//! HTTP Handlers

use auth::AuthContext;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::application::ManageProductsUseCase;
use crate::domain::product::{Product, parse_product_id};
use crate::domain::repository::ProductRepository;
use crate::error::CatalogResult;
use crate::presentation::dto::{CreatedProductResponse, ProductAckResponse, ProductRequest};

#[derive(Clone)]
pub struct CatalogAppState<R>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

impl<R> CatalogAppState<R>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    fn use_case(&self) -> ManageProductsUseCase<R> {
        ManageProductsUseCase::new(self.repo.clone())
    }
}

/// GET /api/product/list
pub async fn list_products<R>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<Product>>>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    Ok(Json(state.use_case().list().await?))
}

/// GET /api/product/id/{productId}
pub async fn get_product<R>(
    State(state): State<CatalogAppState<R>>,
    Path(product_id): Path<String>,
) -> CatalogResult<Json<Product>>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    let product_id = parse_product_id(&product_id)?;
    Ok(Json(state.use_case().get(&product_id).await?))
}

/// GET /api/product/name/{productName}
pub async fn get_product_by_name<R>(
    State(state): State<CatalogAppState<R>>,
    Path(name): Path<String>,
) -> CatalogResult<Json<Product>>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    Ok(Json(state.use_case().get_by_name(&name).await?))
}

/// POST /api/product/new
pub async fn create_product<R>(
    State(state): State<CatalogAppState<R>>,
    auth: AuthContext,
    Json(req): Json<ProductRequest>,
) -> CatalogResult<impl IntoResponse>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    let product = state.use_case().create(req.into()).await?;
    tracing::debug!(product_id = %product.product_id, created_by = %auth.user_id(), "Product created via API");

    Ok((
        StatusCode::CREATED,
        Json(CreatedProductResponse {
            message: "Product created successfully".to_string(),
            new_product_id: product.product_id,
        }),
    ))
}

/// PUT /api/product/{productId}
pub async fn update_product<R>(
    State(state): State<CatalogAppState<R>>,
    Path(product_id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> CatalogResult<Json<ProductAckResponse>>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    let product_id = parse_product_id(&product_id)?;
    state.use_case().update(&product_id, req.into()).await?;

    Ok(Json(ProductAckResponse {
        message: "Product updated".to_string(),
        product_id,
    }))
}

/// DELETE /api/product/{productId}
pub async fn delete_product<R>(
    State(state): State<CatalogAppState<R>>,
    Path(product_id): Path<String>,
) -> CatalogResult<Json<ProductAckResponse>>
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    let product_id = parse_product_id(&product_id)?;
    state.use_case().delete(&product_id).await?;

    Ok(Json(ProductAckResponse {
        message: "Product deleted".to_string(),
        product_id,
    }))
}
