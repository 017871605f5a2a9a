//! Catalog Router
//!
//! Routes under `/api/product`. Reads are public; writes are guarded by
//! the auth gate with product permissions.

use auth::domain::value_object::Permission;
use auth::{Gate, Guard, guarded};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::domain::repository::ProductRepository;
use crate::infra::postgres::PgProductRepository;
use crate::presentation::handlers::{self, CatalogAppState};

/// Create the Catalog router with PostgreSQL repository
pub fn catalog_router(repo: PgProductRepository, gate: Gate) -> Router {
    catalog_router_generic(repo, gate)
}

/// Create a generic Catalog router for any repository implementation
pub fn catalog_router_generic<R>(repo: R, gate: Gate) -> Router
where
    R: ProductRepository + Clone + Send + Sync + 'static,
{
    let state = CatalogAppState {
        repo: Arc::new(repo),
    };

    Router::new()
        .route("/list", get(handlers::list_products::<R>))
        .route("/id/{product_id}", get(handlers::get_product::<R>))
        .route("/name/{product_name}", get(handlers::get_product_by_name::<R>))
        .route(
            "/new",
            guarded(
                post(handlers::create_product::<R>),
                &gate,
                Guard::Permission(Permission::CreateProduct),
            ),
        )
        .route(
            "/{product_id}",
            guarded(
                put(handlers::update_product::<R>),
                &gate,
                Guard::Permission(Permission::UpdateProduct),
            ),
        )
        .route(
            "/{product_id}",
            guarded(
                delete(handlers::delete_product::<R>),
                &gate,
                Guard::Permission(Permission::DeleteProduct),
            ),
        )
        .with_state(state)
}
