//! Product Catalog Module
//!
//! - `domain/` - Product entity and repository trait
//! - `application/` - Product use cases
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! Writes are gated by `auth` permissions (`product:create`,
//! `product:update`, `product:delete`); reads are public.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use domain::{Product, ProductId, ProductRepository};
pub use error::{CatalogError, CatalogResult};
pub use infra::{InMemoryProductRepository, PgProductRepository};
pub use presentation::router::{catalog_router, catalog_router_generic};
