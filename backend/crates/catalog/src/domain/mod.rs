//! Domain Layer

pub mod product;
pub mod repository;

pub use product::{Product, ProductDraft, ProductId, parse_product_id};
pub use repository::ProductRepository;
