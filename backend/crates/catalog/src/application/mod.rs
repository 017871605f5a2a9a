//! Application Layer

pub mod manage_products;

pub use manage_products::{ManageProductsUseCase, ProductInput};
