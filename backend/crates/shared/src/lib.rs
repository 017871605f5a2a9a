//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - The unified error type and its HTTP classification
//! - Typed entity identifiers
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    #[cfg(feature = "axum")]
    pub mod conversions;
    pub mod kind;
}
pub mod id;
