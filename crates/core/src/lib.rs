//! `rocketshoes-core`: domain building blocks shared by the storefront crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::ProductId;
