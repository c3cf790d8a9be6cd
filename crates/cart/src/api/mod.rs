//! Catalog and inventory lookups used to validate cart changes.

use std::sync::Arc;

use async_trait::async_trait;
use rocketshoes_core::ProductId;

use crate::error::ApiError;
use crate::types::{Product, Stock};

pub mod http;
pub mod memory;

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalog;

/// Remote source of product records and stock levels.
///
/// Stock is never cached: every call is a fresh lookup.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Current available quantity of a product.
    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError>;

    /// Product record, or `None` when the catalog has no data for the id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, ApiError>;
}

#[async_trait]
impl<T> CatalogApi for Arc<T>
where
    T: CatalogApi + ?Sized,
{
    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        (**self).stock(id).await
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        (**self).product(id).await
    }
}
