use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rocketshoes_core::ProductId;

use super::CatalogApi;
use crate::error::ApiError;
use crate::types::{Product, Stock};

/// In-memory catalog with fixed products and stock levels.
///
/// Intended for tests/dev. Ids registered with [`InMemoryCatalog::fail_for`]
/// answer every lookup with a simulated network error, and an optional
/// latency is awaited before each answer so overlapping calls really overlap.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
    stock: RwLock<HashMap<ProductId, i64>>,
    failing: RwLock<HashSet<ProductId>>,
    latency: Option<Duration>,
    lookups: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with its available stock.
    pub fn with_product(self, product: Product, stock: i64) -> Self {
        let id = product.id;
        write(&self.products).insert(id, product);
        self.set_stock(id, stock);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Change the stock level of a product, e.g. between two operations.
    pub fn set_stock(&self, id: ProductId, amount: i64) {
        write(&self.stock).insert(id, amount);
    }

    pub fn fail_for(&self, id: ProductId) {
        write(&self.failing).insert(id);
    }

    pub fn recover(&self, id: ProductId) {
        write(&self.failing).remove(&id);
    }

    /// Number of stock and product lookups answered so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    async fn before_lookup(&self, id: ProductId) -> Result<(), ApiError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if read(&self.failing).contains(&id) {
            return Err(ApiError::Network(format!("simulated network failure for {id}")));
        }
        Ok(())
    }
}

// Every map write is a single insert/remove, so a poisoned lock still holds
// consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        self.before_lookup(id).await?;
        let amount = read(&self.stock).get(&id).copied().ok_or(ApiError::NotFound)?;
        Ok(Stock { id, amount })
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        self.before_lookup(id).await?;
        Ok(read(&self.products).get(&id).cloned())
    }
}
