//! `rocketshoes-cart`
//!
//! **Responsibility:** client-side shopping cart for the RocketShoes storefront.
//!
//! This crate provides:
//! - `CartStore`: owned cart state with add/remove/update operations
//! - Local storage of the cart (`SqliteStorage`, `InMemoryStorage`)
//! - Stock and product lookups against the storefront API (`HttpCatalogClient`)
//! - Notifications for presentation layers
//!
//! The storefront API remains the authority on stock; the cart never caches it.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;
pub mod types;

pub use api::{CatalogApi, HttpCatalogClient, InMemoryCatalog};
pub use config::CartConfig;
pub use error::{ApiError, CartError, StorageError};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier, notify_outcome};
pub use storage::{CART_STORAGE_KEY, CartStorage, InMemoryStorage, SqliteStorage};
pub use store::CartStore;
pub use types::{Cart, CartItem, Product, Stock, UpdateProductAmount};

pub use rocketshoes_core::ProductId;
