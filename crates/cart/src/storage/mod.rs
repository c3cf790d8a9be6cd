//! Local storage for the cart.
//!
//! Storage is a plain string key-value store (the shape of browser
//! `localStorage`). The cart lives under a single key as a JSON array; the
//! key is removed when the cart becomes empty.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{Cart, CartItem};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

/// Key under which the serialized cart is stored.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// String key-value storage.
#[async_trait]
pub trait CartStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T> CartStorage for Arc<T>
where
    T: CartStorage + ?Sized,
{
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key).await
    }
}

/// Read the persisted cart.
///
/// A missing key is an empty cart. A value that does not decode as a cart is
/// logged and also treated as empty; it stays in storage until the next
/// successful write replaces it.
pub async fn load_cart<S>(storage: &S) -> Result<Cart, StorageError>
where
    S: CartStorage + ?Sized,
{
    let Some(raw) = storage.get_item(CART_STORAGE_KEY).await? else {
        return Ok(Cart::new());
    };

    let items: Vec<CartItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!("stored cart is not valid JSON, starting with an empty cart: {err}");
            return Ok(Cart::new());
        }
    };

    let (cart, dropped) = Cart::from_items(items);
    if dropped > 0 {
        tracing::warn!("dropped {dropped} duplicate line-items from stored cart");
    }

    Ok(cart)
}

/// Rewrite the persisted cart; an empty cart removes the key.
pub async fn persist_cart<S>(storage: &S, cart: &Cart) -> Result<(), StorageError>
where
    S: CartStorage + ?Sized,
{
    if cart.is_empty() {
        return storage.remove_item(CART_STORAGE_KEY).await;
    }

    let payload = serde_json::to_string(cart)?;
    storage.set_item(CART_STORAGE_KEY, &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use rocketshoes_core::ProductId;

    fn cart_of(ids: &[u64]) -> Cart {
        let items = ids
            .iter()
            .map(|id| CartItem::new(Product::new(ProductId::new(*id)).with_attribute("name", "Shoe")))
            .collect();
        Cart::from_items(items).0
    }

    #[tokio::test]
    async fn missing_key_loads_empty_cart() {
        let storage = InMemoryStorage::new();
        let cart = load_cart(&storage).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn persist_then_load_returns_same_cart() {
        let storage = InMemoryStorage::new();
        let cart = cart_of(&[1, 2]);

        persist_cart(&storage, &cart).await.unwrap();
        let loaded = load_cart(&storage).await.unwrap();

        assert_eq!(loaded, cart);
    }

    #[tokio::test]
    async fn persisting_empty_cart_removes_key() {
        let storage = InMemoryStorage::new();
        persist_cart(&storage, &cart_of(&[1])).await.unwrap();
        assert!(storage.peek(CART_STORAGE_KEY).is_some());

        persist_cart(&storage, &Cart::new()).await.unwrap();
        assert!(storage.peek(CART_STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn corrupt_value_loads_empty_cart_and_is_left_in_place() {
        let storage = InMemoryStorage::new();
        storage.set_item(CART_STORAGE_KEY, "not json").await.unwrap();

        let cart = load_cart(&storage).await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(storage.peek(CART_STORAGE_KEY).as_deref(), Some("not json"));
    }

    #[tokio::test]
    async fn duplicate_ids_in_storage_are_collapsed() {
        let storage = InMemoryStorage::new();
        storage
            .set_item(
                CART_STORAGE_KEY,
                r#"[{"id":1,"amount":2},{"id":1,"amount":5}]"#,
            )
            .await
            .unwrap();

        let cart = load_cart(&storage).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 2);
    }

    #[tokio::test]
    async fn works_through_arc_and_trait_object() {
        let storage: Arc<dyn CartStorage> = Arc::new(InMemoryStorage::new());
        persist_cart(&storage, &cart_of(&[3])).await.unwrap();
        let loaded = load_cart(&storage).await.unwrap();
        assert!(loaded.contains(ProductId::new(3)));
    }
}
