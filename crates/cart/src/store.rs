//! The cart store: owned cart state, validated mutations, persistence.
//!
//! ## Mutation flow
//!
//! ```text
//! operation
//!   ↓
//! 1. Acquire the writer gate (FIFO; one mutation at a time per cart)
//!   ↓
//! 2. Validate against the current cart and the catalog/inventory API
//!   ↓
//! 3. Persist the candidate cart (empty cart removes the storage key)
//!   ↓
//! 4. Commit in memory and publish the new snapshot
//! ```
//!
//! A failure at any step returns a `CartError` and leaves both the in-memory
//! and the persisted cart untouched. Infrastructure causes are logged here
//! and collapsed into the operation's generic error.

use rocketshoes_core::ProductId;
use tokio::sync::{Mutex, watch};
use tracing::instrument;

use crate::api::CatalogApi;
use crate::error::{CartError, StorageError};
use crate::storage::{CartStorage, load_cart, persist_cart};
use crate::types::{Cart, CartItem, UpdateProductAmount};

/// Explicitly owned cart state with injected storage and catalog.
///
/// Share it as `Arc<CartStore<_, _>>`; all operations take `&self`.
#[derive(Debug)]
pub struct CartStore<S, C> {
    storage: S,
    catalog: C,
    /// Writer gate. Held for the whole operation, network round-trips included.
    current: Mutex<Cart>,
    snapshot: watch::Sender<Cart>,
}

impl<S, C> CartStore<S, C>
where
    S: CartStorage,
    C: CatalogApi,
{
    /// Build the store from whatever cart is persisted in `storage`.
    pub async fn load(storage: S, catalog: C) -> Result<Self, StorageError> {
        let cart = load_cart(&storage).await?;
        tracing::info!("loaded cart with {} line-items", cart.len());
        Ok(Self::with_cart(storage, catalog, cart))
    }

    fn with_cart(storage: S, catalog: C, cart: Cart) -> Self {
        let (snapshot, _) = watch::channel(cart.clone());
        Self {
            storage,
            catalog,
            current: Mutex::new(cart),
            snapshot,
        }
    }

    /// Snapshot of the last committed cart. Never waits on a running mutation.
    pub fn cart(&self) -> Cart {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every committed cart.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.snapshot.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// An existing line-item is incremented if stock allows; otherwise the
    /// catalog record is fetched and appended with amount 1.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut current = self.current.lock().await;
        let mut next = current.clone();

        match current.get(product_id).map(|item| item.amount) {
            Some(amount) => {
                let stock = self.catalog.stock(product_id).await.map_err(|err| {
                    tracing::error!("stock lookup failed for product {product_id}: {err}");
                    CartError::AddFailed
                })?;

                if amount >= stock.amount {
                    tracing::warn!(
                        "product {product_id}: {amount} in cart, stock {}",
                        stock.amount
                    );
                    return Err(CartError::StockInsufficient);
                }

                next.set_amount(product_id, amount + 1);
            }
            None => {
                let product = match self.catalog.product(product_id).await {
                    Ok(Some(product)) => product,
                    Ok(None) => {
                        tracing::warn!("catalog returned no data for product {product_id}");
                        return Err(CartError::AddFailed);
                    }
                    Err(err) => {
                        tracing::error!("product lookup failed for product {product_id}: {err}");
                        return Err(CartError::AddFailed);
                    }
                };

                if product.id != product_id {
                    tracing::warn!(
                        "catalog answered product {} for requested id {product_id}",
                        product.id
                    );
                }

                let mut item = CartItem::new(product);
                item.product.id = product_id;
                next.push(item);
            }
        }

        self.commit(&mut current, next, CartError::AddFailed).await
    }

    /// Remove a product's line-item entirely.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut current = self.current.lock().await;

        if !current.contains(product_id) {
            tracing::warn!("cannot remove product {product_id}: not in cart");
            return Err(CartError::RemoveFailed);
        }

        let mut next = current.clone();
        next.remove(product_id);

        self.commit(&mut current, next, CartError::RemoveFailed).await
    }

    /// Set a line-item's amount, validated against current stock.
    #[instrument(skip_all, fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(
        &self,
        request: UpdateProductAmount,
    ) -> Result<Cart, CartError> {
        let UpdateProductAmount { product_id, amount } = request;
        let mut current = self.current.lock().await;

        if !current.contains(product_id) {
            tracing::warn!("cannot update product {product_id}: not in cart");
            return Err(CartError::UpdateFailed);
        }

        let stock = self.catalog.stock(product_id).await.map_err(|err| {
            tracing::error!("stock lookup failed for product {product_id}: {err}");
            CartError::UpdateFailed
        })?;

        if amount > stock.amount {
            tracing::warn!(
                "product {product_id}: requested {amount} exceeds stock {}",
                stock.amount
            );
            return Err(CartError::StockInsufficient);
        }

        if amount <= 0 {
            tracing::warn!("product {product_id}: amount {amount} must be positive");
            return Err(CartError::UpdateFailed);
        }

        let mut next = current.clone();
        next.set_amount(product_id, amount);

        self.commit(&mut current, next, CartError::UpdateFailed).await
    }

    /// Persist `next`, then make it the current cart and publish it.
    async fn commit(
        &self,
        current: &mut Cart,
        next: Cart,
        on_failure: CartError,
    ) -> Result<Cart, CartError> {
        if let Err(err) = persist_cart(&self.storage, &next).await {
            tracing::error!("failed to persist cart: {err}");
            return Err(on_failure);
        }

        *current = next.clone();
        self.snapshot.send_replace(next.clone());

        tracing::info!(
            "cart committed: {} line-items, {} units",
            next.len(),
            next.total_amount()
        );

        Ok(next)
    }
}
