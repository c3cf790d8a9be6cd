//! Cart data model shared by the store, the storage codec and the API client.
//!
//! The JSON shapes here are the wire/storage format: a line-item is the
//! catalog record with an `amount` field merged in, e.g.
//! `{"id": 5, "name": "Shoe", "price": 179.9, "amount": 1}`.

use rocketshoes_core::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog record. Everything except `id` is opaque to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    pub fn new(id: ProductId) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter (mostly for tests and fixtures).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build a product from a raw catalog object fetched for `id`.
    ///
    /// The requested id wins over whatever the record says, and a stray
    /// `amount` attribute is dropped so it cannot collide with the line-item
    /// quantity once merged into the cart.
    pub fn from_record(id: ProductId, mut record: Map<String, Value>) -> Self {
        record.remove("id");
        record.remove("amount");
        Self {
            id,
            attributes: record,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A product in the cart together with the requested quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub amount: i64,
}

impl CartItem {
    /// A fresh line-item with quantity 1.
    pub fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    pub fn id(&self) -> ProductId {
        self.product.id
    }
}

/// Ordered collection of line-items, at most one per product id.
///
/// Serializes as a bare JSON array. Mutation is crate-private: outside code
/// changes the cart only through [`crate::CartStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from untrusted items, keeping the first line-item of each id.
    ///
    /// Returns the cart and the number of duplicates that were dropped.
    pub fn from_items(items: Vec<CartItem>) -> (Self, usize) {
        let mut cart = Self::new();
        let mut dropped = 0;
        for item in items {
            if cart.contains(item.id()) {
                dropped += 1;
            } else {
                cart.items.push(item);
            }
        }
        (cart, dropped)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Sum of all requested quantities, saturating at `i64::MAX`.
    pub fn total_amount(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, item| total.saturating_add(item.amount))
    }

    pub(crate) fn push(&mut self, item: CartItem) {
        debug_assert!(!self.contains(item.id()));
        self.items.push(item);
    }

    /// Returns `false` when no line-item has this id.
    pub(crate) fn set_amount(&mut self, id: ProductId, amount: i64) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.amount = amount;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Available quantity of a product, as reported by the inventory endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: i64,
}

/// Input of [`crate::CartStore::update_product_amount`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shoe(id: u64) -> Product {
        Product::new(ProductId::new(id))
            .with_attribute("name", "Shoe")
            .with_attribute("price", 179.9)
    }

    #[test]
    fn line_item_serializes_flat() {
        let item = CartItem::new(shoe(5));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({"id": 5, "name": "Shoe", "price": 179.9, "amount": 1})
        );
    }

    #[test]
    fn line_item_deserializes_without_leaking_amount_into_attributes() {
        let item: CartItem =
            serde_json::from_value(json!({"id": 3, "title": "Boot", "amount": 4})).unwrap();
        assert_eq!(item.id(), ProductId::new(3));
        assert_eq!(item.amount, 4);
        assert_eq!(item.product.attribute("title"), Some(&json!("Boot")));
        assert!(item.product.attribute("amount").is_none());
        assert!(item.product.attribute("id").is_none());
    }

    #[test]
    fn from_record_prefers_requested_id_and_drops_amount() {
        let record = json!({"id": 99, "name": "Shoe", "amount": 12});
        let Value::Object(map) = record else {
            panic!("Expected object");
        };
        let product = Product::from_record(ProductId::new(5), map);
        assert_eq!(product.id, ProductId::new(5));
        assert_eq!(product.attribute("name"), Some(&json!("Shoe")));
        assert!(product.attribute("amount").is_none());
    }

    #[test]
    fn from_items_keeps_first_of_each_id() {
        let mut second = CartItem::new(shoe(1));
        second.amount = 7;
        let (cart, dropped) =
            Cart::from_items(vec![CartItem::new(shoe(1)), CartItem::new(shoe(2)), second]);

        assert_eq!(dropped, 1);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 1);
    }

    #[test]
    fn cart_serializes_as_array() {
        let (cart, _) = Cart::from_items(vec![CartItem::new(shoe(1))]);
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], json!(1));
    }

    #[test]
    fn mutation_helpers_target_one_id() {
        let (mut cart, _) =
            Cart::from_items(vec![CartItem::new(shoe(1)), CartItem::new(shoe(2))]);

        assert!(cart.set_amount(ProductId::new(2), 3));
        assert!(!cart.set_amount(ProductId::new(9), 3));
        assert_eq!(cart.total_amount(), 4);

        let removed = cart.remove(ProductId::new(1)).unwrap();
        assert_eq!(removed.id(), ProductId::new(1));
        assert!(cart.remove(ProductId::new(1)).is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn total_amount_saturates() {
        let mut big = CartItem::new(shoe(1));
        big.amount = i64::MAX;
        let (cart, _) = Cart::from_items(vec![big, CartItem::new(shoe(2))]);
        assert_eq!(cart.total_amount(), i64::MAX);
    }

    #[test]
    fn update_request_uses_camel_case() {
        let request: UpdateProductAmount =
            serde_json::from_value(json!({"productId": 1, "amount": 2})).unwrap();
        assert_eq!(request.product_id, ProductId::new(1));
        assert_eq!(request.amount, 2);
    }
}
