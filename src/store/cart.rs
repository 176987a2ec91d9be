//! Shopping cart with derived totals.

use serde::{Deserialize, Serialize};

use super::Persisted;
use crate::models::{CartItem, CartProduct, CartView};

/// Flat delivery charge added to every order.
pub const DELIVERY_FEE: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct CartStore {
    items: Vec<CartItem>,
    subtotal: f64,
    discount: f64,
    delivery_fee: f64,
    total: f64,
}

/// Only the lines are persisted; totals are derived on rehydration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            subtotal: 0.0,
            discount: 0.0,
            delivery_fee: DELIVERY_FEE,
            total: 0.0,
        }
    }
}

impl CartStore {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    pub fn view(&self) -> CartView {
        CartView {
            items: self.items().to_vec(),
            item_count: self.item_count(),
            subtotal: self.subtotal(),
            discount: self.discount,
            delivery_fee: self.delivery_fee,
            total: self.total(),
        }
    }

    /// Add `quantity` of a product, merging into an existing line.
    ///
    /// Quantities saturate at `u32::MAX`.
    pub fn add_item(&mut self, product: CartProduct, quantity: u32) {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem {
                id: product.id,
                product,
                quantity,
            }),
        }
        self.recalculate_totals();
    }

    pub fn remove_item(&mut self, product_id: i64) {
        self.items.retain(|item| item.id != product_id);
        self.recalculate_totals();
    }

    /// Set a line quantity; anything below one removes the line.
    pub fn update_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity < 1 {
            self.remove_item(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product_id) {
            item.quantity = quantity;
        }
        self.recalculate_totals();
    }

    pub fn increase_quantity(&mut self, product_id: i64) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product_id) {
            item.quantity = item.quantity.saturating_add(1);
        }
        self.recalculate_totals();
    }

    /// Decrease by one; a line at quantity one is removed.
    pub fn decrease_quantity(&mut self, product_id: i64) {
        let Some(item) = self.items.iter_mut().find(|item| item.id == product_id) else {
            return;
        };
        if item.quantity <= 1 {
            self.remove_item(product_id);
            return;
        }
        item.quantity -= 1;
        self.recalculate_totals();
    }

    /// Empty the cart. The delivery fee is not re-added to `total` until the
    /// next mutation.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.subtotal = 0.0;
        self.discount = 0.0;
        self.total = 0.0;
    }

    fn recalculate_totals(&mut self) {
        self.subtotal = self
            .items
            .iter()
            .map(|item| item.product.price * f64::from(item.quantity))
            .sum();
        self.total = self.subtotal - self.discount + self.delivery_fee;
    }
}

impl Persisted for CartStore {
    const STORAGE_KEY: &'static str = "cart-storage";
    type Snapshot = CartSnapshot;

    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
        }
    }

    fn rehydrate(snapshot: CartSnapshot) -> Self {
        let mut store = Self {
            items: snapshot.items,
            ..Self::default()
        };
        store.recalculate_totals();
        store
    }
}
