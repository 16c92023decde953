use serde::{Deserialize, Serialize};

use crate::{
    db_types::{CartLine, WishlistEntry},
    guest::{GuestCartEntry, GuestWishlistEntry},
};

/// A cart line as presented to callers, independent of whether it lives in the durable ledger (numeric row id) or
/// the guest store (uuid). Ids are strings so both flavours fit one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemView {
    pub id: String,
    pub store_id: i64,
    pub product_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
    pub delivery_detail_id: Option<i64>,
}

impl From<CartLine> for CartItemView {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            store_id: line.store_id,
            product_id: line.product_id,
            variation_id: line.variation_id,
            quantity: line.quantity,
            delivery_detail_id: line.delivery_detail_id,
        }
    }
}

impl From<GuestCartEntry> for CartItemView {
    fn from(entry: GuestCartEntry) -> Self {
        Self {
            id: entry.id,
            store_id: entry.store_id,
            product_id: entry.product_id,
            variation_id: entry.variation_id,
            quantity: entry.quantity,
            delivery_detail_id: entry.delivery_detail_id,
        }
    }
}

/// The whole cart, newest line first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub count: usize,
}

/// A wishlist entry as presented to callers; see [`CartItemView`] for the id convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItemView {
    pub id: String,
    pub product_id: i64,
    pub variation_id: i64,
}

impl From<WishlistEntry> for WishlistItemView {
    fn from(entry: WishlistEntry) -> Self {
        Self { id: entry.id.to_string(), product_id: entry.product_id, variation_id: entry.variation_id }
    }
}

impl From<GuestWishlistEntry> for WishlistItemView {
    fn from(entry: GuestWishlistEntry) -> Self {
        Self { id: entry.id, product_id: entry.product_id, variation_id: entry.variation_id }
    }
}
