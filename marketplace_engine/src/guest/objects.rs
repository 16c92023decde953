use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::GuestId;

/// The cache key namespace for a guest's collections: `guest_<guestId>_<kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestKey {
    Cart,
    Wishlist,
    RecentlyViewed,
}

impl Display for GuestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            GuestKey::Cart => "cart",
            GuestKey::Wishlist => "wishlist",
            GuestKey::RecentlyViewed => "recently_viewed",
        };
        write!(f, "{kind}")
    }
}

impl GuestKey {
    pub fn format(&self, guest_id: &GuestId) -> String {
        format!("guest_{guest_id}_{self}")
    }
}

/// A cart line held for an anonymous shopper. The uuid lets the client target the entry for removal later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartEntry {
    pub id: String,
    pub store_id: i64,
    pub product_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
    pub delivery_detail_id: Option<i64>,
}

/// A wishlist entry held for an anonymous shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestWishlistEntry {
    pub id: String,
    pub product_id: i64,
    pub variation_id: i64,
}

#[cfg(test)]
mod test {
    use super::GuestKey;
    use crate::db_types::GuestId;

    #[test]
    fn key_format() {
        let guest = GuestId::from("g-123");
        assert_eq!(GuestKey::Cart.format(&guest), "guest_g-123_cart");
        assert_eq!(GuestKey::Wishlist.format(&guest), "guest_g-123_wishlist");
        assert_eq!(GuestKey::RecentlyViewed.format(&guest), "guest_g-123_recently_viewed");
    }
}
