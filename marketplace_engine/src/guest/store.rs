use std::time::Duration;

use log::trace;
use moka::future::Cache;
use uuid::Uuid;

use super::objects::{GuestCartEntry, GuestKey, GuestWishlistEntry};
use crate::db_types::{CartAddRequest, CartQuantityUpdate, GuestId, RECENTLY_VIEWED_LIMIT};

/// How long an untouched guest collection survives. Every write refreshes the clock (sliding expiry), so an active
/// guest never loses data and a fully inactive one is purged without explicit deletion.
const GUEST_DATA_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// TTL-backed store for everything scoped to an anonymous shopper: cart, wishlist, recently-viewed trail and push
/// token.
///
/// Collections are keyed `guest_<id>_<kind>` and hold newest-first sequences whose entries carry generated uuids for
/// targeted removal. The push token map is keyed by the bare guest id. Cloning the store is cheap and all clones
/// share the same data.
#[derive(Clone)]
pub struct GuestStore {
    carts: Cache<String, Vec<GuestCartEntry>>,
    wishlists: Cache<String, Vec<GuestWishlistEntry>>,
    recently_viewed: Cache<String, Vec<i64>>,
    push_tokens: Cache<String, String>,
}

impl Default for GuestStore {
    fn default() -> Self {
        Self::with_time_to_idle(GUEST_DATA_TTL)
    }
}

impl GuestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store with a custom idle expiry. Production callers want [`GuestStore::new`]; tests use short
    /// windows to exercise eviction.
    pub fn with_time_to_idle(ttl: Duration) -> Self {
        Self {
            carts: Cache::builder().time_to_idle(ttl).build(),
            wishlists: Cache::builder().time_to_idle(ttl).build(),
            recently_viewed: Cache::builder().time_to_idle(ttl).build(),
            push_tokens: Cache::builder().time_to_idle(ttl).build(),
        }
    }

    //--------------------------------------      Cart       ---------------------------------------------------------

    /// The guest's cart entries, newest first.
    pub async fn cart(&self, guest_id: &GuestId) -> Vec<GuestCartEntry> {
        self.carts.get(&GuestKey::Cart.format(guest_id)).await.unwrap_or_default()
    }

    /// Adds to the guest cart. An existing (product, variation) entry has its quantity incremented; otherwise a
    /// fresh entry is pushed to the front.
    pub async fn add_cart_entry(&self, guest_id: &GuestId, request: &CartAddRequest) -> GuestCartEntry {
        let key = GuestKey::Cart.format(guest_id);
        let mut cart = self.carts.get(&key).await.unwrap_or_default();
        let entry = match cart
            .iter_mut()
            .find(|e| e.product_id == request.product_id && e.variation_id == request.variation_id)
        {
            Some(existing) => {
                existing.quantity += request.quantity;
                existing.clone()
            },
            None => {
                let entry = GuestCartEntry {
                    id: Uuid::new_v4().to_string(),
                    store_id: request.store_id,
                    product_id: request.product_id,
                    variation_id: request.variation_id,
                    quantity: request.quantity,
                    delivery_detail_id: request.delivery_detail_id,
                };
                cart.insert(0, entry.clone());
                entry
            },
        };
        self.carts.insert(key, cart).await;
        entry
    }

    /// Removes a cart entry by its uuid, returning it so the caller can release the reserved stock.
    pub async fn remove_cart_entry(&self, guest_id: &GuestId, entry_id: &str) -> Option<GuestCartEntry> {
        let key = GuestKey::Cart.format(guest_id);
        let mut cart = self.carts.get(&key).await.unwrap_or_default();
        let position = cart.iter().position(|e| e.id == entry_id)?;
        let entry = cart.remove(position);
        self.carts.insert(key, cart).await;
        Some(entry)
    }

    /// Bulk-sets quantities on the entries matching each (product, variation) key. Returns the number of entries
    /// changed.
    pub async fn set_cart_quantities(&self, guest_id: &GuestId, updates: &[CartQuantityUpdate]) -> usize {
        let key = GuestKey::Cart.format(guest_id);
        let mut cart = self.carts.get(&key).await.unwrap_or_default();
        let mut changed = 0;
        for update in updates {
            if let Some(entry) = cart
                .iter_mut()
                .find(|e| e.product_id == update.product_id && e.variation_id == update.variation_id)
            {
                entry.quantity = update.quantity;
                changed += 1;
            }
        }
        if changed > 0 {
            self.carts.insert(key, cart).await;
        }
        changed
    }

    /// Deletes the whole cart collection, freeing the cache slot ahead of its TTL.
    pub async fn invalidate_cart(&self, guest_id: &GuestId) {
        self.carts.invalidate(&GuestKey::Cart.format(guest_id)).await;
        trace!("🧳️ Guest {guest_id} cart collection dropped");
    }

    //--------------------------------------    Wishlist     ---------------------------------------------------------

    /// The guest's wishlist, newest first.
    pub async fn wishlist(&self, guest_id: &GuestId) -> Vec<GuestWishlistEntry> {
        self.wishlists.get(&GuestKey::Wishlist.format(guest_id)).await.unwrap_or_default()
    }

    /// Adds to the guest wishlist. Any entry matching the (product, variation) pair is replaced and the fresh entry
    /// goes to the front, so the no-duplicates invariant holds.
    pub async fn add_wishlist_entry(
        &self,
        guest_id: &GuestId,
        product_id: i64,
        variation_id: i64,
    ) -> GuestWishlistEntry {
        let key = GuestKey::Wishlist.format(guest_id);
        let mut list = self.wishlists.get(&key).await.unwrap_or_default();
        list.retain(|e| !(e.product_id == product_id && e.variation_id == variation_id));
        let entry = GuestWishlistEntry { id: Uuid::new_v4().to_string(), product_id, variation_id };
        list.insert(0, entry.clone());
        self.wishlists.insert(key, list).await;
        entry
    }

    pub async fn remove_wishlist_entry_by_id(
        &self,
        guest_id: &GuestId,
        entry_id: &str,
    ) -> Option<GuestWishlistEntry> {
        let key = GuestKey::Wishlist.format(guest_id);
        let mut list = self.wishlists.get(&key).await.unwrap_or_default();
        let position = list.iter().position(|e| e.id == entry_id)?;
        let entry = list.remove(position);
        self.wishlists.insert(key, list).await;
        Some(entry)
    }

    pub async fn remove_wishlist_entry_by_pair(
        &self,
        guest_id: &GuestId,
        product_id: i64,
        variation_id: i64,
    ) -> Option<GuestWishlistEntry> {
        let key = GuestKey::Wishlist.format(guest_id);
        let mut list = self.wishlists.get(&key).await.unwrap_or_default();
        let position = list.iter().position(|e| e.product_id == product_id && e.variation_id == variation_id)?;
        let entry = list.remove(position);
        self.wishlists.insert(key, list).await;
        Some(entry)
    }

    pub async fn invalidate_wishlist(&self, guest_id: &GuestId) {
        self.wishlists.invalidate(&GuestKey::Wishlist.format(guest_id)).await;
        trace!("🧳️ Guest {guest_id} wishlist collection dropped");
    }

    //--------------------------------------  Recently viewed  -------------------------------------------------------

    /// Recently viewed product ids, newest first, at most [`RECENTLY_VIEWED_LIMIT`].
    pub async fn recently_viewed(&self, guest_id: &GuestId) -> Vec<i64> {
        self.recently_viewed.get(&GuestKey::RecentlyViewed.format(guest_id)).await.unwrap_or_default()
    }

    /// Records a view: the product moves to the front and the list is capped at [`RECENTLY_VIEWED_LIMIT`].
    pub async fn log_view(&self, guest_id: &GuestId, product_id: i64) {
        let key = GuestKey::RecentlyViewed.format(guest_id);
        let mut recent = self.recently_viewed.get(&key).await.unwrap_or_default();
        recent.retain(|p| *p != product_id);
        recent.insert(0, product_id);
        recent.truncate(RECENTLY_VIEWED_LIMIT);
        self.recently_viewed.insert(key, recent).await;
    }

    pub async fn invalidate_recently_viewed(&self, guest_id: &GuestId) {
        self.recently_viewed.invalidate(&GuestKey::RecentlyViewed.format(guest_id)).await;
        trace!("🧳️ Guest {guest_id} recently-viewed collection dropped");
    }

    //--------------------------------------    Push token   ---------------------------------------------------------

    pub async fn set_push_token(&self, guest_id: &GuestId, token: &str) {
        self.push_tokens.insert(guest_id.as_str().to_string(), token.to_string()).await;
    }

    pub async fn push_token(&self, guest_id: &GuestId) -> Option<String> {
        self.push_tokens.get(guest_id.as_str()).await
    }

    pub async fn invalidate_push_token(&self, guest_id: &GuestId) {
        self.push_tokens.invalidate(guest_id.as_str()).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn add_request(product_id: i64, variation_id: i64, quantity: i64) -> CartAddRequest {
        CartAddRequest { store_id: 1, product_id, variation_id, quantity, delivery_detail_id: None }
    }

    #[tokio::test]
    async fn cart_entries_deduplicate_by_product_and_variation() {
        let store = GuestStore::new();
        let guest = GuestId::from("g1");
        let first = store.add_cart_entry(&guest, &add_request(10, 100, 2)).await;
        let again = store.add_cart_entry(&guest, &add_request(10, 100, 3)).await;
        store.add_cart_entry(&guest, &add_request(10, 101, 1)).await;

        assert_eq!(first.id, again.id);
        assert_eq!(again.quantity, 5);
        let cart = store.cart(&guest).await;
        assert_eq!(cart.len(), 2);
        // the fresh variation sits in front of the older line
        assert_eq!(cart[0].variation_id, 101);
    }

    #[tokio::test]
    async fn removing_a_cart_entry_returns_it() {
        let store = GuestStore::new();
        let guest = GuestId::from("g1");
        let entry = store.add_cart_entry(&guest, &add_request(10, 100, 2)).await;

        assert!(store.remove_cart_entry(&guest, "not-an-id").await.is_none());
        let removed = store.remove_cart_entry(&guest, &entry.id).await.unwrap();
        assert_eq!(removed.quantity, 2);
        assert!(store.cart(&guest).await.is_empty());
    }

    #[tokio::test]
    async fn wishlist_replaces_matching_pairs() {
        let store = GuestStore::new();
        let guest = GuestId::from("g2");
        store.add_wishlist_entry(&guest, 10, 100).await;
        store.add_wishlist_entry(&guest, 11, 110).await;
        store.add_wishlist_entry(&guest, 10, 100).await;

        let list = store.wishlist(&guest).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].product_id, 10);
        assert_eq!(list[1].product_id, 11);
    }

    #[tokio::test]
    async fn recently_viewed_caps_at_ten() {
        let store = GuestStore::new();
        let guest = GuestId::from("g3");
        for product_id in 1..=12 {
            store.log_view(&guest, product_id).await;
        }
        // re-viewing moves to the front without duplicating
        store.log_view(&guest, 5).await;

        let recent = store.recently_viewed(&guest).await;
        assert_eq!(recent.len(), RECENTLY_VIEWED_LIMIT);
        assert_eq!(recent[0], 5);
        assert_eq!(recent.iter().filter(|p| **p == 5).count(), 1);
    }

    #[tokio::test]
    async fn collections_are_isolated_per_guest() {
        let store = GuestStore::new();
        let alice = GuestId::from("alice");
        let bob = GuestId::from("bob");
        store.add_cart_entry(&alice, &add_request(10, 100, 1)).await;
        store.set_push_token(&alice, "token-a").await;

        assert!(store.cart(&bob).await.is_empty());
        assert_eq!(store.push_token(&bob).await, None);
        assert_eq!(store.push_token(&alice).await.as_deref(), Some("token-a"));
    }
}
