//! Integration tests for the one-time reconciliation of guest data into a freshly authenticated account.
mod support;

use marketplace_engine::{
    common::{CartUpsertOutcome, WishlistAddOutcome},
    db_types::{CartAddRequest, CartLine, CartQuantityUpdate, GuestId, Identity, Money, RecentlyViewedEntry, UserId, WishlistEntry},
    guest::{GuestCartEntry, GuestMergeService, GuestStore, MergeOutcome, MergeSession},
    test_utils::seed,
    CartApi,
    CartError,
    CartManagement,
    ShopperApi,
    ShopperError,
    ShopperLedgers,
    SqliteDatabase,
    WishlistApi,
    WishlistError,
    WishlistManagement,
    WishlistSelector,
};
use support::{add_request, new_test_db, PRODUCT_ID};

struct GuestSession {
    db: SqliteDatabase,
    guests: GuestStore,
    guest_id: GuestId,
    user_id: i64,
    variation_a: i64,
    variation_b: i64,
}

/// A guest who filled a cart (2 of A, 1 of B), saved two wishlist pairs, browsed three products and registered a
/// push token -- then signed up.
async fn guest_session() -> GuestSession {
    let db = new_test_db().await;
    let guests = GuestStore::new();
    let guest_id = GuestId::from("guest-314");
    let guest = Identity::Guest(guest_id.clone());
    let user_id = seed::seed_user(&db, "converted").await;
    let variation_a = seed::seed_variation(&db, PRODUCT_ID, Money::from(1000), 10).await;
    let variation_b = seed::seed_variation(&db, 2, Money::from(2000), 10).await;

    let carts = CartApi::new(db.clone(), guests.clone());
    carts.add_to_cart(&guest, &add_request(variation_a, 2)).await.unwrap();
    let mut request = add_request(variation_b, 1);
    request.product_id = 2;
    carts.add_to_cart(&guest, &request).await.unwrap();

    let wishlists = WishlistApi::new(db.clone(), guests.clone());
    wishlists.add_to_wishlist(&guest, PRODUCT_ID, variation_a).await.unwrap();
    wishlists.add_to_wishlist(&guest, 2, variation_b).await.unwrap();

    let shopper = ShopperApi::new(db.clone(), guests.clone());
    for product_id in [5, 6, 7] {
        shopper.log_view(&guest, product_id).await.unwrap();
    }
    shopper.set_push_token(&guest, "guest-device-token").await.unwrap();

    GuestSession { db, guests, guest_id, user_id, variation_a, variation_b }
}

#[tokio::test]
async fn a_full_merge_drains_every_collection_into_the_user() {
    let s = guest_session().await;
    let service = GuestMergeService::new(s.db.clone(), s.guests.clone());
    let session = MergeSession::new();

    let report = service.sync_from_guest(&session, s.user_id, &s.guest_id).await.expect("merge should run");
    assert_eq!(report.cart, MergeOutcome::Merged(2));
    assert_eq!(report.wishlist, MergeOutcome::Merged(2));
    assert_eq!(report.recently_viewed, MergeOutcome::Merged(3));
    assert_eq!(report.push_token, MergeOutcome::Merged(1));

    // the cart now lives in the durable ledger under the new user id
    let cart = s.db.cart_for_user(s.user_id).await.unwrap();
    assert_eq!(cart.len(), 2);
    let line_a = cart.iter().find(|l| l.variation_id == s.variation_a).unwrap();
    assert_eq!(line_a.quantity, 2);

    // the guest adds already reserved stock; the merge itself moves none
    assert_eq!(seed::variation_stock(&s.db, s.variation_a).await, 8);
    assert_eq!(seed::variation_stock(&s.db, s.variation_b).await, 9);

    let wishlist = s.db.wishlist_for_user(s.user_id).await.unwrap();
    assert_eq!(wishlist.len(), 2);

    // newest guest view first, exactly as the guest saw it
    let recent: Vec<i64> =
        s.db.recently_viewed_for_user(s.user_id).await.unwrap().into_iter().map(|v| v.product_id).collect();
    assert_eq!(recent, vec![7, 6, 5]);

    assert_eq!(s.db.push_token_for_user(s.user_id).await.unwrap().as_deref(), Some("guest-device-token"));

    // drained collections are deleted outright, not left empty to idle out
    assert!(s.guests.cart(&s.guest_id).await.is_empty());
    assert!(s.guests.wishlist(&s.guest_id).await.is_empty());
    assert!(s.guests.recently_viewed(&s.guest_id).await.is_empty());
    assert_eq!(s.guests.push_token(&s.guest_id).await, None);
}

#[tokio::test]
async fn the_merge_runs_at_most_once_per_session() {
    let s = guest_session().await;
    let service = GuestMergeService::new(s.db.clone(), s.guests.clone());
    let session = MergeSession::new();

    assert!(service.sync_from_guest(&session, s.user_id, &s.guest_id).await.is_some());
    // a replayed login event in the same session is a no-op
    assert!(service.sync_from_guest(&session, s.user_id, &s.guest_id).await.is_none());

    let cart = s.db.cart_for_user(s.user_id).await.unwrap();
    assert_eq!(cart.len(), 2);

    // a later session merges again, but the collections are already gone
    let later = MergeSession::new();
    let report = service.sync_from_guest(&later, s.user_id, &s.guest_id).await.expect("fresh session merges");
    assert_eq!(report.cart, MergeOutcome::Merged(0));
    assert_eq!(report.push_token, MergeOutcome::Merged(0));
}

#[tokio::test]
async fn merged_cart_quantities_overwrite_existing_lines() {
    let s = guest_session().await;
    // the user already had 1 of variation A in their durable cart before logging in
    let carts = CartApi::new(s.db.clone(), GuestStore::new());
    carts.add_to_cart(&Identity::Authenticated(s.user_id), &add_request(s.variation_a, 1)).await.unwrap();

    let service = GuestMergeService::new(s.db.clone(), s.guests.clone());
    service.sync_from_guest(&MergeSession::new(), s.user_id, &s.guest_id).await.expect("merge should run");

    let cart = s.db.cart_for_user(s.user_id).await.unwrap();
    let line_a = cart.iter().find(|l| l.variation_id == s.variation_a).unwrap();
    // last-writer overwrite: the guest quantity wins, it is not added to the existing 1
    assert_eq!(line_a.quantity, 2);
}

#[tokio::test]
async fn merging_a_wishlist_pair_the_user_already_has_stays_deduplicated() {
    let s = guest_session().await;
    let wishlists = WishlistApi::new(s.db.clone(), GuestStore::new());
    wishlists.add_to_wishlist(&Identity::Authenticated(s.user_id), PRODUCT_ID, s.variation_a).await.unwrap();

    let service = GuestMergeService::new(s.db.clone(), s.guests.clone());
    service.sync_from_guest(&MergeSession::new(), s.user_id, &s.guest_id).await.expect("merge should run");

    let wishlist = s.db.wishlist_for_user(s.user_id).await.unwrap();
    assert_eq!(wishlist.len(), 2);
}

/// Delegates everything to SQLite but refuses wishlist writes, standing in for a collaborator outage limited to one
/// collection.
#[derive(Clone)]
struct WishlistDownBackend {
    inner: SqliteDatabase,
}

impl CartManagement for WishlistDownBackend {
    async fn add_cart_line(&self, user_id: UserId, request: &CartAddRequest) -> Result<CartUpsertOutcome, CartError> {
        self.inner.add_cart_line(user_id, request).await
    }

    async fn update_cart_quantities(
        &self,
        user_id: UserId,
        updates: &[CartQuantityUpdate],
    ) -> Result<u64, CartError> {
        self.inner.update_cart_quantities(user_id, updates).await
    }

    async fn remove_cart_line(&self, user_id: UserId, line_id: i64) -> Result<CartLine, CartError> {
        self.inner.remove_cart_line(user_id, line_id).await
    }

    async fn cart_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, CartError> {
        self.inner.cart_for_user(user_id).await
    }

    async fn reserve_variation_stock(&self, variation_id: i64, quantity: i64) -> Result<(), CartError> {
        self.inner.reserve_variation_stock(variation_id, quantity).await
    }

    async fn release_variation_stock(&self, variation_id: i64, quantity: i64) -> Result<(), CartError> {
        self.inner.release_variation_stock(variation_id, quantity).await
    }

    async fn set_cart_line_from_guest(&self, user_id: UserId, entry: &GuestCartEntry) -> Result<CartLine, CartError> {
        self.inner.set_cart_line_from_guest(user_id, entry).await
    }
}

impl WishlistManagement for WishlistDownBackend {
    async fn add_wishlist_entry(
        &self,
        _user_id: UserId,
        _product_id: i64,
        _variation_id: i64,
    ) -> Result<WishlistAddOutcome, WishlistError> {
        Err(WishlistError::DatabaseError("wishlist storage is down".to_string()))
    }

    async fn remove_wishlist_entry(
        &self,
        _user_id: UserId,
        _selector: &WishlistSelector,
    ) -> Result<WishlistEntry, WishlistError> {
        Err(WishlistError::DatabaseError("wishlist storage is down".to_string()))
    }

    async fn wishlist_for_user(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, WishlistError> {
        self.inner.wishlist_for_user(user_id).await
    }
}

impl ShopperLedgers for WishlistDownBackend {
    async fn log_product_view(&self, user_id: UserId, product_id: i64) -> Result<(), ShopperError> {
        self.inner.log_product_view(user_id, product_id).await
    }

    async fn recently_viewed_for_user(&self, user_id: UserId) -> Result<Vec<RecentlyViewedEntry>, ShopperError> {
        self.inner.recently_viewed_for_user(user_id).await
    }

    async fn set_push_token(&self, user_id: UserId, token: &str) -> Result<(), ShopperError> {
        self.inner.set_push_token(user_id, token).await
    }

    async fn push_token_for_user(&self, user_id: UserId) -> Result<Option<String>, ShopperError> {
        self.inner.push_token_for_user(user_id).await
    }
}

#[tokio::test]
async fn one_failing_collection_does_not_block_the_others() {
    let s = guest_session().await;
    let backend = WishlistDownBackend { inner: s.db.clone() };
    let service = GuestMergeService::new(backend, s.guests.clone());

    let report =
        service.sync_from_guest(&MergeSession::new(), s.user_id, &s.guest_id).await.expect("merge should run");
    assert!(report.wishlist.is_failed());
    assert_eq!(report.cart, MergeOutcome::Merged(2));
    assert_eq!(report.recently_viewed, MergeOutcome::Merged(3));
    assert_eq!(report.push_token, MergeOutcome::Merged(1));

    // the failed collection is kept for a later session; the drained ones are gone
    assert_eq!(s.guests.wishlist(&s.guest_id).await.len(), 2);
    assert!(s.guests.cart(&s.guest_id).await.is_empty());
    assert_eq!(s.db.cart_for_user(s.user_id).await.unwrap().len(), 2);
    assert!(s.db.wishlist_for_user(s.user_id).await.unwrap().is_empty());
}
