use crate::{
    db::common::{CartUpsertOutcome, WishlistAddOutcome},
    db_types::{CartAddRequest, CartLine, CartQuantityUpdate, RecentlyViewedEntry, UserId, WishlistEntry},
    guest::GuestCartEntry,
    traits::{CartError, ShopperError, WishlistError},
};

/// Selects a wishlist entry for removal: callers supply either the entry id or the (product, variation) pair, and
/// exactly one lookup strategy is used per call.
#[derive(Debug, Clone)]
pub enum WishlistSelector {
    ById(i64),
    ByProduct { product_id: i64, variation_id: i64 },
}

/// Durable cart rows for authenticated users. The backend owns the stock reservation that accompanies every
/// add/remove: stock moves in the same transaction as the cart row.
#[allow(async_fn_in_trait)]
pub trait CartManagement: Clone {
    /// Adds to the user's cart, reserving stock first.
    ///
    /// The requested quantity is validated against the variation's current stock and the decrement is a single
    /// conditional update, so concurrent shoppers cannot jointly oversubscribe a variation. An existing
    /// (user, product, variation) line is incremented rather than duplicated.
    async fn add_cart_line(&self, user_id: UserId, request: &CartAddRequest) -> Result<CartUpsertOutcome, CartError>;

    /// Bulk-sets quantities on the lines matching each (product, variation) key. Does not touch stock.
    /// Returns the number of lines changed.
    async fn update_cart_quantities(
        &self,
        user_id: UserId,
        updates: &[CartQuantityUpdate],
    ) -> Result<u64, CartError>;

    /// Deletes a cart line owned by this user and releases its reserved stock back to the variation.
    /// Returns the removed line.
    async fn remove_cart_line(&self, user_id: UserId, line_id: i64) -> Result<CartLine, CartError>;

    /// The user's cart lines, newest first.
    async fn cart_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, CartError>;

    /// Reserves stock without touching any cart row. The guest cart path uses this: the durable side of a guest add
    /// is only the stock reservation, the line itself lives in the guest store.
    async fn reserve_variation_stock(&self, variation_id: i64, quantity: i64) -> Result<(), CartError>;

    /// Releases previously reserved stock. The mirror image of [`Self::reserve_variation_stock`].
    async fn release_variation_stock(&self, variation_id: i64, quantity: i64) -> Result<(), CartError>;

    /// Upserts a cart line from a drained guest entry, keyed by (product, variation, store). The quantity is SET to
    /// the guest value (last-writer overwrite), not summed -- merge semantics differ deliberately from the additive
    /// add-to-cart path. Stock is not adjusted here: the guest's add already reserved it.
    async fn set_cart_line_from_guest(
        &self,
        user_id: UserId,
        entry: &GuestCartEntry,
    ) -> Result<CartLine, CartError>;
}

/// Durable wishlist rows for authenticated users; at most one entry per (user, product, variation).
#[allow(async_fn_in_trait)]
pub trait WishlistManagement: Clone {
    async fn add_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: i64,
        variation_id: i64,
    ) -> Result<WishlistAddOutcome, WishlistError>;

    async fn remove_wishlist_entry(
        &self,
        user_id: UserId,
        selector: &WishlistSelector,
    ) -> Result<WishlistEntry, WishlistError>;

    /// The user's wishlist, newest first.
    async fn wishlist_for_user(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, WishlistError>;
}

/// Small per-shopper ledgers: the recently-viewed list (capped at ten) and the push token used for order
/// notifications.
#[allow(async_fn_in_trait)]
pub trait ShopperLedgers: Clone {
    /// Records a product view, bumping the timestamp of an existing (user, product) row, then trims the ledger to
    /// the ten most recent views.
    async fn log_product_view(&self, user_id: UserId, product_id: i64) -> Result<(), ShopperError>;

    /// The user's recently-viewed entries, newest first.
    async fn recently_viewed_for_user(&self, user_id: UserId) -> Result<Vec<RecentlyViewedEntry>, ShopperError>;

    async fn set_push_token(&self, user_id: UserId, token: &str) -> Result<(), ShopperError>;

    async fn push_token_for_user(&self, user_id: UserId) -> Result<Option<String>, ShopperError>;
}
