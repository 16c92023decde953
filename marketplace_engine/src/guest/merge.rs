use std::{
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
};

use log::*;

use super::store::GuestStore;
use crate::{
    db_types::{GuestId, UserId},
    traits::{CartManagement, ShopperLedgers, WishlistManagement},
};

/// The once-per-login-session latch that keeps the merge idempotent.
///
/// The login/registration handler creates one of these per session and passes it to every merge trigger; only the
/// first caller claims it, so replayed auth events cannot drain or re-apply guest data twice.
#[derive(Debug, Default)]
pub struct MergeSession {
    synced: AtomicBool,
}

impl MergeSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn first_claim(&self) -> bool {
        !self.synced.swap(true, Ordering::SeqCst)
    }
}

/// What happened to one guest collection during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The collection was drained; the count is how many entries were applied.
    Merged(usize),
    /// The merge failed; the guest collection is left in place. There is no durable retry -- it will either be
    /// picked up by a later login in a fresh session, or expire with its TTL.
    Failed(String),
}

impl MergeOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, MergeOutcome::Failed(_))
    }
}

/// The per-collection results of one merge run. One collection failing never blocks the others, so callers get a
/// full picture rather than a single error.
#[derive(Debug, Clone)]
pub struct GuestMergeReport {
    pub cart: MergeOutcome,
    pub wishlist: MergeOutcome,
    pub recently_viewed: MergeOutcome,
    pub push_token: MergeOutcome,
}

/// Drains a guest's collections into the durable records of a freshly authenticated user.
///
/// Triggered by a successful login or registration that carries a guest id. Cart quantities are SET from the guest
/// values (last-writer overwrite), wishlist pairs are upserted, recently-viewed entries are replayed oldest-first so
/// the guest's newest views end up most recent, and the push token moves onto the user profile. Each successfully
/// drained collection is deleted from the guest store outright rather than left to its TTL.
pub struct GuestMergeService<B> {
    db: B,
    guests: GuestStore,
}

impl<B> Debug for GuestMergeService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GuestMergeService")
    }
}

impl<B> GuestMergeService<B> {
    pub fn new(db: B, guests: GuestStore) -> Self {
        Self { db, guests }
    }
}

impl<B> GuestMergeService<B>
where B: CartManagement + WishlistManagement + ShopperLedgers
{
    /// Runs the merge, at most once per session. Returns `None` when this session already merged; replayed auth
    /// events land here and do nothing.
    pub async fn sync_from_guest(
        &self,
        session: &MergeSession,
        user_id: UserId,
        guest_id: &GuestId,
    ) -> Option<GuestMergeReport> {
        if !session.first_claim() {
            debug!("🔀️ Guest {guest_id} already merged into user #{user_id} this session; skipping");
            return None;
        }
        let report = GuestMergeReport {
            cart: self.merge_cart(user_id, guest_id).await,
            wishlist: self.merge_wishlist(user_id, guest_id).await,
            recently_viewed: self.merge_recently_viewed(user_id, guest_id).await,
            push_token: self.merge_push_token(user_id, guest_id).await,
        };
        info!("🔀️ Guest {guest_id} merged into user #{user_id}: {report:?}");
        Some(report)
    }

    async fn merge_cart(&self, user_id: UserId, guest_id: &GuestId) -> MergeOutcome {
        let items = self.guests.cart(guest_id).await;
        if items.is_empty() {
            return MergeOutcome::Merged(0);
        }
        for entry in &items {
            if let Err(e) = self.db.set_cart_line_from_guest(user_id, entry).await {
                warn!("🔀️ Guest cart merge into user #{user_id} failed on entry {}: {e}", entry.id);
                return MergeOutcome::Failed(e.to_string());
            }
        }
        self.guests.invalidate_cart(guest_id).await;
        MergeOutcome::Merged(items.len())
    }

    async fn merge_wishlist(&self, user_id: UserId, guest_id: &GuestId) -> MergeOutcome {
        let items = self.guests.wishlist(guest_id).await;
        if items.is_empty() {
            return MergeOutcome::Merged(0);
        }
        for entry in &items {
            if let Err(e) = self.db.add_wishlist_entry(user_id, entry.product_id, entry.variation_id).await {
                warn!("🔀️ Guest wishlist merge into user #{user_id} failed on entry {}: {e}", entry.id);
                return MergeOutcome::Failed(e.to_string());
            }
        }
        self.guests.invalidate_wishlist(guest_id).await;
        MergeOutcome::Merged(items.len())
    }

    async fn merge_recently_viewed(&self, user_id: UserId, guest_id: &GuestId) -> MergeOutcome {
        let products = self.guests.recently_viewed(guest_id).await;
        if products.is_empty() {
            return MergeOutcome::Merged(0);
        }
        // The guest list is newest-first; replay it oldest-first so the newest guest view gets the latest timestamp
        // and the ledger trim keeps the right ten.
        for product_id in products.iter().rev() {
            if let Err(e) = self.db.log_product_view(user_id, *product_id).await {
                warn!("🔀️ Guest recently-viewed merge into user #{user_id} failed on product {product_id}: {e}");
                return MergeOutcome::Failed(e.to_string());
            }
        }
        self.guests.invalidate_recently_viewed(guest_id).await;
        MergeOutcome::Merged(products.len())
    }

    async fn merge_push_token(&self, user_id: UserId, guest_id: &GuestId) -> MergeOutcome {
        let token = match self.guests.push_token(guest_id).await {
            Some(token) => token,
            None => return MergeOutcome::Merged(0),
        };
        if let Err(e) = self.db.set_push_token(user_id, &token).await {
            warn!("🔀️ Guest push token merge into user #{user_id} failed: {e}");
            return MergeOutcome::Failed(e.to_string());
        }
        self.guests.invalidate_push_token(guest_id).await;
        MergeOutcome::Merged(1)
    }
}
