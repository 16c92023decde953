use std::fmt::Debug;

use crate::{
    db_types::Identity,
    guest::GuestStore,
    mpe_api::cart_objects::WishlistItemView,
    traits::{WishlistError, WishlistManagement, WishlistSelector},
};

/// Selects a wishlist item for removal at the API surface, where guest entry ids are uuids. Exactly one lookup
/// strategy is used per call.
#[derive(Debug, Clone)]
pub enum WishlistItemSelector {
    ById(String),
    ByProduct { product_id: i64, variation_id: i64 },
}

/// Uniform wishlist contract over authenticated and guest shoppers. Both sides uphold the same invariant: at most
/// one entry per (owner, product, variation), with adds of an existing pair a quiet no-op.
pub struct WishlistApi<B> {
    db: B,
    guests: GuestStore,
}

impl<B> Debug for WishlistApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WishlistApi")
    }
}

impl<B> WishlistApi<B> {
    pub fn new(db: B, guests: GuestStore) -> Self {
        Self { db, guests }
    }
}

impl<B> WishlistApi<B>
where B: WishlistManagement
{
    pub async fn add_to_wishlist(
        &self,
        identity: &Identity,
        product_id: i64,
        variation_id: i64,
    ) -> Result<WishlistItemView, WishlistError> {
        match identity {
            Identity::Authenticated(user_id) => {
                let entry = self.db.add_wishlist_entry(*user_id, product_id, variation_id).await?.into_entry();
                Ok(WishlistItemView::from(entry))
            },
            Identity::Guest(guest_id) => {
                let entry = self.guests.add_wishlist_entry(guest_id, product_id, variation_id).await;
                Ok(WishlistItemView::from(entry))
            },
        }
    }

    pub async fn remove_from_wishlist(
        &self,
        identity: &Identity,
        selector: &WishlistItemSelector,
    ) -> Result<WishlistItemView, WishlistError> {
        match identity {
            Identity::Authenticated(user_id) => {
                let selector = match selector {
                    WishlistItemSelector::ById(id) => {
                        let entry_id = id.parse::<i64>().map_err(|_| WishlistError::EntryNotFound)?;
                        WishlistSelector::ById(entry_id)
                    },
                    WishlistItemSelector::ByProduct { product_id, variation_id } => {
                        WishlistSelector::ByProduct { product_id: *product_id, variation_id: *variation_id }
                    },
                };
                let entry = self.db.remove_wishlist_entry(*user_id, &selector).await?;
                Ok(WishlistItemView::from(entry))
            },
            Identity::Guest(guest_id) => {
                let removed = match selector {
                    WishlistItemSelector::ById(id) => self.guests.remove_wishlist_entry_by_id(guest_id, id).await,
                    WishlistItemSelector::ByProduct { product_id, variation_id } => {
                        self.guests.remove_wishlist_entry_by_pair(guest_id, *product_id, *variation_id).await
                    },
                };
                removed.map(WishlistItemView::from).ok_or(WishlistError::EntryNotFound)
            },
        }
    }

    /// The caller's wishlist, newest entry first.
    pub async fn wishlist(&self, identity: &Identity) -> Result<Vec<WishlistItemView>, WishlistError> {
        let items = match identity {
            Identity::Authenticated(user_id) => {
                self.db.wishlist_for_user(*user_id).await?.into_iter().map(WishlistItemView::from).collect()
            },
            Identity::Guest(guest_id) => {
                self.guests.wishlist(guest_id).await.into_iter().map(WishlistItemView::from).collect()
            },
        };
        Ok(items)
    }
}
