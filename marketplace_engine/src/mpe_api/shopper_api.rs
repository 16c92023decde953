use std::fmt::Debug;

use crate::{
    db_types::Identity,
    guest::GuestStore,
    traits::{ShopperError, ShopperLedgers},
};

/// Per-shopper odds and ends shared by both identity flavours: the recently-viewed trail and the push token used for
/// order notifications.
pub struct ShopperApi<B> {
    db: B,
    guests: GuestStore,
}

impl<B> Debug for ShopperApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShopperApi")
    }
}

impl<B> ShopperApi<B> {
    pub fn new(db: B, guests: GuestStore) -> Self {
        Self { db, guests }
    }
}

impl<B> ShopperApi<B>
where B: ShopperLedgers
{
    /// Records a product view. Re-viewing a product moves it to the front; only the ten most recent views are kept.
    pub async fn log_view(&self, identity: &Identity, product_id: i64) -> Result<(), ShopperError> {
        match identity {
            Identity::Authenticated(user_id) => self.db.log_product_view(*user_id, product_id).await,
            Identity::Guest(guest_id) => {
                self.guests.log_view(guest_id, product_id).await;
                Ok(())
            },
        }
    }

    /// Recently viewed product ids, newest first.
    pub async fn recently_viewed(&self, identity: &Identity) -> Result<Vec<i64>, ShopperError> {
        match identity {
            Identity::Authenticated(user_id) => {
                let views = self.db.recently_viewed_for_user(*user_id).await?;
                Ok(views.into_iter().map(|v| v.product_id).collect())
            },
            Identity::Guest(guest_id) => Ok(self.guests.recently_viewed(guest_id).await),
        }
    }

    /// Saves the device push token: on the user profile for authenticated shoppers, in the guest token map (with the
    /// usual 30-day sliding expiry) for guests.
    pub async fn set_push_token(&self, identity: &Identity, token: &str) -> Result<(), ShopperError> {
        match identity {
            Identity::Authenticated(user_id) => self.db.set_push_token(*user_id, token).await,
            Identity::Guest(guest_id) => {
                self.guests.set_push_token(guest_id, token).await;
                Ok(())
            },
        }
    }
}
