use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CartAddRequest, CartQuantityUpdate, Identity},
    guest::GuestStore,
    mpe_api::cart_objects::{CartItemView, CartView},
    traits::{CartError, CartManagement},
};

/// Uniform add/update/remove cart contract over authenticated and guest shoppers.
///
/// Authenticated carts live in the durable ledger; guest carts live in the TTL guest store. Either way, stock is
/// reserved at add time and released at removal -- a guest filling a cart locks stock exactly like a logged-in
/// shopper does.
pub struct CartApi<B> {
    db: B,
    guests: GuestStore,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B, guests: GuestStore) -> Self {
        Self { db, guests }
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    /// Adds to the caller's cart. Stock is validated and reserved first; an existing (product, variation) line is
    /// incremented rather than duplicated.
    pub async fn add_to_cart(&self, identity: &Identity, request: &CartAddRequest) -> Result<CartItemView, CartError> {
        match identity {
            Identity::Authenticated(user_id) => {
                let line = self.db.add_cart_line(*user_id, request).await?.into_line();
                Ok(CartItemView::from(line))
            },
            Identity::Guest(guest_id) => {
                self.db.reserve_variation_stock(request.variation_id, request.quantity).await?;
                let entry = self.guests.add_cart_entry(guest_id, request).await;
                trace!("🛒️ Guest {guest_id} cart entry {} saved", entry.id);
                Ok(CartItemView::from(entry))
            },
        }
    }

    /// Removes a line from the caller's cart and releases its reserved stock. The line reference is the ledger row
    /// id for authenticated shoppers and the entry uuid for guests.
    pub async fn remove_from_cart(&self, identity: &Identity, line_ref: &str) -> Result<CartItemView, CartError> {
        match identity {
            Identity::Authenticated(user_id) => {
                let line_id =
                    line_ref.parse::<i64>().map_err(|_| CartError::CartLineNotFound(line_ref.to_string()))?;
                let line = self.db.remove_cart_line(*user_id, line_id).await?;
                Ok(CartItemView::from(line))
            },
            Identity::Guest(guest_id) => {
                let entry = self
                    .guests
                    .remove_cart_entry(guest_id, line_ref)
                    .await
                    .ok_or_else(|| CartError::CartLineNotFound(line_ref.to_string()))?;
                self.db.release_variation_stock(entry.variation_id, entry.quantity).await?;
                trace!("🛒️ Guest {guest_id} cart entry {line_ref} removed");
                Ok(CartItemView::from(entry))
            },
        }
    }

    /// Bulk-sets quantities on the lines matching each (product, variation) key. Stock is not re-validated or
    /// adjusted by quantity edits. Returns the number of lines changed.
    pub async fn update_cart(&self, identity: &Identity, updates: &[CartQuantityUpdate]) -> Result<u64, CartError> {
        match identity {
            Identity::Authenticated(user_id) => self.db.update_cart_quantities(*user_id, updates).await,
            Identity::Guest(guest_id) => Ok(self.guests.set_cart_quantities(guest_id, updates).await as u64),
        }
    }

    /// The caller's cart, newest line first.
    pub async fn cart(&self, identity: &Identity) -> Result<CartView, CartError> {
        let items: Vec<CartItemView> = match identity {
            Identity::Authenticated(user_id) => {
                self.db.cart_for_user(*user_id).await?.into_iter().map(CartItemView::from).collect()
            },
            Identity::Guest(guest_id) => {
                self.guests.cart(guest_id).await.into_iter().map(CartItemView::from).collect()
            },
        };
        Ok(CartView { count: items.len(), items })
    }
}
