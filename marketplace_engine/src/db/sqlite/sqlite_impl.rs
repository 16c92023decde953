//! `SqliteDatabase` is the concrete SQLite implementation of the marketplace engine backend.
//!
//! It composes the per-table query modules in this directory into the engine traits, wrapping multi-step operations
//! in transactions so that checkout, stock movement and history appends stay atomic.
use std::fmt::Debug;

use log::*;
use mpb_common::Money;
use sqlx::SqlitePool;

use super::{
    carts,
    db::{db_url, new_pool},
    order_statuses,
    orders,
    recently_viewed,
    shipping,
    users,
    variations,
    wishlists,
    SqliteDatabaseError,
};
use crate::{
    db::common::{CartUpsertOutcome, WishlistAddOutcome},
    db_types::{
        CartAddRequest,
        CartLine,
        CartQuantityUpdate,
        NewOrder,
        Order,
        OrderStatusEntry,
        OrderStatusType,
        RecentlyViewedEntry,
        UserId,
        WishlistEntry,
    },
    guest::GuestCartEntry,
    helpers::new_tracking_id,
    order_objects::{OrderActivity, OrderQueryFilter},
    traits::{
        CartError,
        CartManagement,
        MarketplaceDatabase,
        OrderFlowError,
        PriceOracle,
        ShippingResolver,
        ShippingResolverError,
        ShopperError,
        ShopperLedgers,
        WishlistError,
        WishlistManagement,
        WishlistSelector,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn checkout_cart(
        &self,
        user_id: UserId,
        delivery_detail_id: i64,
        shipping_method_id: i64,
    ) -> Result<Vec<Order>, OrderFlowError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let cart = carts::cart_for_user(user_id, &mut tx).await?;
        if cart.is_empty() {
            return Err(OrderFlowError::EmptyCart);
        }
        let detail = users::delivery_detail_for_user(user_id, delivery_detail_id, &mut tx)
            .await?
            .ok_or(OrderFlowError::DeliveryDetailNotFound(delivery_detail_id))?;
        let zone = shipping::find_zone(&detail.country, detail.state.as_deref(), detail.city.as_deref(), &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::NoShippingZoneMatch {
                country: detail.country.clone(),
                state: detail.state.clone(),
                city: detail.city.clone(),
            })?;
        let rate = shipping::find_rate(shipping_method_id, zone.id, &mut tx).await?.ok_or(
            OrderFlowError::NoShippingRateForZoneAndMethod { method_id: shipping_method_id, zone_id: zone.id },
        )?;

        let mut result = Vec::with_capacity(cart.len());
        for line in cart {
            let variation = variations::variation_by_id(line.variation_id, &mut tx)
                .await?
                .ok_or(OrderFlowError::VariationNotFound(line.variation_id))?;
            let new_order = NewOrder {
                user_id,
                store_id: line.store_id,
                product_id: line.product_id,
                variation_id: line.variation_id,
                quantity: line.quantity,
                price: variation.price,
                delivery_detail_id,
                shipping_method_id,
                shipping_cost: rate.cost,
            };
            let tracking_id = new_tracking_id();
            let order = orders::insert_order(&new_order, &tracking_id, &mut tx).await?;
            order_statuses::append_status(order.id, OrderStatusType::OrderPlaced, user_id, &mut tx).await?;
            carts::delete_line(line.id, &mut tx).await?;
            debug!("🛒️ Cart line #{} converted to order {} for user #{user_id}", line.id, order.tracking_id);
            result.push(order);
        }
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!("🛒️ Checkout complete for user #{user_id}: {} orders created", result.len());
        Ok(result)
    }

    async fn transition_order(
        &self,
        order_id: i64,
        target: OrderStatusType,
        changed_by: UserId,
    ) -> Result<OrderStatusEntry, OrderFlowError> {
        let required = target.precondition().ok_or(OrderFlowError::UnsupportedTransition(target))?;
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::fetch_order(order_id, &mut conn)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.to_string()))?;
        // The guard is the single conditional INSERT itself: SQLite serializes writers, so of two racing
        // transitions exactly one appends and the other observes the updated history below.
        match order_statuses::append_status_if_current(order.id, required, target, changed_by, &mut conn).await? {
            Some(entry) => {
                debug!("📦️ Order {} moved {required} -> {target} by user #{changed_by}", order.tracking_id);
                Ok(entry)
            },
            None => {
                let current = match order_statuses::current_status(order.id, &mut conn).await? {
                    Some(entry) => entry.status,
                    None => {
                        warn!("📦️ Order {} has no status history at all. This should not happen.", order.tracking_id);
                        OrderStatusType::OrderPlaced
                    },
                };
                Err(OrderFlowError::InvalidStatusTransition { order_id, current, required, target })
            },
        }
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_order(order_id, &mut conn).await?)
    }

    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_order_by_reference(reference, &mut conn).await?)
    }

    async fn order_history(&self, order_id: i64) -> Result<Vec<OrderStatusEntry>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(order_statuses::history(order_id, &mut conn).await?)
    }

    async fn current_status(&self, order_id: i64) -> Result<Option<OrderStatusEntry>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(order_statuses::current_status(order_id, &mut conn).await?)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::search_orders(query, &mut conn).await?)
    }

    async fn orders_activity(&self, user_id: UserId) -> Result<OrderActivity, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::activity_counts(user_id, &mut conn).await?)
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CartManagement for SqliteDatabase {
    async fn add_cart_line(&self, user_id: UserId, request: &CartAddRequest) -> Result<CartUpsertOutcome, CartError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let variation = variations::variation_by_id(request.variation_id, &mut tx)
            .await?
            .ok_or(CartError::VariationNotFound(request.variation_id))?;
        if !variations::reserve_stock(request.variation_id, request.quantity, &mut tx).await? {
            return Err(CartError::InsufficientStock {
                variation_id: request.variation_id,
                requested: request.quantity,
                available: variation.quantity,
            });
        }
        let outcome = match carts::fetch_line_by_key(user_id, request.product_id, request.variation_id, &mut tx).await? {
            Some(line) => {
                let line = carts::increment_line(line.id, request.quantity, &mut tx).await?;
                CartUpsertOutcome::Incremented(line)
            },
            None => {
                let line = carts::insert_line(user_id, request, &mut tx).await?;
                CartUpsertOutcome::Created(line)
            },
        };
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        trace!(
            "🛒️ Reserved {} of variation {} for user #{user_id}'s cart",
            request.quantity,
            request.variation_id
        );
        Ok(outcome)
    }

    async fn update_cart_quantities(
        &self,
        user_id: UserId,
        updates: &[CartQuantityUpdate],
    ) -> Result<u64, CartError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let mut changed = 0;
        for update in updates {
            changed +=
                carts::set_quantity(user_id, update.product_id, update.variation_id, update.quantity, &mut tx).await?;
        }
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(changed)
    }

    async fn remove_cart_line(&self, user_id: UserId, line_id: i64) -> Result<CartLine, CartError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let line = carts::fetch_line(user_id, line_id, &mut tx)
            .await?
            .ok_or_else(|| CartError::CartLineNotFound(line_id.to_string()))?;
        carts::delete_line(line.id, &mut tx).await?;
        variations::release_stock(line.variation_id, line.quantity, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        trace!("🛒️ Cart line #{line_id} removed; {} returned to variation {}", line.quantity, line.variation_id);
        Ok(line)
    }

    async fn cart_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, CartError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(carts::cart_for_user(user_id, &mut conn).await?)
    }

    async fn reserve_variation_stock(&self, variation_id: i64, quantity: i64) -> Result<(), CartError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let variation =
            variations::variation_by_id(variation_id, &mut tx).await?.ok_or(CartError::VariationNotFound(variation_id))?;
        if !variations::reserve_stock(variation_id, quantity, &mut tx).await? {
            return Err(CartError::InsufficientStock { variation_id, requested: quantity, available: variation.quantity });
        }
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(())
    }

    async fn release_variation_stock(&self, variation_id: i64, quantity: i64) -> Result<(), CartError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        if !variations::release_stock(variation_id, quantity, &mut conn).await? {
            return Err(CartError::VariationNotFound(variation_id));
        }
        Ok(())
    }

    async fn set_cart_line_from_guest(&self, user_id: UserId, entry: &GuestCartEntry) -> Result<CartLine, CartError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(carts::upsert_from_guest(user_id, entry, &mut conn).await?)
    }
}

impl WishlistManagement for SqliteDatabase {
    async fn add_wishlist_entry(
        &self,
        user_id: UserId,
        product_id: i64,
        variation_id: i64,
    ) -> Result<WishlistAddOutcome, WishlistError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let outcome = match wishlists::fetch_entry_by_pair(user_id, product_id, variation_id, &mut tx).await? {
            Some(entry) => WishlistAddOutcome::AlreadyPresent(entry),
            None => {
                let entry = wishlists::insert_entry(user_id, product_id, variation_id, &mut tx).await?;
                WishlistAddOutcome::Added(entry)
            },
        };
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(outcome)
    }

    async fn remove_wishlist_entry(
        &self,
        user_id: UserId,
        selector: &WishlistSelector,
    ) -> Result<WishlistEntry, WishlistError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let entry = match selector {
            WishlistSelector::ById(entry_id) => wishlists::fetch_entry(user_id, *entry_id, &mut tx).await?,
            WishlistSelector::ByProduct { product_id, variation_id } => {
                wishlists::fetch_entry_by_pair(user_id, *product_id, *variation_id, &mut tx).await?
            },
        }
        .ok_or(WishlistError::EntryNotFound)?;
        wishlists::delete_entry(entry.id, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(entry)
    }

    async fn wishlist_for_user(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, WishlistError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(wishlists::wishlist_for_user(user_id, &mut conn).await?)
    }
}

impl ShopperLedgers for SqliteDatabase {
    async fn log_product_view(&self, user_id: UserId, product_id: i64) -> Result<(), ShopperError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        recently_viewed::upsert_view(user_id, product_id, &mut tx).await?;
        let trimmed = recently_viewed::trim_to_limit(user_id, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        if trimmed > 0 {
            trace!("👀️ Trimmed {trimmed} stale view records for user #{user_id}");
        }
        Ok(())
    }

    async fn recently_viewed_for_user(&self, user_id: UserId) -> Result<Vec<RecentlyViewedEntry>, ShopperError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(recently_viewed::views_for_user(user_id, &mut conn).await?)
    }

    async fn set_push_token(&self, user_id: UserId, token: &str) -> Result<(), ShopperError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(users::set_push_token(user_id, token, &mut conn).await?)
    }

    async fn push_token_for_user(&self, user_id: UserId) -> Result<Option<String>, ShopperError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(users::push_token_for_user(user_id, &mut conn).await?)
    }
}

impl ShippingResolver for SqliteDatabase {
    async fn find_zone(
        &self,
        country: &str,
        state: Option<&str>,
        city: Option<&str>,
    ) -> Result<Option<crate::db_types::ShippingZone>, ShippingResolverError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(shipping::find_zone(country, state, city, &mut conn).await?)
    }

    async fn find_rate(
        &self,
        shipping_method_id: i64,
        zone_id: i64,
    ) -> Result<Option<crate::db_types::ShippingRate>, ShippingResolverError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(shipping::find_rate(shipping_method_id, zone_id, &mut conn).await?)
    }
}

impl PriceOracle for SqliteDatabase {
    async fn current_price(&self, variation_id: i64) -> Result<Option<Money>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let variation = variations::variation_by_id(variation_id, &mut conn).await?;
        Ok(variation.map(|v| v.price))
    }
}
