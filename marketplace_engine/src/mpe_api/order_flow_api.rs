use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderStatusEntry, OrderStatusType, UserId},
    events::{EventProducers, OrderPlacedEvent, OrderStatusChangedEvent},
    order_objects::{OrderActivity, OrderQueryFilter, OrderWithHistory},
    traits::{MarketplaceDatabase, OrderFlowError},
};

/// `OrderFlowApi` is the primary API for converting carts into orders and walking orders through the status state
/// machine in response to shopper, seller and back-office actions.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: MarketplaceDatabase
{
    /// Converts the user's cart into orders, one per cart line.
    ///
    /// The whole checkout is atomic: the shipping zone and rate are resolved up front from the delivery detail, each
    /// line is converted with its unit price snapshotted from the variation, the initial `OrderPlaced` status is
    /// appended, and the cart is drained. If anything fails, no orders are created and cart and stock are untouched.
    ///
    /// An order-placed event is published per created order after the transaction commits.
    pub async fn place_order(
        &self,
        user_id: UserId,
        delivery_detail_id: i64,
        shipping_method_id: i64,
    ) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.checkout_cart(user_id, delivery_detail_id, shipping_method_id).await?;
        self.call_order_placed_hook(&orders).await;
        debug!("🔄️🛒️ Checkout for user #{user_id} complete. {} orders placed", orders.len());
        Ok(orders)
    }

    async fn call_order_placed_hook(&self, orders: &[Order]) {
        for emitter in &self.producers.order_placed_producer {
            trace!("🔄️📬️ Notifying order placed hook subscribers");
            for order in orders {
                let event = OrderPlacedEvent { order: order.clone() };
                emitter.publish_event(event).await;
            }
        }
    }

    async fn call_status_changed_hook(&self, order: &Order, entry: &OrderStatusEntry) {
        for emitter in &self.producers.status_changed_producer {
            trace!("🔄️📬️ Notifying status changed hook subscribers");
            let event = OrderStatusChangedEvent { order: order.clone(), entry: entry.clone() };
            emitter.publish_event(event).await;
        }
    }

    /// The generic building block behind every named transition. The required current status is derived from the
    /// target; a precondition mismatch surfaces as [`OrderFlowError::InvalidStatusTransition`] and is never retried.
    async fn transition(
        &self,
        order_id: i64,
        target: OrderStatusType,
        actor: UserId,
    ) -> Result<OrderStatusEntry, OrderFlowError> {
        let entry = self.db.transition_order(order_id, target, actor).await?;
        match self.db.fetch_order(order_id).await {
            Ok(Some(order)) => self.call_status_changed_hook(&order, &entry).await,
            Ok(None) => warn!("🔄️📦️ Order #{order_id} vanished right after a status transition"),
            Err(e) => warn!("🔄️📦️ Could not load order #{order_id} for event publishing: {e}"),
        }
        Ok(entry)
    }

    /// Shopper cancels an order that has not been accepted yet.
    pub async fn cancel_order(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::Cancelled, actor).await
    }

    /// Shopper asks for their money back on a delivered order.
    pub async fn request_refund(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::RefundRequested, actor).await
    }

    /// Seller accepts a newly placed order.
    pub async fn accept_order(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::OrderConfirmed, actor).await
    }

    /// Seller declines a newly placed order.
    pub async fn decline_order(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::OrderDeclined, actor).await
    }

    /// Back office starts preparing a confirmed order for shipment.
    pub async fn process_order(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::Processing, actor).await
    }

    pub async fn ship_order(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::Shipped, actor).await
    }

    pub async fn out_for_delivery(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::OutForDelivery, actor).await
    }

    pub async fn mark_as_delivered(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::Delivered, actor).await
    }

    pub async fn approve_refund(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::RefundApproved, actor).await
    }

    pub async fn decline_refund(&self, order_id: i64, actor: UserId) -> Result<OrderStatusEntry, OrderFlowError> {
        self.transition(order_id, OrderStatusType::RefundDeclined, actor).await
    }

    /// Fetches one order with its full history by internal id or tracking code.
    ///
    /// `privileged` is set by the caller for admin/agent viewers, who may inspect any order; everyone else only sees
    /// their own, and other people's orders are indistinguishable from missing ones.
    pub async fn order_by_reference(
        &self,
        reference: &str,
        viewer: UserId,
        privileged: bool,
    ) -> Result<OrderWithHistory, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_reference(reference)
            .await?
            .filter(|o| privileged || o.user_id == viewer)
            .ok_or_else(|| OrderFlowError::OrderNotFound(reference.to_string()))?;
        let statuses = self.db.order_history(order.id).await?;
        let is_cancellable = statuses.last().map(|e| e.status == OrderStatusType::OrderPlaced).unwrap_or(false);
        Ok(OrderWithHistory { order, statuses, is_cancellable })
    }

    /// The user's orders still on their way: latest status is one of the fulfilment statuses.
    pub async fn to_receive_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderFlowError> {
        let query = OrderQueryFilter::default()
            .with_user_id(user_id)
            .with_statuses(OrderStatusType::fulfilment_statuses());
        self.db.search_orders(query).await
    }

    /// The user's orders that ended without delivery, or were declined/returned/refunded.
    pub async fn closed_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderFlowError> {
        let query =
            OrderQueryFilter::default().with_user_id(user_id).with_statuses(OrderStatusType::closed_statuses());
        self.db.search_orders(query).await
    }

    /// All orders for a store, newest first. The seller dashboard view.
    pub async fn store_orders(&self, store_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        let query = OrderQueryFilter::default().with_store_id(store_id);
        self.db.search_orders(query).await
    }

    /// Latest-status order counts for the user's activity screen.
    pub async fn orders_activity(&self, user_id: UserId) -> Result<OrderActivity, OrderFlowError> {
        self.db.orders_activity(user_id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
