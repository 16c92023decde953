use crate::{
    db_types::{Order, OrderStatusEntry, OrderStatusType, UserId},
    order_objects::{OrderActivity, OrderQueryFilter},
    traits::OrderFlowError,
};

/// The highest level of behaviour for backends supporting the marketplace engine's order flow.
///
/// This behaviour includes:
/// * Converting a user's cart into orders in a single atomic checkout
/// * Appending status transitions to the per-order history log, with the precondition check and the append performed
///   atomically so racing transitions cannot both win
/// * Fetching orders and their histories for the query surface
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Converts every line of the user's cart into an order, in one atomic transaction:
    /// * validates that the cart is non-empty and that the delivery detail belongs to the user,
    /// * resolves the shipping zone for the delivery address (NULL state/city on a zone are wildcards; the most
    ///   specific match wins, ties broken by lowest zone id) and the rate for (method, zone),
    /// * creates one order per cart line with the unit price snapshotted from the variation and
    ///   `total = quantity * price + shipping_cost`,
    /// * appends an `OrderPlaced` status entry per order,
    /// * deletes the drained cart lines.
    ///
    /// Any failure rolls the whole checkout back: no orders, cart and stock untouched.
    async fn checkout_cart(
        &self,
        user_id: UserId,
        delivery_detail_id: i64,
        shipping_method_id: i64,
    ) -> Result<Vec<Order>, OrderFlowError>;

    /// Appends a status transition to the order's history.
    ///
    /// The required current status is derived from the target via the transition table
    /// ([`OrderStatusType::precondition`]). The check-then-append runs as one atomic conditional insert, so of two
    /// racing transitions exactly one appends a row; the loser observes
    /// [`OrderFlowError::InvalidStatusTransition`].
    async fn transition_order(
        &self,
        order_id: i64,
        target: OrderStatusType,
        changed_by: UserId,
    ) -> Result<OrderStatusEntry, OrderFlowError>;

    /// Fetches an order by its internal id.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches an order by a human-supplied reference: the internal id or the tracking code.
    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, OrderFlowError>;

    /// The full status history of an order, oldest first.
    async fn order_history(&self, order_id: i64) -> Result<Vec<OrderStatusEntry>, OrderFlowError>;

    /// The latest status entry for an order, or `None` for an unknown order.
    async fn current_status(&self, order_id: i64) -> Result<Option<OrderStatusEntry>, OrderFlowError>;

    /// Fetches orders according to the criteria in the filter, ordered by creation time descending.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError>;

    /// Latest-status order counts for a user's activity screen.
    async fn orders_activity(&self, user_id: UserId) -> Result<OrderActivity, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}
