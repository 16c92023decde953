use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusEntry};

/// Emitted once per order created by a checkout, after the transaction has committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
}

impl OrderPlacedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted after a status transition has been appended to an order's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub entry: OrderStatusEntry,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, entry: OrderStatusEntry) -> Self {
        Self { order, entry }
    }
}
