use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusEntry, OrderStatusType, TrackingId, UserId};

/// Search criteria for the order query surface. Status filters match against each order's *latest* status entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub user_id: Option<UserId>,
    pub store_id: Option<i64>,
    pub tracking_id: Option<TrackingId>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub statuses: Vec<OrderStatusType>,
}

impl OrderQueryFilter {
    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_store_id(mut self, store_id: i64) -> Self {
        self.store_id = Some(store_id);
        self
    }

    pub fn with_tracking_id(mut self, tracking_id: TrackingId) -> Self {
        self.tracking_id = Some(tracking_id);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_statuses(mut self, statuses: &[OrderStatusType]) -> Self {
        self.statuses.extend_from_slice(statuses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.store_id.is_none()
            && self.tracking_id.is_none()
            && self.since.is_none()
            && self.until.is_none()
            && self.statuses.is_empty()
    }
}

/// Latest-status order counts for a user's activity screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderActivity {
    pub total_orders: i64,
    pub to_receive: i64,
    pub received: i64,
    pub cancelled: i64,
}

/// An order with its full audit trail, as returned by the detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithHistory {
    pub order: Order,
    /// The status history, oldest first. The last entry is the current status.
    pub statuses: Vec<OrderStatusEntry>,
    /// True while the order can still be cancelled by the shopper, i.e. its current status is `OrderPlaced`.
    pub is_cancellable: bool,
}
