use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
pub use mpb_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// Internal identifier of an authenticated user.
pub type UserId = i64;

//--------------------------------------      GuestId        ---------------------------------------------------------
/// A lightweight wrapper around the client-supplied identifier of an anonymous shopper.
///
/// The value is opaque to the engine: it is minted by the client, travels in a request header, and only serves to
/// scope the guest's cart, wishlist, recently-viewed list and push token until the shopper authenticates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestId(pub String);

impl Display for GuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for GuestId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl GuestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      Identity       ---------------------------------------------------------
/// The resolved caller of a dual-mode operation.
///
/// The HTTP middleware decides once, at the edge, whether a request carries a bearer token or a guest header, and
/// every cart/wishlist/shopper operation dispatches on this value instead of re-checking auth state internally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Authenticated(UserId),
    Guest(GuestId),
}

impl Identity {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Authenticated(id) => Some(*id),
            Identity::Guest(_) => None,
        }
    }

    pub fn guest_id(&self) -> Option<&GuestId> {
        match self {
            Identity::Authenticated(_) => None,
            Identity::Guest(id) => Some(id),
        }
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Authenticated(id) => write!(f, "user #{id}"),
            Identity::Guest(id) => write!(f, "guest {id}"),
        }
    }
}

//--------------------------------------     TrackingId      ---------------------------------------------------------
/// The human-facing order reference, distinct from the internal row id.
///
/// Generated once at order creation as `TRACK-` followed by ten random uppercase alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct TrackingId(pub String);

impl FromStr for TrackingId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TrackingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TrackingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
/// The canonical order status vocabulary.
///
/// The happy path runs `OrderPlaced → OrderConfirmed → Processing → Shipped → OutForDelivery → Delivered`.
/// `OrderDeclined` and `Cancelled` branch off `OrderPlaced`; a delivered order can enter the refund branch
/// (`RefundRequested → RefundApproved | RefundDeclined`). `Returned`, `Refunded` and `Failed` are terminal statuses
/// kept for records written by older flows; no operation produces them anymore.
///
/// Database and wire strings use the human-readable forms ("Order Placed", "Out for Delivery", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    #[sqlx(rename = "Order Placed")]
    OrderPlaced,
    #[sqlx(rename = "Order Confirmed")]
    OrderConfirmed,
    #[sqlx(rename = "Processing")]
    Processing,
    #[sqlx(rename = "Shipped")]
    Shipped,
    #[sqlx(rename = "Out for Delivery")]
    OutForDelivery,
    #[sqlx(rename = "Delivered")]
    Delivered,
    #[sqlx(rename = "Order Declined")]
    OrderDeclined,
    #[sqlx(rename = "Cancelled")]
    Cancelled,
    #[sqlx(rename = "Refund Requested")]
    RefundRequested,
    #[sqlx(rename = "Refund Approved")]
    RefundApproved,
    #[sqlx(rename = "Refund Declined")]
    RefundDeclined,
    #[sqlx(rename = "Returned")]
    Returned,
    #[sqlx(rename = "Refunded")]
    Refunded,
    #[sqlx(rename = "Failed")]
    Failed,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::OrderPlaced => "Order Placed",
            OrderStatusType::OrderConfirmed => "Order Confirmed",
            OrderStatusType::Processing => "Processing",
            OrderStatusType::Shipped => "Shipped",
            OrderStatusType::OutForDelivery => "Out for Delivery",
            OrderStatusType::Delivered => "Delivered",
            OrderStatusType::OrderDeclined => "Order Declined",
            OrderStatusType::Cancelled => "Cancelled",
            OrderStatusType::RefundRequested => "Refund Requested",
            OrderStatusType::RefundApproved => "Refund Approved",
            OrderStatusType::RefundDeclined => "Refund Declined",
            OrderStatusType::Returned => "Returned",
            OrderStatusType::Refunded => "Refunded",
            OrderStatusType::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Order Placed" => Ok(Self::OrderPlaced),
            "Order Confirmed" => Ok(Self::OrderConfirmed),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Out for Delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            "Order Declined" => Ok(Self::OrderDeclined),
            "Cancelled" => Ok(Self::Cancelled),
            "Refund Requested" => Ok(Self::RefundRequested),
            "Refund Approved" => Ok(Self::RefundApproved),
            "Refund Declined" => Ok(Self::RefundDeclined),
            "Returned" => Ok(Self::Returned),
            "Refunded" => Ok(Self::Refunded),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Order Placed");
            OrderStatusType::OrderPlaced
        })
    }
}

impl OrderStatusType {
    /// The status a transition to `self` requires the order to currently be in. `None` means no operation targets
    /// this status (it is either the initial status or a legacy terminal).
    pub fn precondition(self) -> Option<OrderStatusType> {
        use OrderStatusType::*;
        match self {
            OrderConfirmed | OrderDeclined | Cancelled => Some(OrderPlaced),
            Processing => Some(OrderConfirmed),
            Shipped => Some(Processing),
            OutForDelivery => Some(Shipped),
            Delivered => Some(OutForDelivery),
            RefundRequested => Some(Delivered),
            RefundApproved | RefundDeclined => Some(RefundRequested),
            OrderPlaced | Returned | Refunded | Failed => None,
        }
    }

    /// True when no further transition leaves this status.
    pub fn is_terminal(self) -> bool {
        use OrderStatusType::*;
        matches!(self, OrderDeclined | Cancelled | RefundApproved | RefundDeclined | Returned | Refunded | Failed)
    }

    /// Statuses of orders still on their way to the customer.
    pub fn fulfilment_statuses() -> &'static [OrderStatusType] {
        use OrderStatusType::*;
        &[OrderPlaced, OrderConfirmed, Processing, Shipped, OutForDelivery]
    }

    /// Statuses of orders that ended without delivery, or were refunded after it.
    pub fn closed_statuses() -> &'static [OrderStatusType] {
        use OrderStatusType::*;
        &[OrderDeclined, Cancelled, Returned, Refunded, Failed]
    }

    /// The customer-facing description recorded alongside each status entry.
    pub fn description(self) -> &'static str {
        use OrderStatusType::*;
        match self {
            OrderPlaced => "Pending confirmation.",
            OrderConfirmed => "Your order is confirmed and will be processed shortly.",
            Processing => "Your order is being prepared for shipment.",
            Shipped => "Your order is on the way.",
            OutForDelivery => "Your order is out for delivery and will arrive soon.",
            Delivered => "Order successfully delivered.",
            OrderDeclined => "Your order has been declined.",
            Cancelled => "Your order has been cancelled.",
            RefundRequested => "You have requested a refund. Awaiting approval.",
            RefundApproved => "Your refund has been approved and is being processed.",
            RefundDeclined => "Your refund request was declined.",
            Returned => "Return request received. Awaiting pickup.",
            Refunded => "Refund successfully processed.",
            Failed => "Order failed. Please try again.",
        }
    }
}

//--------------------------------------  OrderStatusEntry   ---------------------------------------------------------
/// One row of an order's append-only status history.
///
/// Entries are inserted, never updated or deleted. The current status of an order is the entry with the latest
/// `created_at`, ties broken by the highest `id` (insertion order).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderStatusEntry {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatusType,
    pub description: String,
    pub changed_by: UserId,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Order         ---------------------------------------------------------
/// A single purchased line: one row per cart line at checkout, not one per checkout.
///
/// `price` is snapshotted from the variation at purchase time and `total` is fixed at creation
/// (`quantity * price + shipping_cost`); neither is ever recomputed. Orders are never deleted -- cancellation and
/// refunds are status transitions.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub tracking_id: TrackingId,
    pub user_id: UserId,
    pub store_id: i64,
    pub product_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
    pub price: Money,
    pub delivery_detail_id: i64,
    pub shipping_method_id: i64,
    pub shipping_cost: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// The data needed to create one order row. Built internally from a cart line plus the resolved shipping rate.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub store_id: i64,
    pub product_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
    /// Unit price at purchase time.
    pub price: Money,
    pub delivery_detail_id: i64,
    pub shipping_method_id: i64,
    pub shipping_cost: Money,
}

impl NewOrder {
    /// The fixed order total: `quantity * price + shipping_cost`.
    pub fn total(&self) -> Money {
        self.price * self.quantity + self.shipping_cost
    }
}

//--------------------------------------      CartLine       ---------------------------------------------------------
/// A line in an authenticated user's cart. At most one row exists per (user, product, variation).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub user_id: UserId,
    pub store_id: i64,
    pub product_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
    pub delivery_detail_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   CartAddRequest    ---------------------------------------------------------
/// What a shopper asks for when adding to the cart, before the owner is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartAddRequest {
    pub store_id: i64,
    pub product_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
    pub delivery_detail_id: Option<i64>,
}

/// A bulk quantity edit, keyed the same way cart lines are deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartQuantityUpdate {
    pub product_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
}

//--------------------------------------   WishlistEntry     ---------------------------------------------------------
/// A saved (product, variation) pair. At most one entry exists per (user, product, variation).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: i64,
    pub variation_id: i64,
    pub created_at: DateTime<Utc>,
}

//-------------------------------------- RecentlyViewedEntry -------------------------------------------------------
/// How many recently-viewed records are kept per shopper, guest or authenticated.
pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// One product-view record. The ledger keeps the ten most recent per user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RecentlyViewedEntry {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: i64,
    pub viewed_at: DateTime<Utc>,
}

//-------------------------------------- ProductVariation    ---------------------------------------------------------
/// A purchasable configuration of a product, carrying its own price and stock count.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: i64,
    pub product_id: i64,
    pub price: Money,
    pub quantity: i64,
}

//--------------------------------------  DeliveryDetail     ---------------------------------------------------------
/// A saved delivery address. The (country, state, city) triple drives shipping zone resolution.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeliveryDetail {
    pub id: i64,
    pub user_id: UserId,
    pub recipient: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub state: Option<String>,
    pub city: Option<String>,
}

//--------------------------------------   ShippingZone      ---------------------------------------------------------
/// A geographic shipping zone. A NULL `state` or `city` acts as a wildcard for that level, so a single country-wide
/// zone can back any address in that country.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShippingZone {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub is_active: bool,
}

//--------------------------------------   ShippingRate      ---------------------------------------------------------
/// The cost-and-duration quote for shipping with a given method into a given zone.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShippingRate {
    pub id: i64,
    pub shipping_method_id: i64,
    pub shipping_zone_id: i64,
    pub cost: Money,
    pub days_min: i64,
    pub days_max: i64,
}
