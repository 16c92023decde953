use thiserror::Error;

use crate::db_types::OrderStatusType;

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Delivery detail {0} not found for this user")]
    DeliveryDetailNotFound(i64),
    #[error("No shipping zone matches {country} / {state:?} / {city:?}")]
    NoShippingZoneMatch { country: String, state: Option<String>, city: Option<String> },
    #[error("No shipping rate for method {method_id} in zone {zone_id}")]
    NoShippingRateForZoneAndMethod { method_id: i64, zone_id: i64 },
    #[error("Order {0} not found")]
    OrderNotFound(String),
    #[error("Product variation {0} not found")]
    VariationNotFound(i64),
    #[error("Order #{order_id} cannot move to {target}: current status is {current}, expected {required}")]
    InvalidStatusTransition { order_id: i64, current: OrderStatusType, required: OrderStatusType, target: OrderStatusType },
    #[error("No operation transitions an order to {0}")]
    UnsupportedTransition(OrderStatusType),
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not enough stock for variation {variation_id}: requested {requested}, available {available}")]
    InsufficientStock { variation_id: i64, requested: i64, available: i64 },
    #[error("Product not found in cart: {0}")]
    CartLineNotFound(String),
    #[error("Product variation {0} not found")]
    VariationNotFound(i64),
}

#[derive(Debug, Clone, Error)]
pub enum WishlistError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product not found in wishlist")]
    EntryNotFound,
}

#[derive(Debug, Clone, Error)]
pub enum ShopperError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShippingResolverError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

impl From<ShippingResolverError> for OrderFlowError {
    fn from(value: ShippingResolverError) -> Self {
        match value {
            ShippingResolverError::DatabaseError(e) => OrderFlowError::DatabaseError(e),
        }
    }
}
