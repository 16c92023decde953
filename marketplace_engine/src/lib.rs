//! Marketplace Order & Identity Engine
//!
//! This library contains the core logic for a multi-vendor marketplace backend: the order lifecycle state machine,
//! the dual-mode (authenticated / guest) cart and wishlist ledgers, and the one-time reconciliation of guest data
//! into a freshly authenticated account. It is provider-agnostic: the HTTP layer, auth middleware and notification
//! delivery are external collaborators that talk to the engine through the public APIs and traits defined here.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly; use the public API instead. The exception is the data types used in the database, which
//!    are defined in the [`db_types`] module and are public.
//! 2. The engine public API ([`mod@mpe_api`]). This provides the public-facing functionality: order placement and
//!    status transitions, cart and wishlist management, and shopper activity ledgers. Backends implement the traits
//!    in [`mod@db`] to power these APIs.
//! 3. The guest subsystem ([`mod@guest`]): a TTL-backed store for anonymous shoppers and the merge service that
//!    drains it into durable records at login.
//!
//! The engine also emits events when order statuses change. A simple actor framework lets collaborators (e.g. a push
//! notification sender) hook into these events without blocking the request path.
mod db;

pub mod db_types;
pub mod events;
pub mod guest;
pub mod helpers;
mod mpe_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::{common, traits};
pub use db::traits::{
    CartError,
    CartManagement,
    MarketplaceDatabase,
    NotificationError,
    NotificationSink,
    OrderFlowError,
    PriceOracle,
    ShippingResolver,
    ShippingResolverError,
    ShopperError,
    ShopperLedgers,
    WishlistError,
    WishlistManagement,
    WishlistSelector,
};
pub use mpe_api::{
    cart_api::CartApi,
    cart_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
    shopper_api::ShopperApi,
    wishlist_api::{WishlistApi, WishlistItemSelector},
};
