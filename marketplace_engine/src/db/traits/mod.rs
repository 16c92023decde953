//! Traits that a storage backend must implement to power the marketplace engine, plus the narrow interfaces of the
//! external collaborators the engine consumes (shipping resolution, price snapshots, push notifications).

mod collaborators;
mod errors;
mod ledgers;
mod marketplace_database;

pub use collaborators::{NotificationSink, PriceOracle, ShippingResolver};
pub use errors::{
    CartError,
    NotificationError,
    OrderFlowError,
    ShippingResolverError,
    ShopperError,
    WishlistError,
};
pub use ledgers::{CartManagement, ShopperLedgers, WishlistManagement, WishlistSelector};
pub use marketplace_database::MarketplaceDatabase;
