use mpb_common::Money;

use crate::{
    db_types::{ShippingRate, ShippingZone, UserId},
    traits::{NotificationError, OrderFlowError, ShippingResolverError},
};

/// Maps a delivery address to a shipping zone and a cost quote. Consulted by checkout, not owned by it.
#[allow(async_fn_in_trait)]
pub trait ShippingResolver {
    /// Finds the zone matching the (country, state, city) triple. A zone row with NULL state or city is a wildcard
    /// for that level. The most specific match wins; ties are broken by lowest zone id.
    async fn find_zone(
        &self,
        country: &str,
        state: Option<&str>,
        city: Option<&str>,
    ) -> Result<Option<ShippingZone>, ShippingResolverError>;

    /// The cost-and-duration quote for shipping with the given method into the given zone.
    async fn find_rate(
        &self,
        shipping_method_id: i64,
        zone_id: i64,
    ) -> Result<Option<ShippingRate>, ShippingResolverError>;
}

/// Supplies the unit price snapshotted onto an order at placement time. Orders never re-read the live price
/// afterwards.
#[allow(async_fn_in_trait)]
pub trait PriceOracle {
    async fn current_price(&self, variation_id: i64) -> Result<Option<Money>, OrderFlowError>;
}

/// Fire-and-forget push notification delivery. Failures are logged by the caller and never block the order flow.
pub trait NotificationSink: Send + Sync {
    fn notify(
        &self,
        user_id: UserId,
        title: &str,
        body: &str,
    ) -> impl std::future::Future<Output = Result<(), NotificationError>> + Send;
}
