use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{ShippingRate, ShippingZone},
};

/// Finds the zone matching the (country, state, city) triple.
///
/// A zone row with NULL `state` or `city` is a wildcard for that level. The ORDER BY ranks exact matches above
/// wildcards (state before city), so the most specific zone wins; remaining ties go to the lowest zone id.
pub async fn find_zone(
    country: &str,
    state: Option<&str>,
    city: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<ShippingZone>, SqliteDatabaseError> {
    let zone = sqlx::query_as::<_, ShippingZone>(
        r#"
            SELECT * FROM shipping_zones
            WHERE is_active = TRUE
              AND country = ?
              AND (state IS NULL OR state = ?)
              AND (city IS NULL OR city = ?)
            ORDER BY (state IS NOT NULL) DESC, (city IS NOT NULL) DESC, id ASC
            LIMIT 1;
        "#,
    )
    .bind(country)
    .bind(state)
    .bind(city)
    .fetch_optional(conn)
    .await?;
    Ok(zone)
}

pub async fn find_rate(
    shipping_method_id: i64,
    zone_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ShippingRate>, SqliteDatabaseError> {
    let rate = sqlx::query_as::<_, ShippingRate>(
        "SELECT * FROM shipping_rates WHERE shipping_method_id = ? AND shipping_zone_id = ? LIMIT 1;",
    )
    .bind(shipping_method_id)
    .bind(zone_id)
    .fetch_optional(conn)
    .await?;
    Ok(rate)
}
