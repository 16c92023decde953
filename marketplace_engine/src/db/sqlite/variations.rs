use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::ProductVariation};

pub async fn variation_by_id(
    variation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ProductVariation>, SqliteDatabaseError> {
    let variation = sqlx::query_as::<_, ProductVariation>("SELECT * FROM product_variations WHERE id = ? LIMIT 1;")
        .bind(variation_id)
        .fetch_optional(conn)
        .await?;
    Ok(variation)
}

/// Decrements the variation's stock by `quantity`, but only when enough stock is available. The guard lives in the
/// UPDATE itself, so concurrent reservations cannot jointly drive the counter negative. Returns false when the
/// variation is missing or understocked.
pub async fn reserve_stock(
    variation_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE product_variations SET quantity = quantity - ? WHERE id = ? AND quantity >= ?;")
        .bind(quantity)
        .bind(variation_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Returns previously reserved stock to the variation. The mirror image of [`reserve_stock`].
pub async fn release_stock(
    variation_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE product_variations SET quantity = quantity + ? WHERE id = ?;")
        .bind(quantity)
        .bind(variation_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}
