use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{RecentlyViewedEntry, UserId, RECENTLY_VIEWED_LIMIT},
};

/// Records a view, bumping the (user, product) pair to the front when it already exists.
///
/// The bump replaces the row rather than updating it in place, so row ids strictly follow recency even when several
/// views land within the same CURRENT_TIMESTAMP second -- the (viewed_at, id) ordering used by the trim and the
/// listing stays exact.
pub async fn upsert_view(
    user_id: UserId,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query("DELETE FROM recently_viewed WHERE user_id = ? AND product_id = ?;")
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("INSERT INTO recently_viewed (user_id, product_id) VALUES (?, ?);")
        .bind(user_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Deletes everything but the user's most recent views.
pub async fn trim_to_limit(user_id: UserId, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            DELETE FROM recently_viewed
            WHERE user_id = ? AND id NOT IN (
                SELECT id FROM recently_viewed
                WHERE user_id = ?
                ORDER BY viewed_at DESC, id DESC
                LIMIT ?
            );
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(RECENTLY_VIEWED_LIMIT as i64)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn views_for_user(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<RecentlyViewedEntry>, SqliteDatabaseError> {
    let entries = sqlx::query_as::<_, RecentlyViewedEntry>(
        "SELECT * FROM recently_viewed WHERE user_id = ? ORDER BY viewed_at DESC, id DESC;",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}
