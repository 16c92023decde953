use log::warn;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{DeliveryDetail, UserId},
};

/// Fetches a delivery detail, scoped to its owner: another user's address is invisible here.
pub async fn delivery_detail_for_user(
    user_id: UserId,
    delivery_detail_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<DeliveryDetail>, SqliteDatabaseError> {
    let detail = sqlx::query_as::<_, DeliveryDetail>(
        "SELECT id, user_id, recipient, phone, address, country, state, city FROM delivery_details WHERE id = ? AND \
         user_id = ? LIMIT 1;",
    )
    .bind(delivery_detail_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(detail)
}

pub async fn set_push_token(
    user_id: UserId,
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let result = sqlx::query("UPDATE users SET push_token = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?;")
        .bind(token)
        .bind(user_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        warn!("👤️ Push token update for user #{user_id} matched no row");
    }
    Ok(())
}

pub async fn push_token_for_user(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<String>, SqliteDatabaseError> {
    let token = sqlx::query_scalar::<_, Option<String>>("SELECT push_token FROM users WHERE id = ?;")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(token.flatten())
}
