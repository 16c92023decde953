use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{CartAddRequest, CartLine, UserId},
    guest::GuestCartEntry,
};

/// The user's cart lines, newest first.
pub async fn cart_for_user(user_id: UserId, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, SqliteDatabaseError> {
    let lines = sqlx::query_as::<_, CartLine>(
        "SELECT * FROM cart_lines WHERE user_id = ? ORDER BY created_at DESC, id DESC;",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

pub async fn fetch_line(
    user_id: UserId,
    line_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLine>, SqliteDatabaseError> {
    let line = sqlx::query_as::<_, CartLine>("SELECT * FROM cart_lines WHERE id = ? AND user_id = ? LIMIT 1;")
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

pub async fn fetch_line_by_key(
    user_id: UserId,
    product_id: i64,
    variation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLine>, SqliteDatabaseError> {
    let line = sqlx::query_as::<_, CartLine>(
        "SELECT * FROM cart_lines WHERE user_id = ? AND product_id = ? AND variation_id = ? LIMIT 1;",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(variation_id)
    .fetch_optional(conn)
    .await?;
    Ok(line)
}

pub async fn insert_line(
    user_id: UserId,
    request: &CartAddRequest,
    conn: &mut SqliteConnection,
) -> Result<CartLine, SqliteDatabaseError> {
    let line = sqlx::query_as::<_, CartLine>(
        r#"
            INSERT INTO cart_lines (user_id, store_id, product_id, variation_id, quantity, delivery_detail_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(request.store_id)
    .bind(request.product_id)
    .bind(request.variation_id)
    .bind(request.quantity)
    .bind(request.delivery_detail_id)
    .fetch_one(conn)
    .await?;
    Ok(line)
}

pub async fn increment_line(
    line_id: i64,
    by: i64,
    conn: &mut SqliteConnection,
) -> Result<CartLine, SqliteDatabaseError> {
    let line = sqlx::query_as::<_, CartLine>(
        "UPDATE cart_lines SET quantity = quantity + ? WHERE id = ? RETURNING *;",
    )
    .bind(by)
    .bind(line_id)
    .fetch_one(conn)
    .await?;
    Ok(line)
}

/// Sets the quantity on the line matching the (user, product, variation) key. Returns the number of lines changed
/// (0 or 1). Stock is deliberately untouched here.
pub async fn set_quantity(
    user_id: UserId,
    product_id: i64,
    variation_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query(
        "UPDATE cart_lines SET quantity = ? WHERE user_id = ? AND product_id = ? AND variation_id = ?;",
    )
    .bind(quantity)
    .bind(user_id)
    .bind(product_id)
    .bind(variation_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_line(line_id: i64, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("DELETE FROM cart_lines WHERE id = ?;").bind(line_id).execute(conn).await?;
    Ok(())
}

/// Upserts a cart line from a drained guest entry. The dedup key is (user, product, variation); on conflict the
/// quantity is overwritten with the guest value, not summed.
pub async fn upsert_from_guest(
    user_id: UserId,
    entry: &GuestCartEntry,
    conn: &mut SqliteConnection,
) -> Result<CartLine, SqliteDatabaseError> {
    let line = sqlx::query_as::<_, CartLine>(
        r#"
            INSERT INTO cart_lines (user_id, store_id, product_id, variation_id, quantity, delivery_detail_id)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, product_id, variation_id) DO UPDATE SET
                quantity = excluded.quantity,
                store_id = excluded.store_id,
                delivery_detail_id = excluded.delivery_detail_id
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(entry.store_id)
    .bind(entry.product_id)
    .bind(entry.variation_id)
    .bind(entry.quantity)
    .bind(entry.delivery_detail_id)
    .fetch_one(conn)
    .await?;
    Ok(line)
}
