use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{OrderStatusEntry, OrderStatusType, UserId},
};

/// Appends a status entry unconditionally. Only the checkout flow uses this, to write the initial `OrderPlaced`
/// entry for a freshly created order.
pub(crate) async fn append_status(
    order_id: i64,
    status: OrderStatusType,
    changed_by: UserId,
    conn: &mut SqliteConnection,
) -> Result<OrderStatusEntry, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, OrderStatusEntry>(
        r#"
            INSERT INTO order_statuses (order_id, status, description, changed_by)
            VALUES (?, ?, ?, ?)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(status)
    .bind(status.description())
    .bind(changed_by)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

/// Appends a status entry only if the order's latest entry matches `required`.
///
/// The precondition check and the append are a single INSERT ... SELECT statement, serialized by SQLite's writer
/// lock, so two racing transitions cannot both observe the old status and both append: exactly one inserts a row and
/// the other gets `None` back.
pub(crate) async fn append_status_if_current(
    order_id: i64,
    required: OrderStatusType,
    target: OrderStatusType,
    changed_by: UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderStatusEntry>, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, OrderStatusEntry>(
        r#"
            INSERT INTO order_statuses (order_id, status, description, changed_by)
            SELECT ?, ?, ?, ?
            WHERE (
                SELECT status FROM order_statuses
                WHERE order_id = ?
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            ) = ?
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(target)
    .bind(target.description())
    .bind(changed_by)
    .bind(order_id)
    .bind(required)
    .fetch_optional(conn)
    .await?;
    Ok(entry)
}

/// The latest status entry for the order. Ties on `created_at` are broken by the highest `id`, i.e. insertion order.
pub async fn current_status(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderStatusEntry>, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, OrderStatusEntry>(
        r#"
            SELECT * FROM order_statuses
            WHERE order_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1;
        "#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(entry)
}

/// The full history for the order, oldest first.
pub async fn history(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderStatusEntry>, SqliteDatabaseError> {
    let entries = sqlx::query_as::<_, OrderStatusEntry>(
        r#"
            SELECT * FROM order_statuses
            WHERE order_id = ?
            ORDER BY created_at ASC, id ASC;
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}
