use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewOrder, Order, OrderStatusType, TrackingId, UserId},
    order_objects::{OrderActivity, OrderQueryFilter},
};

/// Inserts a new order row. This is not atomic on its own; embed the call inside a transaction by passing `&mut *tx`
/// as the connection argument.
pub async fn insert_order(
    order: &NewOrder,
    tracking_id: &TrackingId,
    conn: &mut SqliteConnection,
) -> Result<Order, SqliteDatabaseError> {
    let total = order.total();
    let record = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                tracking_id,
                user_id,
                store_id,
                product_id,
                variation_id,
                quantity,
                price,
                delivery_detail_id,
                shipping_method_id,
                shipping_cost,
                total
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *;
        "#,
    )
    .bind(tracking_id.as_str())
    .bind(order.user_id)
    .bind(order.store_id)
    .bind(order.product_id)
    .bind(order.variation_id)
    .bind(order.quantity)
    .bind(order.price)
    .bind(order.delivery_detail_id)
    .bind(order.shipping_method_id)
    .bind(order.shipping_cost)
    .bind(total)
    .fetch_one(conn)
    .await?;
    Ok(record)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ? LIMIT 1;")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Fetches an order by a human-supplied reference: either the internal id or the tracking code.
pub async fn fetch_order_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let numeric_id = reference.parse::<i64>().ok();
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ? OR tracking_id = ? LIMIT 1;")
        .bind(numeric_id)
        .bind(reference)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// A status filter matches against the order's *latest* status entry, so e.g. an order that was placed and then
/// cancelled only matches `Cancelled`. Results are ordered by `created_at` descending, newest first.
pub async fn search_orders(
    query: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("SELECT o.* FROM orders o ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(user_id) = query.user_id {
        where_clause.push("o.user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if let Some(store_id) = query.store_id {
        where_clause.push("o.store_id = ");
        where_clause.push_bind_unseparated(store_id);
    }
    if let Some(tracking_id) = query.tracking_id {
        where_clause.push("o.tracking_id = ");
        where_clause.push_bind_unseparated(tracking_id.0);
    }
    if let Some(since) = query.since {
        where_clause.push("o.created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("o.created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    if !query.statuses.is_empty() {
        let statuses = query.statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
        where_clause.push(format!(
            "(SELECT os.status FROM order_statuses os WHERE os.order_id = o.id ORDER BY os.created_at DESC, os.id \
             DESC LIMIT 1) IN ({statuses})"
        ));
    }
    builder.push(" ORDER BY o.created_at DESC, o.id DESC");

    trace!("📦️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📦️ Result of search_orders: {} rows", orders.len());
    Ok(orders)
}

/// Latest-status counts for the user's activity screen, computed in one pass over the user's orders.
pub async fn activity_counts(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<OrderActivity, SqliteDatabaseError> {
    let statuses = sqlx::query_scalar::<_, Option<String>>(
        r#"
            SELECT (
                SELECT os.status FROM order_statuses os
                WHERE os.order_id = o.id
                ORDER BY os.created_at DESC, os.id DESC
                LIMIT 1
            )
            FROM orders o
            WHERE o.user_id = ?;
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    let mut activity = OrderActivity::default();
    for status in statuses.iter().flatten() {
        activity.total_orders += 1;
        match status.parse::<OrderStatusType>() {
            Ok(OrderStatusType::Delivered) => activity.received += 1,
            Ok(s) if OrderStatusType::fulfilment_statuses().contains(&s) => activity.to_receive += 1,
            Ok(s) if OrderStatusType::closed_statuses().contains(&s) => activity.cancelled += 1,
            // Refund branch statuses count neither as in-flight nor as cancelled.
            Ok(_) => {},
            Err(_) => return Err(SqliteDatabaseError::QueryError(format!("Unknown order status in history: {status}"))),
        }
    }
    Ok(activity)
}
