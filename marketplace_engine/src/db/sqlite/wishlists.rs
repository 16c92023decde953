use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{UserId, WishlistEntry},
};

pub async fn wishlist_for_user(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<WishlistEntry>, SqliteDatabaseError> {
    let entries = sqlx::query_as::<_, WishlistEntry>(
        "SELECT * FROM wishlist_entries WHERE user_id = ? ORDER BY created_at DESC, id DESC;",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}

pub async fn fetch_entry(
    user_id: UserId,
    entry_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<WishlistEntry>, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, WishlistEntry>("SELECT * FROM wishlist_entries WHERE id = ? AND user_id = ? LIMIT 1;")
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(entry)
}

pub async fn fetch_entry_by_pair(
    user_id: UserId,
    product_id: i64,
    variation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<WishlistEntry>, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, WishlistEntry>(
        "SELECT * FROM wishlist_entries WHERE user_id = ? AND product_id = ? AND variation_id = ? LIMIT 1;",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(variation_id)
    .fetch_optional(conn)
    .await?;
    Ok(entry)
}

pub async fn insert_entry(
    user_id: UserId,
    product_id: i64,
    variation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<WishlistEntry, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, WishlistEntry>(
        r#"
            INSERT INTO wishlist_entries (user_id, product_id, variation_id)
            VALUES (?, ?, ?)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(variation_id)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

pub async fn delete_entry(entry_id: i64, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("DELETE FROM wishlist_entries WHERE id = ?;").bind(entry_id).execute(conn).await?;
    Ok(())
}
