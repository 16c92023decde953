//! Row factories for tests. The engine owns no production write path for users, catalogue rows or shipping tables
//! (those belong to excluded collaborators), so tests seed them directly.
use mpb_common::Money;

use crate::SqliteDatabase;

pub async fn seed_user(db: &SqliteDatabase, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO users (name, email) VALUES (?, ?) RETURNING id;")
        .bind(name)
        .bind(format!("{name}@example.com"))
        .fetch_one(db.pool())
        .await
        .expect("Error seeding user")
}

pub async fn seed_variation(db: &SqliteDatabase, product_id: i64, price: Money, stock: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO product_variations (product_id, price, quantity) VALUES (?, ?, ?) RETURNING id;",
    )
    .bind(product_id)
    .bind(price)
    .bind(stock)
    .fetch_one(db.pool())
    .await
    .expect("Error seeding product variation")
}

pub async fn set_variation_price(db: &SqliteDatabase, variation_id: i64, price: Money) {
    sqlx::query("UPDATE product_variations SET price = ? WHERE id = ?;")
        .bind(price)
        .bind(variation_id)
        .execute(db.pool())
        .await
        .expect("Error updating variation price");
}

pub async fn variation_stock(db: &SqliteDatabase, variation_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT quantity FROM product_variations WHERE id = ?;")
        .bind(variation_id)
        .fetch_one(db.pool())
        .await
        .expect("Error reading variation stock")
}

pub async fn seed_shipping_method(db: &SqliteDatabase, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO shipping_methods (name) VALUES (?) RETURNING id;")
        .bind(name)
        .fetch_one(db.pool())
        .await
        .expect("Error seeding shipping method")
}

pub async fn seed_zone(
    db: &SqliteDatabase,
    name: &str,
    country: &str,
    state: Option<&str>,
    city: Option<&str>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO shipping_zones (name, country, state, city) VALUES (?, ?, ?, ?) RETURNING id;",
    )
    .bind(name)
    .bind(country)
    .bind(state)
    .bind(city)
    .fetch_one(db.pool())
    .await
    .expect("Error seeding shipping zone")
}

pub async fn seed_rate(db: &SqliteDatabase, method_id: i64, zone_id: i64, cost: Money) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO shipping_rates (shipping_method_id, shipping_zone_id, cost, days_min, days_max) VALUES (?, ?, \
         ?, 2, 7) RETURNING id;",
    )
    .bind(method_id)
    .bind(zone_id)
    .bind(cost)
    .fetch_one(db.pool())
    .await
    .expect("Error seeding shipping rate")
}

pub async fn seed_delivery_detail(
    db: &SqliteDatabase,
    user_id: i64,
    country: &str,
    state: Option<&str>,
    city: Option<&str>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO delivery_details (user_id, recipient, phone, address, country, state, city) VALUES (?, 'Test \
         Recipient', '555-0100', '1 Test Lane', ?, ?, ?) RETURNING id;",
    )
    .bind(user_id)
    .bind(country)
    .bind(state)
    .bind(city)
    .fetch_one(db.pool())
    .await
    .expect("Error seeding delivery detail")
}
