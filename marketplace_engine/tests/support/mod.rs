#![allow(dead_code)]
use marketplace_engine::{
    db_types::{CartAddRequest, Money},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed,
    },
    SqliteDatabase,
};

pub const PRODUCT_ID: i64 = 1;
pub const STORE_ID: i64 = 1;

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

/// Everything a checkout needs: a shopper, a variation with price 10.00 and stock 10, and a country-wide shipping
/// zone with a 5.00 rate for the seeded method.
pub struct CheckoutFixture {
    pub db: SqliteDatabase,
    pub user_id: i64,
    pub variation_id: i64,
    pub method_id: i64,
    pub zone_id: i64,
    pub delivery_detail_id: i64,
}

pub async fn checkout_fixture() -> CheckoutFixture {
    let db = new_test_db().await;
    let user_id = seed::seed_user(&db, "shopper").await;
    let variation_id = seed::seed_variation(&db, PRODUCT_ID, Money::from(1000), 10).await;
    let method_id = seed::seed_shipping_method(&db, "Standard").await;
    let zone_id = seed::seed_zone(&db, "Nationwide", "Kenya", None, None).await;
    seed::seed_rate(&db, method_id, zone_id, Money::from(500)).await;
    let delivery_detail_id =
        seed::seed_delivery_detail(&db, user_id, "Kenya", Some("Nairobi County"), Some("Nairobi")).await;
    CheckoutFixture { db, user_id, variation_id, method_id, zone_id, delivery_detail_id }
}

pub fn add_request(variation_id: i64, quantity: i64) -> CartAddRequest {
    CartAddRequest { store_id: STORE_ID, product_id: PRODUCT_ID, variation_id, quantity, delivery_detail_id: None }
}
