//! Integration tests for the dual-mode cart and its stock reservation accounting.
mod support;

use marketplace_engine::{
    db_types::{CartQuantityUpdate, GuestId, Identity, Money},
    guest::GuestStore,
    test_utils::seed,
    CartApi,
    CartError,
};
use support::{add_request, checkout_fixture, new_test_db, PRODUCT_ID};

#[tokio::test]
async fn adding_to_cart_reserves_stock_immediately() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);

    api.add_to_cart(&identity, &add_request(fixture.variation_id, 2)).await.expect("add failed");
    assert_eq!(seed::variation_stock(&fixture.db, fixture.variation_id).await, 8);
}

#[tokio::test]
async fn insufficient_stock_rejects_the_add_without_side_effects() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);

    let err = api.add_to_cart(&identity, &add_request(fixture.variation_id, 11)).await.unwrap_err();
    match err {
        CartError::InsufficientStock { requested, available, .. } => {
            assert_eq!(requested, 11);
            assert_eq!(available, 10);
        },
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(seed::variation_stock(&fixture.db, fixture.variation_id).await, 10);
    assert_eq!(api.cart(&identity).await.unwrap().count, 0);
}

#[tokio::test]
async fn adding_the_same_pair_increments_the_existing_line() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);

    let first = api.add_to_cart(&identity, &add_request(fixture.variation_id, 2)).await.unwrap();
    let second = api.add_to_cart(&identity, &add_request(fixture.variation_id, 3)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 5);
    let cart = api.cart(&identity).await.unwrap();
    assert_eq!(cart.count, 1);
    // both adds reserved stock
    assert_eq!(seed::variation_stock(&fixture.db, fixture.variation_id).await, 5);
}

#[tokio::test]
async fn removing_a_line_restocks_the_variation() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);

    // stock 10 -> 7 on add; removal of a 3-quantity line brings it back to 10
    let line = api.add_to_cart(&identity, &add_request(fixture.variation_id, 3)).await.unwrap();
    assert_eq!(seed::variation_stock(&fixture.db, fixture.variation_id).await, 7);

    let removed = api.remove_from_cart(&identity, &line.id).await.unwrap();
    assert_eq!(removed.quantity, 3);
    assert_eq!(seed::variation_stock(&fixture.db, fixture.variation_id).await, 10);
    assert_eq!(api.cart(&identity).await.unwrap().count, 0);
}

#[tokio::test]
async fn adding_an_unknown_variation_fails() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);

    let err = api.add_to_cart(&identity, &add_request(4096, 1)).await.unwrap_err();
    assert!(matches!(err, CartError::VariationNotFound(4096)));
}

#[tokio::test]
async fn removing_an_unknown_line_fails() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);

    let err = api.remove_from_cart(&identity, "4096").await.unwrap_err();
    assert!(matches!(err, CartError::CartLineNotFound(_)));
    let err = api.remove_from_cart(&identity, "not-a-row-id").await.unwrap_err();
    assert!(matches!(err, CartError::CartLineNotFound(_)));
}

#[tokio::test]
async fn a_user_cannot_remove_another_users_line() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);
    let line = api.add_to_cart(&identity, &add_request(fixture.variation_id, 1)).await.unwrap();

    let stranger = seed::seed_user(&fixture.db, "stranger").await;
    let err = api.remove_from_cart(&Identity::Authenticated(stranger), &line.id).await.unwrap_err();
    assert!(matches!(err, CartError::CartLineNotFound(_)));
    assert_eq!(api.cart(&identity).await.unwrap().count, 1);
}

#[tokio::test]
async fn bulk_quantity_updates_do_not_touch_stock() {
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);
    api.add_to_cart(&identity, &add_request(fixture.variation_id, 2)).await.unwrap();

    let changed = api
        .update_cart(
            &identity,
            &[
                CartQuantityUpdate { product_id: PRODUCT_ID, variation_id: fixture.variation_id, quantity: 6 },
                CartQuantityUpdate { product_id: 99, variation_id: 99, quantity: 1 },
            ],
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let cart = api.cart(&identity).await.unwrap();
    assert_eq!(cart.items[0].quantity, 6);
    // quantity edits deliberately bypass the reservation accounting
    assert_eq!(seed::variation_stock(&fixture.db, fixture.variation_id).await, 8);
}

#[tokio::test]
async fn guest_carts_reserve_and_release_stock_like_authenticated_ones() {
    let db = new_test_db().await;
    let variation_id = seed::seed_variation(&db, PRODUCT_ID, Money::from(1000), 10).await;
    let api = CartApi::new(db.clone(), GuestStore::new());
    let guest = Identity::Guest(GuestId::from("guest-77"));

    let item = api.add_to_cart(&guest, &add_request(variation_id, 4)).await.expect("guest add failed");
    assert_eq!(seed::variation_stock(&db, variation_id).await, 6);

    // guest line ids are uuids, not row ids
    assert!(item.id.parse::<i64>().is_err());
    let cart = api.cart(&guest).await.unwrap();
    assert_eq!(cart.count, 1);
    assert_eq!(cart.items[0].quantity, 4);

    api.remove_from_cart(&guest, &item.id).await.expect("guest remove failed");
    assert_eq!(seed::variation_stock(&db, variation_id).await, 10);
    assert_eq!(api.cart(&guest).await.unwrap().count, 0);
}

#[tokio::test]
async fn guest_adds_are_rejected_on_insufficient_stock() {
    let db = new_test_db().await;
    let variation_id = seed::seed_variation(&db, PRODUCT_ID, Money::from(1000), 3).await;
    let api = CartApi::new(db.clone(), GuestStore::new());
    let guest = Identity::Guest(GuestId::from("guest-77"));

    let err = api.add_to_cart(&guest, &add_request(variation_id, 5)).await.unwrap_err();
    assert!(matches!(err, CartError::InsufficientStock { .. }));
    assert!(api.cart(&guest).await.unwrap().items.is_empty());
    assert_eq!(seed::variation_stock(&db, variation_id).await, 3);
}

#[tokio::test]
async fn guest_quantity_updates_edit_matching_entries_only() {
    let db = new_test_db().await;
    let variation_id = seed::seed_variation(&db, PRODUCT_ID, Money::from(1000), 10).await;
    let api = CartApi::new(db.clone(), GuestStore::new());
    let guest = Identity::Guest(GuestId::from("guest-42"));
    api.add_to_cart(&guest, &add_request(variation_id, 2)).await.unwrap();

    let changed = api
        .update_cart(
            &guest,
            &[CartQuantityUpdate { product_id: PRODUCT_ID, variation_id, quantity: 1 }],
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(api.cart(&guest).await.unwrap().items[0].quantity, 1);
}

#[tokio::test]
async fn stock_is_conserved_across_a_mixed_session() {
    // initial stock == stock + reserved-in-cart quantities at every step
    let fixture = checkout_fixture().await;
    let api = CartApi::new(fixture.db.clone(), GuestStore::new());
    let identity = Identity::Authenticated(fixture.user_id);
    let guest = Identity::Guest(GuestId::from("guest-1"));

    api.add_to_cart(&identity, &add_request(fixture.variation_id, 2)).await.unwrap();
    let guest_item = api.add_to_cart(&guest, &add_request(fixture.variation_id, 3)).await.unwrap();
    let stock = seed::variation_stock(&fixture.db, fixture.variation_id).await;
    assert_eq!(stock + 2 + 3, 10);

    api.remove_from_cart(&guest, &guest_item.id).await.unwrap();
    let stock = seed::variation_stock(&fixture.db, fixture.variation_id).await;
    assert_eq!(stock + 2, 10);
}
