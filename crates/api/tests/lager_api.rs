//! HTTP-level tests for stock, low-stock notifications, the activity feed
//! and the dashboard.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth};
use hms_api::notifications::NotificationRouter;
use hms_api::ws::WsManager;
use hms_events::EventPersistence;
use hms_storage::MemoryStore;
use sqlx::PgPool;

async fn create_produkt(pool: &PgPool, token: &str, quantity: i32, min: i32) -> i64 {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/lager",
        token,
        serde_json::json!({
            "name": "Skruer 5x50", "quantity": quantity, "min_quantity": min, "unit": "pk"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_withdraw_and_return_stock(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder = common::token_for(&common::seed_user(&pool, b.id, "l@bygg.no", "leder").await);
    let worker = common::token_for(&common::seed_user(&pool, b.id, "u@bygg.no", "bruker").await);
    let id = create_produkt(&pool, &leder, 20, 5).await;
    let uri = format!("/api/v1/lager/{id}/bevegelser");

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &worker,
        serde_json::json!({ "movement_type": "uttak", "quantity": 8 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["produkt"]["quantity"], 12);

    // More than is in stock.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &worker,
        serde_json::json!({ "movement_type": "uttak", "quantity": 13 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &worker,
        serde_json::json!({ "movement_type": "innlevering", "quantity": 3 }),
    )
    .await;
    assert_eq!(body_json(response).await["produkt"]["quantity"], 15);

    let response = get_auth(common::build_test_app(pool), &uri, &worker).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_adjustment_requires_leder(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder = common::token_for(&common::seed_user(&pool, b.id, "l@bygg.no", "leder").await);
    let worker = common::token_for(&common::seed_user(&pool, b.id, "u@bygg.no", "bruker").await);
    let id = create_produkt(&pool, &leder, 20, 5).await;
    let uri = format!("/api/v1/lager/{id}/bevegelser");
    let body = serde_json::json!({ "movement_type": "justering", "quantity": 17, "comment": "Telling" });

    let response =
        post_json_auth(common::build_test_app(pool.clone()), &uri, &worker, body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(common::build_test_app(pool), &uri, &leder, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["produkt"]["quantity"], 17);
    assert_eq!(json["bevegelse"]["quantity_change"], -3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bruker_cannot_manage_products(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder = common::token_for(&common::seed_user(&pool, b.id, "l@bygg.no", "leder").await);
    let worker = common::token_for(&common::seed_user(&pool, b.id, "u@bygg.no", "bruker").await);
    let id = create_produkt(&pool, &leder, 1, 0).await;

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/lager/{id}"),
        &worker,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/lager/{id}"),
        &leder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_low_stock_event_notifies_leaders(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder_user = common::seed_user(&pool, b.id, "l@bygg.no", "leder").await;
    let leder = common::token_for(&leder_user);
    let worker = common::token_for(&common::seed_user(&pool, b.id, "u@bygg.no", "bruker").await);
    let id = create_produkt(&pool, &leder, 10, 5).await;

    let state = common::test_state(pool.clone(), Arc::new(MemoryStore::new()));
    let mut events = state.event_bus.subscribe();
    let app = common::app_from_state(state);

    let response = post_json_auth(
        app,
        &format!("/api/v1/lager/{id}/bevegelser"),
        &worker,
        serde_json::json!({ "movement_type": "uttak", "quantity": 6 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["produkt"]["quantity"], 4);

    let event = events.try_recv().expect("low stock event should be published");
    assert_eq!(event.event_type, "lager.low_stock");
    assert_eq!(event.payload["quantity"], 4);
    assert_eq!(event.payload["min_quantity"], 5);

    EventPersistence::persist(&pool, &event).await.unwrap();
    NotificationRouter::new(pool.clone(), Arc::new(WsManager::new()))
        .route_event(&event)
        .await
        .unwrap();

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/unread-count",
        &leder,
    )
    .await;
    assert_eq!(body_json(response).await["count"], 1);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/lager?low_stock=true",
        &leder,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get_auth(common::build_test_app(pool.clone()), "/api/v1/activity", &leder).await;
    assert_eq!(response.status(), StatusCode::OK);
    let feed = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["event_type"], "lager.low_stock");

    let response = get_auth(common::build_test_app(pool), "/api/v1/dashboard", &leder).await;
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = body_json(response).await;
    assert_eq!(dashboard["low_stock_products"], 1);
    assert_eq!(dashboard["unread_notifications"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_read_and_delete_are_owner_only(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder_user = common::seed_user(&pool, b.id, "l@bygg.no", "leder").await;
    let admin_user = common::seed_user(&pool, b.id, "a@bygg.no", "admin").await;
    let leder = common::token_for(&leder_user);
    let admin = common::token_for(&admin_user);

    let event = hms_events::PlatformEvent::new("skjema.submitted")
        .with_bedrift(b.id)
        .with_payload(serde_json::json!({ "number": "AVV-0001", "title": "Fall" }));
    NotificationRouter::new(pool.clone(), Arc::new(WsManager::new()))
        .route_event(&event)
        .await
        .unwrap();

    let response = get_auth(common::build_test_app(pool.clone()), "/api/v1/notifications", &leder).await;
    let list = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(list.len(), 1);
    let nid = list[0]["id"].as_i64().unwrap();

    // The admin got their own copy; the leder's row is not theirs.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{nid}/read"),
        &admin,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{nid}/read"),
        &leder,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications?unread_only=true",
        &leder,
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/read-all",
        &admin,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(body_json(response).await["updated"], 1);

    let response = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/notifications/{nid}"),
        &leder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_movement_history_is_newest_first_and_company_scoped(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let other = common::seed_bedrift(&pool, "Rør AS", "987654321").await;
    let leder = common::token_for(&common::seed_user(&pool, b.id, "l@bygg.no", "leder").await);
    let outsider = common::token_for(&common::seed_user(&pool, other.id, "l@ror.no", "leder").await);
    let id = create_produkt(&pool, &leder, 20, 5).await;
    let uri = format!("/api/v1/lager/{id}/bevegelser");

    for body in [
        serde_json::json!({ "movement_type": "uttak", "quantity": 4 }),
        serde_json::json!({ "movement_type": "innlevering", "quantity": 1 }),
        serde_json::json!({ "movement_type": "justering", "quantity": 30, "comment": "Varetelling" }),
    ] {
        let response = post_json_auth(common::build_test_app(pool.clone()), &uri, &leder, body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(common::build_test_app(pool.clone()), &uri, &leder).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let history: Vec<(String, i64, i64)> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["movement_type"].as_str().unwrap().to_string(),
                m["quantity_change"].as_i64().unwrap(),
                m["quantity_after"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        history,
        vec![
            ("justering".to_string(), 13, 30),
            ("innlevering".to_string(), 1, 17),
            ("uttak".to_string(), -4, 16),
        ]
    );
    assert_eq!(json["data"][0]["comment"], "Varetelling");

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("{uri}?limit=1&offset=1"),
        &leder,
    )
    .await;
    let page = body_json(response).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"][0]["movement_type"], "innlevering");

    let response = get_auth(common::build_test_app(pool), &uri, &outsider).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
