//! HTTP-level tests for task attachments and the chemical register.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, delete_auth, get_auth, post_json_auth, post_multipart_auth,
    put_json_auth,
};
use hms_storage::MemoryStore;
use sqlx::PgPool;

const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

async fn setup_task(pool: &PgPool, token: &str) -> i64 {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/prosjekter",
        token,
        serde_json::json!({ "name": "Hytte" }),
    )
    .await;
    let pid = body_json(response).await["id"].as_i64().unwrap();
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/prosjekter/{pid}/oppgaver"),
        token,
        serde_json::json!({ "title": "Tegninger" }),
    )
    .await;
    body_json(response).await["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_download_and_delete_attachment(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);
    let store = Arc::new(MemoryStore::new());
    let oid = setup_task(&pool, &token).await;

    let response = post_multipart_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &format!("/api/v1/oppgaver/{oid}/filer"),
        &token,
        "plan tegning.txt",
        "text/plain",
        b"etasje 1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let fil = body_json(response).await;
    assert_eq!(fil["size_bytes"], 8);
    assert_eq!(fil["content_type"], "text/plain");
    assert!(fil.get("object_key").is_none());
    assert_eq!(store.len().await, 1);

    let response = get_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &format!("/api/v1/oppgaver/{oid}/filer"),
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &format!("/api/v1/filer/{}/download", fil["id"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    assert_eq!(body_bytes(response).await, b"etasje 1");

    let response = delete_auth(
        common::build_test_app_with_store(pool, store.clone()),
        &format!("/api/v1/filer/{}", fil["id"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.is_empty().await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_bruker_cannot_delete_attachment(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let uploader = common::seed_user(&pool, b.id, "u@bygg.no", "bruker").await;
    let other = common::seed_user(&pool, b.id, "o@bygg.no", "bruker").await;
    let store = Arc::new(MemoryStore::new());
    let oid = setup_task(&pool, &common::token_for(&pl)).await;

    let response = post_multipart_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &format!("/api/v1/oppgaver/{oid}/filer"),
        &common::token_for(&uploader),
        "bilde.jpg",
        "image/jpeg",
        &[0xff, 0xd8, 0xff, 0xe0],
    )
    .await;
    let fil_id = body_json(response).await["id"].as_i64().unwrap();

    let response = delete_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &format!("/api/v1/filer/{fil_id}"),
        &common::token_for(&other),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        common::build_test_app_with_store(pool, store.clone()),
        &format!("/api/v1/filer/{fil_id}"),
        &common::token_for(&uploader),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_oversized_and_empty_uploads_are_rejected(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);
    let store = Arc::new(MemoryStore::new());
    let oid = setup_task(&pool, &token).await;
    let uri = format!("/api/v1/oppgaver/{oid}/filer");

    let too_big = vec![b'x'; common::test_config().max_upload_bytes + 1];
    let response = post_multipart_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &uri,
        &token,
        "stor.bin",
        "application/octet-stream",
        &too_big,
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = post_multipart_auth(
        common::build_test_app_with_store(pool, store.clone()),
        &uri,
        &token,
        "tom.txt",
        "text/plain",
        b"",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

// ---------------------------------------------------------------------------
// Stoffkartotek
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_chemical_with_symbols_and_cas(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder = common::token_for(&common::seed_user(&pool, b.id, "l@bygg.no", "leder").await);
    let bruker = common::token_for(&common::seed_user(&pool, b.id, "u@bygg.no", "bruker").await);

    let body = serde_json::json!({
        "product_name": "Rødsprit",
        "manufacturer": "Kemetyl",
        "cas_number": "64-17-5",
        "hazard_symbols": ["helsefare", "brannfarlig", "brannfarlig"],
    });

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/stoffkartotek",
        &bruker,
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/stoffkartotek",
        &leder,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let stoff = body_json(response).await;
    assert_eq!(
        stoff["hazard_symbols"],
        serde_json::json!(["brannfarlig", "helsefare"])
    );

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/stoffkartotek",
        &leder,
        serde_json::json!({ "product_name": "Feil", "cas_number": "64-17-4" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/stoffkartotek/{}", stoff["id"]),
        &leder,
        serde_json::json!({ "hazard_symbols": ["radioaktiv"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/stoffkartotek?q=KEMETYL",
        &bruker,
    )
    .await;
    let data = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["product_name"], "Rødsprit");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_datasheet_must_be_pdf_and_is_replaced(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder = common::token_for(&common::seed_user(&pool, b.id, "l@bygg.no", "leder").await);
    let store = Arc::new(MemoryStore::new());

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/stoffkartotek",
        &leder,
        serde_json::json!({ "product_name": "Sement" }),
    )
    .await;
    let id = body_json(response).await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/stoffkartotek/{id}/datablad");

    let response = get_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &uri,
        &leder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_multipart_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &uri,
        &leder,
        "sds.txt",
        "text/plain",
        b"not a pdf",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let response = post_multipart_auth(
            common::build_test_app_with_store(pool.clone(), store.clone()),
            &uri,
            &leder,
            "sds.pdf",
            "application/pdf",
            PDF,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    // The first datasheet was removed when it was replaced.
    assert_eq!(store.len().await, 1);

    let response = get_auth(
        common::build_test_app_with_store(pool.clone(), store.clone()),
        &uri,
        &leder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(body_bytes(response).await, PDF);

    let response = delete_auth(
        common::build_test_app_with_store(pool, store.clone()),
        &format!("/api/v1/stoffkartotek/{id}"),
        &leder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.is_empty().await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_chemical_export_is_csv(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let leder = common::token_for(&common::seed_user(&pool, b.id, "l@bygg.no", "leder").await);

    post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/stoffkartotek",
        &leder,
        serde_json::json!({
            "product_name": "Maling", "hazard_symbols": ["brannfarlig", "miljofare"]
        }),
    )
    .await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/stoffkartotek/export",
        &leder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("stoffkartotek.csv"));
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(csv.lines().next().unwrap().ends_with("hazard_symbols,datablad"));
    assert!(csv.lines().nth(1).unwrap().ends_with("brannfarlig;miljofare,nei"));
}
