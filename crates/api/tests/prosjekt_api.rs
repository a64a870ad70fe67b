//! HTTP-level tests for projects, tasks and time entries.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, delete_auth, get_auth, patch_json_auth, post_json_auth, put_json_auth,
};
use hms_db::repositories::{OppgaveRepo, TimeEntryRepo};
use sqlx::PgPool;

async fn create_prosjekt(pool: &PgPool, token: &str, name: &str) -> serde_json::Value {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/prosjekter",
        token,
        serde_json::json!({ "name": name, "customer": "Kunde AS" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn create_oppgave(
    pool: &PgPool,
    token: &str,
    prosjekt_id: i64,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/prosjekter/{prosjekt_id}/oppgaver"),
        token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bruker_cannot_create_project(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let worker = common::seed_user(&pool, b.id, "arb@bygg.no", "bruker").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/prosjekter",
        &common::token_for(&worker),
        serde_json::json!({ "name": "Nytt bygg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_date_range_and_status_are_validated(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/prosjekter",
        &token,
        serde_json::json!({ "name": "Feil", "start_date": "2026-05-01", "end_date": "2026-04-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let p = create_prosjekt(&pool, &token, "Riktig").await;
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/prosjekter/{}", p["id"]),
        &token,
        serde_json::json!({ "status": "ukjent" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/prosjekter/{}", p["id"]),
        &token,
        serde_json::json!({ "status": "aktiv" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "aktiv");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_detail_counts_tasks_and_hours(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);

    let p = create_prosjekt(&pool, &token, "Tak").await;
    let pid = p["id"].as_i64().unwrap();
    create_oppgave(&pool, &token, pid, serde_json::json!({ "title": "Rive" })).await;
    create_oppgave(&pool, &token, pid, serde_json::json!({ "title": "Legge" })).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/timer",
        &token,
        serde_json::json!({ "prosjekt_id": pid, "work_date": "2026-03-02", "hours": 7.5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/prosjekter/{pid}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Tak");
    assert_eq!(json["total_hours"], 7.5);
    let counts = json["task_counts"].as_array().unwrap();
    let total: i64 = counts.iter().map(|c| c["count"].as_i64().unwrap()).sum();
    assert_eq!(total, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_project_removes_tasks_and_hours(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let leder = common::seed_user(&pool, b.id, "leder@bygg.no", "leder").await;
    let pl_token = common::token_for(&pl);

    let p = create_prosjekt(&pool, &pl_token, "Kjeller").await;
    let pid = p["id"].as_i64().unwrap();
    let o = create_oppgave(&pool, &pl_token, pid, serde_json::json!({ "title": "Grave" })).await;
    post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/timer",
        &pl_token,
        serde_json::json!({
            "prosjekt_id": pid, "oppgave_id": o["id"], "work_date": "2026-03-03", "hours": 4
        }),
    )
    .await;

    // Project managers cannot delete projects.
    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/prosjekter/{pid}"),
        &pl_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/prosjekter/{pid}"),
        &common::token_for(&leder),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["deleted_tasks"], 1);
    assert_eq!(summary["deleted_time_entries"], 1);
    assert_eq!(summary["deleted_files"], 0);

    let oid = o["id"].as_i64().unwrap();
    assert!(OppgaveRepo::find_by_id(&pool, b.id, oid).await.unwrap().is_none());

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/prosjekter/{pid}"),
        &pl_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignee_can_move_task_others_cannot(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let assignee = common::seed_user(&pool, b.id, "a@bygg.no", "bruker").await;
    let other = common::seed_user(&pool, b.id, "o@bygg.no", "bruker").await;
    let token = common::token_for(&pl);

    let p = create_prosjekt(&pool, &token, "Bad").await;
    let o = create_oppgave(
        &pool,
        &token,
        p["id"].as_i64().unwrap(),
        serde_json::json!({ "title": "Flislegging", "assigned_user_id": assignee.id }),
    )
    .await;
    let uri = format!("/api/v1/oppgaver/{}/status", o["id"]);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &common::token_for(&other),
        serde_json::json!({ "status": "pagar" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &common::token_for(&assignee),
        serde_json::json!({ "status": "pagar", "position": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "pagar");
    assert_eq!(json["position"], 2);

    let response = patch_json_auth(
        common::build_test_app(pool),
        &uri,
        &common::token_for(&assignee),
        serde_json::json!({ "status": "ferdig" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_tasks_excludes_completed(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let worker = common::seed_user(&pool, b.id, "a@bygg.no", "bruker").await;
    let token = common::token_for(&pl);

    let p = create_prosjekt(&pool, &token, "Loft").await;
    let pid = p["id"].as_i64().unwrap();
    create_oppgave(
        &pool,
        &token,
        pid,
        serde_json::json!({ "title": "Åpen", "assigned_user_id": worker.id }),
    )
    .await;
    create_oppgave(
        &pool,
        &token,
        pid,
        serde_json::json!({ "title": "Ferdig", "status": "fullfort", "assigned_user_id": worker.id }),
    )
    .await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/oppgaver/mine",
        &common::token_for(&worker),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Åpen");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_assignee_must_be_colleague(pool: PgPool) {
    let a = common::seed_bedrift(&pool, "A AS", "912345678").await;
    let b = common::seed_bedrift(&pool, "B AS", "987654321").await;
    let pl = common::seed_user(&pool, a.id, "pl@a.no", "prosjektleder").await;
    let outsider = common::seed_user(&pool, b.id, "x@b.no", "bruker").await;
    let token = common::token_for(&pl);

    let p = create_prosjekt(&pool, &token, "Garasje").await;
    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/prosjekter/{}/oppgaver", p["id"]),
        &token,
        serde_json::json!({ "title": "Mur", "assigned_user_id": outsider.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_task_keeps_hours_on_project(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);

    let p = create_prosjekt(&pool, &token, "Vindu").await;
    let pid = p["id"].as_i64().unwrap();
    let o = create_oppgave(&pool, &token, pid, serde_json::json!({ "title": "Bytte" })).await;
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/timer",
        &token,
        serde_json::json!({
            "prosjekt_id": pid, "oppgave_id": o["id"], "work_date": "2026-03-04", "hours": 2.25
        }),
    )
    .await;
    let entry_id = body_json(response).await["id"].as_i64().unwrap();

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/oppgaver/{}", o["id"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["detached_time_entries"], 1);

    let entry = TimeEntryRepo::find_by_id(&pool, b.id, entry_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.prosjekt_id, pid);
    assert_eq!(entry.oppgave_id, None);
}

// ---------------------------------------------------------------------------
// Time entries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_entry_rules(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);
    let p = create_prosjekt(&pool, &token, "Fasade").await;
    let pid = p["id"].as_i64().unwrap();

    let post = |body: serde_json::Value| {
        let app = common::build_test_app(pool.clone());
        let token = token.clone();
        async move { post_json_auth(app, "/api/v1/timer", &token, body).await.status() }
    };

    // Not a quarter-hour step.
    assert_eq!(
        post(serde_json::json!({ "prosjekt_id": pid, "work_date": "2026-03-05", "hours": 1.1 })).await,
        StatusCode::BAD_REQUEST
    );
    // Unknown project.
    assert_eq!(
        post(serde_json::json!({ "prosjekt_id": 999999, "work_date": "2026-03-05", "hours": 1 })).await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        post(serde_json::json!({ "prosjekt_id": pid, "work_date": "2026-03-05", "hours": 20 })).await,
        StatusCode::CREATED
    );
    // Would exceed 24 hours on the same day.
    assert_eq!(
        post(serde_json::json!({ "prosjekt_id": pid, "work_date": "2026-03-05", "hours": 4.5 })).await,
        StatusCode::BAD_REQUEST
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bruker_only_sees_and_edits_own_hours(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let worker = common::seed_user(&pool, b.id, "a@bygg.no", "bruker").await;
    let pl_token = common::token_for(&pl);
    let worker_token = common::token_for(&worker);
    let p = create_prosjekt(&pool, &pl_token, "Tak").await;
    let pid = p["id"].as_i64().unwrap();

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/timer",
        &pl_token,
        serde_json::json!({ "prosjekt_id": pid, "work_date": "2026-03-06", "hours": 3 }),
    )
    .await;
    let pl_entry = body_json(response).await["id"].as_i64().unwrap();
    post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/timer",
        &worker_token,
        serde_json::json!({ "prosjekt_id": pid, "work_date": "2026-03-06", "hours": 5 }),
    )
    .await;

    let range = "from=2026-03-01&to=2026-03-31";
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/timer?{range}&user_id={}", pl.id),
        &worker_token,
    )
    .await;
    let data = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["user_id"], worker.id);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/timer?{range}"),
        &pl_token,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/timer/{pl_entry}"),
        &worker_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_export_is_csv(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);
    let p = create_prosjekt(&pool, &token, "Kontor").await;
    post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/timer",
        &token,
        serde_json::json!({
            "prosjekt_id": p["id"], "work_date": "2026-03-09", "hours": 7.5, "description": "Maling"
        }),
    )
    .await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/timer/export?from=2026-03-01&to=2026-03-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("timer_2026-03-01_2026-03-31.csv"));

    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("date,employee,project,task,hours,description"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("2026-03-09,"));
    assert!(row.contains("Kontor"));
    assert!(row.contains("7.50"));

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/timer/summary?from=2026-03-01&to=2026-03-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(data[0]["hours"], 7.5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_entries_respect_daily_cap(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);
    let p = create_prosjekt(&pool, &token, "Bru").await;
    let body = serde_json::json!({ "prosjekt_id": p["id"], "work_date": "2026-03-05", "hours": 16 });

    let post = || {
        let app = common::build_test_app(pool.clone());
        let token = token.clone();
        let body = body.clone();
        async move { post_json_auth(app, "/api/v1/timer", &token, body).await.status() }
    };
    let (s1, s2, s3, s4) = tokio::join!(post(), post(), post(), post());
    let statuses = [s1, s2, s3, s4];

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(), 3);

    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(hours), 0) FROM time_entries WHERE user_id = $1 AND work_date = '2026-03-05'",
    )
    .bind(pl.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(total, 16.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_entry_can_detach_task_and_move_project(pool: PgPool) {
    let b = common::seed_bedrift(&pool, "Bygg AS", "912345678").await;
    let pl = common::seed_user(&pool, b.id, "pl@bygg.no", "prosjektleder").await;
    let token = common::token_for(&pl);
    let first = create_prosjekt(&pool, &token, "Garasje").await;
    let second = create_prosjekt(&pool, &token, "Carport").await;
    let o = create_oppgave(
        &pool,
        &token,
        first["id"].as_i64().unwrap(),
        serde_json::json!({ "title": "Grunnmur" }),
    )
    .await;

    let entry_body = serde_json::json!({
        "prosjekt_id": first["id"], "oppgave_id": o["id"], "work_date": "2026-03-10", "hours": 3
    });

    // Moving to another project drops the old project's task.
    let moved = create_time_entry(&pool, &token, entry_body.clone()).await;
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/timer/{moved}"),
        &token,
        serde_json::json!({ "prosjekt_id": second["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["prosjekt_id"], second["id"]);
    assert!(json["oppgave_id"].is_null());
    assert_eq!(json["hours"], 3.0);

    // Explicit detach on the same project.
    let detached = create_time_entry(&pool, &token, entry_body).await;
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/timer/{detached}"),
        &token,
        serde_json::json!({ "unassign_oppgave": true, "description": "Uten oppgave" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["prosjekt_id"], first["id"]);
    assert!(json["oppgave_id"].is_null());
    assert_eq!(json["description"], "Uten oppgave");

    // Naming a task from a different project is still rejected.
    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/timer/{moved}"),
        &token,
        serde_json::json!({ "oppgave_id": o["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let entry = TimeEntryRepo::find_by_id(&pool, b.id, detached).await.unwrap().unwrap();
    assert_eq!(entry.oppgave_id, None);
}

async fn create_time_entry(pool: &PgPool, token: &str, body: serde_json::Value) -> i64 {
    let response =
        post_json_auth(common::build_test_app(pool.clone()), "/api/v1/timer", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
