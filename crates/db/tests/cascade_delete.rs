//! Integration tests for the explicit multi-table deletes of projects,
//! tasks and chemical register records.

mod common;

use chrono::NaiveDate;
use hms_db::models::fil::CreateOppgaveFil;
use hms_db::models::lager::{CreateLagerBevegelse, CreateLagerProdukt};
use hms_db::models::oppgave::CreateOppgave;
use hms_db::models::skjema::CreateSkjema;
use hms_db::models::stoffkartotek::CreateStoffkartotek;
use hms_db::models::time_entry::CreateTimeEntry;
use hms_db::repositories::{
    FilRepo, LagerRepo, OppgaveRepo, ProsjektRepo, SkjemaRepo, StoffkartotekRepo, TimeEntryRepo,
};
use serde_json::json;
use sqlx::PgPool;

fn new_oppgave(title: &str) -> CreateOppgave {
    CreateOppgave {
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
        position: None,
        due_date: None,
        estimated_hours: None,
        assigned_user_id: None,
    }
}

fn new_file(bedrift_id: i64, oppgave_id: i64, key: &str, user_id: i64) -> CreateOppgaveFil {
    CreateOppgaveFil {
        bedrift_id,
        oppgave_id,
        object_key: key.to_string(),
        file_name: "plan.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        size_bytes: 1024,
        uploaded_by: user_id,
    }
}

fn hours(prosjekt_id: i64, oppgave_id: Option<i64>, day: u32, hours: f64) -> CreateTimeEntry {
    CreateTimeEntry {
        prosjekt_id,
        oppgave_id,
        work_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        hours,
        description: None,
    }
}

async fn count(pool: &PgPool, sql: &str, id: i64) -> i64 {
    sqlx::query_scalar(sql).bind(id).fetch_one(pool).await.unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_delete_removes_dependents_and_detaches_forms(pool: PgPool) {
    let b = common::bedrift(&pool, "Bygg AS", "923609016").await;
    let u = common::user(&pool, b.id, "kari@bygg.no", "prosjektleder").await;
    let p = common::prosjekt(&pool, b.id, u.id, "Skolebygg").await;

    let t1 = OppgaveRepo::create(&pool, b.id, p.id, u.id, &new_oppgave("Grunnarbeid"))
        .await
        .unwrap();
    let t2 = OppgaveRepo::create(&pool, b.id, p.id, u.id, &new_oppgave("Tak"))
        .await
        .unwrap();

    FilRepo::create(&pool, &new_file(b.id, t1.id, "k/1", u.id)).await.unwrap();
    FilRepo::create(&pool, &new_file(b.id, t2.id, "k/2", u.id)).await.unwrap();

    TimeEntryRepo::create(&pool, b.id, u.id, &hours(p.id, Some(t1.id), 2, 7.5))
        .await
        .unwrap();
    TimeEntryRepo::create(&pool, b.id, u.id, &hours(p.id, None, 3, 4.0))
        .await
        .unwrap();

    let form = SkjemaRepo::create(
        &pool,
        b.id,
        u.id,
        &CreateSkjema {
            skjema_type: "avvik".to_string(),
            title: "Manglende rekkverk".to_string(),
            prosjekt_id: Some(p.id),
            severity: Some("hoy".to_string()),
            details: json!({"description": "Rekkverk mangler i 3. etasje"}),
        },
    )
    .await
    .unwrap();

    let produkt = LagerRepo::create(
        &pool,
        b.id,
        &CreateLagerProdukt {
            name: "Skruer".to_string(),
            description: None,
            supplier: None,
            category: None,
            unit: None,
            quantity: Some(100),
            min_quantity: None,
            location: None,
        },
    )
    .await
    .unwrap();
    LagerRepo::record_movement(
        &pool,
        b.id,
        produkt.id,
        u.id,
        &CreateLagerBevegelse {
            movement_type: "uttak".to_string(),
            quantity: 10,
            prosjekt_id: Some(p.id),
            comment: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    let summary = ProsjektRepo::delete_cascade(&pool, b.id, p.id)
        .await
        .unwrap()
        .expect("project should exist");

    assert_eq!(summary.deleted_tasks, 2);
    assert_eq!(summary.deleted_time_entries, 2);
    assert_eq!(summary.deleted_files, 2);
    let mut keys = summary.file_keys.clone();
    keys.sort();
    assert_eq!(keys, vec!["k/1", "k/2"]);

    assert!(ProsjektRepo::find_by_id(&pool, b.id, p.id).await.unwrap().is_none());
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM oppgaver WHERE prosjekt_id = $1", p.id).await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM time_entries WHERE prosjekt_id = $1", p.id).await, 0);

    // Forms and the stock ledger survive, detached from the project.
    let form = SkjemaRepo::find_by_id(&pool, b.id, form.id).await.unwrap().unwrap();
    assert_eq!(form.prosjekt_id, None);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM lager_bevegelser WHERE produkt_id = $1 AND prosjekt_id IS NULL", produkt.id).await,
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_delete_is_tenant_scoped(pool: PgPool) {
    let a = common::bedrift(&pool, "A AS", "923609016").await;
    let b = common::bedrift(&pool, "B AS", "974760673").await;
    let u = common::user(&pool, a.id, "ola@a.no", "leder").await;
    let p = common::prosjekt(&pool, a.id, u.id, "Hemmelig").await;

    let result = ProsjektRepo::delete_cascade(&pool, b.id, p.id).await.unwrap();
    assert!(result.is_none());
    assert!(ProsjektRepo::find_by_id(&pool, a.id, p.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_delete_detaches_time_entries(pool: PgPool) {
    let b = common::bedrift(&pool, "Bygg AS", "923609016").await;
    let u = common::user(&pool, b.id, "kari@bygg.no", "prosjektleder").await;
    let p = common::prosjekt(&pool, b.id, u.id, "Skolebygg").await;
    let t = OppgaveRepo::create(&pool, b.id, p.id, u.id, &new_oppgave("Maling"))
        .await
        .unwrap();
    FilRepo::create(&pool, &new_file(b.id, t.id, "k/x", u.id)).await.unwrap();
    let entry = TimeEntryRepo::create(&pool, b.id, u.id, &hours(p.id, Some(t.id), 5, 3.0))
        .await
        .unwrap();

    let summary = OppgaveRepo::delete_cascade(&pool, b.id, t.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.deleted_files, 1);
    assert_eq!(summary.detached_time_entries, 1);
    assert_eq!(summary.file_keys, vec!["k/x"]);

    let entry = TimeEntryRepo::find_by_id(&pool, b.id, entry.id).await.unwrap().unwrap();
    assert_eq!(entry.oppgave_id, None);
    assert_eq!(entry.prosjekt_id, p.id);
    assert_eq!(ProsjektRepo::total_hours(&pool, p.id).await.unwrap(), 3.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stoffkartotek_delete_removes_symbols(pool: PgPool) {
    let b = common::bedrift(&pool, "Kjemi AS", "923609016").await;
    let stoff = StoffkartotekRepo::create(
        &pool,
        b.id,
        &CreateStoffkartotek {
            product_name: "Aceton".to_string(),
            manufacturer: Some("Kjemikalia".to_string()),
            cas_number: Some("67-64-1".to_string()),
            description: None,
            usage_area: None,
            storage_location: None,
            hazard_symbols: vec![],
        },
        &["brannfarlig".to_string(), "helsefare".to_string()],
    )
    .await
    .unwrap();
    assert_eq!(stoff.hazard_symbols, vec!["brannfarlig", "helsefare"]);

    StoffkartotekRepo::set_datasheet(&pool, b.id, stoff.id, "sds/1.pdf")
        .await
        .unwrap()
        .unwrap();

    let datasheet = StoffkartotekRepo::delete_cascade(&pool, b.id, stoff.id)
        .await
        .unwrap()
        .expect("record should exist");
    assert_eq!(datasheet.as_deref(), Some("sds/1.pdf"));

    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM stoffkartotek_faresymboler WHERE stoffkartotek_id = $1", stoff.id).await,
        0
    );
    assert!(StoffkartotekRepo::find_by_id(&pool, b.id, stoff.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stoffkartotek_update_replaces_symbols(pool: PgPool) {
    let b = common::bedrift(&pool, "Kjemi AS", "923609016").await;
    let stoff = StoffkartotekRepo::create(
        &pool,
        b.id,
        &CreateStoffkartotek {
            product_name: "Klorin".to_string(),
            manufacturer: None,
            cas_number: None,
            description: None,
            usage_area: None,
            storage_location: None,
            hazard_symbols: vec![],
        },
        &["etsende".to_string()],
    )
    .await
    .unwrap();

    let updated = StoffkartotekRepo::update(
        &pool,
        b.id,
        stoff.id,
        &Default::default(),
        Some(["etsende".to_string(), "miljofare".to_string()].as_slice()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.hazard_symbols, vec!["etsende", "miljofare"]);
    assert_eq!(updated.product_name, "Klorin");

    let unchanged = StoffkartotekRepo::update(&pool, b.id, stoff.id, &Default::default(), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.hazard_symbols, vec!["etsende", "miljofare"]);
}
