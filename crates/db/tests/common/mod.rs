//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use hms_db::models::bedrift::{Bedrift, CreateBedrift};
use hms_db::models::prosjekt::{CreateProsjekt, Prosjekt};
use hms_db::models::user::{CreateUser, User};
use hms_db::repositories::{BedriftRepo, ProsjektRepo, UserRepo};
use sqlx::PgPool;

pub async fn bedrift(pool: &PgPool, name: &str, orgnummer: &str) -> Bedrift {
    BedriftRepo::create(
        pool,
        &CreateBedrift {
            name: name.to_string(),
            orgnummer: orgnummer.to_string(),
            address: None,
            postal_code: None,
            city: Some("Bergen".to_string()),
        },
    )
    .await
    .unwrap()
}

pub async fn user(pool: &PgPool, bedrift_id: i64, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            bedrift_id,
            first_name: "Kari".to_string(),
            last_name: "Nordmann".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
            position: None,
            phone: None,
        },
    )
    .await
    .unwrap()
}

pub async fn prosjekt(pool: &PgPool, bedrift_id: i64, created_by: i64, name: &str) -> Prosjekt {
    ProsjektRepo::create(
        pool,
        bedrift_id,
        created_by,
        &CreateProsjekt {
            name: name.to_string(),
            description: None,
            status: None,
            customer: None,
            address: None,
            start_date: None,
            end_date: None,
        },
    )
    .await
    .unwrap()
}
