//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod bedrift;
pub mod dashboard;
pub mod event;
pub mod fil;
pub mod lager;
pub mod notification;
pub mod oppgave;
pub mod prosjekt;
pub mod role;
pub mod session;
pub mod skjema;
pub mod stoffkartotek;
pub mod support_logg;
pub mod time_entry;
pub mod user;
