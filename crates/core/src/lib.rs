//! Domain rules for the HMS platform.
//!
//! Pure, database-free building blocks shared by the repository and API
//! layers: error type, id aliases, role ranking, status vocabularies and
//! the validation/formatting rules of each business module.

pub mod bedrift;
pub mod csv;
pub mod error;
pub mod events;
pub mod files;
pub mod lager;
pub mod oppgave;
pub mod prosjekt;
pub mod roles;
pub mod search;
pub mod skjema;
pub mod stoffkartotek;
pub mod time_entry;
pub mod types;
