//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers take the caller's company from the token, delegate to the
//! matching repository in `hms_db` and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod account;
pub mod activity;
pub mod auth;
pub mod bedrift;
pub mod dashboard;
pub mod filer;
pub mod lager;
pub mod notification;
pub mod oppgave;
pub mod prosjekt;
pub mod skjema;
pub mod stoffkartotek;
pub mod support;
pub mod timer;
pub mod users;
