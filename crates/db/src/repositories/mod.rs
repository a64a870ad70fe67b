//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every tenant-owned query
//! is scoped by `bedrift_id`.

pub mod bedrift_repo;
pub mod dashboard_repo;
pub mod event_repo;
pub mod fil_repo;
pub mod lager_repo;
pub mod notification_repo;
pub mod oppgave_repo;
pub mod password_reset_repo;
pub mod prosjekt_repo;
pub mod role_repo;
pub mod session_repo;
pub mod skjema_repo;
pub mod stoffkartotek_repo;
pub mod support_logg_repo;
pub mod time_entry_repo;
pub mod user_repo;

pub use bedrift_repo::BedriftRepo;
pub use dashboard_repo::DashboardRepo;
pub use event_repo::EventRepo;
pub use fil_repo::FilRepo;
pub use lager_repo::LagerRepo;
pub use notification_repo::NotificationRepo;
pub use oppgave_repo::OppgaveRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use prosjekt_repo::ProsjektRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use skjema_repo::SkjemaRepo;
pub use stoffkartotek_repo::StoffkartotekRepo;
pub use support_logg_repo::SupportLoggRepo;
pub use time_entry_repo::TimeEntryRepo;
pub use user_repo::UserRepo;
