//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus, stores in-app
//! notifications for the affected users and pushes them over WebSocket.

pub mod router;

pub use router::NotificationRouter;
