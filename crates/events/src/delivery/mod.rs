//! External delivery channels.
//!
//! Email is the only outbound channel; in-app notifications are pushed over
//! WebSocket by the API server's notification router.

pub mod email;
