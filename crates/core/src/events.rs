//! Well-known platform event names and the in-app notification text derived
//! from them.
//!
//! Event names are stored in `events.event_type` and `notifications.event_type`
//! and matched by the notification router.

use serde_json::Value;

use crate::types::DbId;

pub const EVENT_PROSJEKT_CREATED: &str = "prosjekt.created";
pub const EVENT_PROSJEKT_DELETED: &str = "prosjekt.deleted";
pub const EVENT_OPPGAVE_ASSIGNED: &str = "oppgave.assigned";
pub const EVENT_SKJEMA_SUBMITTED: &str = "skjema.submitted";
pub const EVENT_SKJEMA_STATUS_CHANGED: &str = "skjema.status_changed";
pub const EVENT_LAGER_LOW_STOCK: &str = "lager.low_stock";
pub const EVENT_BEDRIFT_CREATED: &str = "bedrift.created";
pub const EVENT_USER_CREATED: &str = "user.created";

/// Source entity kinds recorded in `events.source_entity_type`.
pub const ENTITY_BEDRIFT: &str = "bedrift";
pub const ENTITY_USER: &str = "user";
pub const ENTITY_PROSJEKT: &str = "prosjekt";
pub const ENTITY_OPPGAVE: &str = "oppgave";
pub const ENTITY_SKJEMA: &str = "skjema";
pub const ENTITY_LAGER_PRODUKT: &str = "lager_produkt";

/// User-facing notification text for an event, or `None` when the event
/// type does not produce notifications.
pub fn notification_message(event_type: &str, payload: &Value) -> Option<String> {
    let text = |key: &str| payload.get(key).and_then(Value::as_str).unwrap_or("");

    let message = match event_type {
        EVENT_OPPGAVE_ASSIGNED => format!("Du er tildelt oppgaven «{}»", text("title")),
        EVENT_SKJEMA_SUBMITTED => format!(
            "Nytt skjema {} er sendt inn: {}",
            text("number"),
            text("title")
        ),
        EVENT_SKJEMA_STATUS_CHANGED => format!(
            "Skjema {} har fått status {}",
            text("number"),
            text("status")
        ),
        EVENT_LAGER_LOW_STOCK => {
            let quantity = payload.get("quantity").and_then(Value::as_i64).unwrap_or(0);
            format!(
                "Lav beholdning: {} ({} igjen)",
                text("name"),
                quantity
            )
        }
        _ => return None,
    };

    Some(message)
}

/// Frontend route for the entity an event refers to.
pub fn notification_link(entity_type: Option<&str>, entity_id: Option<DbId>) -> Option<String> {
    let id = entity_id?;
    let base = match entity_type? {
        ENTITY_PROSJEKT => "/prosjekter",
        ENTITY_OPPGAVE => "/oppgaver",
        ENTITY_SKJEMA => "/skjemaer",
        ENTITY_LAGER_PRODUKT => "/lager",
        _ => return None,
    };
    Some(format!("{base}/{id}"))
}
