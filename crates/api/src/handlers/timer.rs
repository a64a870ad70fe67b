//! Handlers for time tracking (`/timer`).
//!
//! `bruker` only ever sees and edits their own entries; project managers
//! may list any employee, leaders may edit anyone's.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use hms_core::csv::build_csv;
use hms_core::error::CoreError;
use hms_core::roles::{ROLE_LEDER, ROLE_PROSJEKTLEDER};
use hms_core::time_entry::{default_period, validate_hours, validate_period};
use hms_core::types::{Date, DbId};
use hms_db::models::time_entry::{
    CreateTimeEntry, TimeEntry, TimeEntryChanges, TimeEntryFilter, TimeSummaryRow,
    UpdateTimeEntry,
};
use hms_db::repositories::{OppgaveRepo, ProsjektRepo, TimeEntryRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProsjektleder;
use crate::query::PeriodParams;
use crate::response::{CsvResponse, DataResponse};
use crate::state::AppState;

const EXPORT_HEADER: &[&str] = &["date", "employee", "project", "task", "hours", "description"];

/// Query parameters for `GET /timer` and `GET /timer/export`.
#[derive(Debug, Default, Deserialize)]
pub struct TimerQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub user_id: Option<DbId>,
    pub prosjekt_id: Option<DbId>,
}

/// POST /api/v1/timer
///
/// Log hours for the caller.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateTimeEntry>,
) -> AppResult<(StatusCode, Json<TimeEntry>)> {
    input.validate()?;
    validate_hours(input.hours)?;
    check_references(&state, auth.bedrift_id, input.prosjekt_id, input.oppgave_id).await?;

    let entry = TimeEntryRepo::create(&state.pool, auth.bedrift_id, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/timer
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TimerQuery>,
) -> AppResult<Json<DataResponse<Vec<TimeEntry>>>> {
    let filter = visible_filter(&auth, params)?;
    let data = TimeEntryRepo::list(&state.pool, auth.bedrift_id, &filter).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/timer/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimeEntry>,
) -> AppResult<Json<TimeEntry>> {
    input.validate()?;
    let existing = find_editable(&state, &auth, id).await?;

    let hours = input.hours.unwrap_or(existing.hours);
    validate_hours(hours)?;

    let prosjekt_id = input.prosjekt_id.unwrap_or(existing.prosjekt_id);
    let oppgave_id = match input.oppgave_id {
        Some(oppgave_id) => Some(oppgave_id),
        None if input.unassign_oppgave || prosjekt_id != existing.prosjekt_id => None,
        None => existing.oppgave_id,
    };
    check_references(&state, auth.bedrift_id, prosjekt_id, oppgave_id).await?;

    let changes = TimeEntryChanges {
        prosjekt_id,
        oppgave_id,
        work_date: input.work_date.unwrap_or(existing.work_date),
        hours,
        description: input.description.or(existing.description),
    };
    let entry =
        TimeEntryRepo::update(&state.pool, auth.bedrift_id, id, existing.user_id, &changes)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "TimeEntry",
                id,
            }))?;
    Ok(Json(entry))
}

/// DELETE /api/v1/timer/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_editable(&state, &auth, id).await?;
    if TimeEntryRepo::delete(&state.pool, auth.bedrift_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "TimeEntry",
            id,
        }))
    }
}

/// GET /api/v1/timer/summary
///
/// Hours per project and employee for the period.
pub async fn summary(
    State(state): State<AppState>,
    RequireProsjektleder(user): RequireProsjektleder,
    Query(params): Query<PeriodParams>,
) -> AppResult<Json<DataResponse<Vec<TimeSummaryRow>>>> {
    let (from, to) = resolve_period(params.from, params.to)?;
    let filter = TimeEntryFilter {
        from,
        to,
        user_id: None,
        prosjekt_id: None,
    };
    let data = TimeEntryRepo::summary(&state.pool, user.bedrift_id, &filter).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/timer/export
///
/// CSV export with the same visibility rules as the list.
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TimerQuery>,
) -> AppResult<CsvResponse> {
    let filter = visible_filter(&auth, params)?;
    let rows = TimeEntryRepo::export_rows(&state.pool, auth.bedrift_id, &filter).await?;

    let body = build_csv(
        EXPORT_HEADER,
        rows.into_iter().map(|r| {
            vec![
                r.work_date.to_string(),
                r.employee,
                r.project,
                r.task.unwrap_or_default(),
                format!("{:.2}", r.hours),
                r.description.unwrap_or_default(),
            ]
        }),
    );

    Ok(CsvResponse {
        file_name: format!("timer_{}_{}.csv", filter.from, filter.to),
        body,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fill in the default period and clamp the user filter to what the
/// caller may see.
fn visible_filter(auth: &AuthUser, params: TimerQuery) -> AppResult<TimeEntryFilter> {
    let (from, to) = resolve_period(params.from, params.to)?;
    let user_id = if auth.has_role(ROLE_PROSJEKTLEDER) {
        params.user_id
    } else {
        Some(auth.user_id)
    };
    Ok(TimeEntryFilter {
        from,
        to,
        user_id,
        prosjekt_id: params.prosjekt_id,
    })
}

fn resolve_period(from: Option<Date>, to: Option<Date>) -> AppResult<(Date, Date)> {
    let (default_from, default_to) = default_period(Utc::now().date_naive());
    let from = from.unwrap_or(default_from);
    let to = to.unwrap_or(default_to.max(from));
    validate_period(from, to)?;
    Ok((from, to))
}

/// The project must belong to the company and the task, if any, to the project.
async fn check_references(
    state: &AppState,
    bedrift_id: DbId,
    prosjekt_id: DbId,
    oppgave_id: Option<DbId>,
) -> AppResult<()> {
    if ProsjektRepo::find_by_id(&state.pool, bedrift_id, prosjekt_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Prosjekt {prosjekt_id} does not exist"
        ))));
    }

    if let Some(oppgave_id) = oppgave_id {
        let belongs = OppgaveRepo::find_by_id(&state.pool, bedrift_id, oppgave_id)
            .await?
            .is_some_and(|o| o.prosjekt_id == prosjekt_id);
        if !belongs {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Oppgave {oppgave_id} does not belong to prosjekt {prosjekt_id}"
            ))));
        }
    }
    Ok(())
}

/// Load an entry the caller may change: their own, or anyone's for leder+.
/// Other users' entries answer 404 to plain users.
async fn find_editable(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<TimeEntry> {
    let entry = TimeEntryRepo::find_by_id(&state.pool, auth.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimeEntry",
            id,
        }))?;

    if entry.user_id != auth.user_id && !auth.has_role(ROLE_LEDER) {
        return Err(if auth.has_role(ROLE_PROSJEKTLEDER) {
            AppError::Core(CoreError::Forbidden(
                "Only the owner or a leader can change this entry".into(),
            ))
        } else {
            AppError::Core(CoreError::NotFound {
                entity: "TimeEntry",
                id,
            })
        });
    }
    Ok(entry)
}
