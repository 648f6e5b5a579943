//! Journal endpoints.

use axum::{
    Extension,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use dnevnik_upstream::Resource;
use serde::Deserialize;

use crate::auth::Session;
use crate::error::{Result, ServerError};
use crate::proxy::{self, Proxied};
use crate::state::AppState;

/// Query parameters for a subject journal.
///
/// `quarter` is kept raw so validation can report a precise message.
#[derive(Debug, Default, Deserialize)]
pub struct JournalQuery {
    pub quarter: Option<String>,
}

/// GET /journal
pub async fn journal_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Proxied> {
    proxy::serve(&state, &session, Resource::Journal).await
}

/// GET /journal/{subject}?quarter=N
///
/// Malformed path or query input is reported as a JSON 400 like any other
/// validation failure.
pub async fn journal_subject_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    WithRejection(Path(subject), _): WithRejection<Path<String>, ServerError>,
    WithRejection(Query(query), _): WithRejection<Query<JournalQuery>, ServerError>,
) -> Result<Proxied> {
    let resource = Resource::journal_subject(subject, query.quarter.as_deref())?;
    proxy::serve(&state, &session, resource).await
}
