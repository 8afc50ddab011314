//! Job scheduler status routes.
//!
//! A minimal consumer of `agenda_core::jobs`: exposes the Processor's
//! status snapshot (spec's "Status snapshot" interface, §6) as JSON. The
//! core itself has no wire protocol; this route is just a thin read of
//! `JobProcessor::status`.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::state::AppState;
use agenda_core::jobs::ProcessorStatus;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub full_details: bool,
}

/// GET /admin/jobs/status?full_details=
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Json<ProcessorStatus> {
    Json(state.jobs.status(query.full_details))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/jobs/status", get(get_status))
}
