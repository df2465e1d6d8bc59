//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::difficulty::next_session_parameters;
use crate::domain::Level;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for SessionError {
  fn into_response(self) -> Response {
    let status = match &self {
      SessionError::UnknownSession(_) | SessionError::UnknownIsland(_) => StatusCode::NOT_FOUND,
      SessionError::OutOfOrder { .. } => StatusCode::CONFLICT,
      SessionError::IslandLocked(_) => StatusCode::FORBIDDEN,
    };
    warn!(target: "talentia_backend", %status, error = %self, "Request rejected");
    (status, Json(ErrorOut { message: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_profile(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(current_profile(&state))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_profile_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(reset_profile(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session_parameters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(next_session_parameters(&current_profile(&state)))
}

#[instrument(level = "info", skip(state, body), fields(island = ?body.island, track = ?body.track))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionIn>,
) -> Result<Json<SessionOut>, SessionError> {
  let session = start_session(&state, body.island, body.track).await?;
  info!(target: "session", id = %session.id, "HTTP session served");
  Ok(Json(to_out(&session)))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, task_index = body.task_index))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, SessionError> {
  let outcome = submit_answer(&state, &body.session_id, body.task_index, &body.answer).await?;
  info!(target: "session", id = %body.session_id, correct = outcome.correct, completed = outcome.completed, "HTTP submit_answer evaluated");
  Ok(Json(outcome.into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_task(
  State(state): State<Arc<AppState>>,
  Query(q): Query<TaskQuery>,
) -> impl IntoResponse {
  let params = next_session_parameters(&current_profile(&state));
  let level = q.level.map(Level::clamped).unwrap_or(params.level);
  let modifier = q.modifier.unwrap_or(params.modifier);
  let task = preview_task(q.kind, level, modifier, q.hard_mode.unwrap_or(false));
  info!(target: "session", kind = %task.kind(), %level, %modifier, "HTTP task preview served");
  Json(task)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_achievements(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(achievements_out(&current_profile(&state)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_analytics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let recent = state.config.analytics.recent_errors_default;
  Json(analytics_out(&analytics_snapshot(&state), recent))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_recent_errors(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ErrorsQuery>,
) -> impl IntoResponse {
  let limit = q.limit.unwrap_or(state.config.analytics.recent_errors_default);
  Json(analytics_snapshot(&state).recent_errors(limit))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_analytics_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  reset_analytics(&state).await;
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(island_progress(&state))
}
