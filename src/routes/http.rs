//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! scoring core; every refusal maps onto a status code here and nowhere else.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, instrument};

use crate::batch::{load_batch, save_batch, submit_batch, BatchJob, BatchReport};
use crate::domain::{ScoreSheet, SheetType};
use crate::error::ScoringError;
use crate::lifecycle::{save_draft, submit, Answer};
use crate::protocol::*;
use crate::state::AppState;

type Refusal = (StatusCode, Json<ErrorOut>);

fn refuse(e: ScoringError) -> Refusal {
    let status = match &e {
        ScoringError::OutOfRange { .. }
        | ScoringError::WrongKind { .. }
        | ScoringError::UnknownQuestion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ScoringError::AlreadySubmitted { .. } | ScoringError::Incomplete { .. } => {
            StatusCode::CONFLICT
        }
        ScoringError::NotFound => StatusCode::NOT_FOUND,
        ScoringError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ErrorOut { message: e.to_string() }))
}

/// Resolve the (judge, team, sheet type) mapping and fetch the record.
/// A missing mapping is a 404 on the single-sheet surface.
async fn resolve_sheet(
    state: &AppState,
    judge_id: &str,
    team_id: &str,
    sheet_type: SheetType,
) -> Result<ScoreSheet, ScoringError> {
    let sheet_id = state
        .backend
        .sheet_mapping(judge_id, team_id, sheet_type)
        .await?
        .ok_or(ScoringError::NotFound)?;
    state.backend.fetch(&sheet_id).await
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state), fields(%q.judge_id, %q.team_id, sheet_type = %q.sheet_type))]
pub async fn http_get_sheet(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SheetQuery>,
) -> Result<Json<SheetView>, Refusal> {
    let sheet = resolve_sheet(&state, &q.judge_id, &q.team_id, q.sheet_type)
        .await
        .map_err(refuse)?;
    let layout = state.catalogs.layout(q.sheet_type);
    Ok(Json(sheet_view(layout, &sheet)))
}

#[instrument(level = "info", skip(state, body), fields(%body.judge_id, %body.team_id, sheet_type = %body.sheet_type, n_answers = body.answers.len()))]
pub async fn http_save_sheet(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SheetWriteIn>,
) -> Result<Json<SheetView>, Refusal> {
    let sheet = resolve_sheet(&state, &body.judge_id, &body.team_id, body.sheet_type)
        .await
        .map_err(refuse)?;
    let layout = state.catalogs.layout(body.sheet_type);
    let saved = save_draft(&state.backend, layout, &sheet, &body.answers)
        .await
        .map_err(refuse)?;
    info!(target: "scoring", sheet_id = %saved.id, "HTTP draft saved");
    Ok(Json(sheet_view(layout, &saved)))
}

#[instrument(level = "info", skip(state, body), fields(%body.judge_id, %body.team_id, sheet_type = %body.sheet_type, n_answers = body.answers.len()))]
pub async fn http_submit_sheet(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SheetWriteIn>,
) -> Result<Json<SheetView>, Refusal> {
    let sheet = resolve_sheet(&state, &body.judge_id, &body.team_id, body.sheet_type)
        .await
        .map_err(refuse)?;
    let layout = state.catalogs.layout(body.sheet_type);
    let submitted = submit(&state.backend, layout, &sheet, &body.answers)
        .await
        .map_err(refuse)?;
    info!(target: "scoring", sheet_id = %submitted.id, "HTTP sheet submitted");
    Ok(Json(sheet_view(layout, &submitted)))
}

#[instrument(level = "info", skip(state), fields(%q.judge_id, sheet_type = %q.sheet_type))]
pub async fn http_get_batch(
    State(state): State<Arc<AppState>>,
    Query(q): Query<BatchQuery>,
) -> Result<Json<BatchOut>, Refusal> {
    let layout = state.catalogs.layout(q.sheet_type);
    let entries = load_batch(&state.backend, &q.judge_id, q.sheet_type, &q.teams()).await;
    Ok(Json(batch_out(layout, &entries)))
}

/// Rebuild batch jobs from the request body: only teams whose sheet
/// actually resolved get a write; the rest are silently excluded, matching
/// the batch-load contract.
async fn batch_jobs(state: &AppState, body: BatchWriteIn) -> Vec<BatchJob> {
    let mut answers_by_team: HashMap<String, Vec<Answer>> = body
        .teams
        .into_iter()
        .map(|t| (t.team_id, t.answers))
        .collect();
    let team_ids: Vec<String> = answers_by_team.keys().cloned().collect();

    load_batch(&state.backend, &body.judge_id, body.sheet_type, &team_ids)
        .await
        .into_iter()
        .map(|entry| {
            let answers = answers_by_team.remove(&entry.team_id).unwrap_or_default();
            BatchJob { team_id: entry.team_id, sheet: entry.sheet, answers }
        })
        .collect()
}

#[instrument(level = "info", skip(state, body), fields(%body.judge_id, sheet_type = %body.sheet_type, n_teams = body.teams.len()))]
pub async fn http_save_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchWriteIn>,
) -> Json<BatchReport> {
    let layout = state.catalogs.layout(body.sheet_type);
    let jobs = batch_jobs(&state, body).await;
    let report = save_batch(&state.backend, layout, jobs).await;
    Json(report)
}

#[instrument(level = "info", skip(state, body), fields(%body.judge_id, sheet_type = %body.sheet_type, n_teams = body.teams.len()))]
pub async fn http_submit_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchWriteIn>,
) -> Json<BatchReport> {
    let layout = state.catalogs.layout(body.sheet_type);
    let jobs = batch_jobs(&state, body).await;
    let report = submit_batch(&state.backend, layout, jobs).await;
    Json(report)
}
