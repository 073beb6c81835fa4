//! Minimal client for the remote scores API.
//!
//! The API owns the score-sheet rows; this client only speaks the six
//! operations the judging flow needs. Calls are instrumented and log ids,
//! statuses, and latencies; field contents are never logged, only counts.
//! Failures surface per operation as `Transport` (or the matching typed
//! refusal for 404/409) with no automatic retry.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::{FieldMap, ScoreSheet, SheetType};
use crate::error::ScoringError;
use crate::store::NewSheet;

#[derive(Clone)]
pub struct ScoresApi {
  client: reqwest::Client,
  pub base_url: String,
  token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappingDto {
  sheet_id: String,
}

#[derive(Serialize)]
struct SaveFieldsReq<'a> {
  fields: &'a FieldMap,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReq<'a> {
  fields: &'a FieldMap,
  sheet_type: SheetType,
  is_submitted: bool,
}

impl ScoresApi {
  /// Construct the client if SCORES_API_URL is set; otherwise return None
  /// and the caller falls back to the in-memory store.
  pub fn from_env(timeout_secs: u64) -> Option<Self> {
    let base_url = std::env::var("SCORES_API_URL").ok()?;
    let token = std::env::var("SCORES_API_TOKEN").ok();

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .build()
      .ok()?;

    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string(), token })
  }

  fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
    let url = format!("{}{}", self.base_url, path);
    let mut req = self
      .client
      .request(method, url)
      .header(USER_AGENT, "tally-backend/0.1")
      .header(CONTENT_TYPE, "application/json");
    if let Some(token) = &self.token {
      req = req.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    req
  }

  /// Map an HTTP failure to the taxonomy: 404 and 409 carry meaning, the
  /// rest is transport.
  async fn refuse(res: reqwest::Response, sheet_id: Option<&str>) -> ScoringError {
    let status = res.status();
    match status {
      StatusCode::NOT_FOUND => ScoringError::NotFound,
      StatusCode::CONFLICT => ScoringError::AlreadySubmitted {
        sheet_id: sheet_id.unwrap_or_default().to_string(),
      },
      _ => {
        let body = res.text().await.unwrap_or_default();
        let msg = extract_api_error(&body).unwrap_or(body);
        ScoringError::Transport(format!("HTTP {}: {}", status, msg))
      }
    }
  }

  #[instrument(level = "info", skip(self), fields(%judge_id, %team_id, %sheet_type))]
  pub async fn sheet_mapping(
    &self,
    judge_id: &str,
    team_id: &str,
    sheet_type: SheetType,
  ) -> Result<Option<String>, ScoringError> {
    let res = self
      .request(reqwest::Method::GET, "/api/v1/scoresheets/mapping")
      .query(&[
        ("judgeId", judge_id),
        ("teamId", team_id),
        ("sheetType", &sheet_type.to_string()),
      ])
      .send()
      .await
      .map_err(|e| ScoringError::Transport(e.to_string()))?;

    // 404 here is the normal "judge not yet assigned this team" answer.
    if res.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !res.status().is_success() {
      return Err(Self::refuse(res, None).await);
    }
    let dto: MappingDto = res.json().await.map_err(|e| ScoringError::Transport(e.to_string()))?;
    Ok(Some(dto.sheet_id))
  }

  #[instrument(level = "info", skip(self), fields(%sheet_id))]
  pub async fn fetch(&self, sheet_id: &str) -> Result<ScoreSheet, ScoringError> {
    let res = self
      .request(reqwest::Method::GET, &format!("/api/v1/scoresheets/{}", sheet_id))
      .send()
      .await
      .map_err(|e| ScoringError::Transport(e.to_string()))?;
    if !res.status().is_success() {
      return Err(Self::refuse(res, Some(sheet_id)).await);
    }
    res.json().await.map_err(|e| ScoringError::Transport(e.to_string()))
  }

  #[instrument(level = "info", skip(self, new), fields(sheet_type = %new.sheet_type))]
  pub async fn create(&self, new: NewSheet) -> Result<ScoreSheet, ScoringError> {
    let res = self
      .request(reqwest::Method::POST, "/api/v1/scoresheets")
      .json(&new)
      .send()
      .await
      .map_err(|e| ScoringError::Transport(e.to_string()))?;
    if !res.status().is_success() {
      return Err(Self::refuse(res, None).await);
    }
    let sheet: ScoreSheet = res.json().await.map_err(|e| ScoringError::Transport(e.to_string()))?;
    info!(target: "scoring", id = %sheet.id, "Score sheet created");
    Ok(sheet)
  }

  #[instrument(level = "info", skip(self, fields), fields(%sheet_id, n_fields = fields.len()))]
  pub async fn save_fields(
    &self,
    sheet_id: &str,
    fields: &FieldMap,
  ) -> Result<ScoreSheet, ScoringError> {
    let start = std::time::Instant::now();
    let res = self
      .request(reqwest::Method::PATCH, &format!("/api/v1/scoresheets/{}", sheet_id))
      .json(&SaveFieldsReq { fields })
      .send()
      .await
      .map_err(|e| ScoringError::Transport(e.to_string()))?;
    if !res.status().is_success() {
      return Err(Self::refuse(res, Some(sheet_id)).await);
    }
    let sheet: ScoreSheet = res.json().await.map_err(|e| ScoringError::Transport(e.to_string()))?;
    info!(target: "scoring", %sheet_id, elapsed = ?start.elapsed(), "Draft saved");
    Ok(sheet)
  }

  #[instrument(level = "info", skip(self, fields), fields(%sheet_id, %sheet_type, n_fields = fields.len()))]
  pub async fn submit(
    &self,
    sheet_id: &str,
    fields: &FieldMap,
    sheet_type: SheetType,
  ) -> Result<ScoreSheet, ScoringError> {
    let start = std::time::Instant::now();
    let res = self
      .request(reqwest::Method::POST, &format!("/api/v1/scoresheets/{}/submit", sheet_id))
      .json(&SubmitReq { fields, sheet_type, is_submitted: true })
      .send()
      .await
      .map_err(|e| ScoringError::Transport(e.to_string()))?;
    if !res.status().is_success() {
      return Err(Self::refuse(res, Some(sheet_id)).await);
    }
    let sheet: ScoreSheet = res.json().await.map_err(|e| ScoringError::Transport(e.to_string()))?;
    info!(target: "scoring", %sheet_id, elapsed = ?start.elapsed(), "Sheet submitted");
    Ok(sheet)
  }

  #[allow(dead_code)]
  #[instrument(level = "info", skip(self), fields(%sheet_id))]
  pub async fn delete(&self, sheet_id: &str) -> Result<(), ScoringError> {
    let res = self
      .request(reqwest::Method::DELETE, &format!("/api/v1/scoresheets/{}", sheet_id))
      .send()
      .await
      .map_err(|e| ScoringError::Transport(e.to_string()))?;
    if !res.status().is_success() {
      return Err(Self::refuse(res, Some(sheet_id)).await);
    }
    Ok(())
  }
}

/// Try to extract a clean error message from the API's error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
