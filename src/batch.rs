//! Batch coordination: one judge, one sheet type, many teams.
//!
//! Loads, saves, and submits fan out one request per team concurrently and
//! await the lot. Teams without a sheet mapping are simply not part of the
//! batch; a failed write on one entry never blocks or rolls back the
//! others. The per-entry outcome is always reported, never collapsed into
//! a single pass/fail flag.

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::catalog::SheetLayout;
use crate::domain::{ScoreSheet, SheetType};
use crate::lifecycle::{save_draft, submit, Answer};
use crate::store::Backend;

/// One team's sheet inside a batch.
#[derive(Clone, Debug)]
pub struct BatchEntry {
  pub team_id: String,
  pub sheet: ScoreSheet,
}

/// One team's pending answers for a batch write.
#[derive(Clone, Debug)]
pub struct BatchJob {
  pub team_id: String,
  pub sheet: ScoreSheet,
  pub answers: Vec<Answer>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchFailure {
  pub team_id: String,
  pub error: String,
}

/// Per-entry outcome of a batch write. Partial success is expected and
/// non-fatal; callers surface `failed` to the judge.
#[derive(Clone, Debug, Serialize, Default)]
pub struct BatchReport {
  pub succeeded: Vec<String>,
  pub failed: Vec<BatchFailure>,
}

impl BatchReport {
  pub fn partial(&self) -> bool {
    !self.failed.is_empty()
  }
}

/// Fetch every team's sheet concurrently. Teams without a mapping (or whose
/// fetch fails) are dropped from the batch, not reported as errors; the
/// returned set is authoritative, not the requested `team_ids`.
#[instrument(level = "info", skip(store, team_ids), fields(%judge_id, %sheet_type, n_teams = team_ids.len()))]
pub async fn load_batch(
  store: &Backend,
  judge_id: &str,
  sheet_type: SheetType,
  team_ids: &[String],
) -> Vec<BatchEntry> {
  let lookups = team_ids.iter().map(|team_id| async move {
    let mapped = match store.sheet_mapping(judge_id, team_id, sheet_type).await {
      Ok(mapped) => mapped,
      Err(e) => {
        warn!(target: "scoring", %team_id, error = %e, "Mapping lookup failed; team dropped from batch");
        return None;
      }
    };
    let sheet_id = mapped?;
    match store.fetch(&sheet_id).await {
      Ok(sheet) => Some(BatchEntry { team_id: team_id.clone(), sheet }),
      Err(e) => {
        warn!(target: "scoring", %team_id, %sheet_id, error = %e, "Sheet fetch failed; team dropped from batch");
        None
      }
    }
  });

  let entries: Vec<BatchEntry> = join_all(lookups).await.into_iter().flatten().collect();
  info!(target: "scoring", %judge_id, %sheet_type, requested = team_ids.len(), resolved = entries.len(), "Batch loaded");
  entries
}

/// Draft-save every entry concurrently.
#[instrument(level = "info", skip(store, layout, jobs), fields(sheet_type = %layout.sheet_type(), n_jobs = jobs.len()))]
pub async fn save_batch(store: &Backend, layout: &SheetLayout, jobs: Vec<BatchJob>) -> BatchReport {
  let writes = jobs.into_iter().map(|job| async move {
    let outcome = save_draft(store, layout, &job.sheet, &job.answers).await;
    (job.team_id, outcome)
  });
  collect_report(join_all(writes).await, "Batch save finished")
}

/// Submit every entry concurrently, stamping `is_submitted` and the sheet
/// type through the single-sheet controller.
#[instrument(level = "info", skip(store, layout, jobs), fields(sheet_type = %layout.sheet_type(), n_jobs = jobs.len()))]
pub async fn submit_batch(store: &Backend, layout: &SheetLayout, jobs: Vec<BatchJob>) -> BatchReport {
  let writes = jobs.into_iter().map(|job| async move {
    let outcome = submit(store, layout, &job.sheet, &job.answers).await;
    (job.team_id, outcome)
  });
  collect_report(join_all(writes).await, "Batch submit finished")
}

fn collect_report(
  outcomes: Vec<(String, Result<ScoreSheet, crate::error::ScoringError>)>,
  what: &'static str,
) -> BatchReport {
  let mut report = BatchReport::default();
  for (team_id, outcome) in outcomes {
    match outcome {
      Ok(_) => report.succeeded.push(team_id),
      Err(e) => {
        warn!(target: "scoring", %team_id, error = %e, "Batch entry failed");
        report.failed.push(BatchFailure { team_id, error: e.to_string() });
      }
    }
  }
  info!(target: "scoring", ok = report.succeeded.len(), failed = report.failed.len(), "{what}");
  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalogs;
  use crate::domain::{InteractionState, Section};
  use crate::store::MemoryStore;

  fn teams(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
  }

  fn full_redesign() -> Vec<Answer> {
    (1..=5)
      .map(|id| Answer {
        section: Section::Redesign,
        id,
        state: InteractionState::Score { value: Some(4.0) },
      })
      .collect()
  }

  #[tokio::test]
  async fn load_batch_drops_unmapped_teams_silently() {
    let store = MemoryStore::new();
    store.assign("j1", "t1", SheetType::Redesign).await;
    store.assign("j1", "t3", SheetType::Redesign).await;
    let backend = Backend::Memory(store);

    let entries = load_batch(&backend, "j1", SheetType::Redesign, &teams(&["t1", "t2", "t3"])).await;
    let loaded: Vec<&str> = entries.iter().map(|e| e.team_id.as_str()).collect();
    assert_eq!(loaded, vec!["t1", "t3"]);
  }

  #[tokio::test]
  async fn load_batch_ignores_other_judges_assignments() {
    let store = MemoryStore::new();
    store.assign("j2", "t1", SheetType::Redesign).await;
    let backend = Backend::Memory(store);

    let entries = load_batch(&backend, "j1", SheetType::Redesign, &teams(&["t1"])).await;
    assert!(entries.is_empty());
  }

  #[tokio::test]
  async fn save_batch_reports_every_entry() {
    let catalogs = Catalogs::new();
    let layout = catalogs.layout(SheetType::Redesign);
    let store = MemoryStore::new();
    store.assign("j1", "t1", SheetType::Redesign).await;
    store.assign("j1", "t2", SheetType::Redesign).await;
    let backend = Backend::Memory(store);

    let entries = load_batch(&backend, "j1", SheetType::Redesign, &teams(&["t1", "t2"])).await;
    let jobs: Vec<BatchJob> = entries
      .into_iter()
      .map(|e| BatchJob { team_id: e.team_id, sheet: e.sheet, answers: full_redesign() })
      .collect();

    let report = save_batch(&backend, layout, jobs).await;
    assert_eq!(report.succeeded, vec!["t1".to_string(), "t2".to_string()]);
    assert!(!report.partial());
  }

  #[tokio::test]
  async fn submit_batch_surfaces_partial_failure_without_rollback() {
    let catalogs = Catalogs::new();
    let layout = catalogs.layout(SheetType::Redesign);
    let store = MemoryStore::new();
    store.assign("j1", "t1", SheetType::Redesign).await;
    store.assign("j1", "t2", SheetType::Redesign).await;
    let backend = Backend::Memory(store);

    let entries = load_batch(&backend, "j1", SheetType::Redesign, &teams(&["t1", "t2"])).await;

    // t2 is already submitted by the time the batch goes out.
    let t2 = entries.iter().find(|e| e.team_id == "t2").unwrap();
    submit(&backend, layout, &t2.sheet, &full_redesign()).await.unwrap();

    let jobs: Vec<BatchJob> = entries
      .into_iter()
      .map(|e| BatchJob { team_id: e.team_id, sheet: e.sheet, answers: full_redesign() })
      .collect();
    let report = submit_batch(&backend, layout, jobs).await;

    assert!(report.partial());
    assert_eq!(report.succeeded, vec!["t1".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].team_id, "t2");

    // t1's submit stuck despite t2's refusal.
    let reloaded = load_batch(&backend, "j1", SheetType::Redesign, &teams(&["t1"])).await;
    assert!(reloaded[0].sheet.is_submitted);
  }
}
