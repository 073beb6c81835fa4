//! Draft → Submitted lifecycle for a single sheet.
//!
//! Both operations re-check the submitted flag on the fetched record before
//! writing; a disabled button in the UI is not trusted. Submit additionally
//! requires the completion evaluator to pass, and is terminal: there is no
//! sheet-level way back to draft (reopening a contest is an administrative
//! action elsewhere).

use serde::Deserialize;
use tracing::{info, instrument};

use crate::catalog::SheetLayout;
use crate::codec::to_field_value;
use crate::complete::is_complete;
use crate::domain::{FieldMap, InteractionState, ScoreSheet, Section};
use crate::error::ScoringError;
use crate::store::Backend;

/// One judge answer addressed by (section, question id).
#[derive(Clone, Debug, Deserialize)]
pub struct Answer {
  pub section: Section,
  pub id: u8,
  #[serde(flatten)]
  pub state: InteractionState,
}

/// Resolve and encode a set of answers into persisted field values.
///
/// All-or-nothing: any invalid answer refuses the whole set, so a failed
/// save leaves prior persisted state untouched. Unset answers are skipped
/// rather than written.
pub fn encode_answers(layout: &SheetLayout, answers: &[Answer]) -> Result<FieldMap, ScoringError> {
  let mut fields = FieldMap::new();
  for answer in answers {
    let entry = layout.entry(answer.section, answer.id)?;
    if let Some(value) = to_field_value(entry.section, &entry.question, &answer.state)? {
      fields.insert(entry.slot, value);
    }
  }
  Ok(fields)
}

/// Persist current answers without finalizing. Draft-only; idempotent for
/// the same input.
#[instrument(level = "info", skip(store, layout, sheet, answers), fields(sheet_id = %sheet.id, n_answers = answers.len()))]
pub async fn save_draft(
  store: &Backend,
  layout: &SheetLayout,
  sheet: &ScoreSheet,
  answers: &[Answer],
) -> Result<ScoreSheet, ScoringError> {
  if sheet.is_submitted {
    return Err(ScoringError::AlreadySubmitted { sheet_id: sheet.id.clone() });
  }
  let fields = encode_answers(layout, answers)?;
  store.save_fields(&sheet.id, &fields).await
}

/// Finalize: persist all fields with `is_submitted = true`. Allowed only
/// when the sheet (with these answers applied) is complete.
#[instrument(level = "info", skip(store, layout, sheet, answers), fields(sheet_id = %sheet.id, n_answers = answers.len()))]
pub async fn submit(
  store: &Backend,
  layout: &SheetLayout,
  sheet: &ScoreSheet,
  answers: &[Answer],
) -> Result<ScoreSheet, ScoringError> {
  if sheet.is_submitted {
    return Err(ScoringError::AlreadySubmitted { sheet_id: sheet.id.clone() });
  }

  let mut candidate = sheet.clone();
  for (slot, value) in encode_answers(layout, answers)? {
    candidate.fields.insert(slot, value);
  }
  if !is_complete(layout, &candidate) {
    return Err(ScoringError::Incomplete { sheet_id: sheet.id.clone() });
  }

  let submitted = store
    .submit(&candidate.id, &candidate.fields, layout.sheet_type())
    .await?;
  info!(target: "scoring", sheet_id = %submitted.id, sheet_type = %submitted.sheet_type, "Sheet finalized");
  Ok(submitted)
}
