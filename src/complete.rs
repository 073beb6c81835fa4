//! Completion evaluation: whether a sheet may be submitted.
//!
//! Only numeric rubric scores gate submission. Penalty items default to zero
//! occurrences and always count as complete, and comments are optional. On
//! the championship composite this falls out naturally: both scored
//! sections (machine design, presentation) must be independently filled in,
//! while the penalty blocks can never hold a sheet back.

use serde::Serialize;

use crate::catalog::{LayoutEntry, SheetLayout};
use crate::domain::{FieldValue, InteractionMode, ScoreSheet, Section};

/// A required question that still blocks submission.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct MissingQuestion {
  pub section: Section,
  pub id: u8,
}

/// Result of one completion pass. Recomputed on every view/save so the UI
/// can keep its per-question indicator current.
#[derive(Clone, Debug, Serialize)]
pub struct CompletionReport {
  pub complete: bool,
  pub missing: Vec<MissingQuestion>,
}

/// Evaluate a sheet against its layout. Pure; no side effects.
pub fn completion(layout: &SheetLayout, sheet: &ScoreSheet) -> CompletionReport {
  let missing: Vec<MissingQuestion> = layout
    .entries()
    .iter()
    .filter(|e| !entry_complete(e, sheet))
    .map(|e| MissingQuestion { section: e.section, id: e.question.id })
    .collect();
  CompletionReport { complete: missing.is_empty(), missing }
}

pub fn is_complete(layout: &SheetLayout, sheet: &ScoreSheet) -> bool {
  layout.entries().iter().all(|e| entry_complete(e, sheet))
}

fn entry_complete(entry: &LayoutEntry, sheet: &ScoreSheet) -> bool {
  match entry.question.mode {
    // A score counts only when populated, in range, and not the 0 default
    // the persistence schema seeds new rows with.
    InteractionMode::NumericScore { low, high } => match sheet.value(entry.slot) {
      Some(FieldValue::Number(v)) => (low..=high).contains(v) && *v != 0.0,
      _ => false,
    },
    InteractionMode::Checkbox { .. } | InteractionMode::StepCounter { .. } => true,
    InteractionMode::FreeText => true,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalogs;
  use crate::domain::{FieldMap, FieldSlot, SheetType};

  fn sheet(sheet_type: SheetType) -> ScoreSheet {
    ScoreSheet { id: "s1".into(), sheet_type, is_submitted: false, fields: FieldMap::new() }
  }

  fn set(sheet: &mut ScoreSheet, slot: u8, v: f64) {
    sheet.fields.insert(FieldSlot::new(slot).unwrap(), FieldValue::Number(v));
  }

  #[test]
  fn empty_sheet_reports_every_scored_question_missing() {
    let catalogs = Catalogs::new();
    let layout = catalogs.layout(SheetType::Redesign);
    let report = completion(layout, &sheet(SheetType::Redesign));
    assert!(!report.complete);
    // Five scored questions; the comment never blocks.
    assert_eq!(report.missing.len(), 5);
  }

  #[test]
  fn filling_scores_moves_completeness_monotonically() {
    let catalogs = Catalogs::new();
    let layout = catalogs.layout(SheetType::Redesign);
    let mut s = sheet(SheetType::Redesign);

    let mut previous = completion(layout, &s).missing.len();
    for slot in 1..=5u8 {
      set(&mut s, slot, 4.0);
      let now = completion(layout, &s).missing.len();
      assert!(now < previous, "setting field{slot} must shrink the missing set");
      previous = now;
    }
    assert!(is_complete(layout, &s));
  }

  #[test]
  fn zero_default_score_does_not_count_as_filled() {
    let catalogs = Catalogs::new();
    let layout = catalogs.layout(SheetType::Redesign);
    let mut s = sheet(SheetType::Redesign);
    for slot in 1..=5u8 {
      set(&mut s, slot, 4.0);
    }
    set(&mut s, 2, 0.0);
    assert!(!is_complete(layout, &s));
  }

  #[test]
  fn penalty_sheets_are_complete_out_of_the_box() {
    let catalogs = Catalogs::new();
    for sheet_type in [SheetType::GeneralPenalty, SheetType::RunPenalty] {
      let layout = catalogs.layout(sheet_type);
      assert!(is_complete(layout, &sheet(sheet_type)));
    }
  }

  #[test]
  fn championship_needs_both_scored_sections_but_never_penalties() {
    let catalogs = Catalogs::new();
    let layout = catalogs.layout(SheetType::Championship);
    let mut s = sheet(SheetType::Championship);

    // Machine design scores live in fields 1-8.
    for slot in 1..=8u8 {
      set(&mut s, slot, 5.0);
    }
    let report = completion(layout, &s);
    assert!(!report.complete);
    assert!(report.missing.iter().all(|m| m.section == Section::Presentation));

    // Presentation scores live in fields 10-17; penalties stay untouched.
    for slot in 10..=17u8 {
      set(&mut s, slot, 5.0);
    }
    assert!(is_complete(layout, &s));
  }
}
