//! Interaction-state codec: converts between the raw value persisted in a
//! sheet slot and the judge-facing state for that question, per interaction
//! mode. Pure functions of (catalog entry, one field value); field mapping
//! is the layout's job, not the codec's.
//!
//! Penalty magnitudes are persisted non-negative. Readers take `|v|` so that
//! rows written by older tooling with negated deductions still decode.

use crate::domain::{FieldValue, InteractionMode, InteractionState, QuestionDefinition, Section};
use crate::error::ScoringError;

/// Derive the judge-facing state from the persisted slot value.
///
/// A numeric score outside its declared range decodes as unset rather than
/// being clamped into range; the judge has to re-enter it.
pub fn to_interaction_state(q: &QuestionDefinition, value: Option<&FieldValue>) -> InteractionState {
  match q.mode {
    InteractionMode::NumericScore { low, high } => {
      let score = match value {
        Some(FieldValue::Number(v)) if (low..=high).contains(v) => Some(*v),
        _ => None,
      };
      InteractionState::Score { value: score }
    }
    InteractionMode::Checkbox { point_value } => {
      let checked = match value {
        Some(FieldValue::Number(v)) => point_value != 0.0 && v.abs() == point_value,
        _ => false,
      };
      InteractionState::Checkbox { checked }
    }
    InteractionMode::StepCounter { point_value, .. } => {
      let count = match value {
        Some(FieldValue::Number(v)) if point_value != 0.0 => (v.abs() / point_value).round() as u32,
        // Degenerate catalog entry: treat the raw magnitude as the count.
        Some(FieldValue::Number(v)) => v.abs().round() as u32,
        _ => 0,
      };
      InteractionState::Counter { count }
    }
    InteractionMode::FreeText => {
      let text = match value {
        Some(FieldValue::Text(s)) => Some(s.clone()),
        _ => None,
      };
      InteractionState::Text { value: text }
    }
  }
}

/// Convert an interaction state back to the value to persist.
///
/// `Ok(None)` means "leave the slot unset". Out-of-bounds input is refused
/// with `OutOfRange`, never silently clamped; a state whose kind does not
/// match the question's mode is refused with `WrongKind`.
pub fn to_field_value(
  section: Section,
  q: &QuestionDefinition,
  state: &InteractionState,
) -> Result<Option<FieldValue>, ScoringError> {
  match (q.mode, state) {
    (InteractionMode::NumericScore { .. }, InteractionState::Score { value: None }) => Ok(None),
    (InteractionMode::NumericScore { low, high }, InteractionState::Score { value: Some(v) }) => {
      if (low..=high).contains(v) {
        Ok(Some(FieldValue::Number(*v)))
      } else {
        Err(ScoringError::OutOfRange { section, id: q.id, value: *v, low, high })
      }
    }
    (InteractionMode::Checkbox { point_value }, InteractionState::Checkbox { checked }) => {
      Ok(Some(FieldValue::Number(if *checked { point_value } else { 0.0 })))
    }
    (InteractionMode::StepCounter { point_value, lower, upper }, InteractionState::Counter { count }) => {
      if (lower..=upper).contains(count) {
        Ok(Some(FieldValue::Number(f64::from(*count) * point_value)))
      } else {
        Err(ScoringError::OutOfRange {
          section,
          id: q.id,
          value: f64::from(*count),
          low: f64::from(lower),
          high: f64::from(upper),
        })
      }
    }
    (InteractionMode::FreeText, InteractionState::Text { value: None }) => Ok(None),
    (InteractionMode::FreeText, InteractionState::Text { value: Some(s) }) => {
      // Empty comments are valid and submittable; comments are never required.
      Ok(Some(FieldValue::Text(s.clone())))
    }
    _ => Err(ScoringError::WrongKind { section, id: q.id }),
  }
}

/// Step a counter up or down, clamped to the question's `[lower, upper]`.
/// Non-counter questions pass the count through unchanged.
pub fn step_count(q: &QuestionDefinition, count: u32, delta: i64) -> u32 {
  match q.mode {
    InteractionMode::StepCounter { lower, upper, .. } => {
      let stepped = i64::from(count) + delta;
      stepped.clamp(i64::from(lower), i64::from(upper)) as u32
    }
    _ => count,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::QuestionDefinition as Q;

  const SECTION: Section = Section::RunPenalty;

  fn num(v: f64) -> Option<FieldValue> {
    Some(FieldValue::Number(v))
  }

  #[test]
  fn numeric_score_rejects_out_of_range_and_keeps_unset() {
    let q = Q::score(1, "range check", 10.0, 15.0);
    let err = to_field_value(SECTION, &q, &InteractionState::Score { value: Some(9.0) });
    assert!(matches!(err, Err(ScoringError::OutOfRange { value, .. }) if value == 9.0));

    let ok = to_field_value(SECTION, &q, &InteractionState::Score { value: Some(12.0) }).unwrap();
    assert_eq!(ok, num(12.0));
    assert_eq!(
      to_interaction_state(&q, ok.as_ref()),
      InteractionState::Score { value: Some(12.0) }
    );
  }

  #[test]
  fn numeric_score_decodes_out_of_range_as_unset() {
    let q = Q::score(1, "range check", 10.0, 15.0);
    let state = to_interaction_state(&q, num(9.0).as_ref());
    assert_eq!(state, InteractionState::Score { value: None });
  }

  #[test]
  fn checkbox_round_trips_both_stored_values() {
    let q = Q::checkbox(2, "box", 3.0);
    for stored in [0.0, 3.0] {
      let state = to_interaction_state(&q, num(stored).as_ref());
      let back = to_field_value(SECTION, &q, &state).unwrap();
      assert_eq!(back, num(stored));
    }
  }

  #[test]
  fn checkbox_with_zero_point_value_is_always_off() {
    let q = Q::checkbox(2, "box", 0.0);
    let state = to_interaction_state(&q, num(0.0).as_ref());
    assert_eq!(state, InteractionState::Checkbox { checked: false });
  }

  #[test]
  fn checkbox_decodes_negated_legacy_magnitude() {
    let q = Q::checkbox(2, "box", 3.0);
    let state = to_interaction_state(&q, num(-3.0).as_ref());
    assert_eq!(state, InteractionState::Checkbox { checked: true });
  }

  #[test]
  fn counter_round_trips_counts_within_bounds() {
    let q = Q::counter(3, "tally", 2.0, 0, 3);
    for count in 0..=3u32 {
      let stored = to_field_value(SECTION, &q, &InteractionState::Counter { count }).unwrap();
      assert_eq!(
        to_interaction_state(&q, stored.as_ref()),
        InteractionState::Counter { count }
      );
    }
  }

  #[test]
  fn counter_worked_example_from_the_rulebook() {
    // point value 2, bounds [0, 3]
    let q = Q::counter(3, "tally", 2.0, 0, 3);

    // stored 4 decodes as two occurrences
    assert_eq!(to_interaction_state(&q, num(4.0).as_ref()), InteractionState::Counter { count: 2 });

    // stepping 2 -> 3 persists 6
    let count = step_count(&q, 2, 1);
    assert_eq!(count, 3);
    let stored = to_field_value(SECTION, &q, &InteractionState::Counter { count }).unwrap();
    assert_eq!(stored, num(6.0));

    // another increment clamps at the upper bound
    assert_eq!(step_count(&q, 3, 1), 3);
  }

  #[test]
  fn counter_clamps_decrement_at_lower_bound() {
    let q = Q::counter(3, "tally", 2.0, 1, 5);
    assert_eq!(step_count(&q, 1, -1), 1);
    assert_eq!(step_count(&q, 3, -1), 2);
  }

  #[test]
  fn counter_with_zero_point_value_uses_raw_magnitude() {
    let q = Q::counter(3, "tally", 0.0, 0, 9);
    assert_eq!(to_interaction_state(&q, num(4.0).as_ref()), InteractionState::Counter { count: 4 });
  }

  #[test]
  fn counter_refuses_out_of_bounds_count_on_write() {
    let q = Q::counter(3, "tally", 2.0, 0, 3);
    let err = to_field_value(SECTION, &q, &InteractionState::Counter { count: 4 });
    assert!(matches!(err, Err(ScoringError::OutOfRange { .. })));
  }

  #[test]
  fn free_text_keeps_empty_comments() {
    let q = Q::comment(9, "comments");
    let stored = to_field_value(SECTION, &q, &InteractionState::Text { value: Some(String::new()) }).unwrap();
    assert_eq!(stored, Some(FieldValue::Text(String::new())));
  }

  #[test]
  fn mismatched_kind_is_refused() {
    let q = Q::score(1, "score", 0.0, 10.0);
    let err = to_field_value(SECTION, &q, &InteractionState::Checkbox { checked: true });
    assert!(matches!(err, Err(ScoringError::WrongKind { .. })));
  }
}
