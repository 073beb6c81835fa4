//! Domain models: sheet categories, question definitions, field slots,
//! score sheets, and the per-question interaction state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Generic field slots available on a persisted score sheet (`field1..field42`).
pub const MAX_FIELD_SLOTS: u8 = 42;

/// Which judging category a sheet belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SheetType {
  Presentation,
  Journal,
  MachineDesign,
  Redesign,
  GeneralPenalty,
  RunPenalty,
  /// Composite sheet: machine design + presentation + both penalty blocks
  /// packed into one 42-slot record.
  Championship,
}

impl fmt::Display for SheetType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      SheetType::Presentation => "presentation",
      SheetType::Journal => "journal",
      SheetType::MachineDesign => "machine_design",
      SheetType::Redesign => "redesign",
      SheetType::GeneralPenalty => "general_penalty",
      SheetType::RunPenalty => "run_penalty",
      SheetType::Championship => "championship",
    };
    f.write_str(s)
  }
}

/// Catalog section a question belongs to. For simple sheet types this matches
/// the sheet type; the championship composite mixes four sections.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
  Presentation,
  Journal,
  MachineDesign,
  Redesign,
  GeneralPenalty,
  RunPenalty,
}

impl fmt::Display for Section {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Section::Presentation => "presentation",
      Section::Journal => "journal",
      Section::MachineDesign => "machine_design",
      Section::Redesign => "redesign",
      Section::GeneralPenalty => "general_penalty",
      Section::RunPenalty => "run_penalty",
    };
    f.write_str(s)
  }
}

/// How the judge interacts with a question, plus its scoring parameters.
/// Penalty magnitudes (`point_value`) are stored non-negative; sign is a
/// presentation concern.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InteractionMode {
  /// Raw rubric score inside a closed range.
  NumericScore { low: f64, high: f64 },
  /// Single yes/no deduction worth `point_value` when checked.
  Checkbox { point_value: f64 },
  /// Occurrence counter; each occurrence is worth `point_value`, and the
  /// count is clamped to `[lower, upper]`.
  StepCounter { point_value: f64, lower: u32, upper: u32 },
  /// Judge comment. Always optional.
  FreeText,
}

/// Immutable catalog entry. Built once at startup (see `catalog`), never
/// mutated, shared read-only by every sheet of its category.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct QuestionDefinition {
  pub id: u8,
  pub prompt: &'static str,
  #[serde(flatten)]
  pub mode: InteractionMode,
  /// Retired catalog entry that owns no physical field. The championship
  /// layout skips it when packing slots; resolving it is always an error.
  pub placeholder: bool,
}

impl QuestionDefinition {
  pub const fn score(id: u8, prompt: &'static str, low: f64, high: f64) -> Self {
    Self { id, prompt, mode: InteractionMode::NumericScore { low, high }, placeholder: false }
  }

  pub const fn checkbox(id: u8, prompt: &'static str, point_value: f64) -> Self {
    Self { id, prompt, mode: InteractionMode::Checkbox { point_value }, placeholder: false }
  }

  pub const fn counter(id: u8, prompt: &'static str, point_value: f64, lower: u32, upper: u32) -> Self {
    Self { id, prompt, mode: InteractionMode::StepCounter { point_value, lower, upper }, placeholder: false }
  }

  pub const fn comment(id: u8, prompt: &'static str) -> Self {
    Self { id, prompt, mode: InteractionMode::FreeText, placeholder: false }
  }

  pub const fn retired(id: u8) -> Self {
    Self { id, prompt: "(retired)", mode: InteractionMode::FreeText, placeholder: true }
  }
}

/// One of the 42 generic slots of a persisted sheet. Serialized as the slot
/// name the persistence schema uses ("field7").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldSlot(u8);

impl FieldSlot {
  pub fn new(index: u8) -> Option<Self> {
    if (1..=MAX_FIELD_SLOTS).contains(&index) { Some(Self(index)) } else { None }
  }

  pub fn index(self) -> u8 {
    self.0
  }

  pub fn name(self) -> String {
    format!("field{}", self.0)
  }
}

impl fmt::Display for FieldSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "field{}", self.0)
  }
}

impl TryFrom<String> for FieldSlot {
  type Error = String;
  fn try_from(s: String) -> Result<Self, Self::Error> {
    let idx = s
      .strip_prefix("field")
      .and_then(|n| n.parse::<u8>().ok())
      .and_then(FieldSlot::new);
    idx.ok_or_else(|| format!("not a field slot: {s:?}"))
  }
}

impl From<FieldSlot> for String {
  fn from(slot: FieldSlot) -> String {
    slot.name()
  }
}

/// Raw persisted value of one slot: a number (score or penalty points,
/// already scaled) or a free-text comment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
  Number(f64),
  Text(String),
}

/// Field slots of one sheet. Unset slots are simply absent.
pub type FieldMap = BTreeMap<FieldSlot, FieldValue>;

/// One persisted record per (judge, team, sheet type). The persistence
/// collaborator is the system of record; this struct mirrors its row.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSheet {
  pub id: String,
  pub sheet_type: SheetType,
  /// Monotonic: once true, no field may change.
  pub is_submitted: bool,
  #[serde(default)]
  pub fields: FieldMap,
}

impl ScoreSheet {
  pub fn value(&self, slot: FieldSlot) -> Option<&FieldValue> {
    self.fields.get(&slot)
  }
}

/// Judge-facing view of a single question, derived from a sheet via the
/// codec and never persisted directly.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionState {
  Score { value: Option<f64> },
  Checkbox { checked: bool },
  Counter { count: u32 },
  Text { value: Option<String> },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn field_slot_names_round_trip() {
    let slot = FieldSlot::new(7).unwrap();
    assert_eq!(slot.name(), "field7");
    assert_eq!(FieldSlot::try_from("field7".to_string()).unwrap(), slot);
  }

  #[test]
  fn field_slot_rejects_out_of_range_and_garbage() {
    assert!(FieldSlot::new(0).is_none());
    assert!(FieldSlot::new(43).is_none());
    assert!(FieldSlot::try_from("field0".to_string()).is_err());
    assert!(FieldSlot::try_from("field43".to_string()).is_err());
    assert!(FieldSlot::try_from("comment".to_string()).is_err());
  }

  #[test]
  fn sheet_serializes_fields_by_slot_name() {
    let mut fields = FieldMap::new();
    fields.insert(FieldSlot::new(3).unwrap(), FieldValue::Number(12.0));
    fields.insert(FieldSlot::new(9).unwrap(), FieldValue::Text("solid run".into()));
    let sheet = ScoreSheet {
      id: "s1".into(),
      sheet_type: SheetType::Presentation,
      is_submitted: false,
      fields,
    };
    let json = serde_json::to_value(&sheet).unwrap();
    assert_eq!(json["fields"]["field3"], 12.0);
    assert_eq!(json["fields"]["field9"], "solid run");
    assert_eq!(json["sheetType"], "presentation");

    let back: ScoreSheet = serde_json::from_value(json).unwrap();
    assert_eq!(back.fields.len(), 2);
  }
}
