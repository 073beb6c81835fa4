//! Static question catalogs per judging category, and the precomputed
//! field layouts that map each question to a physical sheet slot.
//!
//! Catalogs are fixed tables defined at process start. Layouts are derived
//! from them exactly once (in `Catalogs::new`) and shared read-only, so the
//! read path and the write path can never disagree about which slot a
//! question lives in. That single shared computation is what keeps the
//! championship "skip the retired run-penalty item" rule consistent.

use std::collections::HashMap;

use crate::domain::QuestionDefinition as Q;
use crate::domain::{FieldSlot, QuestionDefinition, Section, SheetType};
use crate::error::ScoringError;

/// Presentation rubric: eight scored questions plus a judge comment.
const PRESENTATION: &[Q] = &[
  Q::score(1, "Organization and flow", 0.0, 10.0),
  Q::score(2, "Content and technical knowledge", 0.0, 10.0),
  Q::score(3, "Delivery and poise", 0.0, 10.0),
  Q::score(4, "Quality of visual aids", 0.0, 10.0),
  Q::score(5, "Whole-team participation", 0.0, 5.0),
  Q::score(6, "Use of allotted time", 0.0, 5.0),
  Q::score(7, "Response to judges' questions", 0.0, 10.0),
  Q::score(8, "Overall effectiveness", 0.0, 15.0),
  Q::comment(9, "Judge comments"),
];

/// Engineering journal rubric.
const JOURNAL: &[Q] = &[
  Q::score(1, "Engineering process documented", 0.0, 15.0),
  Q::score(2, "Organization and completeness", 0.0, 10.0),
  Q::score(3, "Design iterations recorded", 0.0, 10.0),
  Q::score(4, "Sketches and drawings", 0.0, 10.0),
  Q::score(5, "Writing quality", 0.0, 5.0),
  Q::score(6, "Timeliness of entries", 0.0, 5.0),
  Q::comment(7, "Judge comments"),
];

/// Machine design interview rubric.
const MACHINE_DESIGN: &[Q] = &[
  Q::score(1, "Design rationale", 0.0, 10.0),
  Q::score(2, "Innovation and creativity", 0.0, 10.0),
  Q::score(3, "Quality of construction", 0.0, 10.0),
  Q::score(4, "Safety considerations", 0.0, 5.0),
  Q::score(5, "Effective use of materials", 0.0, 10.0),
  Q::score(6, "Manufacturability", 0.0, 10.0),
  Q::score(7, "Team understanding of the design", 0.0, 10.0),
  Q::score(8, "Game task capability", 0.0, 10.0),
  Q::comment(9, "Judge comments"),
];

/// Mid-season redesign rubric.
const REDESIGN: &[Q] = &[
  Q::score(1, "Weaknesses identified", 0.0, 10.0),
  Q::score(2, "Proposed improvements", 0.0, 10.0),
  Q::score(3, "Feasibility of the redesign", 0.0, 10.0),
  Q::score(4, "Expected performance gain", 0.0, 10.0),
  Q::score(5, "Presentation of the redesign", 0.0, 5.0),
  Q::comment(6, "Judge comments"),
];

/// General (non-run) penalty items.
const GENERAL_PENALTY: &[Q] = &[
  Q::checkbox(1, "Late to judging session", 5.0),
  Q::checkbox(2, "Unsportsmanlike conduct", 10.0),
  Q::checkbox(3, "Non-team adult assistance", 15.0),
  Q::checkbox(4, "Missing safety documentation", 5.0),
  Q::counter(5, "Out-of-spec material used", 5.0, 0, 4),
  Q::checkbox(6, "Notebook turned in late", 5.0),
  Q::checkbox(7, "Dress code violation", 2.0),
];

/// Per-run penalty items. Id 9 is a retired item kept so historic sheets
/// keep their numbering; it owns no field anywhere.
const RUN_PENALTY: &[Q] = &[
  Q::counter(1, "False start", 2.0, 0, 3),
  Q::checkbox(2, "Machine outside start box", 3.0),
  Q::counter(3, "Driver touched machine", 2.0, 0, 5),
  Q::counter(4, "Part left on field", 1.0, 0, 6),
  Q::counter(5, "Contact with opposing machine", 3.0, 0, 3),
  Q::checkbox(6, "Field damage", 10.0),
  Q::checkbox(7, "Extra team member in drive area", 2.0),
  Q::counter(8, "Delay of round", 2.0, 0, 3),
  Q::retired(9),
  Q::checkbox(10, "Coaching from the stands", 2.0),
];

/// A question placed in a concrete sheet layout.
#[derive(Clone, Copy, Debug)]
pub struct LayoutEntry {
  pub section: Section,
  pub question: QuestionDefinition,
  pub slot: FieldSlot,
}

/// Ordered slot assignment for one sheet type, plus a lookup index.
/// Placeholder catalog entries are excluded entirely.
#[derive(Debug)]
pub struct SheetLayout {
  sheet_type: SheetType,
  entries: Vec<LayoutEntry>,
  by_key: HashMap<(Section, u8), usize>,
}

impl SheetLayout {
  /// Identity mapping: question id `k` lives in `field k`.
  fn identity(sheet_type: SheetType, section: Section, catalog: &[Q]) -> Self {
    let mut layout = Self { sheet_type, entries: Vec::new(), by_key: HashMap::new() };
    for q in catalog {
      if q.placeholder {
        continue;
      }
      let slot = FieldSlot::new(q.id).expect("catalog id exceeds sheet slots");
      layout.push(section, *q, slot);
    }
    layout
  }

  /// Additive-offset mapping for the championship composite: each section's
  /// non-placeholder questions take the next free slot in order, so the
  /// physical run stays contiguous across the retired run-penalty item.
  fn packed(sheet_type: SheetType, sections: &[(Section, &[Q])]) -> Self {
    let mut layout = Self { sheet_type, entries: Vec::new(), by_key: HashMap::new() };
    let mut next = 1u8;
    for (section, catalog) in sections {
      for q in *catalog {
        if q.placeholder {
          continue;
        }
        let slot = FieldSlot::new(next).expect("composite layout exceeds sheet slots");
        layout.push(*section, *q, slot);
        next += 1;
      }
    }
    layout
  }

  fn push(&mut self, section: Section, question: QuestionDefinition, slot: FieldSlot) {
    self.by_key.insert((section, question.id), self.entries.len());
    self.entries.push(LayoutEntry { section, question, slot });
  }

  pub fn sheet_type(&self) -> SheetType {
    self.sheet_type
  }

  /// All mapped questions in display order.
  pub fn entries(&self) -> &[LayoutEntry] {
    &self.entries
  }

  pub fn entry(&self, section: Section, id: u8) -> Result<&LayoutEntry, ScoringError> {
    self
      .by_key
      .get(&(section, id))
      .map(|&i| &self.entries[i])
      .ok_or(ScoringError::UnknownQuestion { section, id })
  }

  /// Which physical slot holds this question's value.
  pub fn resolve(&self, section: Section, id: u8) -> Result<FieldSlot, ScoringError> {
    self.entry(section, id).map(|e| e.slot)
  }
}

/// All catalogs and layouts, built once at startup and injected by reference
/// wherever sheet values are read or written.
pub struct Catalogs {
  layouts: HashMap<SheetType, SheetLayout>,
}

impl Catalogs {
  pub fn new() -> Self {
    let mut layouts = HashMap::new();
    layouts.insert(
      SheetType::Presentation,
      SheetLayout::identity(SheetType::Presentation, Section::Presentation, PRESENTATION),
    );
    layouts.insert(
      SheetType::Journal,
      SheetLayout::identity(SheetType::Journal, Section::Journal, JOURNAL),
    );
    layouts.insert(
      SheetType::MachineDesign,
      SheetLayout::identity(SheetType::MachineDesign, Section::MachineDesign, MACHINE_DESIGN),
    );
    layouts.insert(
      SheetType::Redesign,
      SheetLayout::identity(SheetType::Redesign, Section::Redesign, REDESIGN),
    );
    layouts.insert(
      SheetType::GeneralPenalty,
      SheetLayout::identity(SheetType::GeneralPenalty, Section::GeneralPenalty, GENERAL_PENALTY),
    );
    layouts.insert(
      SheetType::RunPenalty,
      SheetLayout::identity(SheetType::RunPenalty, Section::RunPenalty, RUN_PENALTY),
    );
    layouts.insert(
      SheetType::Championship,
      SheetLayout::packed(
        SheetType::Championship,
        &[
          (Section::MachineDesign, MACHINE_DESIGN),
          (Section::Presentation, PRESENTATION),
          (Section::GeneralPenalty, GENERAL_PENALTY),
          (Section::RunPenalty, RUN_PENALTY),
        ],
      ),
    );
    Self { layouts }
  }

  pub fn layout(&self, sheet_type: SheetType) -> &SheetLayout {
    // Every variant is inserted above.
    &self.layouts[&sheet_type]
  }
}

impl Default for Catalogs {
  fn default() -> Self {
    Self::new()
  }
}
