//! Public request/response structs for the HTTP endpoints (serde ready).
//! Keep this small and stable so the judging frontend can evolve
//! independently of the core.

use serde::{Deserialize, Serialize};

use crate::batch::BatchEntry;
use crate::catalog::SheetLayout;
use crate::codec::to_interaction_state;
use crate::complete::{completion, CompletionReport};
use crate::domain::{InteractionMode, InteractionState, ScoreSheet, Section, SheetType};
use crate::lifecycle::Answer;

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

/// Identifies one sheet: who is judging which team in which category.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetQuery {
    pub judge_id: String,
    pub team_id: String,
    pub sheet_type: SheetType,
}

/// Body for single-sheet save/submit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetWriteIn {
    pub judge_id: String,
    pub team_id: String,
    pub sheet_type: SheetType,
    pub answers: Vec<Answer>,
}

/// One question rendered for the judge: catalog metadata plus the current
/// interaction state decoded from the sheet.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub section: Section,
    pub id: u8,
    pub prompt: &'static str,
    pub slot: String,
    #[serde(flatten)]
    pub mode: InteractionMode,
    pub state: InteractionState,
}

/// Full judge-facing rendering of one sheet.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetView {
    pub sheet_id: String,
    pub sheet_type: SheetType,
    pub is_submitted: bool,
    pub completion: CompletionReport,
    pub questions: Vec<QuestionView>,
}

/// Decode every mapped question of a sheet into its interaction state and
/// attach the completion report. Recomputed on every request; the persisted
/// record stays the sole source of truth.
pub fn sheet_view(layout: &SheetLayout, sheet: &ScoreSheet) -> SheetView {
    let questions = layout
        .entries()
        .iter()
        .map(|entry| QuestionView {
            section: entry.section,
            id: entry.question.id,
            prompt: entry.question.prompt,
            slot: entry.slot.name(),
            mode: entry.question.mode,
            state: to_interaction_state(&entry.question, sheet.value(entry.slot)),
        })
        .collect();

    SheetView {
        sheet_id: sheet.id.clone(),
        sheet_type: sheet.sheet_type,
        is_submitted: sheet.is_submitted,
        completion: completion(layout, sheet),
        questions,
    }
}

/// Batch load query; `team_ids` is comma-separated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuery {
    pub judge_id: String,
    pub sheet_type: SheetType,
    pub team_ids: String,
}

impl BatchQuery {
    pub fn teams(&self) -> Vec<String> {
        self.team_ids
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSheetView {
    pub team_id: String,
    #[serde(flatten)]
    pub view: SheetView,
}

/// Batch load response. The team set here is authoritative; requested teams
/// without a resolvable sheet are simply absent.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOut {
    pub sheet_type: SheetType,
    pub teams: Vec<TeamSheetView>,
}

pub fn batch_out(layout: &SheetLayout, entries: &[BatchEntry]) -> BatchOut {
    BatchOut {
        sheet_type: layout.sheet_type(),
        teams: entries
            .iter()
            .map(|e| TeamSheetView { team_id: e.team_id.clone(), view: sheet_view(layout, &e.sheet) })
            .collect(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAnswersIn {
    pub team_id: String,
    pub answers: Vec<Answer>,
}

/// Body for batch save/submit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteIn {
    pub judge_id: String,
    pub sheet_type: SheetType,
    pub teams: Vec<TeamAnswersIn>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalogs;
    use crate::domain::{FieldMap, FieldSlot, FieldValue};

    #[test]
    fn sheet_view_decodes_states_and_completion_together() {
        let catalogs = Catalogs::new();
        let layout = catalogs.layout(SheetType::Journal);
        let mut fields = FieldMap::new();
        fields.insert(FieldSlot::new(1).unwrap(), FieldValue::Number(12.0));
        let sheet = ScoreSheet {
            id: "s1".into(),
            sheet_type: SheetType::Journal,
            is_submitted: false,
            fields,
        };

        let view = sheet_view(layout, &sheet);
        assert_eq!(view.questions.len(), 7);
        assert_eq!(view.questions[0].state, InteractionState::Score { value: Some(12.0) });
        assert!(!view.completion.complete);
        assert_eq!(view.completion.missing.len(), 5);
    }

    #[test]
    fn batch_query_splits_and_trims_team_ids() {
        let q = BatchQuery {
            judge_id: "j1".into(),
            sheet_type: SheetType::Journal,
            team_ids: "t1, t2,,t3".into(),
        };
        assert_eq!(q.teams(), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn answers_deserialize_with_flattened_state() {
        let json = r#"{"section":"journal","id":2,"kind":"score","value":8.0}"#;
        let answer: Answer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.id, 2);
        assert_eq!(answer.state, InteractionState::Score { value: Some(8.0) });
    }
}
