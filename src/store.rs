//! Persistence seam: either the remote scores API or an in-memory store.
//!
//! The backend is picked once at startup (remote when SCORES_API_URL is set,
//! in-memory otherwise) and every sheet read/write goes through it. The
//! in-memory store keeps the service usable without the remote collaborator
//! and is what the async tests run against.
//!
//! Discipline is last-write-wins per field set; there is no optimistic
//! concurrency token and no retry at this layer.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::client::ScoresApi;
use crate::domain::{FieldMap, ScoreSheet, SheetType};
use crate::error::ScoringError;

/// Partial record sent to `create`: everything but the id, which the store
/// mints.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSheet {
    pub sheet_type: SheetType,
    #[serde(default)]
    pub fields: FieldMap,
}

/// Which persistence collaborator this process talks to.
pub enum Backend {
    Remote(ScoresApi),
    Memory(MemoryStore),
}

impl Backend {
    /// Resolve the sheet id for (judge, team, sheet type), if one has been
    /// assigned. `Ok(None)` is the normal "no mapping yet" case.
    pub async fn sheet_mapping(
        &self,
        judge_id: &str,
        team_id: &str,
        sheet_type: SheetType,
    ) -> Result<Option<String>, ScoringError> {
        match self {
            Backend::Remote(api) => api.sheet_mapping(judge_id, team_id, sheet_type).await,
            Backend::Memory(mem) => mem.sheet_mapping(judge_id, team_id, sheet_type).await,
        }
    }

    pub async fn fetch(&self, sheet_id: &str) -> Result<ScoreSheet, ScoringError> {
        match self {
            Backend::Remote(api) => api.fetch(sheet_id).await,
            Backend::Memory(mem) => mem.fetch(sheet_id).await,
        }
    }

    #[allow(dead_code)]
    pub async fn create(&self, new: NewSheet) -> Result<ScoreSheet, ScoringError> {
        match self {
            Backend::Remote(api) => api.create(new).await,
            Backend::Memory(mem) => mem.create(new).await,
        }
    }

    /// Draft save: merge the given fields into the record. Refused by the
    /// store once the sheet is submitted.
    pub async fn save_fields(
        &self,
        sheet_id: &str,
        fields: &FieldMap,
    ) -> Result<ScoreSheet, ScoringError> {
        match self {
            Backend::Remote(api) => api.save_fields(sheet_id, fields).await,
            Backend::Memory(mem) => mem.save_fields(sheet_id, fields).await,
        }
    }

    /// Finalizing write: full field set, `is_submitted = true`, sheet type
    /// stamped. Refused by the store once the sheet is submitted.
    pub async fn submit(
        &self,
        sheet_id: &str,
        fields: &FieldMap,
        sheet_type: SheetType,
    ) -> Result<ScoreSheet, ScoringError> {
        match self {
            Backend::Remote(api) => api.submit(sheet_id, fields, sheet_type).await,
            Backend::Memory(mem) => mem.submit(sheet_id, fields, sheet_type).await,
        }
    }

    /// Administrative; never invoked by the judging flow.
    #[allow(dead_code)]
    pub async fn delete(&self, sheet_id: &str) -> Result<(), ScoringError> {
        match self {
            Backend::Remote(api) => api.delete(sheet_id).await,
            Backend::Memory(mem) => mem.delete(sheet_id).await,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Backend::Remote(_) => "remote",
            Backend::Memory(_) => "memory",
        }
    }
}

/// In-memory sheet store: RwLock'd maps, same contract as the remote API.
#[derive(Clone, Default)]
pub struct MemoryStore {
    sheets: Arc<RwLock<HashMap<String, ScoreSheet>>>,
    mappings: Arc<RwLock<HashMap<(String, String, SheetType), String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a sheet to (judge, team, sheet type), creating an empty draft.
    /// Idempotent: an existing mapping returns the existing sheet. This is
    /// what the external mapping service does when a judge is assigned a
    /// team; here it is driven by the TOML roster (and by tests).
    #[instrument(level = "debug", skip(self))]
    pub async fn assign(
        &self,
        judge_id: &str,
        team_id: &str,
        sheet_type: SheetType,
    ) -> ScoreSheet {
        let key = (judge_id.to_string(), team_id.to_string(), sheet_type);
        if let Some(id) = self.mappings.read().await.get(&key).cloned() {
            if let Some(sheet) = self.sheets.read().await.get(&id).cloned() {
                return sheet;
            }
        }

        let sheet = ScoreSheet {
            id: Uuid::new_v4().to_string(),
            sheet_type,
            is_submitted: false,
            fields: FieldMap::new(),
        };
        self.sheets.write().await.insert(sheet.id.clone(), sheet.clone());
        self.mappings.write().await.insert(key, sheet.id.clone());
        sheet
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn sheet_mapping(
        &self,
        judge_id: &str,
        team_id: &str,
        sheet_type: SheetType,
    ) -> Result<Option<String>, ScoringError> {
        let key = (judge_id.to_string(), team_id.to_string(), sheet_type);
        Ok(self.mappings.read().await.get(&key).cloned())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, sheet_id: &str) -> Result<ScoreSheet, ScoringError> {
        self.sheets
            .read()
            .await
            .get(sheet_id)
            .cloned()
            .ok_or(ScoringError::NotFound)
    }

    #[instrument(level = "debug", skip(self, new))]
    pub async fn create(&self, new: NewSheet) -> Result<ScoreSheet, ScoringError> {
        let sheet = ScoreSheet {
            id: Uuid::new_v4().to_string(),
            sheet_type: new.sheet_type,
            is_submitted: false,
            fields: new.fields,
        };
        self.sheets.write().await.insert(sheet.id.clone(), sheet.clone());
        Ok(sheet)
    }

    #[instrument(level = "debug", skip(self, fields), fields(n_fields = fields.len()))]
    pub async fn save_fields(
        &self,
        sheet_id: &str,
        fields: &FieldMap,
    ) -> Result<ScoreSheet, ScoringError> {
        let mut sheets = self.sheets.write().await;
        let sheet = sheets.get_mut(sheet_id).ok_or(ScoringError::NotFound)?;
        if sheet.is_submitted {
            return Err(ScoringError::AlreadySubmitted { sheet_id: sheet_id.to_string() });
        }
        for (slot, value) in fields {
            sheet.fields.insert(*slot, value.clone());
        }
        Ok(sheet.clone())
    }

    #[instrument(level = "debug", skip(self, fields), fields(n_fields = fields.len()))]
    pub async fn submit(
        &self,
        sheet_id: &str,
        fields: &FieldMap,
        sheet_type: SheetType,
    ) -> Result<ScoreSheet, ScoringError> {
        let mut sheets = self.sheets.write().await;
        let sheet = sheets.get_mut(sheet_id).ok_or(ScoringError::NotFound)?;
        if sheet.is_submitted {
            return Err(ScoringError::AlreadySubmitted { sheet_id: sheet_id.to_string() });
        }
        sheet.fields = fields.clone();
        sheet.sheet_type = sheet_type;
        sheet.is_submitted = true;
        Ok(sheet.clone())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, sheet_id: &str) -> Result<(), ScoringError> {
        let removed = self.sheets.write().await.remove(sheet_id);
        let mut mappings = self.mappings.write().await;
        mappings.retain(|_, id| id != sheet_id);
        removed.map(|_| ()).ok_or(ScoringError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldSlot, FieldValue};

    fn one_field(slot: u8, v: f64) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(FieldSlot::new(slot).unwrap(), FieldValue::Number(v));
        fields
    }

    #[tokio::test]
    async fn assign_is_idempotent() {
        let store = MemoryStore::new();
        let a = store.assign("j1", "t1", SheetType::Journal).await;
        let b = store.assign("j1", "t1", SheetType::Journal).await;
        assert_eq!(a.id, b.id);

        let mapped = store.sheet_mapping("j1", "t1", SheetType::Journal).await.unwrap();
        assert_eq!(mapped.as_deref(), Some(a.id.as_str()));
    }

    #[tokio::test]
    async fn unmapped_lookup_is_none_not_an_error() {
        let store = MemoryStore::new();
        let mapped = store.sheet_mapping("j1", "t9", SheetType::Journal).await.unwrap();
        assert!(mapped.is_none());
    }

    #[tokio::test]
    async fn save_merges_and_submit_locks() {
        let store = MemoryStore::new();
        let sheet = store.assign("j1", "t1", SheetType::Journal).await;

        store.save_fields(&sheet.id, &one_field(1, 10.0)).await.unwrap();
        let saved = store.save_fields(&sheet.id, &one_field(2, 8.0)).await.unwrap();
        assert_eq!(saved.fields.len(), 2);

        let submitted = store.submit(&sheet.id, &saved.fields, SheetType::Journal).await.unwrap();
        assert!(submitted.is_submitted);

        let refused = store.save_fields(&sheet.id, &one_field(3, 6.0)).await;
        assert!(matches!(refused, Err(ScoringError::AlreadySubmitted { .. })));
        let refused = store.submit(&sheet.id, &saved.fields, SheetType::Journal).await;
        assert!(matches!(refused, Err(ScoringError::AlreadySubmitted { .. })));

        // Persisted state stays locked and intact.
        let fetched = store.fetch(&sheet.id).await.unwrap();
        assert!(fetched.is_submitted);
        assert_eq!(fetched.fields.len(), 2);
    }

    #[tokio::test]
    async fn delete_drops_sheet_and_mapping() {
        let store = MemoryStore::new();
        let sheet = store.assign("j1", "t1", SheetType::Journal).await;
        store.delete(&sheet.id).await.unwrap();
        assert!(matches!(store.fetch(&sheet.id).await, Err(ScoringError::NotFound)));
        let mapped = store.sheet_mapping("j1", "t1", SheetType::Journal).await.unwrap();
        assert!(mapped.is_none());
    }
}
