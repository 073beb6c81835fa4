//! Application state: the immutable question catalogs plus the persistence
//! backend, built once at startup and shared by every handler.

use tracing::{info, instrument, warn};

use crate::catalog::Catalogs;
use crate::client::ScoresApi;
use crate::config::{load_config_from_env, JudgingConfig};
use crate::domain::SheetType;
use crate::store::{Backend, MemoryStore};

pub struct AppState {
    pub catalogs: Catalogs,
    pub backend: Backend,
    pub contest: String,
}

impl AppState {
    /// Build state from env: load config, build catalogs, pick the backend
    /// (remote scores API when SCORES_API_URL is set, in-memory otherwise),
    /// and seed the roster into the in-memory store.
    #[instrument(level = "info", skip_all)]
    pub async fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_else(JudgingConfig::default);
        let catalogs = Catalogs::new();

        // Startup inventory: questions mapped per sheet category.
        for sheet_type in [
            SheetType::Presentation,
            SheetType::Journal,
            SheetType::MachineDesign,
            SheetType::Redesign,
            SheetType::GeneralPenalty,
            SheetType::RunPenalty,
            SheetType::Championship,
        ] {
            let layout = catalogs.layout(sheet_type);
            info!(target: "scoring", %sheet_type, questions = layout.entries().len(), "Catalog loaded");
        }

        let backend = match ScoresApi::from_env(cfg.persistence.timeout_secs) {
            Some(api) => {
                info!(target: "tally_backend", base_url = %api.base_url, "Remote scores API enabled.");
                Backend::Remote(api)
            }
            None => {
                let store = MemoryStore::new();
                if cfg.roster.is_empty() {
                    warn!(target: "tally_backend", "No SCORES_API_URL and empty roster; in-memory store starts with no assignments.");
                }
                for assignment in &cfg.roster {
                    for sheet_type in &assignment.sheet_types {
                        store.assign(&assignment.judge, &assignment.team, *sheet_type).await;
                    }
                }
                info!(target: "tally_backend", assignments = cfg.roster.len(), "Remote scores API disabled (no SCORES_API_URL). Using in-memory store.");
                Backend::Memory(store)
            }
        };

        Self { catalogs, backend, contest: cfg.contest.name }
    }
}
