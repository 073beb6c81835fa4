//! Loading contest configuration (metadata, persistence tuning, and the
//! judging roster used to seed the in-memory store) from TOML.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::SheetType;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct JudgingConfig {
  #[serde(default)]
  pub contest: ContestCfg,
  #[serde(default)]
  pub persistence: PersistenceCfg,
  /// Judge/team assignments. Only consulted when running against the
  /// in-memory store; the remote API owns assignments otherwise.
  #[serde(default)]
  pub roster: Vec<AssignmentCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContestCfg {
  pub name: String,
}

impl Default for ContestCfg {
  fn default() -> Self {
    Self { name: "unnamed contest".into() }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PersistenceCfg {
  /// Per-request timeout for the remote scores API.
  pub timeout_secs: u64,
}

impl Default for PersistenceCfg {
  fn default() -> Self {
    Self { timeout_secs: 20 }
  }
}

/// One judge assigned one team for a set of sheet categories.
#[derive(Clone, Debug, Deserialize)]
pub struct AssignmentCfg {
  pub judge: String,
  pub team: String,
  pub sheet_types: Vec<SheetType>,
}

/// Attempt to load `JudgingConfig` from JUDGING_CONFIG_PATH. On any
/// parsing/IO error, returns None and the service runs on defaults.
pub fn load_config_from_env() -> Option<JudgingConfig> {
  let path = std::env::var("JUDGING_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<JudgingConfig>(&s) {
      Ok(cfg) => {
        info!(target: "tally_backend", %path, contest = %cfg.contest.name, assignments = cfg.roster.len(), "Loaded judging config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "tally_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "tally_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn roster_entries_parse_sheet_types() {
    let toml = r#"
      [contest]
      name = "fall classic"

      [[roster]]
      judge = "j1"
      team = "t1"
      sheet_types = ["presentation", "machine_design"]
    "#;
    let cfg: JudgingConfig = toml::from_str(toml).unwrap();
    assert_eq!(cfg.contest.name, "fall classic");
    assert_eq!(cfg.roster.len(), 1);
    assert_eq!(cfg.roster[0].sheet_types, vec![SheetType::Presentation, SheetType::MachineDesign]);
    assert_eq!(cfg.persistence.timeout_secs, 20);
  }
}
