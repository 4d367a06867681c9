//! Demo harness configuration, loaded from a TOML file with environment
//! variable overrides (spec §6 external config surface).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DemoError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub nodes_file: Option<PathBuf>,

    #[serde(default)]
    pub edges_file: Option<PathBuf>,

    #[serde(default)]
    pub plan: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            log_level: default_log_level(),
            nodes_file: None,
            edges_file: None,
            plan: None,
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DemoError::config(e.to_string()))
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    pub fn with_env_override(mut self) -> Self {
        if let Ok(level) = std::env::var("MLG_DEMO_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(plan) = std::env::var("MLG_DEMO_PLAN") {
            self.plan = Some(plan);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_info_log_level() {
        assert_eq!(DemoConfig::default().log_level, "info");
    }

    #[test]
    fn env_override_replaces_plan() {
        std::env::set_var("MLG_DEMO_PLAN", "Hs:[0.5]");
        let config = DemoConfig::default().with_env_override();
        assert_eq!(config.plan.as_deref(), Some("Hs:[0.5]"));
        std::env::remove_var("MLG_DEMO_PLAN");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let result = DemoConfig::load(Path::new("/nonexistent/mlg-demo.toml"));
        assert!(result.is_err());
    }
}
