//! Configuration file support for Calicraft.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/calicraft/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub workout: WorkoutConfig,

    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Replaces the bundled exercise catalogue when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalogue_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalogue_path: None,
        }
    }
}

/// Local generator defaults
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutConfig {
    #[serde(default = "default_count")]
    pub count: usize,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
        }
    }
}

/// Remote planner settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_count")]
    pub number_of_exercises: usize,

    #[serde(default = "default_min_difficulty")]
    pub min_difficulty: u8,

    #[serde(default = "default_max_difficulty")]
    pub max_difficulty: u8,

    #[serde(default = "default_true")]
    pub gate_by_skills: bool,

    #[serde(default = "default_true")]
    pub use_llm: bool,

    #[serde(default = "default_session_minutes")]
    pub session_minutes: Option<u32>,

    /// Sent as the goal when no focus skill is selected
    #[serde(default = "default_goal")]
    pub default_goal: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            number_of_exercises: default_count(),
            min_difficulty: default_min_difficulty(),
            max_difficulty: default_max_difficulty(),
            gate_by_skills: true,
            use_llm: true,
            session_minutes: default_session_minutes(),
            default_goal: default_goal(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("calicraft")
}

fn default_count() -> usize {
    8
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_min_difficulty() -> u8 {
    1
}

fn default_max_difficulty() -> u8 {
    10
}

fn default_true() -> bool {
    true
}

fn default_session_minutes() -> Option<u32> {
    Some(45)
}

fn default_goal() -> String {
    "Balanced, fun session with variety".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("calicraft").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let planner = &self.planner;
        if planner.min_difficulty > planner.max_difficulty {
            return Err(Error::Config(format!(
                "planner.min_difficulty ({}) exceeds planner.max_difficulty ({})",
                planner.min_difficulty, planner.max_difficulty
            )));
        }
        if planner.base_url.trim().is_empty() {
            return Err(Error::Config("planner.base_url is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workout.count, 8);
        assert_eq!(config.planner.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.planner.session_minutes, Some(45));
        assert!(config.planner.gate_by_skills);
        assert!(config.data.data_dir.ends_with("calicraft"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[planner]
base_url = "http://planner.local:9000"
max_difficulty = 6
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.planner.base_url, "http://planner.local:9000");
        assert_eq!(config.planner.max_difficulty, 6);
        assert_eq!(config.planner.min_difficulty, 1); // default
        assert_eq!(config.workout.count, 8); // default
        assert!(config.data.catalogue_path.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.workout.count = 5;
        config.data.catalogue_path = Some(temp_dir.path().join("exercises.json"));
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_rejects_inverted_difficulty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[planner]\nmin_difficulty = 8\nmax_difficulty = 3\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_empty_base_url() {
        let mut config = Config::default();
        config.planner.base_url = "  ".into();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[workout\ncount = 3").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }
}
