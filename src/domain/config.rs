//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the Matrix connection, survey behaviour, message templates,
//! administrators and server scopes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::strings::templates;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub survey: SurveyConfig,
    /// Message templates keyed by id. Missing ids fall back to built-in text.
    #[serde(default)]
    pub messages: HashMap<String, String>,
    #[serde(default)]
    pub system: SystemConfig,
    /// Named server scopes grouping several rooms into one survey set.
    #[serde(default)]
    pub servers: BTreeMap<String, Vec<String>>,
}

/// Survey behaviour settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SurveyConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_reaction")]
    pub reaction: String,
    /// Answer window per question, in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_questions")]
    pub default_questions: Vec<String>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            reaction: default_reaction(),
            timeout: default_timeout(),
            data_dir: default_data_dir(),
            default_questions: default_questions(),
        }
    }
}

fn default_prefix() -> String {
    "!survey".to_string()
}

fn default_reaction() -> String {
    "📝".to_string()
}

fn default_timeout() -> u64 {
    300_000
}

fn default_data_dir() -> String {
    "data/surveys".to_string()
}

fn default_questions() -> Vec<String> {
    vec![
        "Question1".to_string(),
        "Question2".to_string(),
        "Question3".to_string(),
    ]
}

/// System-level settings for the bot.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default)]
    pub admin: Vec<String>,
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context(crate::strings::logs::CONFIG_PARSE_ERROR)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| crate::strings::logs::config_read_error(&path.display().to_string()))?;
        Self::from_yaml(&content)
    }

    /// Command prefix followed by the separating space, e.g. `"!survey "`.
    pub fn prefix_with_space(&self) -> String {
        format!("{} ", self.survey.prefix)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.survey.timeout)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.system
            .admin
            .iter()
            .any(|a| a.eq_ignore_ascii_case(user_id))
    }

    /// Server scope a room belongs to: the configured group listing it, else the room itself.
    pub fn server_for_room(&self, room_id: &str) -> String {
        self.servers
            .iter()
            .find(|(_, rooms)| rooms.iter().any(|r| r == room_id))
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| room_id.to_string())
    }

    /// Renders the template `id`, substituting `%s` placeholders in order.
    pub fn message(&self, id: &str, params: &[&str]) -> String {
        let template = self
            .messages
            .get(id)
            .map(String::as_str)
            .unwrap_or_else(|| templates::default_template(id));
        templates::format(template, params)
    }
}

/// Holds the live configuration; replaced wholesale on `reload`.
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Arc<AppConfig>>,
}

impl ConfigStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = AppConfig::from_file(&path)?;
        Ok(Self {
            path,
            current: RwLock::new(Arc::new(config)),
        })
    }

    #[cfg(test)]
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            path: PathBuf::new(),
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn current(&self) -> Arc<AppConfig> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Re-reads the file. On failure the previous configuration stays active.
    pub fn reload(&self) -> Result<()> {
        let config = AppConfig::from_file(&self.path)?;
        match self.current.write() {
            Ok(mut guard) => *guard = Arc::new(config),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(config),
        }
        Ok(())
    }
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig::from_yaml(
        r#"
services:
  matrix:
    username: surveybot
    password: secret
    homeserver: https://matrix.example.org
survey:
  timeout: 1000
system:
  admin: ["@admin:example.org"]
servers:
  community: ["!a:example.org", "!b:example.org"]
"#,
    )
    .expect("test config parses")
}
