use crate::cli::Args;
use crate::core::error::RelayError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Number of entries returned by the session history endpoint
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Provider selected by a request's `model_type` tag.
///
/// Serialized as the tag itself (`"OpenAI"`, `"Gemini"`), which is also what
/// gets persisted with each interaction. Config files may spell the keys in
/// lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    #[serde(alias = "openai")]
    OpenAI,
    #[serde(alias = "gemini")]
    Gemini,
}

impl ModelType {
    pub const ALL: [ModelType; 2] = [ModelType::OpenAI, ModelType::Gemini];

    /// Exact, case-sensitive match against the request tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "OpenAI" => Some(ModelType::OpenAI),
            "Gemini" => Some(ModelType::Gemini),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            ModelType::OpenAI => "OpenAI",
            ModelType::Gemini => "Gemini",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            ModelType::OpenAI => "OPENAI_API_KEY",
            ModelType::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorageBackend {
    #[default]
    #[serde(rename = "mongodb")]
    MongoDB,
    #[serde(rename = "memory")]
    Memory,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub provider_secs: u64,
    pub storage_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            provider_secs: 60,
            storage_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn provider(&self) -> Duration {
        Duration::from_secs(self.provider_secs)
    }

    pub fn storage(&self) -> Duration {
        Duration::from_secs(self.storage_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: HashMap<ModelType, ProviderConfig>,
    pub storage: StorageConfig,
    pub timeouts: TimeoutConfig,
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: HashMap::new(),
            storage: StorageConfig::default(),
            timeouts: TimeoutConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join(".genrelay").join("config.yaml")
    }

    /// Loads the YAML config. An explicit path must exist; the default one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Config, RelayError> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(RelayError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => path.to_path_buf(),
            None => Self::default_path(),
        };

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config = Self::from_yaml(&contents)
            .map_err(|e| RelayError::Config(format!("Parse {}: {}", path.display(), e)))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Config, RelayError> {
        Ok(serde_yml::from_str::<Config>(contents)?)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlays non-empty values found through `lookup` onto the loaded config.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for model_type in ModelType::ALL {
            if let Some(key) = non_empty(model_type.api_key_env()) {
                self.providers.entry(model_type).or_default().api_key = Some(key);
            }
        }

        if let Some(uri) = non_empty("MONGODB_URI") {
            self.storage.uri = Some(uri);
        }
        if let Some(database) = non_empty("MONGODB_DATABASE_NAME") {
            self.storage.database = Some(database);
        }
        if let Some(collection) = non_empty("MONGODB_SESSION_HISTORY_COLLECTION") {
            self.storage.collection = Some(collection);
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.history_limit == 0 {
            return Err(RelayError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }

        for (name, secs) in [
            ("timeouts.provider_secs", self.timeouts.provider_secs),
            ("timeouts.storage_secs", self.timeouts.storage_secs),
        ] {
            if secs == 0 {
                return Err(RelayError::Config(format!("{} must be at least 1", name)));
            }
        }

        if self.storage.backend == StorageBackend::MongoDB {
            let required = [
                ("storage.uri / MONGODB_URI", &self.storage.uri),
                ("storage.database / MONGODB_DATABASE_NAME", &self.storage.database),
                (
                    "storage.collection / MONGODB_SESSION_HISTORY_COLLECTION",
                    &self.storage.collection,
                ),
            ];
            for (name, value) in required {
                if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                    return Err(RelayError::Config(format!("{} is not set", name)));
                }
            }
        }

        Ok(())
    }

    pub fn provider(&self, model_type: ModelType) -> ProviderConfig {
        self.providers.get(&model_type).cloned().unwrap_or_default()
    }
}
