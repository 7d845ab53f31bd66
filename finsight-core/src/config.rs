//! Configuration management
//!
//! Explicit, immutable configuration constructed once and passed to the
//! components that need it. There is no ambient or static mutable
//! configuration anywhere in the workspace.

use crate::error::{ErrorContext, FinsightError, FinsightResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the FinSight client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinsightConfig {
    /// Backend API connection settings
    pub api: ApiConfig,
    /// Chat session settings
    pub chat: ChatSettings,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Backend API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend API server
    pub base_url: String,
    /// Timeout budget for interactive operations, in seconds
    pub interactive_timeout_secs: u64,
    /// Timeout budget for long-running operations (uploads, agentic chat), in seconds
    pub heavy_timeout_secs: u64,
    /// User agent string sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            interactive_timeout_secs: 30,
            heavy_timeout_secs: 120,
            user_agent: format!("finsight/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Chat session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Maximum number of messages retained in the session history
    pub max_history_messages: usize,
    /// Default number of results requested from document search
    pub search_result_limit: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_history_messages: 50,
            search_result_limit: 5,
        }
    }
}

impl Default for FinsightConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            chat: ChatSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FinsightConfig {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("finsight")
            .join("config.toml")
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> FinsightResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| FinsightError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: FinsightConfig =
            toml::from_str(&content).map_err(|e| FinsightError::Config {
                message: format!("Failed to parse config: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("parse_toml")
                    .with_suggestion("Check TOML syntax in config file"),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> FinsightResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| FinsightError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| FinsightError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> FinsightResult<()> {
        url::Url::parse(&self.api.base_url).map_err(|e| FinsightError::Config {
            message: format!("Invalid base URL '{}': {}", self.api.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Set api.base_url to an absolute http(s) URL"),
        })?;

        if self.api.interactive_timeout_secs == 0 || self.api.heavy_timeout_secs == 0 {
            return Err(FinsightError::Config {
                message: "Timeout budgets must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.*_timeout_secs to positive values"),
            });
        }

        if self.api.heavy_timeout_secs < self.api.interactive_timeout_secs {
            return Err(FinsightError::Config {
                message: "Heavy timeout must be at least the interactive timeout".to_string(),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        if self.chat.max_history_messages < 2 {
            return Err(FinsightError::Config {
                message: "Chat history must retain at least 2 messages".to_string(),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        Ok(())
    }
}
