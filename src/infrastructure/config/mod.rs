use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::error::{AppError, Result};
use crate::domain::review_session::SessionLimits;
use crate::domain::table::TablePreparationConfig;

pub const ENV_PREFIX: &str = "RFM_REVIEW_";
pub const CONFIG_PATH_ENV: &str = "RFM_REVIEW_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "rfm_review.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Presentation of the review grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub hide_index: bool,
    pub full_width: bool,
    pub height_px: u32,
    pub opinion_label: String,
    pub opinion_help: String,
    pub opinion_width: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hide_index: true,
            full_width: true,
            height_px: 600,
            opinion_label: "Your Opinion".to_string(),
            opinion_help: "Do you agree or disagree with the RFM analysis for this customer?"
                .to_string(),
            opinion_width: "medium".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub source_csv: PathBuf,
    pub output_dir: PathBuf,
    pub page_title: String,
    pub name_label: String,
    pub table: TablePreparationConfig,
    pub editor: EditorConfig,
    pub sessions: SessionLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            source_csv: PathBuf::from(
                "data/processed/01.0-frosa-customer-transactions-data-bank-rfm-analysis.csv",
            ),
            output_dir: PathBuf::from("data/user_output"),
            page_title: "Valuable clients - RFM Analysis".to_string(),
            name_label: "Enter your name 👇".to_string(),
            table: TablePreparationConfig::default(),
            editor: EditorConfig::default(),
            sessions: SessionLimits::default(),
        }
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Defaults, then the TOML file, then `RFM_REVIEW_*` environment variables.
    pub fn load() -> Result<AppConfig> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = Self::figment(&config_path).extract::<AppConfig>().map_err(|e| {
            AppError::ConfigError(format!("Failed to load configuration: {}", e))
        })?;
        Self::validate(&config)?;

        info!(
            config_file = %config_path.display(),
            source_csv = %config.source_csv.display(),
            output_dir = %config.output_dir.display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn figment(config_path: &std::path::Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["config"])
                    .split("__"),
            )
    }

    pub fn validate(config: &AppConfig) -> Result<()> {
        config
            .table
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid table config: {}", e)))?;
        if config.editor.height_px == 0 {
            return Err(AppError::ConfigError(
                "editor.height_px must be > 0".to_string(),
            ));
        }
        if config.sessions.max_sessions == 0 || config.sessions.idle_timeout_minutes == 0 {
            return Err(AppError::ConfigError(
                "sessions.max_sessions and sessions.idle_timeout_minutes must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
