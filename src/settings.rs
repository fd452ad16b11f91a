use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

pub const DB_FILE: &str = "tally.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub monthly_budget: f64,
    #[serde(default)]
    pub auto_sync: bool,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub sync_endpoint: Option<String>,
    #[serde(default)]
    pub ai_endpoint: Option<String>,
    #[serde(default)]
    pub billing_endpoint: Option<String>,
}

fn default_currency() -> String {
    crate::models::DEFAULT_CURRENCY.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            currency: default_currency(),
            monthly_budget: 0.0,
            auto_sync: false,
            user_id: String::new(),
            sync_endpoint: None,
            ai_endpoint: None,
            billing_endpoint: None,
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }

    /// Sync endpoint with the environment override applied. `None` means the
    /// ledger runs offline.
    pub fn sync_endpoint(&self) -> Option<String> {
        endpoint_from("TALLY_SYNC_ENDPOINT", self.sync_endpoint.as_deref())
    }

    pub fn ai_endpoint(&self) -> Option<String> {
        endpoint_from("TALLY_AI_ENDPOINT", self.ai_endpoint.as_deref())
    }

    pub fn billing_endpoint(&self) -> Option<String> {
        endpoint_from("TALLY_BILLING_ENDPOINT", self.billing_endpoint.as_deref())
    }
}

fn endpoint_from(env_key: &str, configured: Option<&str>) -> Option<String> {
    let value = match std::env::var(env_key) {
        Ok(v) => v,
        Err(_) => configured.unwrap_or_default().to_string(),
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tally")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
