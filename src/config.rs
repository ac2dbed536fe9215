use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::DigestError;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "FLIGHT_DIGEST_CONFIG";

/// Config file picked up from the working directory when `CONFIG_ENV` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "flight_digest.toml";

/// Runtime settings for one digest run.
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```toml
/// spreadsheet_path = "flights.xlsx"
///
/// [email]
/// recipient = "ops@example.com"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_path: PathBuf,
    pub sheet_name: String,
    pub status: StatusConfig,
    pub report: ReportConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub base_url: String,
    /// Request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Tera template overriding the built-in report layout.
    pub template: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    /// Name of the environment variable holding the SMTP password.
    pub password_env: String,
    /// Skip server certificate verification on STARTTLS. Insecure.
    pub accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            spreadsheet_path: PathBuf::from("flight_ids.xlsx"),
            sheet_name: "Sheet1".to_string(),
            status: StatusConfig::default(),
            report: ReportConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            base_url: "https://www.flightstats.com/v2/api-next/flight-tracker".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender: "flight-digest@example.com".to_string(),
            recipient: "flight-ops@example.com".to_string(),
            subject: "Flight Status".to_string(),
            password_env: "EMAIL_PASS".to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl StatusConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl EmailConfig {
    /// SMTP password read from the configured environment variable.
    /// Unset and empty both yield an empty string.
    pub fn password(&self) -> String {
        std::env::var(&self.password_env).unwrap_or_default()
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, DigestError> {
        toml::from_str(text).map_err(|e| DigestError::Config(e.to_string()))
    }

    /// Read a config file from disk.
    pub fn from_file(path: &Path) -> Result<Self, DigestError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DigestError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Resolve the config for this process: `$FLIGHT_DIGEST_CONFIG` if set,
    /// otherwise `flight_digest.toml` when present, otherwise defaults.
    pub fn load() -> Result<Self, DigestError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                log::info!("[config] Loading {}", path);
                return Self::from_file(Path::new(&path));
            }
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            log::info!("[config] Loading {}", DEFAULT_CONFIG_FILE);
            return Self::from_file(local);
        }

        log::info!("[config] No config file found, using defaults");
        Ok(Config::default())
    }
}
