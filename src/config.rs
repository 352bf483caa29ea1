//! Configuration loader and validator for the publishing bridge.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub site: Site,
    pub admin: Admin,
    pub google: Google,
    pub database: Database,
}

/// Public site settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Site {
    /// Name of the Drive folder holding the published documents.
    pub folder_name: String,
    pub bind: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            folder_name: String::new(),
            bind: "127.0.0.1:8080".into(),
        }
    }
}

/// Credentials for the gated admin view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Admin {
    pub username: String,
    pub password: String,
}

/// Google service account settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Google {
    /// Path to the service account JSON key.
    pub service_account_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Database {
    pub url: String,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/posts.db".into(),
        }
    }
}

impl Config {
    /// Overlay environment variables on top of file values. `lookup` is
    /// `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = v;
            }
        };
        set(&mut self.site.folder_name, "FOLDER_NAME");
        set(&mut self.site.bind, "BIND_ADDR");
        set(&mut self.admin.username, "ADMIN_USERNAME");
        set(&mut self.admin.password, "ADMIN_PASSWORD");
        set(&mut self.google.service_account_key, "GOOGLE_SERVICE_ACCOUNT_KEY");
        set(&mut self.database.url, "DATABASE_URL");
    }
}

/// Load configuration from a YAML file, overlay the process environment and
/// validate the result.
/// - If `path` is None, uses `config.yaml` in the current working directory.
/// - A missing file is not an error; the environment alone must then be
///   complete.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)?
    } else {
        Config::default()
    };
    cfg.apply_overrides(|key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.site.folder_name.trim().is_empty() {
        return Err(ConfigError::Invalid("site.folder_name must be non-empty"));
    }
    if cfg.site.bind.trim().is_empty() {
        return Err(ConfigError::Invalid("site.bind must be non-empty"));
    }
    if cfg.admin.username.trim().is_empty() {
        return Err(ConfigError::Invalid("admin.username must be non-empty"));
    }
    if cfg.admin.password.is_empty() {
        return Err(ConfigError::Invalid("admin.password must be non-empty"));
    }
    if cfg.google.service_account_key.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "google.service_account_key must be non-empty",
        ));
    }
    if cfg.database.url.trim().is_empty() {
        return Err(ConfigError::Invalid("database.url must be non-empty"));
    }
    Ok(())
}

/// Example YAML shipped with the README and used by tests.
pub fn example() -> &'static str {
    r#"site:
  folder_name: "My Site"
  bind: "127.0.0.1:8080"

admin:
  username: "admin"
  password: "change-me"

google:
  service_account_key: "./service-account.json"

database:
  url: "sqlite://./data/posts.db"
"#
}
