//! Configuration for streamcat.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (STREAMCAT_CONFIG, STREAMCAT_SESSION_TIMEOUT)
//! 2. Config file (.streamcat/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - STREAMCAT_CONFIG, if set, names the file directly
//! - Otherwise searches current directory and parents for .streamcat/config.yaml
//! - Then falls back to ~/.streamcat/config.yaml

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::AccountPolicy;
use crate::domain::{AgeRating, NewUser, Plan};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_ENV: &str = "STREAMCAT_CONFIG";
const SESSION_TIMEOUT_ENV: &str = "STREAMCAT_SESSION_TIMEOUT";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub session: Option<SessionConfig>,
    #[serde(default)]
    pub admin: Option<AdminSeed>,
    #[serde(default)]
    pub demo: Option<DemoConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountsConfig {
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub min_password_len: Option<usize>,
    pub max_password_len: Option<usize>,
    pub default_plan: Option<Plan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub timeout_seconds: Option<u64>,
}

/// Administrator created at startup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    #[serde(default)]
    pub age_rating: Option<AgeRating>,
}

impl AdminSeed {
    pub fn to_request(&self) -> NewUser {
        NewUser::new(
            &self.name,
            &self.email,
            &self.password,
            self.age,
            self.age_rating.unwrap_or(AgeRating::Adult),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub seed_catalog: bool,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Registration rules
    pub accounts: AccountPolicy,
    /// Session settings
    pub session: SessionSettings,
    /// Bootstrap administrator (if configured)
    pub admin: Option<AdminSeed>,
    /// Preload the demo catalog
    pub seed_demo: bool,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub timeout_seconds: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 300, // 5 minutes of inactivity
        }
    }
}

impl SessionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            accounts: AccountPolicy::default(),
            session: SessionSettings::default(),
            admin: None,
            seed_demo: false,
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    /// Layer a parsed config file over the defaults
    pub fn from_file(file: ConfigFile, path: Option<PathBuf>) -> Result<Self> {
        let defaults = AccountPolicy::default();
        let accounts = AccountPolicy {
            min_age: file.accounts.min_age.unwrap_or(defaults.min_age),
            max_age: file.accounts.max_age.unwrap_or(defaults.max_age),
            min_password_len: file
                .accounts
                .min_password_len
                .unwrap_or(defaults.min_password_len),
            max_password_len: file
                .accounts
                .max_password_len
                .unwrap_or(defaults.max_password_len),
            default_plan: file.accounts.default_plan.unwrap_or(defaults.default_plan),
        };

        if accounts.min_age > accounts.max_age {
            anyhow::bail!(
                "accounts.min_age ({}) exceeds accounts.max_age ({})",
                accounts.min_age,
                accounts.max_age
            );
        }
        if accounts.min_password_len > accounts.max_password_len {
            anyhow::bail!(
                "accounts.min_password_len ({}) exceeds accounts.max_password_len ({})",
                accounts.min_password_len,
                accounts.max_password_len
            );
        }

        let session = SessionSettings {
            timeout_seconds: file
                .session
                .as_ref()
                .and_then(|s| s.timeout_seconds)
                .unwrap_or(SessionSettings::default().timeout_seconds),
        };

        Ok(Self {
            accounts,
            session,
            admin: file.admin,
            seed_demo: file.demo.map(|d| d.seed_catalog).unwrap_or(false),
            config_file: path,
        })
    }

    /// Apply a session timeout override given in seconds
    fn apply_session_override(&mut self, raw: &str) -> Result<()> {
        self.session.timeout_seconds = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {}", SESSION_TIMEOUT_ENV, raw))?;
        Ok(())
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(explicit));
    }

    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".streamcat").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::home_dir()
        .map(|home| home.join(".streamcat").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let mut config = match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            ResolvedConfig::from_file(file, Some(path))?
        }
        None => ResolvedConfig::default(),
    };

    if let Ok(raw) = std::env::var(SESSION_TIMEOUT_ENV) {
        config.apply_session_override(&raw)?;
    }

    Ok(config)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, body: &str) -> PathBuf {
        let dir = temp.path().join(".streamcat");
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = ResolvedConfig::default();

        assert_eq!(config.accounts.min_age, 13);
        assert_eq!(config.accounts.max_age, 120);
        assert_eq!(config.accounts.min_password_len, 6);
        assert_eq!(config.accounts.max_password_len, 32);
        assert_eq!(config.session.timeout(), Duration::from_secs(300));
        assert!(config.admin.is_none());
        assert!(!config.seed_demo);
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
version: "1.0"
accounts:
  min_age: 16
  default_plan: premium
session:
  timeout_seconds: 60
admin:
  name: Operator
  email: ops@example.com
  password: changeme1
  age: 35
demo:
  seed_catalog: true
"#,
        );

        let file = load_config_file(&path).unwrap();
        assert_eq!(file.version, "1.0");

        let config = ResolvedConfig::from_file(file, Some(path.clone())).unwrap();
        assert_eq!(config.accounts.min_age, 16);
        assert_eq!(config.accounts.max_age, 120);
        assert_eq!(config.accounts.default_plan, Plan::Premium);
        assert_eq!(config.session.timeout_seconds, 60);
        assert!(config.seed_demo);
        assert_eq!(config.config_file, Some(path));

        let admin = config.admin.unwrap();
        assert_eq!(admin.email, "ops@example.com");
        assert_eq!(admin.to_request().age_rating, AgeRating::Adult);
    }

    #[test]
    fn test_admin_age_rating_uses_printed_code() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
version: "1.0"
admin:
  name: Operator
  email: ops@example.com
  password: changeme1
  age: 16
  age_rating: teen-13+
"#,
        );

        let file = load_config_file(&path).unwrap();
        let admin = file.admin.unwrap();
        assert_eq!(admin.age_rating, Some(AgeRating::Teen));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
version: "1.0"
accounts:
  min_age: 50
  max_age: 20
"#,
        );

        let file = load_config_file(&path).unwrap();
        assert!(ResolvedConfig::from_file(file, None).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "version: [unclosed");
        assert!(load_config_file(&path).is_err());
    }

    #[test]
    fn test_session_override() {
        let mut config = ResolvedConfig::default();
        config.apply_session_override(" 15 ").unwrap();
        assert_eq!(config.session.timeout_seconds, 15);
        assert!(config.apply_session_override("soon").is_err());
    }
}
