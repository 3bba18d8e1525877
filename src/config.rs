use crate::auth::MAX_TOKEN_TTL_DAYS;
use crate::heuristic_config::HeuristicConfig;
use crate::scorer::EmailRiskScorer;
use crate::storage::history::DEFAULT_MAX_RECORDS_PER_USER;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-here";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub heuristics: HeuristicsConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7071".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub enabled: bool,
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: PathBuf::from("models/ml_model.json"),
            vectorizer_path: PathBuf::from("models/vectorizer.json"),
        }
    }
}

impl ModelConfig {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            enabled: true,
            model_path: dir.join("ml_model.json"),
            vectorizer_path: dir.join("vectorizer.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicsConfig {
    /// YAML file overriding the built-in keyword tables and thresholds.
    pub rules_file: Option<PathBuf>,
}

impl HeuristicsConfig {
    pub fn load(&self) -> crate::Result<HeuristicConfig> {
        match &self.rules_file {
            Some(path) => HeuristicConfig::load_from_file(path),
            None => Ok(HeuristicConfig::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub database_path: String,
    pub max_records_per_user: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "fake-email-detector.db".to_string(),
            max_records_per_user: DEFAULT_MAX_RECORDS_PER_USER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub demo_user: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_days: 7,
            demo_user: true,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Falls back to defaults when `path` does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn default_path() -> &'static str {
        "/etc/fake-email-detector.toml"
    }

    /// `JWT_SECRET_KEY` and `DETECTOR_DATABASE_PATH` win over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(secret) = lookup("JWT_SECRET_KEY").filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
        if let Some(path) = lookup("DETECTOR_DATABASE_PATH").filter(|s| !s.is_empty()) {
            self.storage.database_path = path;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid bind address '{}'", self.server.bind_address))?;

        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret must not be empty");
        }
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&self.auth.token_ttl_days) {
            anyhow::bail!(
                "auth.token_ttl_days must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_DAYS,
                self.auth.token_ttl_days
            );
        }
        if self.storage.max_records_per_user == 0 {
            anyhow::bail!("storage.max_records_per_user must be at least 1");
        }

        self.heuristics.load()?;
        Ok(())
    }

    /// Rule-based unless the model is enabled and both artifacts load.
    pub fn build_scorer(&self) -> crate::Result<EmailRiskScorer> {
        let heuristics = self.heuristics.load()?;
        if self.model.enabled {
            EmailRiskScorer::from_artifacts(
                heuristics,
                &self.model.model_path,
                &self.model.vectorizer_path,
            )
        } else {
            EmailRiskScorer::rule_based(heuristics)
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.token_ttl_days, 7);
        assert_eq!(config.storage.max_records_per_user, 50);
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind_address = \"0.0.0.0:8080\"\n\n[auth]\ndemo_user = false").unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert!(!config.auth.demo_user);
        assert_eq!(config.auth.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 80").unwrap();
        assert!(AppConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_generated_config_round_trips() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JWT_SECRET_KEY", "from-env"),
            ("DETECTOR_DATABASE_PATH", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.storage.database_path, "fake-email-detector.db");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not an address".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.token_ttl_days = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.token_ttl_days = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.token_ttl_days = 3650;
        assert!(config.validate().is_ok());

        let mut config = AppConfig::default();
        config.heuristics.rules_file = Some(PathBuf::from("/nonexistent/rules.yaml"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_in_dir() {
        let model = ModelConfig::in_dir(Path::new("/tmp/m"));
        assert_eq!(model.model_path, PathBuf::from("/tmp/m/ml_model.json"));
        assert_eq!(model.vectorizer_path, PathBuf::from("/tmp/m/vectorizer.json"));
    }
}
