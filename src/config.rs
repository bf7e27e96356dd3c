use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "kora.toml";

/// Deployment configuration from `kora.toml`. Site content and runtime
/// tunables live in the settings table; this file only carries what the
/// process needs before the database is open, plus secrets.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub functions: FunctionsConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Include internal error detail in API responses and logs.
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: "data/db/kora.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FunctionsConfig {
    /// Bearer credential scheduled-function callers must present. Empty
    /// disables the function endpoints.
    pub service_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: String,
    pub public_base_url: String,
    pub signing_key: String,
    pub signed_url_ttl_secs: i64,
    pub buckets: Vec<BucketConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            root: "data/storage".to_string(),
            public_base_url: "http://localhost:8000".to_string(),
            signing_key: String::new(),
            signed_url_ttl_secs: 3600,
            buckets: vec![
                BucketConfig::new("avatars", true),
                BucketConfig::new("site-assets", true),
                BucketConfig::new("player-videos", false),
                BucketConfig::new("documents", false),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketConfig {
    pub name: String,
    #[serde(default)]
    pub public: bool,
}

impl BucketConfig {
    pub fn new(name: &str, public: bool) -> Self {
        BucketConfig {
            name: name.to_string(),
            public,
        }
    }
}

impl AppConfig {
    /// Read `kora.toml` if present, then apply environment overrides.
    pub fn load() -> Result<Self, String> {
        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            log::warn!("{} not found, using built-in defaults", path.display());
            return Ok(AppConfig::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| format!("invalid {}: {}", CONFIG_FILE, e))
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("KORA_SERVICE_SECRET") {
            self.functions.service_secret = secret;
        }
        if let Some(key) = lookup("KORA_STORAGE_SIGNING_KEY") {
            self.storage.signing_key = key;
        }
        if let Some(path) = lookup("KORA_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(flag) = lookup("KORA_DEV_MODE") {
            self.server.dev_mode = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml("[server]\ndev_mode = true\n").unwrap();
        assert!(cfg.server.dev_mode);
        assert_eq!(cfg.database.path, "data/db/kora.db");
        assert_eq!(cfg.storage.signed_url_ttl_secs, 3600);
        assert!(cfg.storage.buckets.iter().any(|b| b.name == "avatars" && b.public));
        assert!(cfg.storage.buckets.iter().any(|b| b.name == "documents" && !b.public));
    }

    #[test]
    fn env_overrides_file() {
        let mut cfg = AppConfig::from_toml("[functions]\nservice_secret = \"file\"\n").unwrap();
        cfg.apply_env(|k| match k {
            "KORA_SERVICE_SECRET" => Some("env".to_string()),
            "KORA_DEV_MODE" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(cfg.functions.service_secret, "env");
        assert!(cfg.server.dev_mode);
    }

    #[test]
    fn bad_toml_is_reported() {
        assert!(AppConfig::from_toml("[server\n").is_err());
    }
}
