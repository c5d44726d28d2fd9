use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BACKEND_URL: &str = "http://pc2-matricula-alb-2123051620.us-east-1.elb.amazonaws.com/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Always ends with `/` so endpoint paths join under it
    pub base_url: String,
    /// Key offered by `portal auth login` when none is given
    pub default_api_key: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("PORTAL_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORTAL_BACKEND_URL") {
            if !v.trim().is_empty() {
                self.backend.base_url = normalize_base_url(&v);
            }
        }
        if let Ok(v) = env::var("PORTAL_API_KEY") {
            let v = v.trim();
            self.backend.default_api_key = (!v.is_empty()).then(|| v.to_string());
        }
        if let Ok(v) = env::var("PORTAL_REQUEST_TIMEOUT_SECS") {
            self.backend.request_timeout_secs = v.parse().unwrap_or(self.backend.request_timeout_secs);
        }
        if let Ok(v) = env::var("PORTAL_CONFIG_DIR") {
            if !v.trim().is_empty() {
                self.storage.dir = PathBuf::from(v);
            }
        }
        if let Ok(v) = env::var("PORTAL_LOG") {
            self.logging.filter = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            backend: BackendConfig {
                base_url: DEFAULT_BACKEND_URL.to_string(),
                default_api_key: None,
                request_timeout_secs: 30,
            },
            storage: StorageConfig { dir: default_storage_dir() },
            logging: LoggingConfig { filter: "info".to_string() },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            backend: BackendConfig {
                base_url: DEFAULT_BACKEND_URL.to_string(),
                default_api_key: None,
                request_timeout_secs: 10,
            },
            storage: StorageConfig { dir: default_storage_dir() },
            logging: LoggingConfig { filter: "warn".to_string() },
        }
    }
}

impl BackendConfig {
    /// Backend pointing at `base_url` with development defaults otherwise
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            default_api_key: None,
            request_timeout_secs: 30,
        }
    }
}

fn default_storage_dir() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config").join("student-portal"),
        Err(_) => PathBuf::from(".student-portal"),
    }
}

/// Base URLs must end in a slash or `Url::join` drops the last segment
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

// Global config - read once by the binary; library types take config by reference
pub static CONFIG: Lazy<PortalConfig> = Lazy::new(PortalConfig::from_env);

pub fn config() -> &'static PortalConfig {
    &CONFIG
}
