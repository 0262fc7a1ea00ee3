use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Client configuration.
///
/// Loaded in layers: built-in defaults, then an optional YAML file, then
/// environment variables prefixed with `USER_ADMIN_`
/// (e.g. `USER_ADMIN_BASE_URL=http://api:8000`). Only variables naming a
/// field are read; other `USER_ADMIN_*` variables are ignored.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Origin every relative request URL is resolved against.
    pub base_url: String,
    /// Transport timeout for a whole request, in seconds.
    pub timeout_secs: u64,
    /// Key the bearer token is persisted under.
    pub token_key: String,
    /// File backing the persisted token store (optional).
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 15,
            token_key: "access_token".to_string(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `USER_ADMIN_*` environment variables.
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(ClientConfig::default()))
            .merge(env())
            .extract()
    }

    /// Defaults, then the YAML file at `path` (skipped if missing), then env.
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(ClientConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(env())
            .extract()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const ENV_PREFIX: &str = "USER_ADMIN_";
const ENV_KEYS: &[&str] = &["base_url", "timeout_secs", "token_key", "token_file"];

fn env() -> Env {
    Env::prefixed(ENV_PREFIX).only(ENV_KEYS)
}
