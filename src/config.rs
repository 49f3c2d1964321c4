use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "IDENTITY_";

pub const DEFAULT_BACKEND_URL: &str = "https://localhost:5001";
pub const DEFAULT_FRONTEND_URL: &str = "https://localhost:5002";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| match Config::load() {
    Ok(cfg) => cfg,
    Err(e) => panic!("invalid configuration: {e}"),
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub cors: CorsConfig,
    pub contacts: ContactsConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    #[serde(alias = "development", alias = "dev")]
    Development,
    #[default]
    #[serde(alias = "production", alias = "prod")]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    pub environment: Environment,
    /// Identity store. The in-memory default lives as long as the process.
    pub database_url: String,
    /// At least 64 bytes; a random key is generated when unset.
    pub cookie_key: Option<String>,
    pub cookie_name: String,
    pub cookie_lifetime_days: i64,
    /// Drop the `Secure` cookie attribute for plain-http development.
    pub insecure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5001".to_string(),
            loglevel: "info".to_string(),
            environment: Environment::default(),
            database_url: "sqlite::memory:".to_string(),
            cookie_key: None,
            cookie_name: "Identity.Application".to_string(),
            cookie_lifetime_days: 14,
            insecure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub backend_url: Url,
    pub frontend_url: Url,
    /// When false every origin is accepted and the two URLs are informational.
    pub enforce_allow_list: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("valid default backend url"),
            frontend_url: Url::parse(DEFAULT_FRONTEND_URL).expect("valid default frontend url"),
            enforce_allow_list: false,
        }
    }
}

impl CorsConfig {
    /// Origins in `scheme://host[:port]` form, as browsers send them.
    pub fn allowed_origins(&self) -> Vec<String> {
        [&self.backend_url, &self.frontend_url]
            .into_iter()
            .map(|u| u.origin().ascii_serialization())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    pub database_url: String,
    pub seed_count: u32,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:contacts.db".to_string(),
            seed_count: 500,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().filter_map(|key| {
                if key.as_str().eq_ignore_ascii_case("BackendUrl") {
                    Some("cors.backend_url".into())
                } else if key.as_str().eq_ignore_ascii_case("FrontendUrl") {
                    Some("cors.frontend_url".into())
                } else {
                    None
                }
            }))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}
