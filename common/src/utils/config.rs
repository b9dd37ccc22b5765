use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// How content containing a banned term is handled.
///
/// Exactly one policy is active per process: `Reject` fails validation,
/// `Redact` accepts the message and masks the offending terms.
#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfanityPolicy {
    #[default]
    Reject,
    Redact,
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub surrealdb_address: String,
    pub surrealdb_username: String,
    pub surrealdb_password: String,
    pub surrealdb_namespace: String,
    pub surrealdb_database: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default)]
    pub profanity_policy: ProfanityPolicy,
    /// Comma-separated list of allowed CORS origins; any origin when unset.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_http_port() -> u16 {
    8000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            surrealdb_address: "mem://".to_string(),
            surrealdb_username: "root".to_string(),
            surrealdb_password: "root".to_string(),
            surrealdb_namespace: "chat".to_string(),
            surrealdb_database: "messages".to_string(),
            http_port: default_http_port(),
            profanity_policy: ProfanityPolicy::default(),
            cors_allowed_origins: None,
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
