use crate::snowball::Parameters;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use std::fmt;

fn default_retain_decided() -> usize {
    4096
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub listener_ip: String,
    pub bootstrap_peers: Vec<String>,
    /// The node id as base58check; derived from `listener_ip` when missing.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub snowball: Parameters,
    /// How many decided questions are remembered for lagging peers.
    #[serde(default = "default_retain_decided")]
    pub retain_decided: usize,
}

const CONFIG_FILE_PATH: &str = "src/server/settings/Default.json";
const CONFIG_FILE_PREFIX: &str = "src/server/settings/";

#[derive(Clone, Debug, Deserialize)]
pub enum ENV {
    Testing,
    Development,
    Production,
}

impl fmt::Display for ENV {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ENV::Testing => write!(f, "Testing"),
            ENV::Production => write!(f, "Production"),
            ENV::Development => write!(f, "Development"),
        }
    }
}

impl From<&str> for ENV {
    fn from(env: &str) -> Self {
        match env {
            "Testing" => ENV::Testing,
            "Production" => ENV::Production,
            _ => ENV::Development,
        }
    }
}

impl Settings {
    /// Loads the default settings, overlaid with the settings of `RUN_ENV` (if present).
    pub fn new() -> Result<Self, ConfigError> {
        let env = ENV::from(std::env::var("RUN_ENV").unwrap_or_else(|_| "Development".into()).as_str());
        Self::load(env)
    }

    pub fn load(env: ENV) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("env", env.to_string())?
            .add_source(File::with_name(CONFIG_FILE_PATH))
            .add_source(File::with_name(&format!("{}{}", CONFIG_FILE_PREFIX, env)).required(false))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::time::Duration;

    fn from_json(json: &str) -> Result<Settings, ConfigError> {
        Config::builder().add_source(File::from_str(json, FileFormat::Json)).build()?.try_deserialize()
    }

    #[test]
    fn test_load_testing() {
        let settings = Settings::load(ENV::Testing).unwrap();
        assert_eq!(settings.snowball.sample(), 4);
        assert_eq!(settings.snowball.quorum(), 3);
        assert_eq!(settings.snowball.timeout(), Duration::from_millis(200));
    }

    #[test]
    fn test_production_falls_back_to_defaults() {
        let settings = Settings::load(ENV::Production).unwrap();
        assert_eq!(settings.snowball, Parameters::default());
        assert_eq!(settings.retain_decided, 4096);
        assert!(settings.id.is_none());
    }

    #[test]
    fn test_invalid_snowball_parameters_are_rejected() {
        let ok = r#"{
            "listener_ip": "127.0.0.1:1234",
            "bootstrap_peers": ["127.0.0.1:1235"],
            "snowball": { "alpha": 0.5, "sample": 2, "beta": 3, "timeout_ms": 100 }
        }"#;
        let settings = from_json(ok).unwrap();
        assert_eq!(settings.snowball.retries(), 0);
        assert_eq!(settings.snowball.interval(), Duration::from_millis(0));

        let bad = r#"{
            "listener_ip": "127.0.0.1:1234",
            "bootstrap_peers": [],
            "snowball": { "alpha": 1.5, "sample": 2, "beta": 3, "timeout_ms": 100 }
        }"#;
        assert!(from_json(bad).is_err());
    }
}
