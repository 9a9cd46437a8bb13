//! Configuration model loaded from external sources.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Settings for the matching worker.
///
/// Values come from an optional YAML file and are overridden by `APP__*`
/// environment variables, e.g. `APP__SMTP__PASSWORD`.
pub struct ServerConfig {
    pub database_url: String,
    pub zmq_address: String,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub captioner: CaptionerConfig,
    pub smtp: SmtpConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    /// Where uploaded images of unmatched found items are kept.
    pub unmatched_dir: PathBuf,
    /// Where images are moved once their item is matched.
    pub matched_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Directory holding downloaded model weights.
    pub cache_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CaptionerConfig {
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

fn default_max_length() -> usize {
    128
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_smtp_port() -> u16 {
    587
}

impl ServerConfig {
    /// Loads the configuration from `path` (extension optional) and the environment.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", "lost_and_found.db")?
            .set_default("zmq_address", "tcp://127.0.0.1:5555")?
            .set_default("storage.unmatched_dir", "unmatched_found_items")?
            .set_default("storage.matched_dir", "matched_found_items")?
            .set_default("embedding.model", "all-minilm-l6-v2")?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::ServerConfig;

    #[test]
    fn load_reads_yaml_and_applies_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp config file");
        writeln!(
            file,
            "captioner:\n  endpoint: http://127.0.0.1:8080/caption\nsmtp:\n  host: smtp.example.com\n  username: api\n  password: secret\n  sender: hello@example.com\n"
        )
        .expect("write config");

        let config = ServerConfig::load(file.path().to_str().expect("utf-8 path"))
            .expect("config should load");

        assert_eq!(config.database_url, "lost_and_found.db");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.embedding.max_length, 128);
        assert_eq!(
            config.storage.matched_dir,
            std::path::PathBuf::from("matched_found_items")
        );
        assert_eq!(config.captioner.timeout_secs, 60);
    }
}
