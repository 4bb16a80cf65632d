use crate::error::{ConfigError, Result as AppResult};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ContentSourceType {
    File,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub source_type: ContentSourceType,
    pub file_path: Option<String>,
    pub http_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppSettings {
    pub server: ServerConfig,
    pub content: ContentConfig,
}

/// Builds settings from defaults, an optional `config.*` file and
/// `ORDBLUFF__`-prefixed environment variables (later sources win).
/// The defaults are complete, so the server runs unconfigured.
pub fn load_settings() -> AppResult<AppSettings> {
    let settings = Config::builder()
        .set_default("server.port", 8000_i64)
        .map_err(load_err)?
        .set_default("server.cors_origins", Vec::<String>::new())
        .map_err(load_err)?
        .set_default("server.static_dir", "static")
        .map_err(load_err)?
        .set_default("content.source_type", "file")
        .map_err(load_err)?
        .set_default("content.file_path", "words.json")
        .map_err(load_err)?
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("ORDBLUFF")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        )
        .build()
        .map_err(load_err)?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()).into())
}

fn load_err(e: config::ConfigError) -> ConfigError {
    ConfigError::Load(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_a_complete_configuration() {
        let settings = load_settings().unwrap();
        assert!(settings.server.port > 0);
        assert_eq!(settings.content.source_type, ContentSourceType::File);
        assert!(settings.content.file_path.is_some());
    }
}
