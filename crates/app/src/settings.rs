//! Handles settings for the application. Configuration is read from
//! `settings.toml` (or the file passed with `--config`) and can be overridden
//! with `QUOKKA_*` environment variables, e.g. `QUOKKA_SERVER__PORT=9090`.
//!
//! See `settings.toml` for the configuration.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "quokka", disable_version_flag = true)]
struct Args {
    /// Optional settings file path (TOML, extension may be omitted).
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct History {
    pub depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            depth: engine::DEFAULT_HISTORY_DEPTH,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub history: History,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("QUOKKA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply_to_missing_sections() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
        assert_eq!(settings.history.depth, engine::DEFAULT_HISTORY_DEPTH);
    }

    #[test]
    fn server_database_variants() {
        let settings = parse(
            r#"
            [server]
            port = 8080
            database = "memory"
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert!(matches!(server.database, Database::Memory));

        let settings = parse(
            r#"
            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "quokka.db" }

            [history]
            depth = 10
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.bind.as_deref(), Some("0.0.0.0"));
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "quokka.db"));
        assert_eq!(settings.history.depth, 10);
    }
}
