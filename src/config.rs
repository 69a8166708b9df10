use crate::cli::Cli;
use crate::error::{BoardError, BoardResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use std::{path::Path, path::PathBuf, time::Duration};
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &'static str = ".env.local.yaml";

// All settings may be configured via environment variables. Example:
// SHEET_ID="xxx" would set sheet_id to the xxx value.
// Command line flags take precedence over both the local file and the environment.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    pub sheet_id: String,
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    // How long a fetched feed is served from its snapshot
    #[serde(default = "default_cache_minutes")]
    pub cache_minutes: u64,
    #[serde(default = "default_http_timeout_sec")]
    pub http_timeout_sec: u64,
    // Population used for the participation rate
    #[serde(default = "default_total_residents")]
    pub total_residents: u32,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    // Origin of the deployed dashboard, needed to pre-cache its assets
    pub site_origin: Option<String>,
    #[serde(default = "default_asset_cache_version")]
    pub asset_cache_version: String,
}

impl Settings {
    pub fn new(cli: &Cli) -> BoardResult<Self> {
        let mut figment = Figment::new();
        if Path::new(LOCAL_SETTINGS_YAML_FILE).exists() {
            println!(
                "\n######################################\n\
                   ##   Found '.env.local.yaml' file,  ##\n\
                   ##   loading local configuration.   ##\n\
                   ######################################\n\
                "
            );
            figment = figment.merge(Yaml::file(LOCAL_SETTINGS_YAML_FILE));
        }
        let figment = figment.merge(Env::raw()).merge(Serialized::defaults(cli));
        Settings::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> BoardResult<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> BoardResult<()> {
        if self.sheet_id.trim().is_empty() {
            return Err(BoardError::Config("sheet_id must not be empty".to_string()));
        }
        if self.total_residents == 0 {
            return Err(BoardError::Config(
                "total_residents must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_minutes * 60)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_sheets_base_url() -> String {
    "https://docs.google.com".to_string()
}

fn default_cache_minutes() -> u64 {
    5
}

fn default_http_timeout_sec() -> u64 {
    10
}

fn default_total_residents() -> u32 {
    42
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(".kstreet-cache")
}

fn default_asset_cache_version() -> String {
    "v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_sheet_id_is_set() {
        let settings =
            Settings::from_figment(Figment::new().merge(Yaml::string("sheet_id: abc"))).unwrap();
        assert_eq!(settings.sheet_id, "abc");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(300));
        assert_eq!(settings.total_residents, 42);
        assert_eq!(settings.asset_cache_version, "v1");
        assert_eq!(settings.site_origin, None);
        assert_eq!(settings.get_trace_level(), Level::INFO);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let cli = Cli {
            command: None,
            sheet_id: None,
            cache_minutes: Some(1),
        };
        let figment = Figment::new()
            .merge(Yaml::string("sheet_id: abc\ncache_minutes: 30\ntrace_level: DEBUG"))
            .merge(Serialized::defaults(&cli));
        let settings = Settings::from_figment(figment).unwrap();
        assert_eq!(settings.cache_minutes, 1);
        assert_eq!(settings.sheet_id, "abc");
        assert_eq!(settings.get_trace_level(), Level::DEBUG);
    }

    #[test]
    fn rejects_missing_sheet_and_zero_residents() {
        assert!(Settings::from_figment(Figment::new()).is_err());
        let zero = Figment::new().merge(Yaml::string("sheet_id: abc\ntotal_residents: 0"));
        assert!(matches!(
            Settings::from_figment(zero),
            Err(BoardError::Config(_))
        ));
    }
}
