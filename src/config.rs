use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "LIFEEXP_CONFIG";
/// Environment variable overriding `data_path`.
pub const DATA_ENV: &str = "LIFEEXP_DATA";
/// Picked up from the working directory when `LIFEEXP_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "lifeexp.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Launch-time settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Window title and page heading.
    pub title: String,
    /// Sidebar heading.
    pub subtitle: String,
    /// Sidebar introduction text.
    pub description: String,
    /// Dataset read at startup.
    pub data_path: PathBuf,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    pub source_url: String,
    pub app_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            title: "Life Expectancy Dashboard".to_string(),
            subtitle: "Life Expectancy vs. Healthcare Expenditure".to_string(),
            description: "Access to healthcare is essential to survival, yet it is not \
                          available to everyone. This dashboard explores the relationship \
                          between total healthcare spending and life expectancy."
                .to_string(),
            data_path: PathBuf::from("healthexp.csv"),
            window_size: [1280.0, 820.0],
            source_url: "https://github.com/dblake26/cintel-06-custom/blob/main/app.py".to_string(),
            app_url: "https://github.com/dblake26/cintel-06-custom".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the environment:
    /// `LIFEEXP_CONFIG`, else `lifeexp.json` if present, else defaults;
    /// then apply `LIFEEXP_DATA`.
    pub fn load() -> Result<Self> {
        let config = Self::resolve(
            std::env::var_os(CONFIG_ENV),
            std::env::var_os(DATA_ENV),
            Path::new(DEFAULT_CONFIG_FILE),
        )?;
        log::debug!("Using configuration {config:?}");
        Ok(config)
    }

    /// `load` with the environment lookups passed in.
    fn resolve(
        config_path: Option<OsString>,
        data_path: Option<OsString>,
        default_file: &Path,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if default_file.exists() => Self::from_file(default_file)?,
            None => Self::default(),
        };

        if let Some(data) = data_path {
            config.data_path = PathBuf::from(data);
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = DashboardConfig::from_json(r#"{ "data_path": "data/other.parquet" }"#)
            .expect("parse");
        assert_eq!(config.data_path, PathBuf::from("data/other.parquet"));
        assert_eq!(config.title, DashboardConfig::default().title);
        assert_eq!(config.window_size, [1280.0, 820.0]);
    }

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(DashboardConfig::from_json("{}").expect("parse"), DashboardConfig::default());
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lifeexp.json");
        std::fs::write(&path, "{ title: ").expect("write");

        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("lifeexp.json"));
    }

    #[test]
    fn explicit_file_wins_over_the_default_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let explicit = dir.path().join("custom.json");
        let default_file = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&explicit, r#"{ "title": "Custom" }"#).expect("write");
        std::fs::write(&default_file, r#"{ "title": "Default file" }"#).expect("write");

        let config =
            DashboardConfig::resolve(Some(explicit.into_os_string()), None, &default_file)
                .expect("resolve");
        assert_eq!(config.title, "Custom");

        let config = DashboardConfig::resolve(None, None, &default_file).expect("resolve");
        assert_eq!(config.title, "Default file");
    }

    #[test]
    fn absent_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_file = dir.path().join(DEFAULT_CONFIG_FILE);

        let config = DashboardConfig::resolve(None, None, &default_file).expect("resolve");
        assert_eq!(config, DashboardConfig::default());

        // A named file that does not exist is an error, not a silent default.
        let missing = dir.path().join("missing.json").into_os_string();
        assert!(DashboardConfig::resolve(Some(missing), None, &default_file).is_err());
    }

    #[test]
    fn data_override_replaces_the_configured_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_file = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&default_file, r#"{ "data_path": "from_file.csv" }"#).expect("write");

        let config =
            DashboardConfig::resolve(None, Some("override.parquet".into()), &default_file)
                .expect("resolve");
        assert_eq!(config.data_path, PathBuf::from("override.parquet"));
    }

    // The only test touching the process environment.
    #[test]
    fn load_reads_the_environment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("env.json");
        std::fs::write(&path, r#"{ "title": "From env", "data_path": "a.csv" }"#)
            .expect("write");

        std::env::set_var(CONFIG_ENV, &path);
        std::env::set_var(DATA_ENV, "b.json");
        let config = DashboardConfig::load();
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(DATA_ENV);

        let config = config.expect("load");
        assert_eq!(config.title, "From env");
        assert_eq!(config.data_path, PathBuf::from("b.json"));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        assert!(DashboardConfig::from_json(r#"{ "window_size": "large" }"#).is_err());
    }
}
