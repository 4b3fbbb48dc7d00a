//! Run configuration: `config/database.*` layered with `TEXTIL_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use textilkit_io_sql::SpecConnectionOptions;
use textilkit_io_sql::spec::{C_CHARSET_DEFAULT, N_PORT_MYSQL_DEFAULT};

use crate::error::ReportError;

/// Config file looked up when no path is given; any supported extension.
pub const C_CONFIG_PATH_DEFAULT: &str = "config/database";
/// Environment variable prefix (`TEXTIL_DATABASE__HOST`).
pub const C_ENV_PREFIX: &str = "TEXTIL";
/// Environment variable nesting separator.
pub const C_ENV_SEPARATOR: &str = "__";

/// Full run configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// `[database]` section.
    pub database: DatabaseSettings,
    /// `[report]` section.
    #[serde(default)]
    pub report: ReportSettings,
}

/// MySQL connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// Server host name or IP.
    pub host: String,
    /// TCP port, 3306 when absent.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Login password; empty when absent.
    #[serde(default)]
    pub password: String,
    /// Schema name.
    pub database: String,
    /// Session character set, `utf8mb4` when absent.
    #[serde(default = "default_charset")]
    pub charset: String,
}

/// Report output settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportSettings {
    /// Directory the workbook is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_port() -> u16 {
    N_PORT_MYSQL_DEFAULT
}

fn default_charset() -> String {
    C_CHARSET_DEFAULT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl DatabaseSettings {
    /// Connection descriptor for the data source.
    pub fn to_connection_options(&self) -> SpecConnectionOptions {
        SpecConnectionOptions {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            charset: self.charset.clone(),
        }
    }
}

/// Load configuration.
///
/// An explicit `path` must exist. The default file is optional so that a pure
/// environment setup works; missing required keys still fail.
pub fn load_report_config(path: Option<&Path>) -> Result<ReportConfig, ReportError> {
    let (c_path, if_required) = match path {
        Some(path) => (path.to_string_lossy().to_string(), true),
        None => (C_CONFIG_PATH_DEFAULT.to_string(), false),
    };

    let settings = ::config::Config::builder()
        .add_source(::config::File::with_name(&c_path).required(if_required))
        .add_source(
            ::config::Environment::with_prefix(C_ENV_PREFIX)
                .prefix_separator("_")
                .separator(C_ENV_SEPARATOR),
        )
        .build()?;

    let cfg_report: ReportConfig = settings.try_deserialize()?;
    validate_report_config(&cfg_report)?;
    Ok(cfg_report)
}

/// Reject settings that cannot describe a connection.
pub fn validate_report_config(cfg_report: &ReportConfig) -> Result<(), ReportError> {
    let cfg_db = &cfg_report.database;
    for (c_key, c_value) in [
        ("database.host", &cfg_db.host),
        ("database.user", &cfg_db.user),
        ("database.database", &cfg_db.database),
        ("database.charset", &cfg_db.charset),
    ] {
        if c_value.trim().is_empty() {
            return Err(ReportError::InvalidConfig(format!("{c_key} is empty")));
        }
    }
    if cfg_db.port == 0 {
        return Err(ReportError::InvalidConfig("database.port is 0".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_load_report_config_applies_defaults() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_cfg = dir_tmp.path().join("database.toml");
        fs::write(
            &path_cfg,
            "[database]\nhost = \"db.local\"\nuser = \"relatorio\"\npassword = \"s3cret\"\ndatabase = \"textil\"\n",
        )
        .expect("write config");

        let cfg_report = load_report_config(Some(&path_cfg)).expect("load");
        assert_eq!(cfg_report.database.host, "db.local");
        assert_eq!(cfg_report.database.port, 3306);
        assert_eq!(cfg_report.database.charset, "utf8mb4");
        assert_eq!(cfg_report.report.output_dir, PathBuf::from("."));

        let options = cfg_report.database.to_connection_options();
        assert_eq!(options.database, "textil");
        assert_eq!(options.password, "s3cret");
    }

    #[test]
    fn test_load_report_config_reads_report_section() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_cfg = dir_tmp.path().join("database.toml");
        fs::write(
            &path_cfg,
            "[database]\nhost = \"h\"\nport = 3307\nuser = \"u\"\ndatabase = \"d\"\ncharset = \"latin1\"\n\n[report]\noutput_dir = \"saida\"\n",
        )
        .expect("write config");

        let cfg_report = load_report_config(Some(&path_cfg)).expect("load");
        assert_eq!(cfg_report.database.port, 3307);
        assert_eq!(cfg_report.database.charset, "latin1");
        assert_eq!(cfg_report.report.output_dir, PathBuf::from("saida"));
    }

    #[test]
    fn test_load_report_config_fails_on_missing_file_or_keys() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_missing = dir_tmp.path().join("absent.toml");
        assert!(matches!(
            load_report_config(Some(&path_missing)),
            Err(ReportError::Config(_))
        ));

        let path_cfg = dir_tmp.path().join("partial.toml");
        fs::write(&path_cfg, "[database]\nhost = \"h\"\n").expect("write config");
        assert!(matches!(
            load_report_config(Some(&path_cfg)),
            Err(ReportError::Config(_))
        ));

        fs::write(
            &path_cfg,
            "[database]\nhost = \" \"\nuser = \"u\"\ndatabase = \"d\"\n",
        )
        .expect("write config");
        assert!(matches!(
            load_report_config(Some(&path_cfg)),
            Err(ReportError::InvalidConfig(_))
        ));
    }
}
