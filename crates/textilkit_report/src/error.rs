//! Fatal run failures.

use textilkit_io_sql::SourceError;
use thiserror::Error;

/// Errors that abort the run. Everything else degrades into warnings.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Configuration could not be read.
    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Configuration was read but is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Query catalog failed validation.
    #[error("invalid query catalog: {0}")]
    Catalog(#[source] SourceError),
    /// Initial connection or connectivity check failed.
    #[error("database connection failed: {0}")]
    Connect(#[source] SourceError),
    /// Workbook could not be written or saved.
    #[error("failed to save workbook: {0}")]
    Save(String),
}

impl ReportError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::InvalidConfig(_) | Self::Catalog(_) => 2,
            Self::Connect(_) => 3,
            Self::Save(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_nonzero_per_class() {
        let err = ReportError::Connect(SourceError::Connect("refused".to_string()));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            err.to_string(),
            "database connection failed: connection failed: refused"
        );
        assert_eq!(ReportError::Save("disk full".to_string()).exit_code(), 4);
        assert_eq!(ReportError::InvalidConfig("host".to_string()).exit_code(), 2);
    }
}
