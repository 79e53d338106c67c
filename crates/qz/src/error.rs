//! CLI error types.

use std::path::PathBuf;

use qz_config::ConfigError;
use qz_core::ParseError;
use qz_moodle::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
