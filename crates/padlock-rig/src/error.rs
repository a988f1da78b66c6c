//! Rig error types.

use std::path::PathBuf;

use padlock_core::ProfileError;
use thiserror::Error;

/// Errors that stop the rig before or between scenarios.
///
/// Failed expectations are not errors; they are reported in the scenario
/// report and reflected in the exit code.
#[derive(Debug, Error)]
pub enum RigError {
    /// A scenario file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A scenario file is not valid YAML for the scenario schema.
    #[error("invalid scenario {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml_ng::Error,
    },

    /// A scenario declares an unusable device profile.
    #[error("scenario `{scenario}` has an invalid profile: {source}")]
    Profile {
        /// Scenario name.
        scenario: String,
        /// Validation failure.
        source: ProfileError,
    },

    /// A scenario has no steps.
    #[error("scenario `{scenario}` has no steps")]
    Empty {
        /// Scenario name.
        scenario: String,
    },

    /// The report could not be rendered.
    #[error("cannot render report: {0}")]
    Report(#[from] serde_json::Error),
}
