//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

use crate::config::ConfigError;

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Registering or restoring an agent failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: lifesim_agents::AgentError,
    },

    /// Agent spawning failed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },

    /// Writing the report file failed.
    #[error("report I/O error: {source}")]
    ReportIo {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Encoding the report failed.
    #[error("report encoding error: {source}")]
    ReportJson {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
