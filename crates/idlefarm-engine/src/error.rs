//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup, the frame loop, and
//! the final report so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: idlefarm_core::config::ConfigError,
    },

    /// The session could not be created.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: idlefarm_core::session::SessionError,
    },

    /// The frame loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: idlefarm_core::runner::RunnerError,
    },

    /// The final snapshot could not be serialized.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
