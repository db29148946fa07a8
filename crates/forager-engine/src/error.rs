//! Error types for the Forager engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup.

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
        source: forager_core::config::ConfigError,
    },

    /// World data could not be loaded or is inconsistent.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: forager_world::WorldError,
    },

    /// A configured alarm could not be registered.
    #[error("alarm error: {source}")]
    Alarm {
        /// The underlying alarm error.
        #[from]
        source: forager_core::alarm::AlarmError,
    },

    /// Reading console input failed.
    #[error("console error: {source}")]
    Console {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
