//! Error types for container deployment.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while deploying or querying a dependency container.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The flow configuration could not be written to the config directory.
    #[error("failed to write flow config to {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container failed to start or reach its startup log entry.
    #[error("container {name} failed to start")]
    Startup {
        name: String,
        #[source]
        source: testcontainers::TestcontainersError,
    },

    /// A host port was requested for a container that is not running.
    #[error("container {name} is not deployed")]
    NotDeployed { name: String },

    /// A mapped host port could not be resolved.
    #[error("failed to resolve host port {port} for container {name}")]
    Port {
        name: String,
        port: u16,
        #[source]
        source: testcontainers::TestcontainersError,
    },
}
