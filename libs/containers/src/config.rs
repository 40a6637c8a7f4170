//! Harness configuration.

use std::time::Duration;

/// Image and timeout configuration for the dependency containers.
///
/// Loaded from `FLOWTEST_*` environment variables with defaults matching
/// the images the scenarios were written against.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Flow engine image name.
    pub engine_image: String,

    /// Flow engine image tag; also selects the engine root inside the
    /// container (`/opt/nifi/nifi-<tag>`).
    pub engine_tag: String,

    /// Azure storage emulator image name.
    pub azurite_image: String,

    /// Azure storage emulator image tag.
    pub azurite_tag: String,

    /// How long to wait for a container's startup log entry.
    pub startup_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            engine_image: "apache/nifi".to_string(),
            engine_tag: "1.7.0".to_string(),
            azurite_image: "mcr.microsoft.com/azure-storage/azurite".to_string(),
            azurite_tag: "3.14.2".to_string(),
            startup_timeout: Duration::from_secs(120),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let startup_timeout = std::env::var("FLOWTEST_STARTUP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.startup_timeout);

        Self {
            engine_image: std::env::var("FLOWTEST_ENGINE_IMAGE")
                .unwrap_or(defaults.engine_image),
            engine_tag: std::env::var("FLOWTEST_ENGINE_TAG").unwrap_or(defaults.engine_tag),
            azurite_image: std::env::var("FLOWTEST_AZURITE_IMAGE")
                .unwrap_or(defaults.azurite_image),
            azurite_tag: std::env::var("FLOWTEST_AZURITE_TAG").unwrap_or(defaults.azurite_tag),
            startup_timeout,
        }
    }
}
