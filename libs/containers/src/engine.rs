//! Flow-processing engine container.
//!
//! Launches the engine with a caller-supplied flow configuration. The flow
//! graph is serialized by the caller (its format is the engine's business);
//! this container only gzips the blob into the bind-mounted config
//! directory and rewrites the engine's properties file on startup so the
//! engine answers under its container name.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use testcontainers::core::{Mount, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::error::DeployError;
use crate::state::DeployState;

/// Container path the config directory is mounted at.
const CONFIG_MOUNT: &str = "/tmp/flow_config";

/// Log line marking the engine's flow controller as started.
const STARTUP_LOG_ENTRY: &str = "Starting Flow Controller";

/// A flow-processing engine instance with a generated flow config.
pub struct FlowEngineContainer {
    name: String,
    config_dir: PathBuf,
    flow_config: Vec<u8>,
    network: Option<String>,
    config: HarnessConfig,
    state: DeployState,
    container: Option<ContainerAsync<GenericImage>>,
}

impl FlowEngineContainer {
    /// Describe an engine container named `name`.
    ///
    /// `config_dir` is a host directory mounted into the container;
    /// `flow_config` is the serialized flow graph installed as the
    /// engine's flow configuration at startup.
    pub fn new(
        name: impl Into<String>,
        config_dir: impl Into<PathBuf>,
        flow_config: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            config_dir: config_dir.into(),
            flow_config,
            network: None,
            config: HarnessConfig::from_env(),
            state: DeployState::default(),
            container: None,
        }
    }

    /// Attach the container to a named docker network.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Override the environment-derived configuration.
    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deployed(&self) -> bool {
        self.state.is_deployed()
    }

    /// Log entry that gates startup.
    pub fn startup_log_entry(&self) -> &'static str {
        STARTUP_LOG_ENTRY
    }

    /// The engine's application log inside the container.
    pub fn log_file_path(&self) -> String {
        format!("{}/logs/nifi-app.log", self.engine_root())
    }

    fn engine_root(&self) -> String {
        format!("/opt/nifi/nifi-{}", self.config.engine_tag)
    }

    /// Shell command run as the container entrypoint: point the engine's
    /// remote-input host at the container name, install the flow config,
    /// then hand over to the stock start script.
    fn entry_command(&self) -> String {
        let root = self.engine_root();
        format!(
            "sed -i -e 's/^\\(nifi.remote.input.host\\)=.*/\\1={name}/' {root}/conf/nifi.properties \
             && cp {mount}/flow.xml.gz {root}/conf && /opt/nifi/scripts/start.sh",
            name = self.name,
            mount = CONFIG_MOUNT,
        )
    }

    /// Gzip the flow config blob into the config directory.
    fn write_flow_config(&self) -> Result<PathBuf, DeployError> {
        let path = self.config_dir.join("flow.xml.gz");
        let as_config_err = |source| DeployError::Config {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(as_config_err)?;
        let mut gz = GzEncoder::new(file, Compression::default());
        gz.write_all(&self.flow_config).map_err(as_config_err)?;
        gz.finish().map_err(as_config_err)?;

        debug!(path = %path.display(), bytes = self.flow_config.len(), "wrote flow config");
        Ok(path)
    }

    /// Create and start the engine container. Idempotent.
    pub async fn deploy(&mut self) -> Result<(), DeployError> {
        if !self.state.set_deployed() {
            return Ok(());
        }

        info!(name = %self.name, "creating and running flow engine container");
        self.write_flow_config()?;

        let image = GenericImage::new(
            self.config.engine_image.clone(),
            self.config.engine_tag.clone(),
        )
        .with_entrypoint("/bin/sh")
        .with_wait_for(WaitFor::message_on_stdout(STARTUP_LOG_ENTRY));

        let request = image
            .with_cmd(vec!["-c".to_string(), self.entry_command()])
            .with_container_name(self.name.clone())
            .with_mount(Mount::bind_mount(
                self.config_dir.display().to_string(),
                CONFIG_MOUNT,
            ))
            .with_startup_timeout(self.config.startup_timeout);
        let request = match &self.network {
            Some(network) => request.with_network(network.clone()),
            None => request,
        };

        let container = request.start().await.map_err(|source| DeployError::Startup {
            name: self.name.clone(),
            source,
        })?;
        info!(name = %self.name, id = container.id(), "added flow engine container");
        self.container = Some(container);
        Ok(())
    }

    /// Host directory holding the generated config.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Docker id of the running container, if deployed.
    pub fn container_id(&self) -> Option<&str> {
        self.container.as_ref().map(|container| container.id())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn engine(dir: &Path) -> FlowEngineContainer {
        FlowEngineContainer::new("flow-engine-1", dir, b"<flow/>".to_vec())
            .with_config(HarnessConfig::default())
    }

    #[test]
    fn flow_config_is_gzipped_into_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path());

        let path = engine.write_flow_config().unwrap();
        assert_eq!(path, dir.path().join("flow.xml.gz"));

        let mut gz = flate2::read::GzDecoder::new(File::open(&path).unwrap());
        let mut contents = Vec::new();
        gz.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"<flow/>");
    }

    #[test]
    fn flow_config_write_fails_on_missing_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir.path().join("gone"));
        assert!(matches!(
            engine.write_flow_config(),
            Err(DeployError::Config { .. })
        ));
    }

    #[test]
    fn entry_command_targets_the_versioned_engine_root() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path());

        let command = engine.entry_command();
        assert!(command.contains("/opt/nifi/nifi-1.7.0/conf/nifi.properties"));
        assert!(command.contains("\\1=flow-engine-1"));
        assert!(command.contains("cp /tmp/flow_config/flow.xml.gz"));
        assert!(command.ends_with("/opt/nifi/scripts/start.sh"));
    }

    #[test]
    fn log_path_follows_the_engine_tag() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::default();
        config.engine_tag = "2.0.0".to_string();
        let engine = FlowEngineContainer::new("e", dir.path(), Vec::new()).with_config(config);

        assert_eq!(engine.log_file_path(), "/opt/nifi/nifi-2.0.0/logs/nifi-app.log");
    }

    #[test]
    fn not_deployed_until_deploy_runs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!engine(dir.path()).is_deployed());
    }
}
