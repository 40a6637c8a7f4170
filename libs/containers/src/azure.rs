//! Azure storage emulator container.
//!
//! Runs Azurite so scenarios exercising the agent's cloud-storage
//! processors have a blob/queue endpoint to talk to. Purely declarative:
//! image, two ports, and a startup log gate.

use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tracing::info;

use crate::config::HarnessConfig;
use crate::error::DeployError;
use crate::state::DeployState;

/// Azurite blob service port inside the container.
pub const BLOB_PORT: u16 = 10000;

/// Azurite queue service port inside the container.
pub const QUEUE_PORT: u16 = 10001;

/// Queue service is the last of Azurite's listeners to come up.
const STARTUP_LOG_ENTRY: &str = "Azurite Queue service is successfully listening at";

/// An Azurite cloud-storage emulator instance.
pub struct AzureStorageContainer {
    name: String,
    network: Option<String>,
    config: HarnessConfig,
    state: DeployState,
    container: Option<ContainerAsync<GenericImage>>,
}

impl AzureStorageContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
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

    /// Create and start the emulator container. Idempotent.
    pub async fn deploy(&mut self) -> Result<(), DeployError> {
        if !self.state.set_deployed() {
            return Ok(());
        }

        info!(name = %self.name, "creating and running azure storage emulator container");
        let image = GenericImage::new(
            self.config.azurite_image.clone(),
            self.config.azurite_tag.clone(),
        )
        .with_exposed_port(BLOB_PORT.tcp())
        .with_exposed_port(QUEUE_PORT.tcp())
        .with_wait_for(WaitFor::message_on_stdout(STARTUP_LOG_ENTRY));

        let request = image
            .with_container_name(self.name.clone())
            .with_startup_timeout(self.config.startup_timeout);
        let request = match &self.network {
            Some(network) => request.with_network(network.clone()),
            None => request,
        };

        let container = request.start().await.map_err(|source| DeployError::Startup {
            name: self.name.clone(),
            source,
        })?;
        info!(name = %self.name, id = container.id(), "added azure storage emulator container");
        self.container = Some(container);
        Ok(())
    }

    /// Host port mapped to the blob service.
    pub async fn blob_port(&self) -> Result<u16, DeployError> {
        self.host_port(BLOB_PORT).await
    }

    /// Host port mapped to the queue service.
    pub async fn queue_port(&self) -> Result<u16, DeployError> {
        self.host_port(QUEUE_PORT).await
    }

    async fn host_port(&self, port: u16) -> Result<u16, DeployError> {
        let container = self.container.as_ref().ok_or_else(|| DeployError::NotDeployed {
            name: self.name.clone(),
        })?;
        container
            .get_host_port_ipv4(port.tcp())
            .await
            .map_err(|source| DeployError::Port {
                name: self.name.clone(),
                port,
                source,
            })
    }
}
