//! # flowtest-containers
//!
//! Declarative container launch for data-flow agent integration tests.
//!
//! Scenarios boot the agent's dependencies — a flow-processing engine and
//! a cloud-storage emulator — as containers. This crate holds only the
//! declarative part of that: image names, ports, volumes, entrypoints,
//! startup log gates, and the deploy-once guard. The orchestration
//! mechanics (image pull, container create/start, cleanup) live entirely
//! in `testcontainers`.
//!
//! Every container exposes the same lifecycle contract:
//!
//! - `deploy()` — idempotent: the first call creates and starts the
//!   container and waits for its startup log entry; later calls no-op.
//! - `is_deployed()` — whether `deploy()` has run.

mod azure;
mod config;
mod engine;
mod error;
mod state;

pub use azure::AzureStorageContainer;
pub use config::HarnessConfig;
pub use engine::FlowEngineContainer;
pub use error::DeployError;
pub use state::DeployState;
