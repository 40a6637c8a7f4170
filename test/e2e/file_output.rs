//! End-to-end file-output scenario.
//!
//! Exercises the harness the way a real agent scenario does: dependency
//! containers come up via their idempotent `deploy()`, a (here simulated)
//! agent drops its result into a shared output directory, and the test
//! blocks on `validate_output` until the output satisfies the validator or
//! the deadline passes.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p flowtest-e2e --test file_output
//! # docker-backed cases:
//! cargo test -p flowtest-e2e --test file_output -- --ignored
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use flowtest_containers::{AzureStorageContainer, FlowEngineContainer};
use flowtest_observer::{OutputObserver, SingleFileOutputValidator};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,flowtest_observer=debug,flowtest_containers=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn unique_suffix() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos()
        .to_string()
}

#[tokio::test]
async fn agent_output_is_validated_as_it_arrives() -> anyhow::Result<()> {
    init_logging();
    let output_dir = tempfile::tempdir()?;

    // Simulated agent: drops its result into the shared output directory
    // while the observer is waiting.
    let agent_dir = output_dir.path().to_path_buf();
    let agent = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(800)).await;
        std::fs::write(agent_dir.join("result"), "transferred payload").unwrap();
    });

    // The observer contract is thread-blocking, so drive it off the runtime.
    let dir = output_dir.path().to_path_buf();
    let accepted = tokio::task::spawn_blocking(move || {
        let mut observer = OutputObserver::new(&dir)?;
        let mut validator = SingleFileOutputValidator::new(&dir, "transferred payload");
        observer.validate_output(Duration::from_secs(10), &mut validator, 0)
    })
    .await??;

    agent.await?;
    assert!(accepted, "agent output should satisfy the validator");
    Ok(())
}

#[tokio::test]
async fn missing_agent_output_times_out_cleanly() -> anyhow::Result<()> {
    init_logging();
    let output_dir = tempfile::tempdir()?;

    let dir = output_dir.path().to_path_buf();
    let accepted = tokio::task::spawn_blocking(move || {
        let mut observer = OutputObserver::new(&dir)?;
        let mut validator = SingleFileOutputValidator::new(&dir, "never written");
        observer.validate_output(Duration::from_millis(500), &mut validator, 0)
    })
    .await??;

    assert!(!accepted, "no output means a false result, not an error");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn azure_storage_dependency_comes_up_once() -> anyhow::Result<()> {
    init_logging();
    let mut azure = AzureStorageContainer::new(format!("azure-storage-{}", unique_suffix()));

    azure.deploy().await?;
    assert!(azure.is_deployed());

    let blob_port = azure.blob_port().await?;
    let queue_port = azure.queue_port().await?;
    assert_ne!(blob_port, 0);
    assert_ne!(queue_port, 0);
    assert_ne!(blob_port, queue_port);

    // Re-deploying an already-deployed dependency is a no-op.
    azure.deploy().await?;
    assert_eq!(azure.blob_port().await?, blob_port);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a docker daemon and the flow engine image"]
async fn flow_engine_boots_with_generated_config() -> anyhow::Result<()> {
    init_logging();
    let config_dir = tempfile::tempdir()?;

    let mut engine = FlowEngineContainer::new(
        format!("flow-engine-{}", unique_suffix()),
        config_dir.path(),
        b"<flowController/>".to_vec(),
    );
    engine.deploy().await?;

    assert!(engine.is_deployed());
    assert!(config_dir.path().join("flow.xml.gz").exists());
    Ok(())
}
