use anyhow::{Context, Result};
use modeldb_infrastructure::{ConfigLoader, InMemoryMetadataStore};
use modeldb_sync::{SessionSlot, SyncSession};
use std::path::Path;
use std::sync::Arc;

pub async fn run(path: Option<&Path>, dry_run: bool) -> Result<()> {
    let config = ConfigLoader::resolve(path).context("Failed to resolve configuration")?;
    let address = config.address();

    let opened = if dry_run {
        println!("Dry run: using an in-memory store instead of {address}");
        SyncSession::with_client(
            &SessionSlot::global(),
            config,
            Arc::new(InMemoryMetadataStore::new()),
        )
        .await
    } else {
        println!("Connecting to ModelDB at {address}...");
        SyncSession::start(config).await
    };
    let session = opened.with_context(|| format!("Failed to sync context with {address}"))?;

    let project = session.project().context("project was not synced")?;
    let experiment = session.experiment().context("experiment was not synced")?;
    let run = session.experiment_run().context("run was not synced")?;

    println!("Session:        {}", session.session_id());
    println!("Project:        {} ({})", project.id, project.name);
    println!("Experiment:     {}", experiment.id);
    println!("Experiment run: {}", run.id);
    Ok(())
}
