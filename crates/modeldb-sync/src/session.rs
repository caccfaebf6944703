//! The synchronization session.

use crate::intercept::InterceptorTable;
use crate::slot::{SessionSlot, SlotGuard};
use modeldb_core::buffer::EventBuffer;
use modeldb_core::client::MetadataClient;
use modeldb_core::config::SyncerConfig;
use modeldb_core::context::{
    ExperimentConfig, ExperimentRunConfig, ProjectConfig, SessionContext,
};
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::event::Event;
use modeldb_core::handle::{Handle, ObjectKind, Trackable};
use modeldb_core::registry::IdentityRegistry;
use modeldb_core::wire::{
    Experiment, ExperimentEvent, ExperimentRun, ExperimentRunEvent, Project, ProjectEvent,
};
use modeldb_infrastructure::FramedRpcClient;
use std::sync::Arc;
use uuid::Uuid;

/// Owns the metadata client, the context triple, the identity registry and
/// the event buffer.
///
/// `SyncSession` is responsible for:
/// - Syncing project, experiment and run, in that order, as soon as they are set
/// - Buffering events recorded by interceptors
/// - Flushing buffered events in record order and writing back assigned ids
///
/// Sessions are passed explicitly (`&mut SyncSession`) to interceptors.
pub struct SyncSession {
    id: Uuid,
    config: SyncerConfig,
    client: Arc<dyn MetadataClient>,
    context: SessionContext,
    registry: IdentityRegistry,
    buffer: EventBuffer,
    interceptors: InterceptorTable,
    _slot: SlotGuard,
}

impl SyncSession {
    /// Connects to the store at `config.host:config.port` and syncs the
    /// configured project, experiment and run.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` if another session is alive
    /// - `Connection` if the transport cannot be opened (no retry)
    /// - `Transmission` if syncing the context fails
    pub async fn start(config: SyncerConfig) -> Result<Self> {
        let guard = SessionSlot::global().claim(&config)?;
        let client = FramedRpcClient::connect(&config.host, config.port).await?;
        Self::open(guard, config, Arc::new(client)).await
    }

    /// Like [`SyncSession::start`], with an explicit slot and client.
    pub async fn with_client(
        slot: &Arc<SessionSlot>,
        config: SyncerConfig,
        client: Arc<dyn MetadataClient>,
    ) -> Result<Self> {
        let guard = slot.claim(&config)?;
        Self::open(guard, config, client).await
    }

    /// Claims the slot without syncing any context. Project, experiment and
    /// run must then be set explicitly before anything can be flushed.
    pub fn unsynced(
        slot: &Arc<SessionSlot>,
        config: SyncerConfig,
        client: Arc<dyn MetadataClient>,
    ) -> Result<Self> {
        let guard = slot.claim(&config)?;
        Ok(Self::build(guard, config, client))
    }

    fn build(guard: SlotGuard, config: SyncerConfig, client: Arc<dyn MetadataClient>) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            registry: IdentityRegistry::with_warn_threshold(config.registry_warn_threshold),
            config,
            client,
            context: SessionContext::default(),
            buffer: EventBuffer::new(),
            interceptors: InterceptorTable::default(),
            _slot: guard,
        };
        tracing::info!(session = %session.id, "[SyncSession] opening against {}", session.config.address());
        session
    }

    async fn open(
        guard: SlotGuard,
        config: SyncerConfig,
        client: Arc<dyn MetadataClient>,
    ) -> Result<Self> {
        let mut session = Self::build(guard, config, client);
        let project = session.config.project.clone();
        let experiment = session.config.experiment.clone();
        let run = session.config.run.clone();
        session.setup(&project, &experiment, &run).await?;
        Ok(session)
    }

    /// Syncs project, experiment and run in order.
    pub async fn setup(
        &mut self,
        project: &ProjectConfig,
        experiment: &ExperimentConfig,
        run: &ExperimentRunConfig,
    ) -> Result<()> {
        self.set_project(project).await?;
        self.set_experiment(experiment).await?;
        self.set_experiment_run(run).await
    }

    /// Syncs the project immediately. Experiment and run are cleared, since
    /// they belong to the previous project.
    pub async fn set_project(&mut self, config: &ProjectConfig) -> Result<()> {
        let mut project = config.to_wire();
        let response = self
            .client
            .store_project_event(ProjectEvent {
                project: project.clone(),
            })
            .await
            .map_err(|e| e.into_transmission("ProjectEvent"))?;
        project.id = response.project_id;

        tracing::info!(session = %self.id, "[SyncSession] project '{}' -> id {}", project.name, project.id);
        self.context.project = Some(project);
        self.context.experiment = None;
        self.context.experiment_run = None;
        Ok(())
    }

    /// Syncs the experiment immediately, under the current project.
    ///
    /// # Errors
    ///
    /// `ContextOrder` if no project has been synced yet.
    pub async fn set_experiment(&mut self, config: &ExperimentConfig) -> Result<()> {
        let project_id = self.context.project_id().ok_or_else(|| {
            ModelDbError::context_order("set_project must succeed before set_experiment")
        })?;

        let mut experiment = config.to_wire();
        experiment.project_id = project_id;
        let response = self
            .client
            .store_experiment_event(ExperimentEvent {
                experiment: experiment.clone(),
            })
            .await
            .map_err(|e| e.into_transmission("ExperimentEvent"))?;
        experiment.id = response.experiment_id;

        tracing::info!(
            session = %self.id,
            "[SyncSession] experiment (default: {}) -> id {}",
            experiment.is_default,
            experiment.id
        );
        self.context.experiment = Some(experiment);
        self.context.experiment_run = None;
        Ok(())
    }

    /// Syncs the run immediately, under the current experiment.
    ///
    /// # Errors
    ///
    /// `ContextOrder` if no experiment has been synced yet.
    pub async fn set_experiment_run(&mut self, config: &ExperimentRunConfig) -> Result<()> {
        let experiment_id = self.context.experiment_id().ok_or_else(|| {
            ModelDbError::context_order("set_experiment must succeed before set_experiment_run")
        })?;

        let mut run = config.to_wire();
        run.experiment_id = experiment_id;
        let response = self
            .client
            .store_experiment_run_event(ExperimentRunEvent {
                experiment_run: run.clone(),
            })
            .await
            .map_err(|e| e.into_transmission("ExperimentRunEvent"))?;
        run.id = response.experiment_run_id;

        tracing::info!(session = %self.id, "[SyncSession] experiment run -> id {}", run.id);
        self.context.experiment_run = Some(run);
        Ok(())
    }

    /// Buffers an event. Never performs I/O.
    pub fn record(&mut self, event: Event) {
        self.buffer.append(event);
    }

    /// Sends every buffered event in record order.
    ///
    /// The buffer is drained up front. If an event fails to send, the rest
    /// are not attempted and all drained events from the failed one onward
    /// are lost.
    ///
    /// # Returns
    ///
    /// The number of events sent.
    ///
    /// # Errors
    ///
    /// - `ContextOrder` if no run is synced (nothing is drained in that case)
    /// - `Transmission` for the first event that failed
    pub async fn flush(&mut self) -> Result<usize> {
        let run_id = self.context.experiment_run_id().ok_or_else(|| {
            ModelDbError::context_order("cannot flush before an experiment run is synced")
        })?;

        let pending = self.buffer.drain();
        let total = pending.len();
        for (sent, item) in pending.iter().enumerate() {
            if let Err(err) = item
                .event
                .sync(self.client.as_ref(), &mut self.registry, run_id)
                .await
            {
                tracing::warn!(
                    session = %self.id,
                    "[SyncSession] flush aborted at {} (seq {}): {}; {} event(s) dropped",
                    item.event.kind(),
                    item.seq,
                    err,
                    total - sent
                );
                return Err(err.into_transmission(item.event.kind()));
            }
        }

        if total > 0 {
            tracing::info!(session = %self.id, "[SyncSession] flushed {} event(s)", total);
        }
        Ok(total)
    }

    /// Attaches a user tag to a tracked object.
    pub fn tag_object(&mut self, object: &impl Trackable, tag: impl Into<String>) {
        self.tag_handle(object.handle(), object.kind(), tag);
    }

    pub fn tag_handle(&mut self, handle: Handle, kind: ObjectKind, tag: impl Into<String>) {
        self.registry.tag(handle, kind, tag);
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SyncerConfig {
        &self.config
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn project(&self) -> Option<&Project> {
        self.context.project.as_ref()
    }

    pub fn experiment(&self) -> Option<&Experiment> {
        self.context.experiment.as_ref()
    }

    pub fn experiment_run(&self) -> Option<&ExperimentRun> {
        self.context.experiment_run.as_ref()
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Number of buffered events.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn interceptors(&self) -> &InterceptorTable {
        &self.interceptors
    }

    /// Register additional estimator types here.
    pub fn interceptors_mut(&mut self) -> &mut InterceptorTable {
        &mut self.interceptors
    }
}
