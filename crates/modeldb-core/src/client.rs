//! RPC client interface to the ModelDB metadata store.

use crate::error::Result;
use crate::wire::*;
use async_trait::async_trait;

/// One call per wire record kind. Each call is a single round-trip and may
/// fail with a transport-level error.
///
/// Implementations own the connection; callers must not issue calls
/// concurrently and expect any particular interleaving.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    async fn store_project_event(&self, event: ProjectEvent) -> Result<ProjectEventResponse>;

    async fn store_experiment_event(
        &self,
        event: ExperimentEvent,
    ) -> Result<ExperimentEventResponse>;

    async fn store_experiment_run_event(
        &self,
        event: ExperimentRunEvent,
    ) -> Result<ExperimentRunEventResponse>;

    async fn store_fit_event(&self, event: FitEvent) -> Result<FitEventResponse>;

    async fn store_transform_event(&self, event: TransformEvent)
    -> Result<TransformEventResponse>;

    async fn store_metric_event(&self, event: MetricEvent) -> Result<MetricEventResponse>;

    async fn store_random_split_event(
        &self,
        event: RandomSplitEvent,
    ) -> Result<RandomSplitEventResponse>;

    async fn store_pipeline_event(&self, event: PipelineEvent) -> Result<PipelineEventResponse>;

    async fn store_grid_search_cv_event(
        &self,
        event: GridSearchCrossValidationEvent,
    ) -> Result<GridSearchCrossValidationEventResponse>;
}
