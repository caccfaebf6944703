//! In-memory metadata store.
//!
//! Assigns ids the way the real store does (fresh id for `-1`, echo for a
//! known id, same id for a project name seen before) and keeps a log of
//! every call. Used for dry runs and tests.

use async_trait::async_trait;
use modeldb_core::client::MetadataClient;
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::wire::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::rpc::envelope::method;

#[derive(Debug)]
struct StoreState {
    next_id: i32,
    calls: Vec<(&'static str, Value)>,
    fail_on_call: Option<usize>,
    projects_by_name: HashMap<String, i32>,
    default_experiments: HashMap<i32, i32>,
}

impl StoreState {
    fn fresh_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn resolve(&mut self, id: i32) -> i32 {
        if id >= 0 { id } else { self.fresh_id() }
    }
}

#[derive(Debug)]
pub struct InMemoryMetadataStore {
    state: Mutex<StoreState>,
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_id: 1,
                calls: Vec::new(),
                fail_on_call: None,
                projects_by_name: HashMap::new(),
                default_experiments: HashMap::new(),
            }),
        }
    }

    /// Makes the `index`-th call (0-based, counting every call) fail with a
    /// transmission error. The failed call is still logged.
    pub fn fail_on_call(self, index: usize) -> Self {
        self.lock().fail_on_call = Some(index);
        self
    }

    /// Method names of every call received, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.iter().map(|(name, _)| *name).collect()
    }

    /// Payloads received for `method_name`, in order.
    pub fn payloads(&self, method_name: &str) -> Vec<Value> {
        self.lock()
            .calls
            .iter()
            .filter(|(name, _)| *name == method_name)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A poisoned lock only means a test panicked mid-call; the log is
        // still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Logs the call and returns the guard, or the injected failure.
    fn begin<T: Serialize>(
        &self,
        method_name: &'static str,
        payload: &T,
    ) -> Result<MutexGuard<'_, StoreState>> {
        let payload = serde_json::to_value(payload)?;
        let mut state = self.lock();
        let index = state.calls.len();
        state.calls.push((method_name, payload));
        if state.fail_on_call == Some(index) {
            return Err(ModelDbError::transmission(
                method_name,
                "injected failure from in-memory store",
            ));
        }
        Ok(state)
    }
}

fn fit_response(state: &mut StoreState, event: &FitEvent) -> FitEventResponse {
    FitEventResponse {
        df_id: state.resolve(event.df.id),
        spec_id: state.resolve(event.spec.id),
        model_id: state.resolve(event.model.id),
        event_id: state.fresh_id(),
        fit_event_id: state.fresh_id(),
    }
}

fn transform_response(state: &mut StoreState, event: &TransformEvent) -> TransformEventResponse {
    TransformEventResponse {
        old_data_frame_id: state.resolve(event.old_data_frame.id),
        new_data_frame_id: state.resolve(event.new_data_frame.id),
        transformer_id: state.resolve(event.transformer.id),
        event_id: state.fresh_id(),
    }
}

#[async_trait]
impl MetadataClient for InMemoryMetadataStore {
    async fn store_project_event(&self, event: ProjectEvent) -> Result<ProjectEventResponse> {
        let mut state = self.begin(method::STORE_PROJECT_EVENT, &event)?;
        let project = &event.project;
        let project_id = if project.id >= 0 {
            project.id
        } else if let Some(id) = state.projects_by_name.get(&project.name) {
            *id
        } else {
            let id = state.fresh_id();
            state.projects_by_name.insert(project.name.clone(), id);
            id
        };
        Ok(ProjectEventResponse {
            project_id,
            event_id: state.fresh_id(),
        })
    }

    async fn store_experiment_event(
        &self,
        event: ExperimentEvent,
    ) -> Result<ExperimentEventResponse> {
        let mut state = self.begin(method::STORE_EXPERIMENT_EVENT, &event)?;
        let experiment = &event.experiment;
        let experiment_id = if experiment.id >= 0 {
            experiment.id
        } else if experiment.is_default {
            match state.default_experiments.get(&experiment.project_id) {
                Some(id) => *id,
                None => {
                    let id = state.fresh_id();
                    state.default_experiments.insert(experiment.project_id, id);
                    id
                }
            }
        } else {
            state.fresh_id()
        };
        Ok(ExperimentEventResponse {
            experiment_id,
            event_id: state.fresh_id(),
        })
    }

    async fn store_experiment_run_event(
        &self,
        event: ExperimentRunEvent,
    ) -> Result<ExperimentRunEventResponse> {
        let mut state = self.begin(method::STORE_EXPERIMENT_RUN_EVENT, &event)?;
        Ok(ExperimentRunEventResponse {
            experiment_run_id: state.resolve(event.experiment_run.id),
            event_id: state.fresh_id(),
        })
    }

    async fn store_fit_event(&self, event: FitEvent) -> Result<FitEventResponse> {
        let mut state = self.begin(method::STORE_FIT_EVENT, &event)?;
        Ok(fit_response(&mut state, &event))
    }

    async fn store_transform_event(
        &self,
        event: TransformEvent,
    ) -> Result<TransformEventResponse> {
        let mut state = self.begin(method::STORE_TRANSFORM_EVENT, &event)?;
        Ok(transform_response(&mut state, &event))
    }

    async fn store_metric_event(&self, event: MetricEvent) -> Result<MetricEventResponse> {
        let mut state = self.begin(method::STORE_METRIC_EVENT, &event)?;
        Ok(MetricEventResponse {
            model_id: state.resolve(event.model.id),
            df_id: state.resolve(event.df.id),
            event_id: state.fresh_id(),
        })
    }

    async fn store_random_split_event(
        &self,
        event: RandomSplitEvent,
    ) -> Result<RandomSplitEventResponse> {
        let mut state = self.begin(method::STORE_RANDOM_SPLIT_EVENT, &event)?;
        let old_data_frame_id = state.resolve(event.old_data_frame.id);
        let split_ids = event
            .split_data_frames
            .iter()
            .map(|df| state.resolve(df.id))
            .collect();
        Ok(RandomSplitEventResponse {
            old_data_frame_id,
            split_ids,
            split_event_id: state.fresh_id(),
        })
    }

    async fn store_pipeline_event(&self, event: PipelineEvent) -> Result<PipelineEventResponse> {
        let mut state = self.begin(method::STORE_PIPELINE_EVENT, &event)?;
        let pipeline_fit_response = fit_response(&mut state, &event.pipeline_fit);
        let transform_stages_responses = event
            .transform_stages
            .iter()
            .map(|stage| transform_response(&mut state, &stage.te))
            .collect();
        let fit_stages_responses = event
            .fit_stages
            .iter()
            .map(|stage| fit_response(&mut state, &stage.fe))
            .collect();
        Ok(PipelineEventResponse {
            pipeline_fit_response,
            transform_stages_responses,
            fit_stages_responses,
        })
    }

    async fn store_grid_search_cv_event(
        &self,
        event: GridSearchCrossValidationEvent,
    ) -> Result<GridSearchCrossValidationEventResponse> {
        let mut state = self.begin(method::STORE_GRID_SEARCH_CV_EVENT, &event)?;
        let fit_event_response = fit_response(&mut state, &event.best_fit);
        let cross_validation_event_responses = event
            .cross_validations
            .iter()
            .map(|cv| CrossValidationEventResponse {
                df_id: state.resolve(cv.df.id),
                spec_id: state.resolve(cv.spec.id),
                event_id: state.fresh_id(),
                fold_responses: cv
                    .folds
                    .iter()
                    .map(|fold| CrossValidationFoldResponse {
                        model_id: state.resolve(fold.model.id),
                        validation_id: state.resolve(fold.validation_df.id),
                        training_id: state.resolve(fold.training_df.id),
                    })
                    .collect(),
            })
            .collect();
        Ok(GridSearchCrossValidationEventResponse {
            gscve_id: state.fresh_id(),
            event_id: state.fresh_id(),
            fit_event_response,
            cross_validation_event_responses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str) -> ProjectEvent {
        ProjectEvent {
            project: Project {
                id: UNASSIGNED_ID,
                name: name.to_string(),
                author: String::new(),
                description: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn same_project_name_maps_to_same_id() {
        let store = InMemoryMetadataStore::new();
        let first = store.store_project_event(project("a")).await.unwrap();
        let again = store.store_project_event(project("a")).await.unwrap();
        let other = store.store_project_event(project("b")).await.unwrap();

        assert_eq!(first.project_id, again.project_id);
        assert_ne!(first.project_id, other.project_id);
        assert_eq!(store.calls().len(), 3);
    }

    #[tokio::test]
    async fn injected_failure_is_logged_and_returned() {
        let store = InMemoryMetadataStore::new().fail_on_call(1);
        store.store_project_event(project("a")).await.unwrap();
        let err = store.store_project_event(project("b")).await.unwrap_err();

        assert!(err.is_transmission());
        assert_eq!(store.calls(), vec!["storeProjectEvent", "storeProjectEvent"]);
        assert_eq!(store.payloads("storeProjectEvent")[1]["project"]["name"], "b");
    }
}
