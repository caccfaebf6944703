//! Recorded events.
//!
//! An event is captured when an intercepted call returns and is immutable
//! afterwards. At flush time it converts itself into its wire record using
//! the registry, sends it, and writes the ids from the response back into
//! the registry.

use crate::client::MetadataClient;
use crate::converter::{frame_to_wire, model_to_wire, spec_to_wire};
use crate::error::Result;
use crate::estimator::{ModelSnapshot, SpecSnapshot};
use crate::frame::FrameSnapshot;
use crate::handle::ObjectKind;
use crate::registry::IdentityRegistry;
use crate::wire;

#[derive(Debug, Clone, PartialEq)]
pub struct FitRecord {
    pub spec: SpecSnapshot,
    pub model: ModelSnapshot,
    pub frame: FrameSnapshot,
    pub feature_columns: Vec<String>,
    pub label_columns: Vec<String>,
    pub prediction_columns: Vec<String>,
}

impl FitRecord {
    pub fn to_wire(&self, registry: &IdentityRegistry, run_id: i32) -> wire::FitEvent {
        wire::FitEvent {
            df: frame_to_wire(registry, &self.frame),
            spec: spec_to_wire(registry, &self.spec, &self.frame),
            model: model_to_wire(registry, &self.model),
            feature_columns: self.feature_columns.clone(),
            prediction_columns: self.prediction_columns.clone(),
            label_columns: self.label_columns.clone(),
            experiment_run_id: run_id,
        }
    }

    pub fn write_back(&self, registry: &mut IdentityRegistry, response: &wire::FitEventResponse) {
        registry.assign(self.frame.handle, ObjectKind::DataFrame, response.df_id);
        registry.assign(self.spec.handle, ObjectKind::TransformerSpec, response.spec_id);
        registry.assign(self.model.handle, ObjectKind::Transformer, response.model_id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformRecord {
    pub model: ModelSnapshot,
    pub input: FrameSnapshot,
    pub output: FrameSnapshot,
    pub input_columns: Vec<String>,
    pub output_columns: Vec<String>,
}

impl TransformRecord {
    pub fn to_wire(&self, registry: &IdentityRegistry, run_id: i32) -> wire::TransformEvent {
        wire::TransformEvent {
            old_data_frame: frame_to_wire(registry, &self.input),
            new_data_frame: frame_to_wire(registry, &self.output),
            transformer: model_to_wire(registry, &self.model),
            input_columns: self.input_columns.clone(),
            output_columns: self.output_columns.clone(),
            experiment_run_id: run_id,
        }
    }

    pub fn write_back(
        &self,
        registry: &mut IdentityRegistry,
        response: &wire::TransformEventResponse,
    ) {
        registry.assign(
            self.input.handle,
            ObjectKind::DataFrame,
            response.old_data_frame_id,
        );
        registry.assign(
            self.output.handle,
            ObjectKind::DataFrame,
            response.new_data_frame_id,
        );
        registry.assign(
            self.model.handle,
            ObjectKind::Transformer,
            response.transformer_id,
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub model: ModelSnapshot,
    pub frame: FrameSnapshot,
    pub metric_type: String,
    pub value: f64,
    pub label_column: String,
    pub prediction_column: String,
}

impl MetricRecord {
    pub fn to_wire(&self, registry: &IdentityRegistry, run_id: i32) -> wire::MetricEvent {
        wire::MetricEvent {
            df: frame_to_wire(registry, &self.frame),
            model: model_to_wire(registry, &self.model),
            metric_type: self.metric_type.clone(),
            metric_value: self.value,
            label_col: self.label_column.clone(),
            prediction_col: self.prediction_column.clone(),
            experiment_run_id: run_id,
        }
    }

    pub fn write_back(&self, registry: &mut IdentityRegistry, response: &wire::MetricEventResponse) {
        registry.assign(self.model.handle, ObjectKind::Transformer, response.model_id);
        registry.assign(self.frame.handle, ObjectKind::DataFrame, response.df_id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomSplitRecord {
    pub input: FrameSnapshot,
    pub weights: Vec<f64>,
    pub seed: i64,
    pub splits: Vec<FrameSnapshot>,
}

impl RandomSplitRecord {
    pub fn to_wire(&self, registry: &IdentityRegistry, run_id: i32) -> wire::RandomSplitEvent {
        wire::RandomSplitEvent {
            old_data_frame: frame_to_wire(registry, &self.input),
            weights: self.weights.clone(),
            seed: self.seed,
            split_data_frames: self
                .splits
                .iter()
                .map(|split| frame_to_wire(registry, split))
                .collect(),
            experiment_run_id: run_id,
        }
    }

    pub fn write_back(
        &self,
        registry: &mut IdentityRegistry,
        response: &wire::RandomSplitEventResponse,
    ) {
        registry.assign(
            self.input.handle,
            ObjectKind::DataFrame,
            response.old_data_frame_id,
        );
        for (split, id) in self.splits.iter().zip(&response.split_ids) {
            registry.assign(split.handle, ObjectKind::DataFrame, *id);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRecord {
    pub fit: FitRecord,
    pub transform_stages: Vec<(usize, TransformRecord)>,
    pub fit_stages: Vec<(usize, FitRecord)>,
}

impl PipelineRecord {
    pub fn to_wire(&self, registry: &IdentityRegistry, run_id: i32) -> wire::PipelineEvent {
        wire::PipelineEvent {
            pipeline_fit: self.fit.to_wire(registry, run_id),
            transform_stages: self
                .transform_stages
                .iter()
                .map(|(stage, record)| wire::PipelineTransformStage {
                    stage_number: *stage as i32,
                    te: record.to_wire(registry, run_id),
                })
                .collect(),
            fit_stages: self
                .fit_stages
                .iter()
                .map(|(stage, record)| wire::PipelineFitStage {
                    stage_number: *stage as i32,
                    fe: record.to_wire(registry, run_id),
                })
                .collect(),
            experiment_run_id: run_id,
        }
    }

    pub fn write_back(
        &self,
        registry: &mut IdentityRegistry,
        response: &wire::PipelineEventResponse,
    ) {
        self.fit.write_back(registry, &response.pipeline_fit_response);
        for ((_, record), stage_response) in self
            .transform_stages
            .iter()
            .zip(&response.transform_stages_responses)
        {
            record.write_back(registry, stage_response);
        }
        for ((_, record), stage_response) in
            self.fit_stages.iter().zip(&response.fit_stages_responses)
        {
            record.write_back(registry, stage_response);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoldRecord {
    pub model: ModelSnapshot,
    pub validation: FrameSnapshot,
    pub training: FrameSnapshot,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationRecord {
    pub frame: FrameSnapshot,
    pub spec: SpecSnapshot,
    pub seed: i64,
    pub evaluator: String,
    pub feature_columns: Vec<String>,
    pub label_columns: Vec<String>,
    pub prediction_columns: Vec<String>,
    pub folds: Vec<FoldRecord>,
}

impl CrossValidationRecord {
    pub fn to_wire(&self, registry: &IdentityRegistry, run_id: i32) -> wire::CrossValidationEvent {
        wire::CrossValidationEvent {
            df: frame_to_wire(registry, &self.frame),
            spec: spec_to_wire(registry, &self.spec, &self.frame),
            seed: self.seed,
            evaluator: self.evaluator.clone(),
            label_columns: self.label_columns.clone(),
            prediction_columns: self.prediction_columns.clone(),
            feature_columns: self.feature_columns.clone(),
            folds: self
                .folds
                .iter()
                .map(|fold| wire::CrossValidationFold {
                    model: model_to_wire(registry, &fold.model),
                    validation_df: frame_to_wire(registry, &fold.validation),
                    training_df: frame_to_wire(registry, &fold.training),
                    score: fold.score,
                })
                .collect(),
            experiment_run_id: run_id,
        }
    }

    pub fn write_back(
        &self,
        registry: &mut IdentityRegistry,
        response: &wire::CrossValidationEventResponse,
    ) {
        registry.assign(self.frame.handle, ObjectKind::DataFrame, response.df_id);
        registry.assign(self.spec.handle, ObjectKind::TransformerSpec, response.spec_id);
        for (fold, ids) in self.folds.iter().zip(&response.fold_responses) {
            registry.assign(fold.model.handle, ObjectKind::Transformer, ids.model_id);
            registry.assign(
                fold.validation.handle,
                ObjectKind::DataFrame,
                ids.validation_id,
            );
            registry.assign(fold.training.handle, ObjectKind::DataFrame, ids.training_id);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchRecord {
    pub num_folds: usize,
    pub best_fit: FitRecord,
    pub cross_validations: Vec<CrossValidationRecord>,
}

impl GridSearchRecord {
    pub fn to_wire(
        &self,
        registry: &IdentityRegistry,
        run_id: i32,
    ) -> wire::GridSearchCrossValidationEvent {
        wire::GridSearchCrossValidationEvent {
            num_folds: self.num_folds as i32,
            best_fit: self.best_fit.to_wire(registry, run_id),
            cross_validations: self
                .cross_validations
                .iter()
                .map(|cv| cv.to_wire(registry, run_id))
                .collect(),
            experiment_run_id: run_id,
        }
    }

    pub fn write_back(
        &self,
        registry: &mut IdentityRegistry,
        response: &wire::GridSearchCrossValidationEventResponse,
    ) {
        self.best_fit
            .write_back(registry, &response.fit_event_response);
        for (cv, cv_response) in self
            .cross_validations
            .iter()
            .zip(&response.cross_validation_event_responses)
        {
            cv.write_back(registry, cv_response);
        }
    }
}

/// A recorded call, waiting in the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Fit(FitRecord),
    Transform(TransformRecord),
    Metric(MetricRecord),
    RandomSplit(RandomSplitRecord),
    Pipeline(PipelineRecord),
    GridSearchCrossValidation(GridSearchRecord),
}

impl Event {
    /// Wire record name, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fit(_) => "FitEvent",
            Self::Transform(_) => "TransformEvent",
            Self::Metric(_) => "MetricEvent",
            Self::RandomSplit(_) => "RandomSplitEvent",
            Self::Pipeline(_) => "PipelineEvent",
            Self::GridSearchCrossValidation(_) => "GridSearchCrossValidationEvent",
        }
    }

    /// Converts, sends and writes back ids. One round-trip per event.
    pub async fn sync(
        &self,
        client: &dyn MetadataClient,
        registry: &mut IdentityRegistry,
        run_id: i32,
    ) -> Result<()> {
        match self {
            Self::Fit(record) => {
                let response = client
                    .store_fit_event(record.to_wire(registry, run_id))
                    .await?;
                record.write_back(registry, &response);
            }
            Self::Transform(record) => {
                let response = client
                    .store_transform_event(record.to_wire(registry, run_id))
                    .await?;
                record.write_back(registry, &response);
            }
            Self::Metric(record) => {
                let response = client
                    .store_metric_event(record.to_wire(registry, run_id))
                    .await?;
                record.write_back(registry, &response);
            }
            Self::RandomSplit(record) => {
                let response = client
                    .store_random_split_event(record.to_wire(registry, run_id))
                    .await?;
                record.write_back(registry, &response);
            }
            Self::Pipeline(record) => {
                let response = client
                    .store_pipeline_event(record.to_wire(registry, run_id))
                    .await?;
                record.write_back(registry, &response);
            }
            Self::GridSearchCrossValidation(record) => {
                let response = client
                    .store_grid_search_cv_event(record.to_wire(registry, run_id))
                    .await?;
                record.write_back(registry, &response);
            }
        }
        tracing::debug!("[Event] synced {}", self.kind());
        Ok(())
    }
}
