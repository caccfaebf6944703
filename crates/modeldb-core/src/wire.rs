//! Wire records exchanged with the ModelDB metadata store.
//!
//! Field names follow the store's camelCase schema. An `id` of `-1` always
//! means "not assigned by the store yet".

use serde::{Deserialize, Serialize};

/// Sentinel id for records the store has not seen.
pub const UNASSIGNED_ID: i32 = -1;

// ============================================================================
// Context records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub author: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRun {
    pub id: i32,
    pub experiment_id: i32,
    pub description: String,
}

// ============================================================================
// Object records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrameColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub dtype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrame {
    pub id: i32,
    pub schema: Vec<DataFrameColumn>,
    pub num_rows: i32,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperParameter {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerSpec {
    pub id: i32,
    pub transformer_type: String,
    pub features: Vec<String>,
    pub hyperparameters: Vec<HyperParameter>,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformer {
    pub id: i32,
    pub weights: Vec<f64>,
    pub transformer_type: String,
    pub tag: String,
}

// ============================================================================
// Event records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEvent {
    pub project: Project,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentEvent {
    pub experiment: Experiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRunEvent {
    pub experiment_run: ExperimentRun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitEvent {
    pub df: DataFrame,
    pub spec: TransformerSpec,
    pub model: Transformer,
    pub feature_columns: Vec<String>,
    pub prediction_columns: Vec<String>,
    pub label_columns: Vec<String>,
    pub experiment_run_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformEvent {
    pub old_data_frame: DataFrame,
    pub new_data_frame: DataFrame,
    pub transformer: Transformer,
    pub input_columns: Vec<String>,
    pub output_columns: Vec<String>,
    pub experiment_run_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricEvent {
    pub df: DataFrame,
    pub model: Transformer,
    pub metric_type: String,
    pub metric_value: f64,
    pub label_col: String,
    pub prediction_col: String,
    pub experiment_run_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomSplitEvent {
    pub old_data_frame: DataFrame,
    pub weights: Vec<f64>,
    pub seed: i64,
    pub split_data_frames: Vec<DataFrame>,
    pub experiment_run_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTransformStage {
    pub stage_number: i32,
    pub te: TransformEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineFitStage {
    pub stage_number: i32,
    pub fe: FitEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineEvent {
    pub pipeline_fit: FitEvent,
    pub transform_stages: Vec<PipelineTransformStage>,
    pub fit_stages: Vec<PipelineFitStage>,
    pub experiment_run_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationFold {
    pub model: Transformer,
    pub validation_df: DataFrame,
    pub training_df: DataFrame,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationEvent {
    pub df: DataFrame,
    pub spec: TransformerSpec,
    pub seed: i64,
    pub evaluator: String,
    pub label_columns: Vec<String>,
    pub prediction_columns: Vec<String>,
    pub feature_columns: Vec<String>,
    pub folds: Vec<CrossValidationFold>,
    pub experiment_run_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSearchCrossValidationEvent {
    pub num_folds: i32,
    pub best_fit: FitEvent,
    pub cross_validations: Vec<CrossValidationEvent>,
    pub experiment_run_id: i32,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEventResponse {
    pub project_id: i32,
    pub event_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentEventResponse {
    pub experiment_id: i32,
    pub event_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRunEventResponse {
    pub experiment_run_id: i32,
    pub event_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitEventResponse {
    pub df_id: i32,
    pub spec_id: i32,
    pub model_id: i32,
    pub event_id: i32,
    pub fit_event_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformEventResponse {
    pub old_data_frame_id: i32,
    pub new_data_frame_id: i32,
    pub transformer_id: i32,
    pub event_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricEventResponse {
    pub model_id: i32,
    pub df_id: i32,
    pub event_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomSplitEventResponse {
    pub old_data_frame_id: i32,
    pub split_ids: Vec<i32>,
    pub split_event_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineEventResponse {
    pub pipeline_fit_response: FitEventResponse,
    pub transform_stages_responses: Vec<TransformEventResponse>,
    pub fit_stages_responses: Vec<FitEventResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationFoldResponse {
    pub model_id: i32,
    pub validation_id: i32,
    pub training_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationEventResponse {
    pub df_id: i32,
    pub spec_id: i32,
    pub event_id: i32,
    pub fold_responses: Vec<CrossValidationFoldResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSearchCrossValidationEventResponse {
    pub gscve_id: i32,
    pub event_id: i32,
    pub fit_event_response: FitEventResponse,
    pub cross_validation_event_responses: Vec<CrossValidationEventResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_serialize_with_camel_case_names() {
        let df = DataFrame {
            id: UNASSIGNED_ID,
            schema: vec![DataFrameColumn {
                name: "age".to_string(),
                dtype: "int64".to_string(),
            }],
            num_rows: 3,
            tag: String::new(),
        };

        let json = serde_json::to_value(&df).unwrap();
        assert_eq!(json["numRows"], 3);
        assert_eq!(json["schema"][0]["type"], "int64");
        assert_eq!(json["id"], -1);
    }
}
