//! Message envelope carried inside each length-prefixed frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Method names understood by the store.
pub mod method {
    pub const STORE_PROJECT_EVENT: &str = "storeProjectEvent";
    pub const STORE_EXPERIMENT_EVENT: &str = "storeExperimentEvent";
    pub const STORE_EXPERIMENT_RUN_EVENT: &str = "storeExperimentRunEvent";
    pub const STORE_FIT_EVENT: &str = "storeFitEvent";
    pub const STORE_TRANSFORM_EVENT: &str = "storeTransformEvent";
    pub const STORE_METRIC_EVENT: &str = "storeMetricEvent";
    pub const STORE_RANDOM_SPLIT_EVENT: &str = "storeRandomSplitEvent";
    pub const STORE_PIPELINE_EVENT: &str = "storePipelineEvent";
    pub const STORE_GRID_SEARCH_CV_EVENT: &str = "storeGridSearchCrossValidationEvent";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    pub seqid: i32,
    pub payload: Value,
}

/// Exactly one of `result` and `error` is set by a well-behaved server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcReply {
    pub seqid: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RpcReply {
    pub fn ok(seqid: i32, result: Value) -> Self {
        Self {
            seqid,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(seqid: i32, error: impl Into<String>) -> Self {
        Self {
            seqid,
            result: None,
            error: Some(error.into()),
        }
    }
}
