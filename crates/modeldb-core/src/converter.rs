//! Wire converter: snapshots + registry → wire records.
//!
//! Every function here only reads the registry.

use crate::estimator::{ModelSnapshot, SpecSnapshot};
use crate::frame::FrameSnapshot;
use crate::registry::IdentityRegistry;
use crate::wire;

/// Weight vector sent when the estimator exposes no learned weights.
pub const PLACEHOLDER_WEIGHTS: [f64; 1] = [0.0];

/// Lower bound sent for hyperparameters without a known range.
pub const HYPERPARAMETER_MIN: f64 = f64::MIN;
/// Upper bound sent for hyperparameters without a known range.
pub const HYPERPARAMETER_MAX: f64 = f64::MAX;

pub fn model_to_wire(registry: &IdentityRegistry, model: &ModelSnapshot) -> wire::Transformer {
    wire::Transformer {
        id: registry.resolve_id(model.handle),
        weights: model
            .weights
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_WEIGHTS.to_vec()),
        transformer_type: model.type_name.clone(),
        tag: registry.resolve_tag(model.handle),
    }
}

pub fn frame_to_wire(registry: &IdentityRegistry, frame: &FrameSnapshot) -> wire::DataFrame {
    wire::DataFrame {
        id: registry.resolve_id(frame.handle),
        schema: frame
            .schema
            .iter()
            .map(|(name, dtype)| wire::DataFrameColumn {
                name: name.clone(),
                dtype: dtype.clone(),
            })
            .collect(),
        num_rows: clamp_rows(frame.num_rows),
        tag: registry.resolve_tag(frame.handle),
    }
}

/// `features` records the schema of the frame the spec was applied to.
pub fn spec_to_wire(
    registry: &IdentityRegistry,
    spec: &SpecSnapshot,
    frame: &FrameSnapshot,
) -> wire::TransformerSpec {
    wire::TransformerSpec {
        id: registry.resolve_id(spec.handle),
        transformer_type: spec.type_name.clone(),
        features: frame.column_names(),
        hyperparameters: spec
            .params
            .iter()
            .map(|param| wire::HyperParameter {
                name: param.name.clone(),
                value: param.value.to_string(),
                value_type: param.value.type_name().to_string(),
                min: HYPERPARAMETER_MIN,
                max: HYPERPARAMETER_MAX,
            })
            .collect(),
        tag: registry.resolve_tag(spec.handle),
    }
}

fn clamp_rows(rows: usize) -> i32 {
    i32::try_from(rows).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{Param, ParamValue};
    use crate::frame::{Column, DataFrame};
    use crate::handle::{Handle, ObjectKind, Trackable};

    #[test]
    fn frame_without_columns_converts_to_empty_schema() {
        let registry = IdentityRegistry::new();
        let df = DataFrame::unstructured(vec![vec![1.0, 2.0]; 7]);

        let wire = frame_to_wire(&registry, &df.snapshot());
        assert!(wire.schema.is_empty());
        assert_eq!(wire.num_rows, 7);
        assert_eq!(wire.id, -1);
    }

    #[test]
    fn frame_with_columns_converts_name_and_dtype() {
        let mut registry = IdentityRegistry::new();
        let df = DataFrame::structured(vec![
            Column::int("a", vec![1, 2]),
            Column::float("b", vec![0.1, 0.2]),
        ])
        .unwrap();
        registry.assign(df.handle(), ObjectKind::DataFrame, 5);
        registry.tag(df.handle(), ObjectKind::DataFrame, "train");

        let wire = frame_to_wire(&registry, &df.snapshot());
        let pairs: Vec<(&str, &str)> = wire
            .schema
            .iter()
            .map(|c| (c.name.as_str(), c.dtype.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "int64"), ("b", "float64")]);
        assert_eq!(wire.id, 5);
        assert_eq!(wire.tag, "train");
    }

    #[test]
    fn model_without_weights_gets_placeholder() {
        let registry = IdentityRegistry::new();
        let model = ModelSnapshot {
            handle: Handle::next(),
            type_name: "LinearRegression".to_string(),
            weights: None,
        };

        let wire = model_to_wire(&registry, &model);
        assert_eq!(wire.transformer_type, "LinearRegression");
        assert_eq!(wire.weights, vec![0.0]);
        assert_eq!(wire.id, -1);
        assert_eq!(wire.tag, "");
    }

    #[test]
    fn spec_lists_hyperparameters_and_frame_columns() {
        let registry = IdentityRegistry::new();
        let spec = SpecSnapshot {
            handle: Handle::next(),
            type_name: "LogisticRegression".to_string(),
            params: vec![
                Param::new("C", ParamValue::Float(1.0)),
                Param::new("penalty", ParamValue::Str("l2".to_string())),
            ],
        };
        let df = DataFrame::structured(vec![Column::float("x", vec![1.0])]).unwrap();

        let wire = spec_to_wire(&registry, &spec, &df.snapshot());
        assert_eq!(wire.features, vec!["x"]);
        assert_eq!(wire.hyperparameters.len(), 2);
        assert_eq!(wire.hyperparameters[0].value, "1.0");
        assert_eq!(wire.hyperparameters[0].value_type, "float");
        assert_eq!(wire.hyperparameters[1].value, "l2");
        assert_eq!(wire.hyperparameters[1].min, f64::MIN);
        assert_eq!(wire.hyperparameters[1].max, f64::MAX);
    }
}
