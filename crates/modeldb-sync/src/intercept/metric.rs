//! Metric interceptor.

use super::syncable::{Intercepted, Syncable};
use crate::session::SyncSession;
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::estimator::Estimator;
use modeldb_core::event::{Event, MetricRecord};
use modeldb_core::frame::DataFrame;

/// Metrics computed from a label column and a prediction column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    MeanSquaredError,
    MeanAbsoluteError,
    R2,
    Accuracy,
}

impl Metric {
    /// Name recorded as the metric type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MeanSquaredError => "mean_squared_error",
            Self::MeanAbsoluteError => "mean_absolute_error",
            Self::R2 => "r2_score",
            Self::Accuracy => "accuracy_score",
        }
    }

    /// # Errors
    ///
    /// `InvalidInput` if the slices are empty or differ in length.
    pub fn compute(&self, labels: &[f64], predictions: &[f64]) -> Result<f64> {
        if labels.is_empty() || labels.len() != predictions.len() {
            return Err(ModelDbError::invalid_input(format!(
                "{} needs equal non-empty inputs, got {} labels and {} predictions",
                self.name(),
                labels.len(),
                predictions.len()
            )));
        }
        let n = labels.len() as f64;
        let pairs = labels.iter().zip(predictions);
        let value = match self {
            Self::MeanSquaredError => pairs.map(|(l, p)| (l - p).powi(2)).sum::<f64>() / n,
            Self::MeanAbsoluteError => pairs.map(|(l, p)| (l - p).abs()).sum::<f64>() / n,
            Self::R2 => {
                let mean = labels.iter().sum::<f64>() / n;
                let residual: f64 = pairs.map(|(l, p)| (l - p).powi(2)).sum();
                let total: f64 = labels.iter().map(|l| (l - mean).powi(2)).sum();
                if total == 0.0 {
                    if residual == 0.0 { 1.0 } else { 0.0 }
                } else {
                    1.0 - residual / total
                }
            }
            Self::Accuracy => pairs.filter(|(l, p)| l == p).count() as f64 / n,
        };
        Ok(value)
    }
}

/// Computes `metric` over two columns of `frame` and records a `Metric`
/// event against `model`.
///
/// # Errors
///
/// `InvalidInput` if either column is missing, non-numeric or empty.
pub fn evaluate_sync<E: Estimator>(
    session: &mut SyncSession,
    model: &Syncable<E>,
    frame: &DataFrame,
    metric: Metric,
    label_column: &str,
    prediction_column: &str,
) -> Result<Intercepted<f64>> {
    let labels = numeric_column(frame, label_column)?;
    let predictions = numeric_column(frame, prediction_column)?;
    let value = metric.compute(&labels, &predictions)?;

    session.record(Event::Metric(MetricRecord {
        model: model.model_snapshot(),
        frame: frame.snapshot(),
        metric_type: metric.name().to_string(),
        value,
        label_column: label_column.to_string(),
        prediction_column: prediction_column.to_string(),
    }));
    Ok(Intercepted::new(metric.name(), value, Ok(())))
}

fn numeric_column(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    frame
        .column(name)
        .and_then(|column| column.values.as_f64())
        .ok_or_else(|| {
            ModelDbError::invalid_input(format!("no numeric column '{name}' in frame"))
        })
}
