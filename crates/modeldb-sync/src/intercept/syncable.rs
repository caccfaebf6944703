//! Wrapper that adds recording `*_sync` operations to an estimator.

use super::labeled_frame;
use super::table::Operation;
use crate::session::SyncSession;
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::estimator::{Estimator, ModelSnapshot, SpecSnapshot};
use modeldb_core::event::{Event, FitRecord, TransformRecord};
use modeldb_core::frame::{Column, DataFrame, TransformOutput};
use modeldb_core::handle::{Handle, ObjectKind, Trackable};

/// Column that carries labels joined onto a frame without a label name.
pub const LABEL_COLUMN: &str = "outputColumn";
/// Column that carries predictions joined onto the input frame.
pub const PREDICTION_COLUMN: &str = "prediction";

/// The real result of an intercepted call, plus the outcome of recording it.
#[derive(Debug)]
pub struct Intercepted<T> {
    output: T,
    recording: Result<()>,
}

impl<T> Intercepted<T> {
    pub(crate) fn new(context: &str, output: T, recording: Result<()>) -> Self {
        if let Err(err) = &recording {
            tracing::warn!("[Interceptor] {} ran but was not recorded: {}", context, err);
        }
        Self { output, recording }
    }

    pub fn output(&self) -> &T {
        &self.output
    }

    pub fn into_output(self) -> T {
        self.output
    }

    /// Why the event could not be recorded, if it could not.
    pub fn recording_error(&self) -> Option<&ModelDbError> {
        self.recording.as_ref().err()
    }

    pub fn is_recorded(&self) -> bool {
        self.recording.is_ok()
    }

    pub fn into_parts(self) -> (T, Result<()>) {
        (self.output, self.recording)
    }
}

/// An estimator plus the identities the syncer tracks for it.
///
/// The parameter specification keeps one handle for the wrapper's lifetime.
/// Each successful fit produces a new fitted model and therefore a new model
/// handle; a tag set with [`Syncable::tag`] carries over to it.
#[derive(Debug)]
pub struct Syncable<E> {
    pub(crate) estimator: E,
    pub(crate) spec_handle: Handle,
    pub(crate) model_handle: Handle,
    pub(crate) tag: Option<String>,
}

impl<E: Estimator> Syncable<E> {
    pub fn new(estimator: E) -> Self {
        Self {
            estimator,
            spec_handle: Handle::next(),
            model_handle: Handle::next(),
            tag: None,
        }
    }

    pub fn inner(&self) -> &E {
        &self.estimator
    }

    pub fn into_inner(self) -> E {
        self.estimator
    }

    pub fn spec_handle(&self) -> Handle {
        self.spec_handle
    }

    pub fn model_handle(&self) -> Handle {
        self.model_handle
    }

    pub fn spec_snapshot(&self) -> SpecSnapshot {
        SpecSnapshot {
            handle: self.spec_handle,
            type_name: self.estimator.type_name().to_string(),
            params: self.estimator.params(),
        }
    }

    pub fn model_snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            handle: self.model_handle,
            type_name: self.estimator.type_name().to_string(),
            weights: self.estimator.weights(),
        }
    }

    /// Tags the specification and the current model.
    pub fn tag(&mut self, session: &mut SyncSession, tag: impl Into<String>) {
        let tag = tag.into();
        session.tag_handle(self.spec_handle, ObjectKind::TransformerSpec, tag.clone());
        session.tag_handle(self.model_handle, ObjectKind::Transformer, tag.clone());
        self.tag = Some(tag);
    }

    /// Fits the estimator and records a `Fit` event.
    ///
    /// # Errors
    ///
    /// - `Unsupported` if fit is not enabled for this type (nothing runs)
    /// - `Estimator` if the fit itself fails (nothing is recorded)
    pub fn fit_sync(
        &mut self,
        session: &mut SyncSession,
        x: &DataFrame,
        y: Option<&[f64]>,
    ) -> Result<Intercepted<()>> {
        session
            .interceptors()
            .ensure(self.estimator.type_name(), Operation::Fit)?;
        self.estimator.fit(x, y).map_err(ModelDbError::estimator)?;
        self.refit(session);

        let recording = self
            .fit_record(x, y)
            .map(|record| session.record(Event::Fit(record)));
        Ok(Intercepted::new(
            &format!("{}.fit", self.estimator.type_name()),
            (),
            recording,
        ))
    }

    /// Predicts and records a `Transform` event whose output frame is the
    /// input joined with the predictions.
    pub fn predict_sync(
        &self,
        session: &mut SyncSession,
        x: &DataFrame,
    ) -> Result<Intercepted<Vec<f64>>> {
        session
            .interceptors()
            .ensure(self.estimator.type_name(), Operation::Predict)?;
        let predictions = self.estimator.predict(x).map_err(ModelDbError::estimator)?;

        let recording = x
            .with_column(Column::float(PREDICTION_COLUMN, predictions.clone()))
            .map(|output| {
                let output_columns = if output.is_structured() {
                    vec![PREDICTION_COLUMN.to_string()]
                } else {
                    Vec::new()
                };
                session.record(Event::Transform(TransformRecord {
                    model: self.model_snapshot(),
                    input: x.snapshot(),
                    output: output.snapshot(),
                    input_columns: x.column_names(),
                    output_columns,
                }));
            });
        Ok(Intercepted::new(
            &format!("{}.predict", self.estimator.type_name()),
            predictions,
            recording,
        ))
    }

    /// Transforms and records a `Transform` event. Dense and sparse outputs
    /// are recorded as a frame with columns `"0".."n-1"`; the caller still
    /// gets the output exactly as the estimator produced it.
    pub fn transform_sync(
        &self,
        session: &mut SyncSession,
        x: &DataFrame,
    ) -> Result<Intercepted<TransformOutput>> {
        session
            .interceptors()
            .ensure(self.estimator.type_name(), Operation::Transform)?;
        let output = self
            .estimator
            .transform(x)
            .map_err(ModelDbError::estimator)?;

        let recording = output.to_frame().map(|frame| {
            session.record(Event::Transform(self.transform_record(x, &frame)));
        });
        Ok(Intercepted::new(
            &format!("{}.transform", self.estimator.type_name()),
            output,
            recording,
        ))
    }

    /// A fit yields a new model; the stored tag follows it.
    pub(crate) fn refit(&mut self, session: &mut SyncSession) {
        self.model_handle = Handle::next();
        if let Some(tag) = &self.tag {
            session.tag_handle(self.model_handle, ObjectKind::Transformer, tag.clone());
        }
    }

    pub(crate) fn fit_record(&self, x: &DataFrame, y: Option<&[f64]>) -> Result<FitRecord> {
        let (frame, label_columns) = labeled_frame(x, y)?;
        Ok(FitRecord {
            spec: self.spec_snapshot(),
            model: self.model_snapshot(),
            frame: frame.snapshot(),
            feature_columns: x.column_names(),
            label_columns,
            prediction_columns: Vec::new(),
        })
    }

    pub(crate) fn transform_record(&self, input: &DataFrame, output: &DataFrame) -> TransformRecord {
        TransformRecord {
            model: self.model_snapshot(),
            input: input.snapshot(),
            output: output.snapshot(),
            input_columns: input.column_names(),
            output_columns: output.column_names(),
        }
    }
}

impl<E: Estimator> Trackable for Syncable<E> {
    /// The current fitted model.
    fn handle(&self) -> Handle {
        self.model_handle
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Transformer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeldb_core::estimator::{Param, ParamValue};

    struct Constant(f64);

    impl Estimator for Constant {
        fn type_name(&self) -> &str {
            "Constant"
        }

        fn params(&self) -> Vec<Param> {
            vec![Param::new("value", ParamValue::Float(self.0))]
        }

        fn fit(&mut self, _x: &DataFrame, y: Option<&[f64]>) -> anyhow::Result<()> {
            if let Some(y) = y {
                self.0 = y.iter().sum::<f64>() / y.len().max(1) as f64;
            }
            Ok(())
        }
    }

    #[test]
    fn intercepted_exposes_recording_error() {
        let ok = Intercepted::new("ok", 1, Ok(()));
        assert!(ok.is_recorded());
        assert_eq!(*ok.output(), 1);

        let failed = Intercepted::new("failed", 2, Err(ModelDbError::schema("ragged")));
        assert!(failed.recording_error().is_some_and(|e| e.is_schema()));
        let (output, recording) = failed.into_parts();
        assert_eq!(output, 2);
        assert!(recording.is_err());
    }

    #[test]
    fn fit_record_appends_label_column_to_structured_input() {
        let wrapped = Syncable::new(Constant(0.0));
        let x = DataFrame::structured(vec![Column::float("a", vec![1.0, 2.0])]).unwrap();

        let record = wrapped.fit_record(&x, Some(&[3.0, 4.0])).unwrap();
        assert_eq!(record.feature_columns, vec!["a"]);
        assert_eq!(record.label_columns, vec![LABEL_COLUMN]);
        assert_eq!(record.frame.column_names(), vec!["a", LABEL_COLUMN]);
        assert_ne!(record.frame.handle, x.handle());
        assert_eq!(record.spec.params[0].name, "value");
    }

    #[test]
    fn fit_record_without_labels_reuses_input_identity() {
        let wrapped = Syncable::new(Constant(0.0));
        let x = DataFrame::unstructured(vec![vec![1.0], vec![2.0]]);

        let record = wrapped.fit_record(&x, None).unwrap();
        assert_eq!(record.frame.handle, x.handle());
        assert!(record.label_columns.is_empty());
        assert!(record.feature_columns.is_empty());
    }

    #[test]
    fn fit_record_rejects_mismatched_labels() {
        let wrapped = Syncable::new(Constant(0.0));
        let x = DataFrame::unstructured(vec![vec![1.0], vec![2.0]]);

        let err = wrapped.fit_record(&x, Some(&[1.0])).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn spec_and_model_have_distinct_handles() {
        let wrapped = Syncable::new(Constant(0.0));
        assert_ne!(wrapped.spec_handle(), wrapped.model_handle());
        assert_eq!(wrapped.handle(), wrapped.model_handle());
    }
}
