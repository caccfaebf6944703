//! Pipeline interceptor: one `Pipeline` event with per-stage records.

use super::labeled_frame;
use super::syncable::{Intercepted, Syncable};
use super::table::Operation;
use crate::session::SyncSession;
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::estimator::{Estimator, ModelSnapshot, Param, ParamValue, SpecSnapshot};
use modeldb_core::event::{Event, FitRecord, PipelineRecord};
use modeldb_core::frame::DataFrame;
use modeldb_core::handle::{Handle, ObjectKind, Trackable};

/// Type name the pipeline is registered and recorded under.
pub const PIPELINE_TYPE: &str = "Pipeline";

/// An ordered chain of named estimators. Every stage but the last must
/// support `transform`; its output feeds the next stage.
pub struct SyncablePipeline {
    stages: Vec<(String, Syncable<Box<dyn Estimator>>)>,
    spec_handle: Handle,
    model_handle: Handle,
    tag: Option<String>,
}

impl SyncablePipeline {
    /// # Errors
    ///
    /// `InvalidInput` if `stages` is empty.
    pub fn new(stages: Vec<(String, Box<dyn Estimator>)>) -> Result<Self> {
        if stages.is_empty() {
            return Err(ModelDbError::invalid_input("a pipeline needs at least one stage"));
        }
        Ok(Self {
            stages: stages
                .into_iter()
                .map(|(name, estimator)| (name, Syncable::new(estimator)))
                .collect(),
            spec_handle: Handle::next(),
            model_handle: Handle::next(),
            tag: None,
        })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn stage(&self, index: usize) -> Option<&Syncable<Box<dyn Estimator>>> {
        self.stages.get(index).map(|(_, stage)| stage)
    }

    pub fn spec_handle(&self) -> Handle {
        self.spec_handle
    }

    pub fn model_handle(&self) -> Handle {
        self.model_handle
    }

    /// `steps` lists the stage names; every stage parameter follows as
    /// `<stage>__<param>`.
    pub fn params(&self) -> Vec<Param> {
        let mut params = vec![Param::new(
            "steps",
            ParamValue::Str(self.stage_names().join(",")),
        )];
        for (name, stage) in &self.stages {
            params.extend(
                stage
                    .inner()
                    .params()
                    .into_iter()
                    .map(|p| Param::new(format!("{}__{}", name, p.name), p.value)),
            );
        }
        params
    }

    pub fn tag(&mut self, session: &mut SyncSession, tag: impl Into<String>) {
        let tag = tag.into();
        session.tag_handle(self.spec_handle, ObjectKind::TransformerSpec, tag.clone());
        session.tag_handle(self.model_handle, ObjectKind::Transformer, tag.clone());
        self.tag = Some(tag);
    }

    /// Fits every stage in order and records one `Pipeline` event.
    ///
    /// # Errors
    ///
    /// - `Unsupported` if pipeline fit is not enabled
    /// - `Estimator` if any stage fails to fit or transform
    /// - `Schema` if a stage's transform output cannot feed the next stage
    pub fn fit_sync(
        &mut self,
        session: &mut SyncSession,
        x: &DataFrame,
        y: Option<&[f64]>,
    ) -> Result<Intercepted<()>> {
        session
            .interceptors()
            .ensure(PIPELINE_TYPE, Operation::PipelineFit)?;

        let last = self.stages.len() - 1;
        let mut produced: Vec<DataFrame> = Vec::with_capacity(last);
        for (index, (name, stage)) in self.stages.iter_mut().enumerate() {
            let input = if index == 0 { x } else { &produced[index - 1] };
            stage
                .estimator
                .fit(input, y)
                .map_err(|e| ModelDbError::estimator(e.context(format!("stage '{name}'"))))?;
            stage.refit(session);
            if index < last {
                let output = stage
                    .estimator
                    .transform(input)
                    .map_err(|e| ModelDbError::estimator(e.context(format!("stage '{name}'"))))?
                    .into_frame()?;
                produced.push(output);
            }
        }
        self.model_handle = Handle::next();
        if let Some(tag) = &self.tag {
            session.tag_handle(self.model_handle, ObjectKind::Transformer, tag.clone());
        }
        tracing::debug!(
            "[SyncablePipeline] fitted {} stage(s): {}",
            self.stages.len(),
            self.stage_names().join(" -> ")
        );

        let recording = self
            .pipeline_record(x, y, &produced)
            .map(|record| session.record(Event::Pipeline(record)));
        Ok(Intercepted::new("Pipeline.fit", (), recording))
    }

    fn pipeline_record(
        &self,
        x: &DataFrame,
        y: Option<&[f64]>,
        produced: &[DataFrame],
    ) -> Result<PipelineRecord> {
        let (frame, label_columns) = labeled_frame(x, y)?;
        let fit = FitRecord {
            spec: SpecSnapshot {
                handle: self.spec_handle,
                type_name: PIPELINE_TYPE.to_string(),
                params: self.params(),
            },
            model: ModelSnapshot {
                handle: self.model_handle,
                type_name: PIPELINE_TYPE.to_string(),
                weights: None,
            },
            frame: frame.snapshot(),
            feature_columns: x.column_names(),
            label_columns,
            prediction_columns: Vec::new(),
        };

        let mut transform_stages = Vec::with_capacity(produced.len());
        let mut fit_stages = Vec::with_capacity(self.stages.len());
        for (index, (_, stage)) in self.stages.iter().enumerate() {
            let input = if index == 0 { x } else { &produced[index - 1] };
            fit_stages.push((index, stage.fit_record(input, y)?));
            if let Some(output) = produced.get(index) {
                transform_stages.push((index, stage.transform_record(input, output)));
            }
        }

        Ok(PipelineRecord {
            fit,
            transform_stages,
            fit_stages,
        })
    }
}

impl Trackable for SyncablePipeline {
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

    struct Named(&'static str);

    impl Estimator for Named {
        fn type_name(&self) -> &str {
            self.0
        }

        fn params(&self) -> Vec<Param> {
            vec![Param::new("fit_intercept", ParamValue::Bool(true))]
        }

        fn fit(&mut self, _x: &DataFrame, _y: Option<&[f64]>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_pipeline_is_rejected() {
        let err = SyncablePipeline::new(Vec::new()).err().unwrap();
        assert!(matches!(err, ModelDbError::InvalidInput(_)));
    }

    #[test]
    fn params_are_prefixed_with_stage_name() {
        let pipeline = SyncablePipeline::new(vec![
            ("scale".to_string(), Box::new(Named("StandardScaler")) as Box<dyn Estimator>),
            ("model".to_string(), Box::new(Named("LinearRegression"))),
        ])
        .unwrap();

        let params = pipeline.params();
        assert_eq!(params[0], Param::new("steps", ParamValue::Str("scale,model".into())));
        assert_eq!(params[1].name, "scale__fit_intercept");
        assert_eq!(params[2].name, "model__fit_intercept");
        assert_eq!(pipeline.len(), 2);
    }
}
