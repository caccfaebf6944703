//! Grid-search interceptor.

use super::labeled_frame;
use super::syncable::{Intercepted, Syncable};
use super::table::Operation;
use crate::session::SyncSession;
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::estimator::{Estimator, GridSearch, ModelSnapshot, SpecSnapshot};
use modeldb_core::event::{
    CrossValidationRecord, Event, FitRecord, FoldRecord, GridSearchRecord,
};
use modeldb_core::frame::DataFrame;
use modeldb_core::handle::Handle;

impl<G: GridSearch> Syncable<G> {
    /// Runs the search and records one `GridSearchCrossValidation` event:
    /// a cross-validation per candidate and a fit for the winner.
    ///
    /// Fold frames are the rows of the labeled input the search reported
    /// for training and validation.
    pub fn fit_grid_search_sync(
        &mut self,
        session: &mut SyncSession,
        x: &DataFrame,
        y: Option<&[f64]>,
    ) -> Result<Intercepted<()>> {
        session
            .interceptors()
            .ensure(self.estimator.type_name(), Operation::GridSearchFit)?;
        self.estimator.fit(x, y).map_err(ModelDbError::estimator)?;
        self.refit(session);

        let recording = self
            .grid_search_record(x, y)
            .map(|record| session.record(Event::GridSearchCrossValidation(record)));
        Ok(Intercepted::new(
            &format!("{}.fit", self.estimator.type_name()),
            (),
            recording,
        ))
    }

    fn grid_search_record(&self, x: &DataFrame, y: Option<&[f64]>) -> Result<GridSearchRecord> {
        let (frame, label_columns) = labeled_frame(x, y)?;
        let base_type = self.estimator.base_type_name().to_string();
        let candidates = self.estimator.candidates();
        let best = self
            .estimator
            .best_index()
            .filter(|index| *index < candidates.len())
            .ok_or_else(|| {
                ModelDbError::invalid_input(format!(
                    "search reported no best candidate among {}",
                    candidates.len()
                ))
            })?;

        let mut cross_validations = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let folds = candidate
                .folds
                .iter()
                .map(|fold| -> Result<FoldRecord> {
                    Ok(FoldRecord {
                        model: ModelSnapshot {
                            handle: Handle::next(),
                            type_name: base_type.clone(),
                            weights: fold.weights.clone(),
                        },
                        validation: frame.take_rows(&fold.validation_rows)?.snapshot(),
                        training: frame.take_rows(&fold.training_rows)?.snapshot(),
                        score: fold.score,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            cross_validations.push(CrossValidationRecord {
                frame: frame.snapshot(),
                spec: SpecSnapshot {
                    handle: Handle::next(),
                    type_name: base_type.clone(),
                    params: candidate.params.clone(),
                },
                seed: self.estimator.seed(),
                evaluator: self.estimator.evaluator(),
                feature_columns: x.column_names(),
                label_columns: label_columns.clone(),
                prediction_columns: Vec::new(),
                folds,
            });
        }

        let best_fit = FitRecord {
            spec: cross_validations[best].spec.clone(),
            model: ModelSnapshot {
                handle: self.model_handle,
                type_name: base_type,
                weights: self.estimator.weights(),
            },
            frame: frame.snapshot(),
            feature_columns: x.column_names(),
            label_columns,
            prediction_columns: Vec::new(),
        };

        Ok(GridSearchRecord {
            num_folds: self.estimator.num_folds(),
            best_fit,
            cross_validations,
        })
    }
}
