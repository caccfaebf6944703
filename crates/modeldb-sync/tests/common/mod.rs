//! Shared fixtures for the session tests.
#![allow(dead_code)]

use anyhow::{anyhow, bail};
use modeldb_core::config::SyncerConfig;
use modeldb_core::estimator::{
    Estimator, FoldOutcome, GridSearch, Param, ParamValue, SearchCandidate,
};
use modeldb_core::frame::{Column, DataFrame, SparseMatrix, TransformOutput};
use modeldb_infrastructure::InMemoryMetadataStore;
use modeldb_sync::{SessionSlot, SyncSession};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const CONTEXT_CALLS: usize = 3;

pub struct Harness {
    pub slot: Arc<SessionSlot>,
    pub store: Arc<InMemoryMetadataStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(InMemoryMetadataStore::new())
    }

    pub fn with_store(store: InMemoryMetadataStore) -> Self {
        Self {
            slot: Arc::new(SessionSlot::new()),
            store: Arc::new(store),
        }
    }

    pub async fn open(&self) -> SyncSession {
        SyncSession::with_client(&self.slot, SyncerConfig::default(), self.store.clone())
            .await
            .unwrap()
    }

    /// Calls made after the context triple was synced.
    pub fn event_calls(&self) -> Vec<&'static str> {
        self.store.calls().split_off(CONTEXT_CALLS)
    }
}

/// 100 rows, two float features `x1`, `x2`, and `y = 2*x1 + x2`.
pub fn hundred_rows() -> (DataFrame, Vec<f64>) {
    let x1: Vec<f64> = (0..100).map(|i| i as f64).collect();
    let x2: Vec<f64> = (0..100).map(|i| (i % 7) as f64).collect();
    let y = x1.iter().zip(&x2).map(|(a, b)| 2.0 * a + b).collect();
    let frame =
        DataFrame::structured(vec![Column::float("x1", x1), Column::float("x2", x2)]).unwrap();
    (frame, y)
}

/// Predicts the mean label seen during fit.
#[derive(Debug, Default)]
pub struct LinearRegression {
    pub fit_intercept: bool,
    pub mean: Option<f64>,
}

impl Estimator for LinearRegression {
    fn type_name(&self) -> &str {
        "LinearRegression"
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("fit_intercept", ParamValue::Bool(self.fit_intercept)),
            Param::new("n_jobs", ParamValue::Int(1)),
        ]
    }

    fn fit(&mut self, _x: &DataFrame, y: Option<&[f64]>) -> anyhow::Result<()> {
        let y = y.ok_or_else(|| anyhow!("LinearRegression needs labels"))?;
        if y.is_empty() {
            bail!("no samples");
        }
        self.mean = Some(y.iter().sum::<f64>() / y.len() as f64);
        Ok(())
    }

    fn predict(&self, x: &DataFrame) -> anyhow::Result<Vec<f64>> {
        let mean = self.mean.ok_or_else(|| anyhow!("not fitted"))?;
        Ok(vec![mean; x.num_rows()])
    }

    fn weights(&self) -> Option<Vec<f64>> {
        self.mean.map(|m| vec![m])
    }
}

/// One-hot encodes the first column; transform output is sparse.
#[derive(Debug, Default)]
pub struct OneHotEncoder {
    pub categories: Vec<i64>,
}

impl Estimator for OneHotEncoder {
    fn type_name(&self) -> &str {
        "OneHotEncoder"
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("handle_unknown", ParamValue::Str("error".into()))]
    }

    fn fit(&mut self, x: &DataFrame, _y: Option<&[f64]>) -> anyhow::Result<()> {
        let rows = x.to_rows()?;
        let mut categories: Vec<i64> = rows
            .iter()
            .filter_map(|r| r.first())
            .map(|v| *v as i64)
            .collect();
        categories.sort_unstable();
        categories.dedup();
        self.categories = categories;
        Ok(())
    }

    fn transform(&self, x: &DataFrame) -> anyhow::Result<TransformOutput> {
        let rows = x.to_rows()?;
        let mut entries = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            let value = row.first().map(|v| *v as i64).unwrap_or_default();
            let c = self
                .categories
                .iter()
                .position(|category| *category == value)
                .ok_or_else(|| anyhow!("unknown category {value}"))?;
            entries.push((r, c, 1.0));
        }
        Ok(TransformOutput::Sparse(SparseMatrix {
            rows: rows.len(),
            cols: self.categories.len(),
            entries,
        }))
    }
}

/// Counts fit calls; registered under a type name the default table lacks.
#[derive(Debug, Default)]
pub struct RandomForest {
    pub fits: Arc<AtomicUsize>,
}

impl Estimator for RandomForest {
    fn type_name(&self) -> &str {
        "RandomForest"
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("max_depth", ParamValue::None)]
    }

    fn fit(&mut self, _x: &DataFrame, _y: Option<&[f64]>) -> anyhow::Result<()> {
        self.fits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A classifier whose fit always fails and whose predict returns one value
/// too many.
#[derive(Debug, Default)]
pub struct BrokenLogisticRegression;

impl Estimator for BrokenLogisticRegression {
    fn type_name(&self) -> &str {
        "LogisticRegression"
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("C", ParamValue::Float(1.0))]
    }

    fn fit(&mut self, _x: &DataFrame, _y: Option<&[f64]>) -> anyhow::Result<()> {
        bail!("solver did not converge")
    }

    fn predict(&self, x: &DataFrame) -> anyhow::Result<Vec<f64>> {
        Ok(vec![1.0; x.num_rows() + 1])
    }
}

/// Pretends to search `alpha` over two values with two folds each.
#[derive(Debug, Default)]
pub struct GridSearchCV {
    fitted_rows: usize,
}

impl Estimator for GridSearchCV {
    fn type_name(&self) -> &str {
        "GridSearchCV"
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("cv", ParamValue::Int(2))]
    }

    fn fit(&mut self, x: &DataFrame, _y: Option<&[f64]>) -> anyhow::Result<()> {
        self.fitted_rows = x.num_rows();
        Ok(())
    }

    fn weights(&self) -> Option<Vec<f64>> {
        Some(vec![0.25, 0.75])
    }
}

impl GridSearch for GridSearchCV {
    fn base_type_name(&self) -> &str {
        "LinearRegression"
    }

    fn num_folds(&self) -> usize {
        2
    }

    fn evaluator(&self) -> String {
        "r2_score".to_string()
    }

    fn seed(&self) -> i64 {
        11
    }

    fn candidates(&self) -> Vec<SearchCandidate> {
        let half = self.fitted_rows / 2;
        let first: Vec<usize> = (0..half).collect();
        let second: Vec<usize> = (half..self.fitted_rows).collect();
        [0.1, 1.0]
            .iter()
            .map(|alpha| SearchCandidate {
                params: vec![Param::new("alpha", ParamValue::Float(*alpha))],
                folds: vec![
                    FoldOutcome {
                        training_rows: first.clone(),
                        validation_rows: second.clone(),
                        score: 0.5,
                        weights: None,
                    },
                    FoldOutcome {
                        training_rows: second.clone(),
                        validation_rows: first.clone(),
                        score: 0.7,
                        weights: Some(vec![*alpha]),
                    },
                ],
            })
            .collect()
    }

    fn best_index(&self) -> Option<usize> {
        Some(1)
    }
}
