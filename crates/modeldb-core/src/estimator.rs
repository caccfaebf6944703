//! Capability interface over the wrapped estimator library.
//!
//! The syncer never trains anything itself. Concrete estimators implement
//! [`Estimator`] and the interceptors in `modeldb-sync` wrap them.

use crate::frame::{DataFrame, TransformOutput};
use crate::handle::Handle;
use anyhow::anyhow;
use std::fmt;

/// A configured hyperparameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    None,
}

impl ParamValue {
    /// Type name reported to the store alongside the stringified value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "str",
            Self::None => "NoneType",
        }
    }
}

/// Renders values the way the wrapped library stringifies them: integral
/// floats keep a `.0` and booleans are capitalized.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_nan() => f.write_str("nan"),
            Self::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "inf" } else { "-inf" })
            }
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 1e16 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Str(v) => f.write_str(v),
            Self::None => f.write_str("None"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The operations the syncer knows how to intercept.
///
/// `predict` and `transform` default to an error so that an estimator only
/// implements what it actually supports.
pub trait Estimator: Send {
    /// Concrete type name, e.g. `"LinearRegression"`.
    fn type_name(&self) -> &str;

    /// Configured parameters, in a stable order.
    fn params(&self) -> Vec<Param>;

    fn fit(&mut self, x: &DataFrame, y: Option<&[f64]>) -> anyhow::Result<()>;

    fn predict(&self, _x: &DataFrame) -> anyhow::Result<Vec<f64>> {
        Err(anyhow!("{} does not implement predict", self.type_name()))
    }

    fn transform(&self, _x: &DataFrame) -> anyhow::Result<TransformOutput> {
        Err(anyhow!("{} does not implement transform", self.type_name()))
    }

    /// Learned weights, when the estimator exposes them.
    fn weights(&self) -> Option<Vec<f64>> {
        None
    }
}

impl Estimator for Box<dyn Estimator> {
    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn params(&self) -> Vec<Param> {
        (**self).params()
    }

    fn fit(&mut self, x: &DataFrame, y: Option<&[f64]>) -> anyhow::Result<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, x: &DataFrame) -> anyhow::Result<Vec<f64>> {
        (**self).predict(x)
    }

    fn transform(&self, x: &DataFrame) -> anyhow::Result<TransformOutput> {
        (**self).transform(x)
    }

    fn weights(&self) -> Option<Vec<f64>> {
        (**self).weights()
    }
}

/// One fold of one candidate, as reported by a search after fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldOutcome {
    pub training_rows: Vec<usize>,
    pub validation_rows: Vec<usize>,
    pub score: f64,
    pub weights: Option<Vec<f64>>,
}

/// One parameter combination tried by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub params: Vec<Param>,
    pub folds: Vec<FoldOutcome>,
}

/// A cross-validated hyperparameter search. The search itself runs inside
/// `fit`; the syncer only reads back what was tried.
pub trait GridSearch: Estimator {
    /// Type name of the estimator being searched over.
    fn base_type_name(&self) -> &str;

    fn num_folds(&self) -> usize;

    /// Name of the scoring function used on validation folds.
    fn evaluator(&self) -> String;

    fn seed(&self) -> i64;

    /// Candidates tried during the last `fit`.
    fn candidates(&self) -> Vec<SearchCandidate>;

    /// Index into [`GridSearch::candidates`] of the winning candidate.
    fn best_index(&self) -> Option<usize>;
}

/// Identity and type of a fitted model at record time.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    pub handle: Handle,
    pub type_name: String,
    pub weights: Option<Vec<f64>>,
}

/// Identity, type and configuration of a parameter specification.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSnapshot {
    pub handle: Handle,
    pub type_name: String,
    pub params: Vec<Param>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_values_display_like_their_source() {
        assert_eq!(ParamValue::Float(0.5).to_string(), "0.5");
        assert_eq!(ParamValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ParamValue::Float(-3.0).to_string(), "-3.0");
        assert_eq!(ParamValue::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(ParamValue::Int(1).to_string(), "1");
        assert_eq!(ParamValue::Bool(true).to_string(), "True");
        assert_eq!(ParamValue::Bool(false).to_string(), "False");
        assert_eq!(ParamValue::None.to_string(), "None");
        assert_eq!(ParamValue::Str("l2".into()).type_name(), "str");
    }
}
