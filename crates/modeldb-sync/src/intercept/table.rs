//! Registration table: estimator type name → operations that are intercepted.
//!
//! Coverage is explicit. A type that is not in the table cannot be used
//! with the `*_sync` operations; supporting it is one `register` call.

use modeldb_core::error::{ModelDbError, Result};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fit,
    Predict,
    Transform,
    PipelineFit,
    GridSearchFit,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Predict => "predict",
            Self::Transform => "transform",
            Self::PipelineFit => "pipeline_fit",
            Self::GridSearchFit => "grid_search_fit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InterceptorTable {
    entries: HashMap<String, HashSet<Operation>>,
}

impl Default for InterceptorTable {
    /// Linear models, preprocessing encoders, pipelines and grid search.
    fn default() -> Self {
        let mut table = Self::empty();
        for linear in ["LogisticRegression", "LinearRegression"] {
            table.register(linear, &[Operation::Fit, Operation::Predict]);
        }
        for encoder in ["LabelEncoder", "OneHotEncoder"] {
            table.register(encoder, &[Operation::Fit, Operation::Transform]);
        }
        table.register(super::PIPELINE_TYPE, &[Operation::PipelineFit]);
        table.register("GridSearchCV", &[Operation::GridSearchFit]);
        table
    }
}

impl InterceptorTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Enables `operations` for `type_name`, in addition to any already
    /// enabled.
    pub fn register(&mut self, type_name: impl Into<String>, operations: &[Operation]) {
        self.entries
            .entry(type_name.into())
            .or_default()
            .extend(operations.iter().copied());
    }

    pub fn supports(&self, type_name: &str, operation: Operation) -> bool {
        self.entries
            .get(type_name)
            .is_some_and(|ops| ops.contains(&operation))
    }

    /// # Errors
    ///
    /// `Unsupported` if `operation` is not enabled for `type_name`.
    pub fn ensure(&self, type_name: &str, operation: Operation) -> Result<()> {
        if self.supports(type_name, operation) {
            Ok(())
        } else {
            Err(ModelDbError::unsupported(type_name, operation.as_str()))
        }
    }

    /// Registered type names, sorted.
    pub fn registered_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_enumerated_types() {
        let table = InterceptorTable::default();
        assert!(table.supports("LinearRegression", Operation::Predict));
        assert!(table.supports("OneHotEncoder", Operation::Transform));
        assert!(!table.supports("LabelEncoder", Operation::Predict));
        assert!(table.supports("Pipeline", Operation::PipelineFit));
        assert!(!table.supports("GridSearchCV", Operation::Fit));
        assert_eq!(table.registered_types().len(), 6);
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let table = InterceptorTable::default();
        let err = table.ensure("RandomForest", Operation::Fit).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(
            err.to_string(),
            "Operation 'fit' is not enabled for 'RandomForest'"
        );
    }

    #[test]
    fn register_extends_existing_entry() {
        let mut table = InterceptorTable::empty();
        table.register("StandardScaler", &[Operation::Fit]);
        table.register("StandardScaler", &[Operation::Transform]);

        assert!(table.supports("StandardScaler", Operation::Fit));
        assert!(table.supports("StandardScaler", Operation::Transform));
    }
}
