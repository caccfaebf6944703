//! In-memory frames passed to estimators and recorded by the syncer.
//!
//! A frame is either `Structured` (named, typed columns) or `Unstructured`
//! (bare numeric rows without column names). Anything else an estimator
//! produces, dense or sparse matrices, is normalized into a structured
//! frame once at the boundary via [`TransformOutput::to_frame`].

use crate::error::{ModelDbError, Result};
use crate::handle::{Handle, ObjectKind, Trackable};
use std::collections::HashSet;

/// Values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display form of the column dtype, as the store expects it.
    pub fn dtype(&self) -> &'static str {
        match self {
            Self::Int(_) => "int64",
            Self::Float(_) => "float64",
            Self::Bool(_) => "bool",
            Self::Str(_) => "object",
        }
    }

    /// Numeric view of the column. String columns have none.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            Self::Int(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Self::Float(v) => Some(v.clone()),
            Self::Bool(v) => Some(v.iter().map(|x| if *x { 1.0 } else { 0.0 }).collect()),
            Self::Str(_) => None,
        }
    }

    fn take(&self, rows: &[usize]) -> Self {
        fn pick<T: Clone>(values: &[T], rows: &[usize]) -> Vec<T> {
            rows.iter().map(|r| values[*r].clone()).collect()
        }
        match self {
            Self::Int(v) => Self::Int(pick(v, rows)),
            Self::Float(v) => Self::Float(pick(v, rows)),
            Self::Bool(v) => Self::Bool(pick(v, rows)),
            Self::Str(v) => Self::Str(pick(v, rows)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn float(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnValues::Float(values))
    }

    pub fn int(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(name, ColumnValues::Int(values))
    }
}

/// The two shapes a frame can take.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameData {
    Structured { columns: Vec<Column> },
    Unstructured { rows: Vec<Vec<f64>> },
}

/// A tracked table of values.
///
/// Cloning a frame yields a *different* object with its own handle; share a
/// frame by reference when the same identity is meant.
#[derive(Debug)]
pub struct DataFrame {
    handle: Handle,
    data: FrameData,
}

impl Clone for DataFrame {
    fn clone(&self) -> Self {
        Self {
            handle: Handle::next(),
            data: self.data.clone(),
        }
    }
}

impl Trackable for DataFrame {
    fn handle(&self) -> Handle {
        self.handle
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::DataFrame
    }
}

impl DataFrame {
    /// Builds a structured frame. Columns must have equal length and
    /// distinct names.
    pub fn structured(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ModelDbError::schema(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(ModelDbError::schema(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.values.len(),
                    expected
                )));
            }
        }
        Ok(Self {
            handle: Handle::next(),
            data: FrameData::Structured { columns },
        })
    }

    /// Builds a frame from bare rows that carry no column names.
    pub fn unstructured(rows: Vec<Vec<f64>>) -> Self {
        Self {
            handle: Handle::next(),
            data: FrameData::Unstructured { rows },
        }
    }

    /// Normalizes a dense matrix into a structured frame with columns
    /// named `"0".."n-1"`.
    pub fn from_dense(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((index, _)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ModelDbError::schema(format!(
                "row {} has {} values, expected {}",
                index,
                rows[index].len(),
                width
            )));
        }
        let columns = (0..width)
            .map(|c| Column::float(c.to_string(), rows.iter().map(|r| r[c]).collect()))
            .collect();
        Self::structured(columns)
    }

    pub fn data(&self) -> &FrameData {
        &self.data
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.data, FrameData::Structured { .. })
    }

    pub fn num_rows(&self) -> usize {
        match &self.data {
            FrameData::Structured { columns } => columns.first().map_or(0, |c| c.values.len()),
            FrameData::Unstructured { rows } => rows.len(),
        }
    }

    /// Column names; empty for unstructured frames.
    pub fn column_names(&self) -> Vec<String> {
        match &self.data {
            FrameData::Structured { columns } => columns.iter().map(|c| c.name.clone()).collect(),
            FrameData::Unstructured { .. } => Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        match &self.data {
            FrameData::Structured { columns } => columns.iter().find(|c| c.name == name),
            FrameData::Unstructured { .. } => None,
        }
    }

    /// `(name, dtype)` pairs; empty for unstructured frames.
    pub fn schema(&self) -> Vec<(String, &'static str)> {
        match &self.data {
            FrameData::Structured { columns } => columns
                .iter()
                .map(|c| (c.name.clone(), c.values.dtype()))
                .collect(),
            FrameData::Unstructured { .. } => Vec::new(),
        }
    }

    /// Returns a new frame with `column` appended.
    ///
    /// Structured frames join the column by name. Unstructured frames have
    /// no names to join on, so the values are appended to every row and the
    /// name is dropped; only numeric columns can be appended that way.
    pub fn with_column(&self, column: Column) -> Result<DataFrame> {
        if column.values.len() != self.num_rows() {
            return Err(ModelDbError::schema(format!(
                "cannot append '{}' with {} rows to a frame with {} rows",
                column.name,
                column.values.len(),
                self.num_rows()
            )));
        }
        match &self.data {
            FrameData::Structured { columns } => {
                let mut joined = columns.clone();
                joined.push(column);
                DataFrame::structured(joined)
            }
            FrameData::Unstructured { rows } => {
                let values = column.values.as_f64().ok_or_else(|| {
                    ModelDbError::schema(format!(
                        "cannot append non-numeric column '{}' to a frame without column names",
                        column.name
                    ))
                })?;
                let appended = rows
                    .iter()
                    .zip(values)
                    .map(|(row, value)| {
                        let mut row = row.clone();
                        row.push(value);
                        row
                    })
                    .collect();
                Ok(DataFrame::unstructured(appended))
            }
        }
    }

    /// Returns a new frame holding only `rows`, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Result<DataFrame> {
        let total = self.num_rows();
        if let Some(bad) = rows.iter().find(|r| **r >= total) {
            return Err(ModelDbError::invalid_input(format!(
                "row index {} out of range for {} rows",
                bad, total
            )));
        }
        match &self.data {
            FrameData::Structured { columns } => DataFrame::structured(
                columns
                    .iter()
                    .map(|c| Column::new(c.name.clone(), c.values.take(rows)))
                    .collect(),
            ),
            FrameData::Unstructured { rows: data } => Ok(DataFrame::unstructured(
                rows.iter().map(|r| data[*r].clone()).collect(),
            )),
        }
    }

    /// Row-major numeric view, for estimators that want a plain matrix.
    pub fn to_rows(&self) -> Result<Vec<Vec<f64>>> {
        match &self.data {
            FrameData::Unstructured { rows } => Ok(rows.clone()),
            FrameData::Structured { columns } => {
                let numeric = columns
                    .iter()
                    .map(|c| {
                        c.values.as_f64().ok_or_else(|| {
                            ModelDbError::schema(format!("column '{}' is not numeric", c.name))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((0..self.num_rows())
                    .map(|r| numeric.iter().map(|c| c[r]).collect())
                    .collect())
            }
        }
    }

    /// Captures what the converter needs, detached from the data.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            handle: self.handle,
            schema: self
                .schema()
                .into_iter()
                .map(|(name, dtype)| (name, dtype.to_string()))
                .collect(),
            num_rows: self.num_rows(),
        }
    }
}

/// Shape and identity of a frame at the moment an event was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub handle: Handle,
    pub schema: Vec<(String, String)>,
    pub num_rows: usize,
}

impl FrameSnapshot {
    pub fn column_names(&self) -> Vec<String> {
        self.schema.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Sparse matrix in coordinate form.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    pub rows: usize,
    pub cols: usize,
    pub entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
    pub fn to_dense(&self) -> Result<Vec<Vec<f64>>> {
        let mut dense = vec![vec![0.0; self.cols]; self.rows];
        for (r, c, value) in &self.entries {
            if *r >= self.rows || *c >= self.cols {
                return Err(ModelDbError::schema(format!(
                    "sparse entry ({}, {}) outside {}x{} matrix",
                    r, c, self.rows, self.cols
                )));
            }
            dense[*r][*c] = *value;
        }
        Ok(dense)
    }
}

/// What a `transform` call can hand back.
#[derive(Debug, Clone)]
pub enum TransformOutput {
    Frame(DataFrame),
    Dense(Vec<Vec<f64>>),
    Sparse(SparseMatrix),
}

impl TransformOutput {
    /// Normalizes the output into a structured frame; sparse outputs are
    /// densified first. A frame output is returned as-is so its identity is
    /// preserved.
    pub fn to_frame(&self) -> Result<std::borrow::Cow<'_, DataFrame>> {
        use std::borrow::Cow;
        match self {
            Self::Frame(frame) => Ok(Cow::Borrowed(frame)),
            Self::Dense(rows) => Ok(Cow::Owned(DataFrame::from_dense(rows)?)),
            Self::Sparse(matrix) => Ok(Cow::Owned(DataFrame::from_dense(&matrix.to_dense()?)?)),
        }
    }

    /// Like [`TransformOutput::to_frame`], consuming the output.
    pub fn into_frame(self) -> Result<DataFrame> {
        match self {
            Self::Frame(frame) => Ok(frame),
            Self::Dense(rows) => DataFrame::from_dense(&rows),
            Self::Sparse(matrix) => DataFrame::from_dense(&matrix.to_dense()?),
        }
    }
}
