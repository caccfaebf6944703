//! Call interceptors.
//!
//! Every interceptor runs the real operation unchanged, builds the event
//! for it, records the event into the session and hands back the real
//! result. A recording failure never replaces the real result; it is
//! logged and carried next to the result in [`Intercepted`].

mod grid_search;
mod metric;
mod pipeline;
mod split;
mod syncable;
mod table;

pub use metric::{Metric, evaluate_sync};
pub use pipeline::{PIPELINE_TYPE, SyncablePipeline};
pub use split::random_split_sync;
pub use syncable::{Intercepted, LABEL_COLUMN, PREDICTION_COLUMN, Syncable};
pub use table::{InterceptorTable, Operation};

use modeldb_core::error::Result;
use modeldb_core::frame::{Column, DataFrame};
use std::borrow::Cow;

/// Joins labels onto `x` for the fit record.
///
/// Returns the frame plus the label column names it carries (none when `x`
/// has no column names and the labels were appended positionally).
pub(crate) fn labeled_frame<'a>(
    x: &'a DataFrame,
    y: Option<&[f64]>,
) -> Result<(Cow<'a, DataFrame>, Vec<String>)> {
    let Some(y) = y else {
        return Ok((Cow::Borrowed(x), Vec::new()));
    };
    let joined = x.with_column(Column::float(LABEL_COLUMN, y.to_vec()))?;
    let label_columns = if joined.is_structured() {
        vec![LABEL_COLUMN.to_string()]
    } else {
        Vec::new()
    };
    Ok((Cow::Owned(joined), label_columns))
}
