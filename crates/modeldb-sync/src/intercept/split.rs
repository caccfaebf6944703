//! Seeded random split of a frame's rows.

use super::syncable::Intercepted;
use crate::session::SyncSession;
use modeldb_core::error::{ModelDbError, Result};
use modeldb_core::event::{Event, RandomSplitRecord};
use modeldb_core::frame::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Splits `frame` into one frame per weight and records a `RandomSplit`
/// event. The same seed always yields the same splits. Rows keep their
/// original order inside each split.
///
/// # Errors
///
/// `InvalidInput` if `weights` is empty, has a negative or non-finite
/// entry, or sums to zero.
pub fn random_split_sync(
    session: &mut SyncSession,
    frame: &DataFrame,
    weights: &[f64],
    seed: i64,
) -> Result<Intercepted<Vec<DataFrame>>> {
    let splits = split_rows(frame.num_rows(), weights, seed)?
        .iter()
        .map(|rows| frame.take_rows(rows))
        .collect::<Result<Vec<_>>>()?;

    session.record(Event::RandomSplit(RandomSplitRecord {
        input: frame.snapshot(),
        weights: weights.to_vec(),
        seed,
        splits: splits.iter().map(DataFrame::snapshot).collect(),
    }));
    Ok(Intercepted::new("random_split", splits, Ok(())))
}

/// Row indices per split. Split sizes follow the cumulative weights, so
/// every row lands in exactly one split.
fn split_rows(num_rows: usize, weights: &[f64], seed: i64) -> Result<Vec<Vec<usize>>> {
    if weights.is_empty() {
        return Err(ModelDbError::invalid_input("random split needs at least one weight"));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ModelDbError::invalid_input(format!(
            "split weights must be finite and non-negative: {weights:?}"
        )));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(ModelDbError::invalid_input("split weights sum to zero"));
    }

    let mut order: Vec<usize> = (0..num_rows).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed as u64));

    let mut splits = Vec::with_capacity(weights.len());
    let mut cumulative = 0.0;
    let mut start = 0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        let end = if index + 1 == weights.len() {
            num_rows
        } else {
            let boundary = ((cumulative / total) * num_rows as f64).round() as usize;
            boundary.clamp(start, num_rows)
        };
        let mut rows = order[start..end].to_vec();
        rows.sort_unstable();
        splits.push(rows);
        start = end;
    }
    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_row_lands_in_exactly_one_split() {
        let splits = split_rows(10, &[0.7, 0.3], 42).unwrap();
        assert_eq!(splits[0].len(), 7);
        assert_eq!(splits[1].len(), 3);

        let mut all: Vec<usize> = splits.concat();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        let first = split_rows(50, &[1.0, 1.0, 2.0], 7).unwrap();
        let second = split_rows(50, &[1.0, 1.0, 2.0], 7).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|rows| rows.windows(2).all(|w| w[0] < w[1])));
    }

    #[test]
    fn bad_weights_are_rejected() {
        assert!(split_rows(5, &[], 0).is_err());
        assert!(split_rows(5, &[0.0, 0.0], 0).is_err());
        assert!(split_rows(5, &[1.0, -1.0], 0).is_err());
        assert!(split_rows(5, &[f64::NAN], 0).is_err());
    }

    #[test]
    fn empty_frame_yields_empty_splits() {
        let splits = split_rows(0, &[0.5, 0.5], 1).unwrap();
        assert!(splits.iter().all(Vec::is_empty));
    }
}
