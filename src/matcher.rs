//! Matching of integer object IDs between two independently produced catalogues.
//!
//! The longer sequence is sorted through an index permutation (the input is
//! never reordered) and every element of the shorter one is located in it by
//! binary search. Elements present in only one input are dropped silently.
//!
//! IDs are expected to be unique within each input. With duplicates the
//! result is outside the contract; what currently happens is:
//! * a value repeated in the longer input matches its occurrence with the
//!   smallest original index (stable sort plus lower-bound search),
//! * a value repeated in the shorter input yields one pair per occurrence.

use crate::error::{CatalogueError, Result};

/// Match two ID sequences.
///
/// Returns `(indices_first, indices_second)` of equal length such that
/// `first[indices_first[k]] == second[indices_second[k]]` for every `k`. Pairs
/// come out in the order the shorter sequence is scanned (its original order).
/// When both inputs have the same length, `first` plays the role of the longer one.
///
/// With `assume_sorted` the caller asserts both inputs are already ascending,
/// which skips the sort. The assertion is verified and an unsorted input
/// fails with [`CatalogueError::MatchPrecondition`] rather than producing
/// arbitrary pairs. If either input is empty the result is empty and
/// nothing is checked.
pub fn match_ids(
    first: &[i64],
    second: &[i64],
    assume_sorted: bool,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let first_is_long = first.len() >= second.len();
    let (long, short) = if first_is_long {
        (first, second)
    } else {
        (second, first)
    };

    if short.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    if assume_sorted {
        check_sorted(first, "first")?;
        check_sorted(second, "second")?;
    }

    let order = if assume_sorted {
        (0..long.len()).collect()
    } else {
        sort_permutation(long)
    };

    let mut long_matches = Vec::with_capacity(short.len());
    let mut short_matches = Vec::with_capacity(short.len());

    for (short_idx, &id) in short.iter().enumerate() {
        let pos = order.partition_point(|&i| long[i] < id);
        if let Some(&long_idx) = order.get(pos) {
            if long[long_idx] == id {
                long_matches.push(long_idx);
                short_matches.push(short_idx);
            }
        }
    }

    log::debug!(
        "matched {} of {} IDs against {} candidates",
        short_matches.len(),
        short.len(),
        long.len()
    );

    if first_is_long {
        Ok((long_matches, short_matches))
    } else {
        Ok((short_matches, long_matches))
    }
}

/// Indices that visit `ids` in ascending order; ties keep their original order.
fn sort_permutation(ids: &[i64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ids.len()).collect();
    order.sort_by_key(|&i| ids[i]);
    order
}

fn check_sorted(ids: &[i64], sequence: &'static str) -> Result<()> {
    match ids.windows(2).position(|w| w[0] > w[1]) {
        Some(pos) => Err(CatalogueError::MatchPrecondition {
            sequence,
            position: pos + 1,
        }),
        None => Ok(()),
    }
}
