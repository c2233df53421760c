//! Conversion between the two sample-set layouts used throughout the crate.
//!
//! *Grouped* data holds one feature matrix per class. *Flat* data holds a
//! single matrix plus a parallel label vector. Both describe the same
//! population; converting back and forth preserves per-class row membership.

use std::collections::BTreeSet;

use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::core::errors::{LirError, Result};

/// Concatenate per-class matrices into a flat matrix with group-index labels.
///
/// Rows keep the order in which they are given; each row is labelled with the
/// position of its source matrix in `groups` (0, 1, 2, ...).
pub fn grouped_to_flat(groups: &[Array2<f64>]) -> Result<(Array2<f64>, Array1<usize>)> {
    if groups.is_empty() {
        return Err(LirError::value_constraint_field(
            "at least one group is required",
            "groups",
        ));
    }

    let n_features = groups[0].ncols();
    if let Some((index, group)) = groups
        .iter()
        .enumerate()
        .find(|(_, group)| group.ncols() != n_features)
    {
        return Err(LirError::shape_mismatch(
            "grouped_to_flat",
            format!("{n_features} features in every group"),
            format!("{} features in group {index}", group.ncols()),
        ));
    }

    let views: Vec<ArrayView2<f64>> = groups.iter().map(|group| group.view()).collect();
    let x = concatenate(Axis(0), &views).map_err(|e| {
        LirError::shape_mismatch("grouped_to_flat", "row-concatenable groups", e.to_string())
    })?;

    let y: Array1<usize> = groups
        .iter()
        .enumerate()
        .flat_map(|(index, group)| std::iter::repeat(index).take(group.nrows()))
        .collect();

    Ok((x, y))
}

/// Split a flat labelled matrix into one matrix per class.
///
/// Exactly two distinct label values are required. The result is ordered by
/// ascending label value and each matrix keeps the relative row order of `x`.
pub fn flat_to_grouped<L>(x: ArrayView2<f64>, y: ArrayView1<L>) -> Result<Vec<Array2<f64>>>
where
    L: Ord + Clone,
{
    if x.nrows() != y.len() {
        return Err(LirError::shape_mismatch(
            "flat_to_grouped",
            format!("{} labels (one per row of X)", x.nrows()),
            format!("{} labels", y.len()),
        ));
    }

    let classes: BTreeSet<&L> = y.iter().collect();
    if classes.len() != 2 {
        return Err(LirError::value_constraint_field(
            format!("expected exactly 2 distinct labels, got {}", classes.len()),
            "y",
        ));
    }

    Ok(classes
        .into_iter()
        .map(|class| {
            let rows: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|(_, label)| *label == class)
                .map(|(row, _)| row)
                .collect();
            x.select(Axis(0), &rows)
        })
        .collect())
}
