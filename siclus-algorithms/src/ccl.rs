//! Sparse connected-component labeling.
//!
//! Every cell starts as a singleton set. Scanning forward over the ordered
//! cell collection, each cell is united with every earlier adjacent cell of
//! the same module. Cells are sorted by module and then by `channel1`, so the
//! backward search stops at the first cell of another module or at the first
//! cell whose `channel1` is more than one below the current one.
//!
//! Thresholds play no role here: low-signal cells still connect their
//! neighbours and are only filtered during aggregation.

use crate::union_find::DisjointSet;
use siclus_core::{CellView, ClusterizationConfig, Connectivity, NeighborScan};
use std::ops::Range;

/// Cluster label per cell.
///
/// Labels are dense (`0..num_clusters`) and numbered in order of each
/// cluster's first cell in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterLabels {
    labels: Vec<usize>,
    num_clusters: usize,
}

impl ClusterLabels {
    /// Builds dense labels from a flattened forest whose roots are the
    /// smallest member of each set.
    ///
    /// Each root is a cluster seed; the running count of seeds gives every
    /// cluster its output slot.
    #[must_use]
    pub fn from_roots(roots: &[usize]) -> Self {
        let mut labels = Vec::with_capacity(roots.len());
        let mut num_clusters = 0;
        for (i, &root) in roots.iter().enumerate() {
            if root == i {
                labels.push(num_clusters);
                num_clusters += 1;
            } else {
                debug_assert!(root < i, "root must precede its members");
                labels.push(labels[root]);
            }
        }
        Self {
            labels,
            num_clusters,
        }
    }

    /// Wraps labels produced elsewhere. The cluster count is one past the
    /// largest label.
    #[must_use]
    pub fn from_labels(labels: Vec<usize>) -> Self {
        let num_clusters = labels.iter().max().map_or(0, |&max| max + 1);
        Self {
            labels,
            num_clusters,
        }
    }

    /// Label of every cell.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of distinct clusters.
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Number of labeled cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if no cells were labeled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Calls `f` with every cell in `range` (searched backwards) that is
/// adjacent to cell `i`.
///
/// The search ends at the first cell of another module. With
/// [`NeighborScan::Bounded`] it also ends at the first cell whose `channel1`
/// is more than one below that of cell `i`.
#[inline]
pub(crate) fn scan_earlier_neighbors<C, F>(
    cells: &C,
    i: usize,
    range: Range<usize>,
    connectivity: Connectivity,
    scan: NeighborScan,
    mut f: F,
) where
    C: CellView + ?Sized,
    F: FnMut(usize),
{
    let module = cells.module_index(i);
    let address = (cells.channel0(i), cells.channel1(i));

    for j in range.rev() {
        if cells.module_index(j) != module {
            break;
        }
        let channel1 = cells.channel1(j);
        if scan == NeighborScan::Bounded && address.1 > channel1.saturating_add(1) {
            break;
        }
        if connectivity.is_adjacent((cells.channel0(j), channel1), address) {
            f(j);
        }
    }
}

/// Sequential sparse CCL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseCcl {
    connectivity: Connectivity,
    scan: NeighborScan,
}

impl SparseCcl {
    /// Creates a labeler.
    #[must_use]
    pub fn new(connectivity: Connectivity, scan: NeighborScan) -> Self {
        Self { connectivity, scan }
    }

    /// Creates a labeler from the pipeline configuration.
    #[must_use]
    pub fn from_config(config: &ClusterizationConfig) -> Self {
        Self::new(config.connectivity, config.neighbor_scan)
    }

    /// Labels every cell with its cluster.
    ///
    /// Cells must be grouped by module; with [`NeighborScan::Bounded`] they
    /// must also be ordered by `channel1` within a module. This is checked in
    /// debug builds only.
    pub fn label<C: CellView + ?Sized>(&self, cells: &C) -> ClusterLabels {
        debug_assert!(
            self.scan == NeighborScan::Exhaustive || cells.is_clustering_ordered(),
            "cells must be sorted by module and channel1"
        );

        let mut set = DisjointSet::new(cells.len());
        for i in 0..cells.len() {
            scan_earlier_neighbors(cells, i, 0..i, self.connectivity, self.scan, |j| {
                set.union(i, j);
            });
        }
        set.flatten();

        let labels = ClusterLabels::from_roots(set.parents());
        log::trace!(
            "sparse CCL: {} cells -> {} clusters",
            cells.len(),
            labels.num_clusters()
        );
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siclus_core::Cell;

    fn sorted(mut cells: Vec<Cell>) -> Vec<Cell> {
        cells.sort_by_key(Cell::sort_key);
        cells
    }

    #[test]
    fn test_single_cluster() {
        let cells = sorted(vec![
            Cell::new(0, 0, 1.0, 0),
            Cell::new(1, 0, 1.0, 0),
            Cell::new(1, 1, 1.0, 0),
        ]);
        let labels = SparseCcl::default().label(&cells[..]);
        assert_eq!(labels.num_clusters(), 1);
        assert_eq!(labels.labels(), &[0, 0, 0]);
    }

    #[test]
    fn test_separate_clusters() {
        let cells = sorted(vec![
            Cell::new(0, 0, 1.0, 0),
            Cell::new(1, 0, 1.0, 0),
            Cell::new(100, 100, 1.0, 0),
            Cell::new(101, 100, 1.0, 0),
        ]);
        let labels = SparseCcl::default().label(&cells[..]);
        assert_eq!(labels.num_clusters(), 2);
        assert_eq!(labels.labels(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_modules_never_merge() {
        let cells = vec![Cell::new(3, 3, 1.0, 0), Cell::new(3, 3, 1.0, 1)];
        let labels = SparseCcl::default().label(&cells[..]);
        assert_eq!(labels.labels(), &[0, 1]);
    }

    #[test]
    fn test_diagonal_needs_eight_connectivity() {
        let cells = sorted(vec![Cell::new(0, 0, 1.0, 0), Cell::new(1, 1, 1.0, 0)]);
        assert_eq!(SparseCcl::default().label(&cells[..]).num_clusters(), 1);

        let four = SparseCcl::new(Connectivity::Four, NeighborScan::Bounded);
        assert_eq!(four.label(&cells[..]).num_clusters(), 2);
    }

    #[test]
    fn test_late_bridge_merges_earlier_components() {
        // Two arms that only meet at the top row.
        let cells = sorted(vec![
            Cell::new(0, 0, 1.0, 0),
            Cell::new(4, 0, 1.0, 0),
            Cell::new(0, 1, 1.0, 0),
            Cell::new(4, 1, 1.0, 0),
            Cell::new(1, 2, 1.0, 0),
            Cell::new(2, 2, 1.0, 0),
            Cell::new(3, 2, 1.0, 0),
        ]);
        let labels = SparseCcl::default().label(&cells[..]);
        assert_eq!(labels.num_clusters(), 1);
    }

    #[test]
    fn test_bounded_matches_exhaustive() {
        let cells = sorted(
            (0..60u32)
                .map(|k| Cell::new((k * 7) % 13, (k * 5) % 11, 1.0, k / 20))
                .collect(),
        );
        let bounded = SparseCcl::new(Connectivity::Eight, NeighborScan::Bounded).label(&cells[..]);
        let exhaustive =
            SparseCcl::new(Connectivity::Eight, NeighborScan::Exhaustive).label(&cells[..]);
        assert_eq!(bounded, exhaustive);
    }

    #[test]
    fn test_exhaustive_tolerates_channel_disorder() {
        // channel1 decreases inside the module; bounded search would stop early.
        let cells = vec![
            Cell::new(0, 5, 1.0, 0),
            Cell::new(0, 0, 1.0, 0),
            Cell::new(0, 4, 1.0, 0),
        ];
        let exhaustive =
            SparseCcl::new(Connectivity::Eight, NeighborScan::Exhaustive).label(&cells[..]);
        assert_eq!(exhaustive.labels(), &[0, 1, 0]);
    }

    #[test]
    fn test_from_labels() {
        let labels = ClusterLabels::from_labels(vec![2, 0, 2]);
        assert_eq!(labels.num_clusters(), 3);
        assert_eq!(labels.len(), 3);
        assert!(ClusterLabels::from_labels(Vec::new()).is_empty());
    }
}
