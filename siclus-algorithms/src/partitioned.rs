//! Partitioned connected-component labeling.
//!
//! The cell collection is cut into fixed-size contiguous partitions:
//!
//! 1. Each partition is labeled concurrently. A partition owns the slice of
//!    the parent array covering its cells and only writes there.
//! 2. Components straddling a partition edge are merged serially. Only cells
//!    at the start of a partition whose `channel1` is within one of the last
//!    cell before the edge (same module) can have neighbours across it.
//! 3. Roots are the smallest member of each component, so a prefix count of
//!    roots assigns every cluster its slot in discovery order. The result is
//!    identical to [`SparseCcl`](crate::SparseCcl) for any partition size.

use crate::ccl::{scan_earlier_neighbors, ClusterLabels};
use crate::union_find::DisjointSet;
use rayon::prelude::*;
use siclus_core::{CellView, ClusterizationConfig, Connectivity, NeighborScan};

/// Partitioned, rayon-parallel sparse CCL.
#[derive(Debug, Clone, Copy)]
pub struct PartitionedCcl {
    partition_size: usize,
    connectivity: Connectivity,
    scan: NeighborScan,
}

impl Default for PartitionedCcl {
    fn default() -> Self {
        Self::from_config(&ClusterizationConfig::default())
    }
}

impl PartitionedCcl {
    /// Creates a labeler. A partition size of zero is treated as one.
    #[must_use]
    pub fn new(partition_size: usize, connectivity: Connectivity, scan: NeighborScan) -> Self {
        Self {
            partition_size: partition_size.max(1),
            connectivity,
            scan,
        }
    }

    /// Creates a labeler from the pipeline configuration.
    #[must_use]
    pub fn from_config(config: &ClusterizationConfig) -> Self {
        Self::new(config.partition_size, config.connectivity, config.neighbor_scan)
    }

    /// Cells per partition.
    #[must_use]
    pub fn partition_size(&self) -> usize {
        self.partition_size
    }

    /// Labels every cell with its cluster.
    pub fn label<C: CellView + ?Sized>(&self, cells: &C) -> ClusterLabels {
        debug_assert!(
            self.scan == NeighborScan::Exhaustive || cells.is_clustering_ordered(),
            "cells must be sorted by module and channel1"
        );

        let n = cells.len();
        let size = self.partition_size;
        let mut parent: Vec<usize> = (0..n).collect();

        parent
            .par_chunks_mut(size)
            .enumerate()
            .for_each(|(partition, window)| {
                let start = partition * size;
                let end = start + window.len();
                let mut forest = DisjointSet::over(window, start);
                for i in start..end {
                    scan_earlier_neighbors(cells, i, start..i, self.connectivity, self.scan, |j| {
                        forest.union(i, j);
                    });
                }
            });

        let mut set = DisjointSet::from_parents(parent);
        let mut merges = 0;
        for start in (size..n).step_by(size) {
            let end = (start + size).min(n);
            merges += self.merge_boundary(cells, &mut set, start, end);
        }
        set.flatten();

        let labels = ClusterLabels::from_roots(set.parents());
        log::trace!(
            "partitioned CCL: {} cells in {} partitions, {} boundary merges -> {} clusters",
            n,
            n.div_ceil(size),
            merges,
            labels.num_clusters()
        );
        labels
    }

    /// Unites cells of partition `start..end` with their neighbours before
    /// `start`. Returns the number of unions that joined two sets.
    fn merge_boundary<C: CellView + ?Sized>(
        &self,
        cells: &C,
        set: &mut DisjointSet,
        start: usize,
        end: usize,
    ) -> usize {
        let edge = start - 1;
        let module = cells.module_index(edge);
        let reach = cells.channel1(edge).saturating_add(1);

        let mut merges = 0;
        for i in start..end {
            if cells.module_index(i) != module {
                break;
            }
            if self.scan == NeighborScan::Bounded && cells.channel1(i) > reach {
                break;
            }
            scan_earlier_neighbors(cells, i, 0..start, self.connectivity, self.scan, |j| {
                if set.union(i, j) {
                    merges += 1;
                }
            });
        }
        merges
    }
}
