//! Explicit cluster membership lists.

use crate::ccl::ClusterLabels;

/// Cell indices of every cluster, stored compressed: the members of cluster
/// `k` are `cell_indices[offsets[k]..offsets[k + 1]]`, in ascending cell order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIndex {
    offsets: Vec<usize>,
    cell_indices: Vec<usize>,
}

impl Default for ClusterIndex {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            cell_indices: Vec::new(),
        }
    }
}

impl ClusterIndex {
    /// Groups cells by label with a counting sort.
    #[must_use]
    pub fn from_labels(labels: &ClusterLabels) -> Self {
        let mut offsets = vec![0usize; labels.num_clusters() + 1];
        for &label in labels.labels() {
            offsets[label + 1] += 1;
        }
        for k in 0..labels.num_clusters() {
            offsets[k + 1] += offsets[k];
        }

        let mut cursor = offsets.clone();
        let mut cell_indices = vec![0usize; labels.len()];
        for (cell, &label) in labels.labels().iter().enumerate() {
            cell_indices[cursor[label]] = cell;
            cursor[label] += 1;
        }

        Self {
            offsets,
            cell_indices,
        }
    }

    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns true if there are no clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Member cells of cluster `k`.
    #[must_use]
    pub fn cluster(&self, k: usize) -> &[usize] {
        &self.cell_indices[self.offsets[k]..self.offsets[k + 1]]
    }

    /// Iterates over the member lists in label order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[usize]> + '_ {
        self.offsets
            .windows(2)
            .map(|w| &self.cell_indices[w[0]..w[1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping() {
        let labels = ClusterLabels::from_labels(vec![0, 1, 0, 2, 1, 0]);
        let index = ClusterIndex::from_labels(&labels);

        assert_eq!(index.len(), 3);
        assert_eq!(index.cluster(0), &[0, 2, 5]);
        assert_eq!(index.cluster(1), &[1, 4]);
        assert_eq!(index.cluster(2), &[3]);

        let sizes: Vec<usize> = index.iter().map(<[usize]>::len).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
    }

    #[test]
    fn test_gap_in_labels_gives_empty_cluster() {
        let labels = ClusterLabels::from_labels(vec![2, 0]);
        let index = ClusterIndex::from_labels(&labels);
        assert_eq!(index.len(), 3);
        assert!(index.cluster(1).is_empty());
    }

    #[test]
    fn test_empty() {
        let index = ClusterIndex::from_labels(&ClusterLabels::default());
        assert!(index.is_empty());
        assert_eq!(index, ClusterIndex::default());
    }
}
