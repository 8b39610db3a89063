//! Detector cell types and the columnar cell store.
//!
//! Cells are stored in Structure of Arrays (`SoA`) layout: one column per
//! field. Clusterization requires the cells to be grouped by module and,
//! within a module, ordered by `channel1` (the dominant axis). This ordering
//! lets neighbour searches stop as soon as the channel gap exceeds one.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single readout activation of a silicon sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    /// Channel address on the first local axis.
    pub channel0: u32,
    /// Channel address on the second local axis (sorting axis).
    pub channel1: u32,
    /// Signal amplitude.
    pub activation: f64,
    /// Index of the owning module in the conditions table.
    pub module_index: u32,
}

impl Cell {
    /// Creates a new cell.
    #[inline]
    #[must_use]
    pub fn new(channel0: u32, channel1: u32, activation: f64, module_index: u32) -> Self {
        Self {
            channel0,
            channel1,
            activation,
            module_index,
        }
    }

    /// Clustering sort key: module, then dominant axis, then secondary axis.
    #[inline]
    #[must_use]
    pub fn sort_key(&self) -> (u32, u32, u32) {
        (self.module_index, self.channel1, self.channel0)
    }
}

/// Read-only accessor interface over a cell collection.
///
/// Algorithms are written against this trait so that owned batches,
/// borrowed column views and plain row slices can all be clustered.
pub trait CellView: Sync {
    /// Number of cells.
    fn len(&self) -> usize;

    /// Channel on the first axis of cell `index`.
    fn channel0(&self, index: usize) -> u32;

    /// Channel on the second (dominant) axis of cell `index`.
    fn channel1(&self, index: usize) -> u32;

    /// Activation of cell `index`.
    fn activation(&self, index: usize) -> f64;

    /// Owning module of cell `index`.
    fn module_index(&self, index: usize) -> u32;

    /// Returns true if there are no cells.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reassembles cell `index` as a row.
    #[inline]
    fn cell(&self, index: usize) -> Cell {
        Cell::new(
            self.channel0(index),
            self.channel1(index),
            self.activation(index),
            self.module_index(index),
        )
    }

    /// Checks the clustering precondition: non-decreasing module index and,
    /// inside a module, non-decreasing `channel1`.
    fn is_clustering_ordered(&self) -> bool {
        (1..self.len()).all(|i| {
            let (prev_module, module) = (self.module_index(i - 1), self.module_index(i));
            prev_module < module
                || (prev_module == module && self.channel1(i - 1) <= self.channel1(i))
        })
    }
}

/// A batch of cells stored in Structure of Arrays (`SoA`) format.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellBatch {
    /// Columnar storage for first-axis channels.
    pub channel0: Vec<u32>,
    /// Columnar storage for second-axis channels.
    pub channel1: Vec<u32>,
    /// Columnar storage for activations.
    pub activation: Vec<f64>,
    /// Columnar storage for module indices.
    pub module_index: Vec<u32>,
}

impl CellBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channel0: Vec::with_capacity(capacity),
            channel1: Vec::with_capacity(capacity),
            activation: Vec::with_capacity(capacity),
            module_index: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of cells in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channel0.len()
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channel0.is_empty()
    }

    /// Clears all columns.
    pub fn clear(&mut self) {
        self.channel0.clear();
        self.channel1.clear();
        self.activation.clear();
        self.module_index.clear();
    }

    /// Appends all cells from another batch to this one.
    pub fn append(&mut self, other: &CellBatch) {
        self.channel0.extend_from_slice(&other.channel0);
        self.channel1.extend_from_slice(&other.channel1);
        self.activation.extend_from_slice(&other.activation);
        self.module_index.extend_from_slice(&other.module_index);
    }

    /// Pushes a single cell into the batch.
    pub fn push(&mut self, channel0: u32, channel1: u32, activation: f64, module_index: u32) {
        self.channel0.push(channel0);
        self.channel1.push(channel1);
        self.activation.push(activation);
        self.module_index.push(module_index);
    }

    /// Pushes a cell row into the batch.
    pub fn push_cell(&mut self, cell: Cell) {
        self.push(cell.channel0, cell.channel1, cell.activation, cell.module_index);
    }

    /// Iterates over the cells as rows.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.len()).map(|i| CellView::cell(self, i))
    }

    /// Borrows the columns as a [`CellSlice`].
    #[must_use]
    pub fn as_slice(&self) -> CellSlice<'_> {
        CellSlice {
            channel0: &self.channel0,
            channel1: &self.channel1,
            activation: &self.activation,
            module_index: &self.module_index,
        }
    }

    /// Reorders the batch into clustering order (module, `channel1`, `channel0`).
    ///
    /// The sort is stable, so duplicate addresses keep their relative order.
    pub fn sort_for_clustering(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| CellView::cell(self, i).sort_key());

        self.channel0 = order.iter().map(|&i| self.channel0[i]).collect();
        self.channel1 = order.iter().map(|&i| self.channel1[i]).collect();
        self.activation = order.iter().map(|&i| self.activation[i]).collect();
        self.module_index = order.iter().map(|&i| self.module_index[i]).collect();
    }
}

impl FromIterator<Cell> for CellBatch {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut batch = CellBatch::with_capacity(iter.size_hint().0);
        for cell in iter {
            batch.push_cell(cell);
        }
        batch
    }
}

impl CellView for CellBatch {
    #[inline]
    fn len(&self) -> usize {
        self.channel0.len()
    }

    #[inline]
    fn channel0(&self, index: usize) -> u32 {
        self.channel0[index]
    }

    #[inline]
    fn channel1(&self, index: usize) -> u32 {
        self.channel1[index]
    }

    #[inline]
    fn activation(&self, index: usize) -> f64 {
        self.activation[index]
    }

    #[inline]
    fn module_index(&self, index: usize) -> u32 {
        self.module_index[index]
    }
}

/// Borrowed view over externally owned cell columns.
///
/// All columns must have the same length.
#[derive(Debug, Clone, Copy)]
pub struct CellSlice<'a> {
    channel0: &'a [u32],
    channel1: &'a [u32],
    activation: &'a [f64],
    module_index: &'a [u32],
}

impl<'a> CellSlice<'a> {
    /// Creates a view over the given columns, or `None` if their lengths differ.
    #[must_use]
    pub fn new(
        channel0: &'a [u32],
        channel1: &'a [u32],
        activation: &'a [f64],
        module_index: &'a [u32],
    ) -> Option<Self> {
        let n = channel0.len();
        (channel1.len() == n && activation.len() == n && module_index.len() == n).then_some(Self {
            channel0,
            channel1,
            activation,
            module_index,
        })
    }
}

impl CellView for CellSlice<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.channel0.len()
    }

    #[inline]
    fn channel0(&self, index: usize) -> u32 {
        self.channel0[index]
    }

    #[inline]
    fn channel1(&self, index: usize) -> u32 {
        self.channel1[index]
    }

    #[inline]
    fn activation(&self, index: usize) -> f64 {
        self.activation[index]
    }

    #[inline]
    fn module_index(&self, index: usize) -> u32 {
        self.module_index[index]
    }
}

impl CellView for [Cell] {
    #[inline]
    fn len(&self) -> usize {
        <[Cell]>::len(self)
    }

    #[inline]
    fn channel0(&self, index: usize) -> u32 {
        self[index].channel0
    }

    #[inline]
    fn channel1(&self, index: usize) -> u32 {
        self[index].channel1
    }

    #[inline]
    fn activation(&self, index: usize) -> f64 {
        self[index].activation
    }

    #[inline]
    fn module_index(&self, index: usize) -> u32 {
        self[index].module_index
    }

    #[inline]
    fn cell(&self, index: usize) -> Cell {
        self[index]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_cell_batch_operations() {
        let mut batch = CellBatch::with_capacity(10);
        assert!(batch.is_empty());

        batch.push(10, 20, 0.5, 3);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.channel0[0], 10);
        assert_eq!(batch.module_index[0], 3);

        batch.push(11, 21, 0.7, 3);
        assert_eq!(batch.len(), 2);
        assert_eq!(CellView::cell(&batch, 1), Cell::new(11, 21, 0.7, 3));

        batch.clear();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_append_and_collect() {
        let a: CellBatch = [Cell::new(0, 0, 1.0, 0), Cell::new(1, 0, 1.0, 0)]
            .into_iter()
            .collect();
        let mut b = CellBatch::default();
        b.push(5, 5, 2.0, 1);
        b.append(&a);

        assert_eq!(b.len(), 3);
        let rows: Vec<Cell> = b.iter().collect();
        assert_eq!(rows[0], Cell::new(5, 5, 2.0, 1));
        assert_eq!(rows[2], Cell::new(1, 0, 1.0, 0));
    }

    #[test]
    fn test_ordering_check() {
        let ordered = [
            Cell::new(4, 0, 1.0, 0),
            Cell::new(0, 1, 1.0, 0),
            Cell::new(9, 0, 1.0, 1),
        ];
        assert!(ordered[..].is_clustering_ordered());

        let wrong_channel = [Cell::new(0, 2, 1.0, 0), Cell::new(0, 1, 1.0, 0)];
        assert!(!wrong_channel[..].is_clustering_ordered());

        let wrong_module = [Cell::new(0, 0, 1.0, 1), Cell::new(0, 0, 1.0, 0)];
        assert!(!wrong_module[..].is_clustering_ordered());
    }

    #[test]
    fn test_sort_for_clustering() {
        let mut batch: CellBatch = [
            Cell::new(3, 7, 0.1, 2),
            Cell::new(1, 7, 0.2, 0),
            Cell::new(0, 7, 0.3, 0),
            Cell::new(5, 2, 0.4, 0),
        ]
        .into_iter()
        .collect();
        assert!(!batch.is_clustering_ordered());

        batch.sort_for_clustering();

        assert!(batch.is_clustering_ordered());
        assert_eq!(batch.channel0, vec![5, 0, 1, 3]);
        assert_eq!(batch.channel1, vec![2, 7, 7, 7]);
        assert_eq!(batch.module_index, vec![0, 0, 0, 2]);
        assert_eq!(batch.activation, vec![0.4, 0.3, 0.2, 0.1]);
    }

    #[test]
    fn test_cell_slice_view() {
        let c0 = [1, 2];
        let c1 = [3, 4];
        let act = [0.5, 0.6];
        let module = [0, 0];
        let view = CellSlice::new(&c0, &c1, &act, &module).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.cell(1), Cell::new(2, 4, 0.6, 0));

        assert!(CellSlice::new(&c0, &c1, &act[..1], &module).is_none());
    }
}
