//! Weighted single-pass cluster statistics.
//!
//! Cells are streamed once per cluster. The weighted mean is updated in
//! place (a weighted Welford update) relative to the position of the first
//! accepted cell, which keeps the accumulated values small when absolute
//! module coordinates are large compared to the cluster spread.

use siclus_core::{CellView, ModuleConditions, ModuleDesign, Result, SignalModel};

/// Raw statistics of one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterStatistics {
    /// Module all member cells belong to.
    pub module_index: u32,
    /// Position of the first accepted cell.
    pub offset: [f64; 2],
    /// Weighted mean position relative to `offset`.
    pub mean: [f64; 2],
    /// Sum of accepted cell widths per axis.
    pub width_sum: [f64; 2],
    /// Sum of accepted cell weights.
    pub total_weight: f64,
    /// Smallest accepted channel per axis.
    pub channel_min: [u32; 2],
    /// Largest accepted channel per axis.
    pub channel_max: [u32; 2],
    /// Number of cells above threshold.
    pub accepted_cells: usize,
}

impl ClusterStatistics {
    /// A cluster with no weight above threshold cannot form a measurement.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !is_positive(self.total_weight)
    }

    /// Weighted mean position in the module frame.
    #[must_use]
    pub fn position(&self) -> [f64; 2] {
        [self.mean[0] + self.offset[0], self.mean[1] + self.offset[1]]
    }

    /// Channel span per axis (`max - min`); zero for a degenerate cluster.
    #[must_use]
    pub fn channel_extent(&self) -> [u32; 2] {
        [
            self.channel_max[0].saturating_sub(self.channel_min[0]),
            self.channel_max[1].saturating_sub(self.channel_min[1]),
        ]
    }

    /// Per-axis diameter: summed widths over the number of channels spanned.
    #[must_use]
    pub fn diameters(&self) -> [f64; 2] {
        let extent = self.channel_extent();
        [
            self.width_sum[0] / (f64::from(extent[0]) + 1.0),
            self.width_sum[1] / (f64::from(extent[1]) + 1.0),
        ]
    }

    /// Per-axis variance of a position uniformly distributed over the diameter.
    #[must_use]
    pub fn variance(&self) -> [f64; 2] {
        let [d0, d1] = self.diameters();
        [d0 * d0 / 12.0, d1 * d1 / 12.0]
    }
}

/// Streaming accumulator behind [`ClusterStatistics`].
#[derive(Debug, Clone)]
pub struct ClusterAccumulator {
    stats: ClusterStatistics,
}

impl ClusterAccumulator {
    /// Starts an empty cluster on `module_index`.
    #[must_use]
    pub fn new(module_index: u32) -> Self {
        Self {
            stats: ClusterStatistics {
                module_index,
                offset: [0.0; 2],
                mean: [0.0; 2],
                width_sum: [0.0; 2],
                total_weight: 0.0,
                channel_min: [u32::MAX; 2],
                channel_max: [u32::MIN; 2],
                accepted_cells: 0,
            },
        }
    }

    /// Adds one accepted cell.
    pub fn add(&mut self, position: [f64; 2], width: [f64; 2], weight: f64, channels: [u32; 2]) {
        let s = &mut self.stats;
        if s.accepted_cells == 0 {
            s.offset = position;
        }
        s.accepted_cells += 1;
        s.total_weight += weight;

        // Only an exactly cancelled running total leaves the mean untouched.
        let factor = if s.total_weight == 0.0 {
            0.0
        } else {
            weight / s.total_weight
        };
        for axis in 0..2 {
            s.mean[axis] += (position[axis] - s.offset[axis] - s.mean[axis]) * factor;
            s.width_sum[axis] += width[axis];
            s.channel_min[axis] = s.channel_min[axis].min(channels[axis]);
            s.channel_max[axis] = s.channel_max[axis].max(channels[axis]);
        }
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn finish(self) -> ClusterStatistics {
        self.stats
    }
}

#[inline]
fn is_positive(value: f64) -> bool {
    value > 0.0
}

// NaN weights never pass.
#[inline]
fn passes_threshold(weight: f64, threshold: f64) -> bool {
    weight > threshold
}

/// Computes the statistics of the cluster made of `members`.
///
/// Each cell's weight comes from `signal`; cells whose weight does not exceed
/// the module threshold are skipped entirely. All members must belong to
/// `module_index` (checked in debug builds).
pub fn accumulate<C, S>(
    cells: &C,
    members: &[usize],
    module_index: u32,
    design: &ModuleDesign<'_>,
    conditions: &ModuleConditions,
    signal: &S,
) -> Result<ClusterStatistics>
where
    C: CellView + ?Sized,
    S: SignalModel + ?Sized,
{
    let mut acc = ClusterAccumulator::new(module_index);
    for &i in members {
        debug_assert_eq!(
            cells.module_index(i),
            module_index,
            "cluster member {i} belongs to another module"
        );

        let weight = signal.weight(cells.activation(i), conditions);
        if !passes_threshold(weight, conditions.threshold) {
            continue;
        }

        let channels = [cells.channel0(i), cells.channel1(i)];
        let (position, width) = design.position_from_cell(channels[0], channels[1])?;
        acc.add(position, width, weight, channels);
    }
    Ok(acc.finish())
}
