//! Measurement construction from cluster statistics.

use crate::aggregation::ClusterStatistics;
use siclus_core::{DiameterStrategy, Measurement, ModuleConditions, ModuleDesign};

/// Reduces the statistics of a non-degenerate cluster to a measurement.
///
/// `index` is the output ordinal of the cluster and becomes both the
/// identifier and the cluster index of the measurement.
#[must_use]
pub fn build_measurement(
    stats: &ClusterStatistics,
    conditions: &ModuleConditions,
    design: &ModuleDesign<'_>,
    strategy: DiameterStrategy,
    index: u32,
) -> Measurement {
    let position = stats.position();
    Measurement {
        surface_link: conditions.geometry_id,
        local_position: [
            position[0] + conditions.translation[0],
            position[1] + conditions.translation[1],
        ],
        local_variance: stats.variance(),
        identifier: index,
        cluster_index: index,
        dimensions: design.dimensions,
        subspace: design.subspace,
        diameter: strategy.apply(stats.diameters()),
    }
}
