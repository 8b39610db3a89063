//! Measurement type produced by clusterization.

use crate::description::GeometryId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Local position measurement reduced from one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// Surface the measurement lies on.
    pub surface_link: GeometryId,
    /// Position in the module's local frame.
    pub local_position: [f64; 2],
    /// Variance of the local position per axis.
    pub local_variance: [f64; 2],
    /// Unique key within the collection (equal to `cluster_index`).
    pub identifier: u32,
    /// Ordinal of the source cluster in the collection.
    pub cluster_index: u32,
    /// Measurement dimensionality, 1 or 2.
    pub dimensions: u8,
    /// Sensitive local parameters.
    pub subspace: [u32; 2],
    /// Cluster size metric chosen by the diameter strategy.
    pub diameter: f64,
}

impl Measurement {
    /// Local position along `axis` with its standard deviation.
    #[must_use]
    pub fn axis(&self, axis: usize) -> (f64, f64) {
        (self.local_position[axis], self.local_variance[axis].sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_axis() {
        let m = Measurement {
            surface_link: GeometryId(3),
            local_position: [1.5, -2.0],
            local_variance: [0.25, 4.0],
            identifier: 0,
            cluster_index: 0,
            dimensions: 2,
            subspace: [0, 1],
            diameter: 1.0,
        };
        let (pos, sigma) = m.axis(1);
        assert!((pos + 2.0).abs() < f64::EPSILON);
        assert!((sigma - 2.0).abs() < f64::EPSILON);
    }
}
