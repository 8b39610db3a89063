//! Clusterization configuration.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Policy for collapsing the two per-axis cluster diameters into one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum DiameterStrategy {
    /// Diameter along the first axis.
    Channel0,
    /// Diameter along the second axis.
    Channel1,
    /// Larger of the two axis diameters.
    #[default]
    Maximum,
    /// Euclidean norm of the two axis diameters.
    Diagonal,
}

impl DiameterStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [DiameterStrategy; 4] = [
        DiameterStrategy::Channel0,
        DiameterStrategy::Channel1,
        DiameterStrategy::Maximum,
        DiameterStrategy::Diagonal,
    ];

    /// Collapses per-axis diameters into the measurement diameter.
    #[inline]
    #[must_use]
    pub fn apply(self, diameters: [f64; 2]) -> f64 {
        let [d0, d1] = diameters;
        match self {
            DiameterStrategy::Channel0 => d0,
            DiameterStrategy::Channel1 => d1,
            DiameterStrategy::Maximum => d0.max(d1),
            DiameterStrategy::Diagonal => d0.hypot(d1),
        }
    }

    /// Lowercase configuration name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DiameterStrategy::Channel0 => "channel0",
            DiameterStrategy::Channel1 => "channel1",
            DiameterStrategy::Maximum => "maximum",
            DiameterStrategy::Diagonal => "diagonal",
        }
    }
}

impl fmt::Display for DiameterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiameterStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownDiameterStrategy(s.to_string()))
    }
}

/// How the labeling and aggregation phases are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ExecutionModel {
    /// Single-threaded forward scan.
    #[default]
    Sequential,
    /// Fixed-size contiguous partitions processed concurrently.
    Partitioned,
}

/// Which channel-space neighbours count as adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Connectivity {
    /// Edge and corner neighbours.
    #[default]
    Eight,
    /// Edge neighbours only.
    Four,
}

impl Connectivity {
    /// Checks whether two channel addresses on the same module are adjacent.
    #[inline]
    #[must_use]
    pub fn is_adjacent(self, a: (u32, u32), b: (u32, u32)) -> bool {
        let d0 = a.0.abs_diff(b.0);
        let d1 = a.1.abs_diff(b.1);
        match self {
            Connectivity::Eight => d0 <= 1 && d1 <= 1,
            Connectivity::Four => d0 + d1 <= 1,
        }
    }
}

/// Neighbour search strategy of the labeler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum NeighborScan {
    /// Stop scanning once the `channel1` gap exceeds one (requires ordered cells).
    #[default]
    Bounded,
    /// Compare against every earlier cell of the same module.
    Exhaustive,
}

/// Configuration for the clusterization pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ClusterizationConfig {
    /// Diameter collapse policy.
    pub diameter_strategy: DiameterStrategy,
    /// Execution model.
    pub execution: ExecutionModel,
    /// Cells per partition (partitioned model only).
    pub partition_size: usize,
    /// Adjacency definition.
    pub connectivity: Connectivity,
    /// Neighbour search strategy.
    pub neighbor_scan: NeighborScan,
}

impl Default for ClusterizationConfig {
    fn default() -> Self {
        Self {
            diameter_strategy: DiameterStrategy::Maximum,
            execution: ExecutionModel::Sequential,
            partition_size: 1024,
            connectivity: Connectivity::Eight,
            neighbor_scan: NeighborScan::Bounded,
        }
    }
}

impl ClusterizationConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the diameter strategy.
    #[must_use]
    pub fn with_diameter_strategy(mut self, strategy: DiameterStrategy) -> Self {
        self.diameter_strategy = strategy;
        self
    }

    /// Sets the execution model.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionModel) -> Self {
        self.execution = execution;
        self
    }

    /// Selects the partitioned model with the given partition size.
    #[must_use]
    pub fn partitioned(mut self, partition_size: usize) -> Self {
        self.execution = ExecutionModel::Partitioned;
        self.partition_size = partition_size;
        self
    }

    /// Sets the adjacency definition.
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Sets the neighbour search strategy.
    #[must_use]
    pub fn with_neighbor_scan(mut self, scan: NeighborScan) -> Self {
        self.neighbor_scan = scan;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.partition_size == 0 {
            return Err(Error::ConfigError(
                "partition_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_diameter_strategy_selection() {
        let diameters = [2.0, 6.0];
        assert_eq!(DiameterStrategy::Channel0.apply(diameters), 2.0);
        assert_eq!(DiameterStrategy::Channel1.apply(diameters), 6.0);
        assert_eq!(DiameterStrategy::Maximum.apply(diameters), 6.0);
        assert!((DiameterStrategy::Diagonal.apply(diameters) - 40.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_diameter_strategy_parse() {
        assert_eq!(
            "channel0".parse::<DiameterStrategy>().unwrap(),
            DiameterStrategy::Channel0
        );
        assert_eq!(
            "MAXIMUM".parse::<DiameterStrategy>().unwrap(),
            DiameterStrategy::Maximum
        );
        assert_eq!(
            " Diagonal ".parse::<DiameterStrategy>().unwrap(),
            DiameterStrategy::Diagonal
        );
        assert_eq!(
            "median".parse::<DiameterStrategy>().unwrap_err(),
            Error::UnknownDiameterStrategy("median".to_string())
        );
        for strategy in DiameterStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<DiameterStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_connectivity() {
        assert!(Connectivity::Eight.is_adjacent((5, 5), (6, 6)));
        assert!(Connectivity::Eight.is_adjacent((5, 5), (5, 5)));
        assert!(!Connectivity::Eight.is_adjacent((5, 5), (7, 5)));
        assert!(Connectivity::Four.is_adjacent((5, 5), (5, 4)));
        assert!(!Connectivity::Four.is_adjacent((5, 5), (6, 6)));
    }

    #[test]
    fn test_clusterization_config() {
        let config = ClusterizationConfig::new()
            .with_diameter_strategy(DiameterStrategy::Diagonal)
            .partitioned(64)
            .with_connectivity(Connectivity::Four)
            .with_neighbor_scan(NeighborScan::Exhaustive);

        assert_eq!(config.diameter_strategy, DiameterStrategy::Diagonal);
        assert_eq!(config.execution, ExecutionModel::Partitioned);
        assert_eq!(config.partition_size, 64);
        assert!(config.validate().is_ok());

        let zero = ClusterizationConfig::new().partitioned(0);
        assert!(matches!(zero.validate(), Err(Error::ConfigError(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_rejects_unknown_strategy() {
        let config: ClusterizationConfig =
            serde_json::from_str(r#"{"diameter_strategy": "channel1", "partition_size": 8}"#)
                .unwrap();
        assert_eq!(config.diameter_strategy, DiameterStrategy::Channel1);
        assert_eq!(config.execution, ExecutionModel::Sequential);

        let unknown = serde_json::from_str::<ClusterizationConfig>(
            r#"{"diameter_strategy": "average"}"#,
        );
        assert!(unknown.is_err());
    }
}
