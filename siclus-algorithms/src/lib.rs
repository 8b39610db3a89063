//! siclus-algorithms: Clusterization of silicon detector cells.
//!
//! This crate provides:
//! - **Union-find** arena over cell indices
//! - **Sparse CCL**, sequential and partitioned (rayon)
//! - **Aggregation** of weighted cluster statistics
//! - **Measurement** creation and the full pipeline
//!
#![warn(missing_docs)]

mod aggregation;
mod ccl;
mod cluster;
mod measurement;
mod partitioned;
mod processing;
pub mod union_find;

pub use aggregation::{accumulate, ClusterAccumulator, ClusterStatistics};
pub use ccl::{ClusterLabels, SparseCcl};
pub use cluster::ClusterIndex;
pub use measurement::build_measurement;
pub use partitioned::PartitionedCcl;
pub use processing::{clusterize, Clusterization, ClusterizationSummary};
pub use union_find::DisjointSet;

// Re-export the configuration types the pipeline is driven by
pub use siclus_core::{ClusterizationConfig, DiameterStrategy, ExecutionModel};
