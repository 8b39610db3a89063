//! siclus-core: Core types for silicon detector clusterization.
//!
//! This crate provides the cell store, the module description tables,
//! the measurement record, pipeline configuration and the signal
//! modelling hook shared by the algorithm crates.
//!

pub mod cell;
pub mod config;
pub mod description;
pub mod error;
pub mod measurement;
pub mod signal;

pub use cell::{Cell, CellBatch, CellSlice, CellView};
pub use config::{
    ClusterizationConfig, Connectivity, DiameterStrategy, ExecutionModel, NeighborScan,
};
pub use description::{
    ConditionsTable, ConditionsView, DesignEntry, DesignTable, DesignView, GeometryId,
    ModuleConditions, ModuleDesign,
};
pub use error::{Error, Result};
pub use measurement::Measurement;
pub use signal::{IdentitySignal, SignalModel};
