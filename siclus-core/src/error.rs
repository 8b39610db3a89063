//! Error types for siclus-core.

use thiserror::Error;

/// Result type alias for siclus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for siclus operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Diameter strategy name outside the closed set.
    #[error("unknown diameter strategy: {0:?} (expected channel0, channel1, maximum or diagonal)")]
    UnknownDiameterStrategy(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Module index with no conditions entry.
    #[error("module index {index} out of range for conditions table of {len} modules")]
    ModuleOutOfRange { index: u32, len: usize },

    /// Design id with no design entry.
    #[error("design id {id} out of range for design table of {len} designs")]
    DesignOutOfRange { id: u32, len: usize },

    /// Cell channel past the last bin edge of its design.
    #[error("channel {channel} on axis {axis} out of range for {bins} bins")]
    ChannelOutOfRange { axis: usize, channel: u32, bins: usize },

    /// Malformed design entry.
    #[error("invalid design: {0}")]
    InvalidDesign(String),

    /// Label array does not cover the cell collection.
    #[error("label count {labels} does not match cell count {cells}")]
    LabelMismatch { cells: usize, labels: usize },

    /// Ordinal does not fit the measurement identifier type.
    #[error("measurement index {0} exceeds the identifier range")]
    IndexOverflow(usize),
}
