//! siclus-io: Event file reading and measurement writing.
//!
//! Events are self-contained JSON documents holding the cells of one
//! readout together with the design and conditions tables they refer to.
//! Measurements are written as CSV or fixed-size little-endian records.
//!

mod error;
mod event;
mod writer;

pub use error::{Error, Result};
pub use event::{read_event, Event, EventFile};
pub use writer::{MeasurementWriter, BINARY_RECORD_SIZE, CSV_HEADER};
