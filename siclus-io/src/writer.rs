//! Measurement writers.

use crate::Result;
use siclus_core::Measurement;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column names of the CSV output.
pub const CSV_HEADER: &str =
    "identifier,cluster_index,surface_link,local_0,local_1,var_0,var_1,diameter,dimensions,subspace_0,subspace_1";

/// Size in bytes of one binary measurement record.
pub const BINARY_RECORD_SIZE: usize = 65;

/// Writes measurement collections to a file.
pub struct MeasurementWriter<W: Write = BufWriter<File>> {
    writer: W,
}

impl MeasurementWriter {
    /// Creates a new file writer.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> MeasurementWriter<W> {
    /// Wraps an arbitrary sink.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes measurements as CSV, optionally preceded by [`CSV_HEADER`].
    pub fn write_csv(&mut self, measurements: &[Measurement], header: bool) -> Result<()> {
        if header {
            writeln!(self.writer, "{CSV_HEADER}")?;
        }

        for m in measurements {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{},{}",
                m.identifier,
                m.cluster_index,
                m.surface_link.value(),
                m.local_position[0],
                m.local_position[1],
                m.local_variance[0],
                m.local_variance[1],
                m.diameter,
                m.dimensions,
                m.subspace[0],
                m.subspace[1]
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes measurements as binary data.
    ///
    /// Format (little-endian) per measurement: u64 (`surface_link`), u32 (`identifier`),
    /// u32 (`cluster_index`), 2 x f64 (`local_position`), 2 x f64 (`local_variance`),
    /// f64 (`diameter`), 2 x u32 (`subspace`), u8 (`dimensions`).
    /// Total: 65 bytes per measurement
    pub fn write_binary(&mut self, measurements: &[Measurement]) -> Result<()> {
        for m in measurements {
            self.writer.write_all(&m.surface_link.value().to_le_bytes())?;
            self.writer.write_all(&m.identifier.to_le_bytes())?;
            self.writer.write_all(&m.cluster_index.to_le_bytes())?;
            for value in m.local_position.iter().chain(&m.local_variance) {
                self.writer.write_all(&value.to_le_bytes())?;
            }
            self.writer.write_all(&m.diameter.to_le_bytes())?;
            for axis in m.subspace {
                self.writer.write_all(&axis.to_le_bytes())?;
            }
            self.writer.write_all(&[m.dimensions])?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siclus_core::GeometryId;
    use tempfile::NamedTempFile;

    fn measurements() -> Vec<Measurement> {
        vec![
            Measurement {
                surface_link: GeometryId(0x10),
                local_position: [1.5, 2.5],
                local_variance: [0.25, 0.5],
                identifier: 0,
                cluster_index: 0,
                dimensions: 2,
                subspace: [0, 1],
                diameter: 2.0,
            },
            Measurement {
                surface_link: GeometryId(0x11),
                local_position: [-3.0, 0.125],
                local_variance: [1.0, 2.0],
                identifier: 1,
                cluster_index: 1,
                dimensions: 1,
                subspace: [1, 0],
                diameter: 0.75,
            },
        ]
    }

    #[test]
    fn test_write_measurements_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = MeasurementWriter::create(file.path()).unwrap();

        writer.write_csv(&measurements(), true).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "0,0,16,1.5,2.5,0.25,0.5,2,2,0,1");
        assert_eq!(lines[2], "1,1,17,-3,0.125,1,2,0.75,1,1,0");
    }

    #[test]
    fn test_write_csv_without_header() {
        let mut writer = MeasurementWriter::new(Vec::new());
        writer.write_csv(&measurements()[..1], false).unwrap();
        let content = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(content, "0,0,16,1.5,2.5,0.25,0.5,2,2,0,1\n");
    }

    #[test]
    fn test_write_measurements_binary() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = MeasurementWriter::create(file.path()).unwrap();

        writer.write_binary(&measurements()).unwrap();

        let data = std::fs::read(file.path()).unwrap();
        assert_eq!(data.len(), 2 * BINARY_RECORD_SIZE);

        let record = &data[BINARY_RECORD_SIZE..];
        assert_eq!(u64::from_le_bytes(record[0..8].try_into().unwrap()), 0x11);
        assert_eq!(u32::from_le_bytes(record[8..12].try_into().unwrap()), 1);
        assert_eq!(
            f64::from_le_bytes(record[16..24].try_into().unwrap()).to_bits(),
            (-3.0f64).to_bits()
        );
        assert_eq!(
            f64::from_le_bytes(record[48..56].try_into().unwrap()).to_bits(),
            0.75f64.to_bits()
        );
        assert_eq!(u32::from_le_bytes(record[56..60].try_into().unwrap()), 1);
        assert_eq!(record[64], 1);
    }
}
