//! Module description tables.
//!
//! Two read-only columnar tables describe the detector to clusterization:
//!
//! - the *design* table holds the channel segmentation shared by all modules
//!   of one sensor type (bin edges per axis, dimensionality, measurement
//!   subspace);
//! - the *conditions* table holds one entry per physical module (design
//!   linkage, surface identifier, signal threshold, local translation).
//!
//! Both are exposed through accessor traits ([`DesignView`], [`ConditionsView`])
//! so other storage backends can stand in for the owned tables defined here.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of a detector surface in the tracking geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct GeometryId(pub u64);

impl GeometryId {
    /// Returns the raw identifier value.
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GeometryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Owned description of one module design, used to fill a [`DesignTable`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignEntry {
    /// Bin edges along the first axis (channel count + 1 values).
    pub bin_edges_x: Vec<f64>,
    /// Bin edges along the second axis (channel count + 1 values).
    pub bin_edges_y: Vec<f64>,
    /// Measurement dimensionality, 1 (strips) or 2 (pixels). A design whose
    /// second axis has fewer than two edges is always one-dimensional.
    #[cfg_attr(feature = "serde", serde(default = "default_dimensions"))]
    pub dimensions: u8,
    /// Sensitive local parameters for downstream fitting.
    #[cfg_attr(feature = "serde", serde(default = "default_subspace"))]
    pub subspace: [u32; 2],
}

#[cfg(feature = "serde")]
fn default_dimensions() -> u8 {
    2
}

#[cfg(feature = "serde")]
fn default_subspace() -> [u32; 2] {
    [0, 1]
}

impl DesignEntry {
    /// Creates a two-dimensional design with the default `[0, 1]` subspace.
    #[must_use]
    pub fn new(bin_edges_x: Vec<f64>, bin_edges_y: Vec<f64>) -> Self {
        Self {
            bin_edges_x,
            bin_edges_y,
            dimensions: 2,
            subspace: [0, 1],
        }
    }

    /// Creates a design with `channels` bins of width `pitch` per axis,
    /// starting at `origin`.
    #[must_use]
    pub fn uniform(channels: [u32; 2], pitch: [f64; 2], origin: [f64; 2]) -> Self {
        let edges = |axis: usize| -> Vec<f64> {
            (0..=channels[axis])
                .map(|c| origin[axis] + f64::from(c) * pitch[axis])
                .collect()
        };
        Self::new(edges(0), edges(1))
    }

    /// Sets the dimensionality.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: u8) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Sets the measurement subspace.
    #[must_use]
    pub fn with_subspace(mut self, subspace: [u32; 2]) -> Self {
        self.subspace = subspace;
        self
    }

    /// Dimensionality stored in the table: 1 when the second axis is unsegmented.
    #[must_use]
    pub fn effective_dimensions(&self) -> u8 {
        if self.bin_edges_y.len() < 2 {
            1
        } else {
            self.dimensions
        }
    }

    fn validate(&self) -> Result<()> {
        if !matches!(self.dimensions, 1 | 2) {
            return Err(Error::InvalidDesign(format!(
                "dimensions must be 1 or 2, got {}",
                self.dimensions
            )));
        }
        if self.bin_edges_x.len() < 2 {
            return Err(Error::InvalidDesign(
                "first axis needs at least two bin edges".to_string(),
            ));
        }
        for (axis, edges) in [&self.bin_edges_x, &self.bin_edges_y].into_iter().enumerate() {
            if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
                return Err(Error::InvalidDesign(format!(
                    "bin edges on axis {axis} must be finite and strictly increasing"
                )));
            }
        }
        Ok(())
    }
}

/// Borrowed row of the design table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleDesign<'a> {
    /// Bin edges along the first axis.
    pub bin_edges_x: &'a [f64],
    /// Bin edges along the second axis.
    pub bin_edges_y: &'a [f64],
    /// Measurement dimensionality.
    pub dimensions: u8,
    /// Measurement subspace.
    pub subspace: [u32; 2],
}

impl ModuleDesign<'_> {
    /// Number of channels along `axis` (0 or 1).
    #[must_use]
    pub fn bins(&self, axis: usize) -> usize {
        let edges = if axis == 0 {
            self.bin_edges_x
        } else {
            self.bin_edges_y
        };
        edges.len().saturating_sub(1)
    }

    /// Local position (bin midpoint) and bin width of a cell on each axis.
    ///
    /// An axis with fewer than two edges is unsegmented: the position is its
    /// single edge (or zero) and the width is zero.
    pub fn position_from_cell(&self, channel0: u32, channel1: u32) -> Result<([f64; 2], [f64; 2])> {
        let (x, width_x) = axis_position(self.bin_edges_x, 0, channel0)?;
        let (y, width_y) = axis_position(self.bin_edges_y, 1, channel1)?;
        Ok(([x, y], [width_x, width_y]))
    }
}

#[inline]
fn axis_position(edges: &[f64], axis: usize, channel: u32) -> Result<(f64, f64)> {
    match edges {
        [] => Ok((0.0, 0.0)),
        [edge] => Ok((*edge, 0.0)),
        _ => {
            let c = channel as usize;
            match (edges.get(c), edges.get(c + 1)) {
                (Some(&lo), Some(&hi)) => Ok((0.5 * (lo + hi), hi - lo)),
                _ => Err(Error::ChannelOutOfRange {
                    axis,
                    channel,
                    bins: edges.len() - 1,
                }),
            }
        }
    }
}

/// Read-only accessor interface over module designs.
pub trait DesignView: Sync {
    /// Number of designs.
    fn design_count(&self) -> usize;

    /// Looks up design `id`.
    fn design(&self, id: u32) -> Result<ModuleDesign<'_>>;
}

/// Columnar table of module designs.
///
/// Bin edges are jagged per design and stored flat, with `offsets` marking
/// where each design's edges start.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignTable {
    edges_x: Vec<f64>,
    offsets_x: Vec<usize>,
    edges_y: Vec<f64>,
    offsets_y: Vec<usize>,
    dimensions: Vec<u8>,
    subspace: Vec<[u32; 2]>,
}

impl Default for DesignTable {
    fn default() -> Self {
        Self {
            edges_x: Vec::new(),
            offsets_x: vec![0],
            edges_y: Vec::new(),
            offsets_y: vec![0],
            dimensions: Vec::new(),
            subspace: Vec::new(),
        }
    }
}

impl DesignTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from design entries, validating each one.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a DesignEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.push(entry)?;
        }
        Ok(table)
    }

    /// Returns the number of designs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns true if the table holds no designs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Appends a design and returns its id.
    pub fn push(&mut self, entry: &DesignEntry) -> Result<u32> {
        entry.validate()?;
        let id = u32::try_from(self.len()).map_err(|_| Error::IndexOverflow(self.len()))?;

        self.edges_x.extend_from_slice(&entry.bin_edges_x);
        self.offsets_x.push(self.edges_x.len());
        self.edges_y.extend_from_slice(&entry.bin_edges_y);
        self.offsets_y.push(self.edges_y.len());
        self.dimensions.push(entry.effective_dimensions());
        self.subspace.push(entry.subspace);
        Ok(id)
    }

    /// Reassembles the owned entry of every design.
    #[must_use]
    pub fn entries(&self) -> Vec<DesignEntry> {
        (0..self.len())
            .map(|i| self.row(i))
            .map(|d| DesignEntry {
                bin_edges_x: d.bin_edges_x.to_vec(),
                bin_edges_y: d.bin_edges_y.to_vec(),
                dimensions: d.dimensions,
                subspace: d.subspace,
            })
            .collect()
    }

    fn row(&self, i: usize) -> ModuleDesign<'_> {
        ModuleDesign {
            bin_edges_x: &self.edges_x[self.offsets_x[i]..self.offsets_x[i + 1]],
            bin_edges_y: &self.edges_y[self.offsets_y[i]..self.offsets_y[i + 1]],
            dimensions: self.dimensions[i],
            subspace: self.subspace[i],
        }
    }
}

impl DesignView for DesignTable {
    fn design_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn design(&self, id: u32) -> Result<ModuleDesign<'_>> {
        let i = id as usize;
        if i >= self.len() {
            return Err(Error::DesignOutOfRange { id, len: self.len() });
        }
        Ok(self.row(i))
    }
}

/// Per-module conditions (one row of the conditions table).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleConditions {
    /// Id of the module's design.
    pub design_id: u32,
    /// Surface the module's measurements are attached to.
    pub geometry_id: GeometryId,
    /// Minimum weight a cell needs to contribute to a measurement.
    #[cfg_attr(feature = "serde", serde(default))]
    pub threshold: f64,
    /// Local shift applied to measurements (e.g. Lorentz drift).
    #[cfg_attr(feature = "serde", serde(default))]
    pub translation: [f64; 2],
}

impl ModuleConditions {
    /// Creates conditions with zero threshold and no translation.
    #[must_use]
    pub fn new(design_id: u32, geometry_id: GeometryId) -> Self {
        Self {
            design_id,
            geometry_id,
            threshold: 0.0,
            translation: [0.0, 0.0],
        }
    }

    /// Sets the signal threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the local translation.
    #[must_use]
    pub fn with_translation(mut self, translation: [f64; 2]) -> Self {
        self.translation = translation;
        self
    }
}

/// Read-only accessor interface over module conditions.
pub trait ConditionsView: Sync {
    /// Number of modules.
    fn module_count(&self) -> usize;

    /// Looks up the conditions of module `index`.
    fn module(&self, index: u32) -> Result<ModuleConditions>;
}

/// Columnar table of module conditions, indexed by module index.
///
/// Columns are only filled row by row, so they always have equal length.
/// Serialized as a sequence of [`ModuleConditions`] rows.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "Vec<ModuleConditions>", into = "Vec<ModuleConditions>")
)]
pub struct ConditionsTable {
    design_id: Vec<u32>,
    geometry_id: Vec<GeometryId>,
    threshold: Vec<f64>,
    translation: Vec<[f64; 2]>,
}

impl ConditionsTable {
    /// Creates an empty table with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            design_id: Vec::with_capacity(capacity),
            geometry_id: Vec::with_capacity(capacity),
            threshold: Vec::with_capacity(capacity),
            translation: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.design_id.len()
    }

    /// Returns true if the table holds no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.design_id.is_empty()
    }

    /// Appends a module and returns its index.
    pub fn push(&mut self, conditions: ModuleConditions) -> Result<u32> {
        let index = u32::try_from(self.len()).map_err(|_| Error::IndexOverflow(self.len()))?;
        self.push_row(conditions);
        Ok(index)
    }

    fn push_row(&mut self, conditions: ModuleConditions) {
        self.design_id.push(conditions.design_id);
        self.geometry_id.push(conditions.geometry_id);
        self.threshold.push(conditions.threshold);
        self.translation.push(conditions.translation);
    }

    /// Iterates over the modules as rows.
    pub fn iter(&self) -> impl Iterator<Item = ModuleConditions> + '_ {
        (0..self.len()).map(|i| self.row(i))
    }

    #[inline]
    fn row(&self, i: usize) -> ModuleConditions {
        ModuleConditions {
            design_id: self.design_id[i],
            geometry_id: self.geometry_id[i],
            threshold: self.threshold[i],
            translation: self.translation[i],
        }
    }
}

impl FromIterator<ModuleConditions> for ConditionsTable {
    fn from_iter<I: IntoIterator<Item = ModuleConditions>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = Self::with_capacity(iter.size_hint().0);
        for conditions in iter {
            table.push_row(conditions);
        }
        table
    }
}

impl From<Vec<ModuleConditions>> for ConditionsTable {
    fn from(rows: Vec<ModuleConditions>) -> Self {
        rows.into_iter().collect()
    }
}

impl From<ConditionsTable> for Vec<ModuleConditions> {
    fn from(table: ConditionsTable) -> Self {
        table.iter().collect()
    }
}

impl ConditionsView for ConditionsTable {
    fn module_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn module(&self, index: u32) -> Result<ModuleConditions> {
        let i = index as usize;
        if i >= self.len() {
            return Err(Error::ModuleOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.row(i))
    }
}
