//! JSON event files.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use siclus_core::{
    Cell, CellBatch, ConditionsTable, DesignEntry, DesignTable, ModuleConditions,
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// On-disk layout of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFile {
    /// Cells in any order.
    pub cells: Vec<Cell>,
    /// Design entries, indexed by design id.
    pub designs: Vec<DesignEntry>,
    /// Module conditions, indexed by module index.
    pub conditions: Vec<ModuleConditions>,
}

/// An event converted to the columnar tables the pipeline consumes.
#[derive(Debug, Clone, Default)]
pub struct Event {
    /// Cells, sorted for clustering.
    pub cells: CellBatch,
    /// Validated design table.
    pub designs: DesignTable,
    /// Conditions table.
    pub conditions: ConditionsTable,
}

impl EventFile {
    /// Parses an event from JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Builds the pipeline tables.
    ///
    /// Designs are validated. Every cell must reference a module that has
    /// conditions, and every module must reference an existing design.
    pub fn into_event(self) -> Result<Event> {
        let designs = DesignTable::from_entries(&self.designs)?;

        for (index, module) in self.conditions.iter().enumerate() {
            if module.design_id as usize >= designs.len() {
                return Err(Error::InvalidFormat(format!(
                    "module {index} refers to design {} but only {} designs are defined",
                    module.design_id,
                    designs.len()
                )));
            }
        }
        if let Some(cell) = self
            .cells
            .iter()
            .find(|cell| cell.module_index as usize >= self.conditions.len())
        {
            return Err(Error::InvalidFormat(format!(
                "cell refers to module {} but only {} modules are defined",
                cell.module_index,
                self.conditions.len()
            )));
        }

        let mut cells: CellBatch = self.cells.into_iter().collect();
        cells.sort_for_clustering();
        Ok(Event {
            cells,
            designs,
            conditions: self.conditions.into_iter().collect(),
        })
    }
}

/// Reads and converts an event file.
pub fn read_event<P: AsRef<Path>>(path: P) -> Result<Event> {
    let file = File::open(path)?;
    EventFile::from_reader(BufReader::new(file))?.into_event()
}

#[cfg(test)]
mod tests {
    use super::*;
    use siclus_core::{CellView, ConditionsView, DesignView, GeometryId};

    const EVENT: &str = r#"{
        "cells": [
            {"channel0": 1, "channel1": 2, "activation": 0.7, "module_index": 1},
            {"channel0": 4, "channel1": 0, "activation": 1.5, "module_index": 0},
            {"channel0": 3, "channel1": 0, "activation": 2.0, "module_index": 0}
        ],
        "designs": [
            {"bin_edges_x": [0.0, 0.1, 0.2, 0.3, 0.4, 0.5], "bin_edges_y": [0.0, 0.1, 0.2, 0.3]}
        ],
        "conditions": [
            {"design_id": 0, "geometry_id": 17},
            {"design_id": 0, "geometry_id": 18, "threshold": 0.5, "translation": [0.01, 0.0]}
        ]
    }"#;

    #[test]
    fn test_parse_event() {
        let event = EventFile::from_reader(EVENT.as_bytes())
            .unwrap()
            .into_event()
            .unwrap();

        assert_eq!(event.cells.len(), 3);
        assert_eq!(event.designs.design_count(), 1);
        assert_eq!(event.conditions.module_count(), 2);
        assert!(event.cells.is_clustering_ordered());
        assert_eq!(event.cells.cell(0), Cell::new(3, 0, 2.0, 0));

        let design = event.designs.design(0).unwrap();
        assert_eq!(design.dimensions, 2);
        assert_eq!(design.subspace, [0, 1]);
        assert_eq!(design.bins(0), 5);

        let module = event.conditions.module(1).unwrap();
        assert_eq!(module.geometry_id, GeometryId(18));
        assert!((module.threshold - 0.5).abs() < f64::EPSILON);
        assert!(event.conditions.module(0).unwrap().threshold.abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_module_rejected() {
        let file = EventFile {
            cells: vec![Cell::new(0, 0, 1.0, 2)],
            designs: vec![DesignEntry::uniform([2, 2], [1.0, 1.0], [0.0, 0.0])],
            conditions: vec![ModuleConditions::new(0, GeometryId(1))],
        };
        assert!(matches!(file.into_event(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_unknown_design_rejected() {
        let file = EventFile {
            cells: Vec::new(),
            designs: Vec::new(),
            conditions: vec![ModuleConditions::new(0, GeometryId(1))],
        };
        assert!(matches!(file.into_event(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_invalid_design_rejected() {
        let file = EventFile {
            cells: Vec::new(),
            designs: vec![DesignEntry::new(vec![0.0, 2.0, 1.0], vec![0.0, 1.0])],
            conditions: Vec::new(),
        };
        assert!(matches!(file.into_event(), Err(Error::CoreError(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EventFile::from_reader(&b"{\"cells\": 3}"[..]),
            Err(Error::Json(_))
        ));
    }
}
