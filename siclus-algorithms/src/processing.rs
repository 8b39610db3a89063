//! Clusterization pipeline: labeling, aggregation and measurement creation.

use crate::aggregation::accumulate;
use crate::ccl::{ClusterLabels, SparseCcl};
use crate::cluster::ClusterIndex;
use crate::measurement::build_measurement;
use crate::partitioned::PartitionedCcl;
use rayon::prelude::*;
use siclus_core::{
    CellView, ClusterizationConfig, ConditionsView, DesignView, Error, ExecutionModel,
    IdentitySignal, Measurement, Result, SignalModel,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counters of one pipeline invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterizationSummary {
    /// Number of input cells.
    pub cells: usize,
    /// Number of non-empty clusters found by labeling.
    pub clusters: usize,
    /// Clusters dropped because no cell cleared the threshold.
    pub degenerate_clusters: usize,
    /// Number of measurements emitted.
    pub measurements: usize,
}

/// Stateless clusterization pipeline.
///
/// Cells must be sorted by module and then by `channel1` (see
/// [`CellView::is_clustering_ordered`]). Output order follows the position
/// of each cluster's first cell in the input and is identical for both
/// execution models and any partition size.
#[derive(Debug, Clone)]
pub struct Clusterization<S = IdentitySignal> {
    config: ClusterizationConfig,
    signal: S,
}

impl Clusterization<IdentitySignal> {
    /// Creates a pipeline with the identity signal model.
    pub fn new(config: ClusterizationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            signal: IdentitySignal,
        })
    }
}

impl<S: SignalModel> Clusterization<S> {
    /// Replaces the signal model used to weight cells.
    pub fn with_signal_model<T: SignalModel>(self, signal: T) -> Clusterization<T> {
        Clusterization {
            config: self.config,
            signal,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ClusterizationConfig {
        &self.config
    }

    /// Runs the labeler selected by the execution model.
    pub fn label<C: CellView + ?Sized>(&self, cells: &C) -> ClusterLabels {
        match self.config.execution {
            ExecutionModel::Sequential => SparseCcl::from_config(&self.config).label(cells),
            ExecutionModel::Partitioned => PartitionedCcl::from_config(&self.config).label(cells),
        }
    }

    /// Clusters `cells` and returns one measurement per non-degenerate cluster.
    pub fn run<C, D, K>(&self, cells: &C, designs: &D, conditions: &K) -> Result<Vec<Measurement>>
    where
        C: CellView + ?Sized,
        D: DesignView + ?Sized,
        K: ConditionsView + ?Sized,
    {
        self.run_with_summary(cells, designs, conditions)
            .map(|(measurements, _)| measurements)
    }

    /// Like [`run`](Self::run), also returning the invocation counters.
    pub fn run_with_summary<C, D, K>(
        &self,
        cells: &C,
        designs: &D,
        conditions: &K,
    ) -> Result<(Vec<Measurement>, ClusterizationSummary)>
    where
        C: CellView + ?Sized,
        D: DesignView + ?Sized,
        K: ConditionsView + ?Sized,
    {
        let labels = self.label(cells);
        self.measure(cells, &labels, designs, conditions)
    }

    /// Turns labeled cells into measurements.
    ///
    /// Clusters are aggregated independently (concurrently in the partitioned
    /// model); degenerate clusters are dropped and the survivors numbered
    /// in label order.
    pub fn measure<C, D, K>(
        &self,
        cells: &C,
        labels: &ClusterLabels,
        designs: &D,
        conditions: &K,
    ) -> Result<(Vec<Measurement>, ClusterizationSummary)>
    where
        C: CellView + ?Sized,
        D: DesignView + ?Sized,
        K: ConditionsView + ?Sized,
    {
        if labels.len() != cells.len() {
            return Err(Error::LabelMismatch {
                cells: cells.len(),
                labels: labels.len(),
            });
        }

        let index = ClusterIndex::from_labels(labels);
        let candidates: Vec<Option<Measurement>> = match self.config.execution {
            ExecutionModel::Sequential => index
                .iter()
                .map(|members| self.measure_cluster(cells, members, designs, conditions))
                .collect::<Result<_>>()?,
            // Collected in full first so the reported error is the one of the
            // lowest failing label, whatever the scheduling.
            ExecutionModel::Partitioned => (0..index.len())
                .into_par_iter()
                .map(|k| self.measure_cluster(cells, index.cluster(k), designs, conditions))
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<_>>()?,
        };

        let mut measurements = Vec::with_capacity(candidates.len());
        for mut measurement in candidates.into_iter().flatten() {
            let ordinal = measurements.len();
            let ordinal = u32::try_from(ordinal).map_err(|_| Error::IndexOverflow(ordinal))?;
            measurement.identifier = ordinal;
            measurement.cluster_index = ordinal;
            measurements.push(measurement);
        }

        let clusters = index.iter().filter(|members| !members.is_empty()).count();
        let summary = ClusterizationSummary {
            cells: cells.len(),
            clusters,
            degenerate_clusters: clusters - measurements.len(),
            measurements: measurements.len(),
        };
        log::debug!(
            "clusterization ({:?}): {} cells, {} clusters, {} degenerate, {} measurements",
            self.config.execution,
            summary.cells,
            summary.clusters,
            summary.degenerate_clusters,
            summary.measurements
        );
        Ok((measurements, summary))
    }

    /// Aggregates one cluster. Returns `None` for a degenerate cluster; the
    /// ordinal fields are filled in by the caller.
    fn measure_cluster<C, D, K>(
        &self,
        cells: &C,
        members: &[usize],
        designs: &D,
        conditions: &K,
    ) -> Result<Option<Measurement>>
    where
        C: CellView + ?Sized,
        D: DesignView + ?Sized,
        K: ConditionsView + ?Sized,
    {
        let Some(&first) = members.first() else {
            return Ok(None);
        };
        let module_index = cells.module_index(first);
        let module = conditions.module(module_index)?;
        let design = designs.design(module.design_id)?;

        let stats = accumulate(cells, members, module_index, &design, &module, &self.signal)?;
        if stats.is_degenerate() {
            return Ok(None);
        }
        Ok(Some(build_measurement(
            &stats,
            &module,
            &design,
            self.config.diameter_strategy,
            0,
        )))
    }
}

/// Runs the pipeline once with the identity signal model.
pub fn clusterize<C, D, K>(
    cells: &C,
    designs: &D,
    conditions: &K,
    config: &ClusterizationConfig,
) -> Result<Vec<Measurement>>
where
    C: CellView + ?Sized,
    D: DesignView + ?Sized,
    K: ConditionsView + ?Sized,
{
    Clusterization::new(config.clone())?.run(cells, designs, conditions)
}
