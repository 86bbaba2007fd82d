//! The `ReportWriter` trait implemented by all backends.

use ct_analysis::AnalysisResults;

use crate::report::{ChargingRanges, DistanceShares, LinkVolumeReport, RelationReport, VehicleDistanceRow};
use crate::OutputResult;

/// Report names.  Backends derive file or table names from these.
pub const LINK_VOLUME: &str = "link_volume";
pub const DISTANCE_SHARES: &str = "travelDistancesShares";
pub const RELATIONS: &str = "relations";
pub const VEHICLE_DISTANCES: &str = "travelDistances_perVehicle";

/// Variants of the distance-share report.
pub const PER_MODE: &str = "perMode";
pub const PER_TYPE: &str = "perType";

/// Trait implemented by the CSV, SQLite, and Parquet writers.
pub trait ReportWriter {
    fn write_link_volumes(&mut self, report: &LinkVolumeReport) -> OutputResult<()>;

    /// `variant` is [`PER_MODE`] or [`PER_TYPE`].
    fn write_distance_shares(&mut self, variant: &str, shares: &DistanceShares) -> OutputResult<()>;

    fn write_relations(&mut self, report: &RelationReport) -> OutputResult<()>;

    fn write_vehicle_distances(&mut self, rows: &[VehicleDistanceRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Build every report from `results`, write it, and finish the writer.
pub fn write_all<W: ReportWriter + ?Sized>(
    writer:  &mut W,
    results: &AnalysisResults<'_>,
    ranges:  &ChargingRanges,
) -> OutputResult<()> {
    writer.write_link_volumes(&LinkVolumeReport::new(results))?;
    writer.write_distance_shares(PER_MODE, &DistanceShares::new(results.distances_per_mode))?;
    writer.write_distance_shares(PER_TYPE, &DistanceShares::new(results.distances_per_class))?;
    writer.write_relations(&RelationReport::new(results.relations))?;
    writer.write_vehicle_distances(&ranges.rows(results.distances_per_vehicle, results.attributes)?)?;
    writer.finish()
}
