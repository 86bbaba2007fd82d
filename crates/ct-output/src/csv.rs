//! CSV output backend.
//!
//! Creates one `;`-delimited file per report in the output directory, named
//! `{run_id}.{report}.csv`:
//!
//! - `{run_id}.link_volume.csv`
//! - `{run_id}.travelDistancesShares_perMode.csv`
//! - `{run_id}.travelDistancesShares_perType.csv`
//! - `{run_id}.relations.csv`
//! - `{run_id}.travelDistances_perVehicle.csv`

use std::fs::File;
use std::iter;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use crate::report::{DistanceShares, LinkVolumeReport, RelationReport, VehicleDistanceRow};
use crate::writer::{DISTANCE_SHARES, LINK_VOLUME, RELATIONS, ReportWriter, VEHICLE_DISTANCES};
use crate::OutputResult;

/// Writes each report to its own CSV file.
pub struct CsvReportWriter {
    dir:      PathBuf,
    run_id:   String,
    written:  Vec<PathBuf>,
    finished: bool,
}

impl CsvReportWriter {
    /// Create `dir` if needed.  Files are created as reports are written.
    pub fn new(dir: &Path, run_id: impl Into<String>) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir:      dir.to_path_buf(),
            run_id:   run_id.into(),
            written:  Vec::new(),
            finished: false,
        })
    }

    /// `{dir}/{run_id}.{report}.csv`
    pub fn path_for(&self, report: &str) -> PathBuf {
        self.dir.join(format!("{}.{report}.csv", self.run_id))
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn open(&mut self, report: &str) -> OutputResult<Writer<File>> {
        let path = self.path_for(report);
        log::info!("writing {}", path.display());
        let writer = WriterBuilder::new().delimiter(b';').flexible(true).from_path(&path)?;
        self.written.push(path);
        Ok(writer)
    }
}

impl ReportWriter for CsvReportWriter {
    fn write_link_volumes(&mut self, report: &LinkVolumeReport) -> OutputResult<()> {
        let mut w = self.open(LINK_VOLUME)?;
        w.write_record(iter::once("linkId").chain(report.columns.iter().map(String::as_str)))?;
        for row in &report.rows {
            w.write_record(iter::once(row.link.clone()).chain(row.values.iter().map(i64::to_string)))?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_distance_shares(&mut self, variant: &str, shares: &DistanceShares) -> OutputResult<()> {
        let mut w = self.open(&format!("{DISTANCE_SHARES}_{variant}"))?;
        // An empty table leaves an empty file.
        if !shares.is_empty() {
            w.write_record(&shares.labels)?;
            w.write_record(shares.shares.iter().map(f64::to_string))?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_relations(&mut self, report: &RelationReport) -> OutputResult<()> {
        let mut w = self.open(RELATIONS)?;
        w.write_record(iter::once("relationNumber").chain(report.columns.iter().map(String::as_str)))?;
        for row in &report.rows {
            w.write_record(
                iter::once(row.relation.to_string()).chain(row.values.iter().map(f64::to_string)),
            )?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_vehicle_distances(&mut self, rows: &[VehicleDistanceRow]) -> OutputResult<()> {
        let mut w = self.open(VEHICLE_DISTANCES)?;
        w.write_record([
            "vehicleId",
            "vehicleType",
            "subpopulation",
            "distanceInKm",
            "distanceInKmWithDepotCharging",
            "shareOfTravelDistanceWithDepotCharging",
        ])?;
        for row in rows {
            w.write_record(&[
                row.vehicle.clone(),
                row.vehicle_type.clone(),
                row.subpopulation.clone(),
                row.distance_km.to_string(),
                row.range_km.to_string(),
                row.share.to_string(),
            ])?;
        }
        w.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        log::info!("{} report files written to {}", self.written.len(), self.dir.display());
        Ok(())
    }
}
