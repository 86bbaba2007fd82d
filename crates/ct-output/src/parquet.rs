//! Parquet output backend (feature `parquet`).
//!
//! One file per report, `{run_id}.{report}.parquet`, each written as a single
//! snappy-compressed row group.  Wide reports are stored in long form so the
//! schema does not depend on the observed labels:
//!
//! - `link_volume`: `link_id`, `label`, `volume`
//! - `travelDistancesShares`: `variant`, `label`, `share`
//! - `relations`: `relation`, `field`, `value`
//! - `travelDistances_perVehicle`: `vehicle_id`, `vehicle_type`,
//!   `subpopulation`, `distance_km`, `range_km`, `share`

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder, UInt32Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::report::{DistanceShares, LinkVolumeReport, RelationReport, VehicleDistanceRow};
use crate::writer::{DISTANCE_SHARES, LINK_VOLUME, RELATIONS, ReportWriter, VEHICLE_DISTANCES};
use crate::OutputResult;

fn link_volume_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("link_id", DataType::Utf8,  false),
        Field::new("label",   DataType::Utf8,  false),
        Field::new("volume",  DataType::Int64, false),
    ]))
}

fn distance_share_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("variant", DataType::Utf8,    false),
        Field::new("label",   DataType::Utf8,    false),
        Field::new("share",   DataType::Float64, false),
    ]))
}

fn relation_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("relation", DataType::UInt32,  false),
        Field::new("field",    DataType::Utf8,    false),
        Field::new("value",    DataType::Float64, false),
    ]))
}

fn vehicle_distance_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("vehicle_id",    DataType::Utf8,    false),
        Field::new("vehicle_type",  DataType::Utf8,    false),
        Field::new("subpopulation", DataType::Utf8,    false),
        Field::new("distance_km",   DataType::Float64, false),
        Field::new("range_km",      DataType::UInt32,  false),
        Field::new("share",         DataType::Float64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes each report to its own Parquet file.
///
/// Distance shares of both variants share one file, written by `finish()`.
/// Files written before `finish()` are already complete.
pub struct ParquetReportWriter {
    dir:      PathBuf,
    run_id:   String,
    shares:   Vec<(String, String, f64)>,
    written:  Vec<PathBuf>,
    finished: bool,
}

impl ParquetReportWriter {
    pub fn new(dir: &Path, run_id: impl Into<String>) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir:      dir.to_path_buf(),
            run_id:   run_id.into(),
            shares:   Vec::new(),
            written:  Vec::new(),
            finished: false,
        })
    }

    /// `{dir}/{run_id}.{report}.parquet`
    pub fn path_for(&self, report: &str) -> PathBuf {
        self.dir.join(format!("{}.{report}.parquet", self.run_id))
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_file(&mut self, report: &str, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> OutputResult<()> {
        let path = self.path_for(report);
        log::info!("writing {}", path.display());
        let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;
        let mut writer = ArrowWriter::try_new(File::create(&path)?, schema, Some(snappy_props()))?;
        writer.write(&batch)?;
        writer.close()?;
        self.written.push(path);
        Ok(())
    }

    fn flush_shares(&mut self) -> OutputResult<()> {
        let mut variants = StringBuilder::new();
        let mut labels   = StringBuilder::new();
        let mut shares   = Float64Builder::new();
        for (variant, label, share) in self.shares.drain(..) {
            variants.append_value(variant);
            labels.append_value(label);
            shares.append_value(share);
        }
        self.write_file(
            DISTANCE_SHARES,
            distance_share_schema(),
            vec![
                Arc::new(variants.finish()),
                Arc::new(labels.finish()),
                Arc::new(shares.finish()),
            ],
        )
    }
}

impl ReportWriter for ParquetReportWriter {
    fn write_link_volumes(&mut self, report: &LinkVolumeReport) -> OutputResult<()> {
        let mut links   = StringBuilder::new();
        let mut labels  = StringBuilder::new();
        let mut volumes = Int64Builder::new();
        for row in &report.rows {
            for (label, volume) in report.columns.iter().zip(&row.values) {
                links.append_value(&row.link);
                labels.append_value(label);
                volumes.append_value(*volume);
            }
        }
        self.write_file(
            LINK_VOLUME,
            link_volume_schema(),
            vec![
                Arc::new(links.finish()),
                Arc::new(labels.finish()),
                Arc::new(volumes.finish()),
            ],
        )
    }

    fn write_distance_shares(&mut self, variant: &str, shares: &DistanceShares) -> OutputResult<()> {
        for (label, share) in shares.labels.iter().zip(&shares.shares) {
            self.shares.push((variant.to_owned(), label.clone(), *share));
        }
        Ok(())
    }

    fn write_relations(&mut self, report: &RelationReport) -> OutputResult<()> {
        let mut relations = UInt32Builder::new();
        let mut fields    = StringBuilder::new();
        let mut values    = Float64Builder::new();
        for row in &report.rows {
            for (field, value) in report.columns.iter().zip(&row.values) {
                relations.append_value(row.relation);
                fields.append_value(field);
                values.append_value(*value);
            }
        }
        self.write_file(
            RELATIONS,
            relation_schema(),
            vec![
                Arc::new(relations.finish()),
                Arc::new(fields.finish()),
                Arc::new(values.finish()),
            ],
        )
    }

    fn write_vehicle_distances(&mut self, rows: &[VehicleDistanceRow]) -> OutputResult<()> {
        let mut vehicles       = StringBuilder::new();
        let mut types          = StringBuilder::new();
        let mut subpopulations = StringBuilder::new();
        let mut distances      = Float64Builder::new();
        let mut ranges         = UInt32Builder::new();
        let mut shares         = Float64Builder::new();
        for row in rows {
            vehicles.append_value(&row.vehicle);
            types.append_value(&row.vehicle_type);
            subpopulations.append_value(&row.subpopulation);
            distances.append_value(row.distance_km);
            ranges.append_value(row.range_km);
            shares.append_value(row.share);
        }
        self.write_file(
            VEHICLE_DISTANCES,
            vehicle_distance_schema(),
            vec![
                Arc::new(vehicles.finish()),
                Arc::new(types.finish()),
                Arc::new(subpopulations.finish()),
                Arc::new(distances.finish()),
                Arc::new(ranges.finish()),
                Arc::new(shares.finish()),
            ],
        )
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush_shares()?;
        log::info!("{} report files written to {}", self.written.len(), self.dir.display());
        Ok(())
    }
}
