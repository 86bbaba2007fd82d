//! SQLite output backend (feature `sqlite`).
//!
//! Creates `{run_id}.analysis.db` in the output directory.  Wide reports are
//! stored in long form, one row per cell:
//!
//! | Table               | Columns                                                  |
//! |---------------------|----------------------------------------------------------|
//! | `link_volumes`      | `link_id`, `label`, `volume`                             |
//! | `distance_shares`   | `variant`, `label`, `share`                              |
//! | `relations`         | `relation`, `field`, `value`                             |
//! | `vehicle_distances` | `vehicle_id`, `vehicle_type`, `subpopulation`, `distance_km`, `range_km`, `share` |
//!
//! Every write replaces the rows of its report, so reopening the same run
//! overwrites it like the CSV backend does.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::report::{DistanceShares, LinkVolumeReport, RelationReport, VehicleDistanceRow};
use crate::writer::ReportWriter;
use crate::OutputResult;

/// Writes analysis reports to one SQLite database.
pub struct SqliteReportWriter {
    conn:     Connection,
    path:     PathBuf,
    finished: bool,
}

impl SqliteReportWriter {
    /// Open (or create) the database in `dir` and initialise the schema.
    pub fn new(dir: &Path, run_id: &str) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{run_id}.analysis.db"));
        let conn = Connection::open(&path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS link_volumes (
                 link_id TEXT    NOT NULL,
                 label   TEXT    NOT NULL,
                 volume  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS distance_shares (
                 variant TEXT NOT NULL,
                 label   TEXT NOT NULL,
                 share   REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS relations (
                 relation INTEGER NOT NULL,
                 field    TEXT    NOT NULL,
                 value    REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS vehicle_distances (
                 vehicle_id    TEXT    NOT NULL,
                 vehicle_type  TEXT    NOT NULL,
                 subpopulation TEXT    NOT NULL,
                 distance_km   REAL    NOT NULL,
                 range_km      INTEGER NOT NULL,
                 share         REAL    NOT NULL
             );",
        )?;

        log::info!("writing {}", path.display());
        Ok(Self { conn, path, finished: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportWriter for SqliteReportWriter {
    fn write_link_volumes(&mut self, report: &LinkVolumeReport) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM link_volumes", [])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO link_volumes (link_id, label, volume) VALUES (?1, ?2, ?3)",
            )?;
            for row in &report.rows {
                for (label, volume) in report.columns.iter().zip(&row.values) {
                    stmt.execute(rusqlite::params![row.link, label, volume])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_distance_shares(&mut self, variant: &str, shares: &DistanceShares) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM distance_shares WHERE variant = ?1", rusqlite::params![variant])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO distance_shares (variant, label, share) VALUES (?1, ?2, ?3)",
            )?;
            for (label, share) in shares.labels.iter().zip(&shares.shares) {
                stmt.execute(rusqlite::params![variant, label, share])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_relations(&mut self, report: &RelationReport) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM relations", [])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO relations (relation, field, value) VALUES (?1, ?2, ?3)",
            )?;
            for row in &report.rows {
                for (field, value) in report.columns.iter().zip(&row.values) {
                    stmt.execute(rusqlite::params![row.relation, field, value])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_vehicle_distances(&mut self, rows: &[VehicleDistanceRow]) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM vehicle_distances", [])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO vehicle_distances \
                 (vehicle_id, vehicle_type, subpopulation, distance_km, range_km, share) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.vehicle,
                    row.vehicle_type,
                    row.subpopulation,
                    row.distance_km,
                    row.range_km,
                    row.share,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
