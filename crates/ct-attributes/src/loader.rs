//! Delimited-text attribute loader.
//!
//! # Format
//!
//! The first row is a header.  Its first column holds the person id; every
//! other column becomes an attribute name.  The delimiter is configurable
//! (`;` in the usual exports).
//!
//! ```text
//! person;subpopulation;first_act_x;first_act_y
//! goodsTraffic_1_trip;goodsTraffic_trip;1.0;2.0
//! freight_FTL_7;FTL_trip;5000.0;-120.5
//! ```
//!
//! A data row whose field count differs from the header's is rejected with
//! [`AttributeError::MalformedRow`].  An empty input yields an empty table.

use std::io::Read;
use std::path::Path;

use ct_core::PersonId;

use crate::{AttributeError, AttributeRecord, AttributeResult, AttributeTable};

/// Load an [`AttributeTable`] from a file.
pub fn load_attributes_csv(path: &Path, delimiter: char) -> AttributeResult<AttributeTable> {
    let file = std::fs::File::open(path)?;
    let table = load_attributes_reader(file, delimiter)?;
    log::info!("loaded {} person attribute rows from {}", table.len(), path.display());
    Ok(table)
}

/// Like [`load_attributes_csv`] but accepts any `Read` source.
pub fn load_attributes_reader<R: Read>(reader: R, delimiter: char) -> AttributeResult<AttributeTable> {
    if !delimiter.is_ascii() {
        return Err(AttributeError::Config(format!(
            "attribute delimiter {delimiter:?} is not a single-byte character"
        )));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = csv_reader.records();

    // ── Header ────────────────────────────────────────────────────────────
    let header = match rows.next() {
        None => return Ok(AttributeTable::default()),
        Some(result) => result?,
    };
    let expected = header.len();
    let columns: Vec<String> = header.iter().skip(1).map(str::to_owned).collect();
    let mut table = AttributeTable::new(columns);

    // ── Data rows ─────────────────────────────────────────────────────────
    for result in rows {
        let row = result?;
        let line = row.position().map_or(0, |p| p.line());
        if row.len() != expected {
            return Err(AttributeError::MalformedRow { line, expected, got: row.len() });
        }

        let mut fields = row.iter();
        let person = PersonId::from(fields.next().unwrap_or_default());
        let record = AttributeRecord::from_pairs(
            person,
            table.columns().iter().cloned().zip(fields.map(str::to_owned)),
        );
        if let Some(previous) = table.insert(record) {
            log::warn!("line {line}: duplicate attribute row for person {}, keeping the later one", previous.person);
        }
    }

    Ok(table)
}
