//! Report tables derived from the analysis results.
//!
//! Each report is a plain, backend-independent table.  Backends only decide
//! how to lay it out on disk.

use std::collections::{BTreeMap, BTreeSet};

use ct_analysis::{ALL_COMMERCIAL_VEHICLES, AnalysisResults, FastMap, LabelTotals, RelationTable, SUBPOPULATION};
use ct_attributes::AttributeTable;
use ct_core::{PersonId, VehicleId};

use crate::{OutputError, OutputResult};

/// Class columns of the link-volume report, in output order.  Network-mode
/// columns follow.
pub const LINK_VOLUME_CLASS_COLUMNS: [&str; 8] = [
    ALL_COMMERCIAL_VEHICLES,
    "Small-Scale-Commercial-Traffic",
    "Transit-Freight-Traffic",
    "FTL-Traffic",
    "LTL-Traffic",
    "KEP",
    "FTL_kv-Traffic",
    "WasteCollection",
];

// ── Link volumes ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct LinkVolumeRow {
    pub link:   String,
    /// One value per report column, truncated toward zero.
    pub values: Vec<i64>,
}

/// Wide link-volume table: one row per link, one column per class or mode.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkVolumeReport {
    pub columns: Vec<String>,
    /// Sorted by link id.
    pub rows:    Vec<LinkVolumeRow>,
}

impl LinkVolumeReport {
    pub fn new(results: &AnalysisResults<'_>) -> Self {
        let mut columns: Vec<String> = LINK_VOLUME_CLASS_COLUMNS.iter().map(|c| (*c).to_owned()).collect();
        for mode in results.network_modes {
            if !columns.contains(mode) {
                columns.push(mode.clone());
            }
        }

        let mut rows: Vec<LinkVolumeRow> = results
            .link_volumes
            .iter()
            .map(|(link, bucket)| LinkVolumeRow {
                link:   link.to_string(),
                values: columns
                    .iter()
                    .map(|c| bucket.get(c.as_str()).copied().unwrap_or(0.0) as i64)
                    .collect(),
            })
            .collect();
        rows.sort_unstable_by(|a, b| a.link.cmp(&b.link));

        Self { columns, rows }
    }
}

// ── Distance shares ───────────────────────────────────────────────────────────

/// Each label's share of the summed distance.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceShares {
    /// Sorted.
    pub labels: Vec<String>,
    pub shares: Vec<f64>,
}

impl DistanceShares {
    /// Shares are 0 when every total is 0.
    pub fn new(totals: &LabelTotals) -> Self {
        let sorted: BTreeMap<&str, f64> = totals.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let sum: f64 = sorted.values().sum();
        Self {
            labels: sorted.keys().map(|k| (*k).to_owned()).collect(),
            shares: sorted.values().map(|v| if sum > 0.0 { v / sum } else { 0.0 }).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ── Relations ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct RelationRow {
    pub relation: u32,
    /// One value per column; fields the relation lacks are 0.
    pub values:   Vec<f64>,
}

/// Wide relation table over the union of all field names.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationReport {
    /// Sorted field names.
    pub columns: Vec<String>,
    /// In relation-index order.
    pub rows:    Vec<RelationRow>,
}

impl RelationReport {
    pub fn new(relations: &RelationTable) -> Self {
        let columns: Vec<String> = relations
            .iter()
            .flat_map(|(_, r)| r.fields().keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let rows = relations
            .iter()
            .map(|(index, relation)| RelationRow {
                relation: index.0,
                values:   columns.iter().map(|c| relation.get(c).unwrap_or(0.0)).collect(),
            })
            .collect();

        Self { columns, rows }
    }
}

// ── Per-vehicle distances ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleDistanceRow {
    pub vehicle:       String,
    pub vehicle_type:  String,
    /// Raw subpopulation of the person sharing the vehicle's id, or empty.
    pub subpopulation: String,
    /// Whole-network distance, km to 2 decimals.
    pub distance_km:   f64,
    /// Range of the vehicle type with depot charging only.
    pub range_km:      u32,
    /// `distance_km / range_km`, to 2 decimals.
    pub share:         f64,
}

/// Depot-charging range (km) per vehicle type.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargingRanges {
    ranges: BTreeMap<String, u32>,
}

impl Default for ChargingRanges {
    fn default() -> Self {
        let mut ranges = Self::empty();
        for (vehicle_type, km) in [
            ("golf1.4", 200),
            ("car", 200),
            ("vwCaddy", 120),
            ("mercedes313_parcel", 440),
            ("mercedes313", 440),
            ("light8t", 174),
            ("medium18t", 395),
            ("medium18t_parcel", 395),
            ("waste_collection_diesel", 280),
            ("heavy40t", 416),
            ("truck40t", 416),
        ] {
            ranges.insert(vehicle_type, km);
        }
        ranges
    }
}

impl ChargingRanges {
    pub fn empty() -> Self {
        Self { ranges: BTreeMap::new() }
    }

    pub fn insert(&mut self, vehicle_type: impl Into<String>, range_km: u32) -> &mut Self {
        self.ranges.insert(vehicle_type.into(), range_km);
        self
    }

    pub fn get(&self, vehicle_type: &str) -> Option<u32> {
        self.ranges.get(vehicle_type).copied()
    }

    /// One row per vehicle, sorted by vehicle type then id.
    ///
    /// A vehicle whose id is also a person id in `attributes` carries that
    /// person's subpopulation.
    ///
    /// # Errors
    ///
    /// [`OutputError::UnknownVehicleType`] for a type without a range.
    pub fn rows(
        &self,
        distances:  &FastMap<String, FastMap<VehicleId, f64>>,
        attributes: &AttributeTable,
    ) -> OutputResult<Vec<VehicleDistanceRow>> {
        let mut rows = Vec::new();
        for (vehicle_type, per_vehicle) in distances {
            let range_km = self
                .get(vehicle_type)
                .ok_or_else(|| OutputError::UnknownVehicleType(vehicle_type.clone()))?;
            for (vehicle, meters) in per_vehicle {
                let distance_km = (meters / 10.0).round() / 100.0;
                let subpopulation = attributes
                    .get(&PersonId::from(vehicle.as_str()))
                    .and_then(|record| record.get(SUBPOPULATION))
                    .unwrap_or_default();
                rows.push(VehicleDistanceRow {
                    vehicle:       vehicle.to_string(),
                    vehicle_type:  vehicle_type.clone(),
                    subpopulation: subpopulation.to_owned(),
                    distance_km,
                    range_km,
                    share: round2(distance_km / f64::from(range_km)),
                });
            }
        }
        rows.sort_unstable_by(|a, b| (&a.vehicle_type, &a.vehicle).cmp(&(&b.vehicle_type, &b.vehicle)));
        Ok(rows)
    }
}

/// Round half up to two decimals.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
