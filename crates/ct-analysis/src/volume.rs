//! Link volumes and travel distances.
//!
//! # Tables
//!
//! | Table                   | Key                        | Scope          | Increment        |
//! |-------------------------|----------------------------|----------------|------------------|
//! | `link_volumes`          | link → class / mode label  | whole network  | `floor(1/s)`     |
//! | `distances_per_mode`    | network mode               | study area     | link length (m)  |
//! | `distances_per_class`   | traffic-class label        | study area     | link length (m)  |
//! | `distances_per_vehicle` | vehicle type → vehicle     | whole network  | link length (m)  |
//!
//! All tables are plain additive reductions, so aggregators built over
//! disjoint parts of a stream can be combined with
//! [`VolumeAggregator::merge`] in any order.

use ct_core::{LinkId, VehicleId};
use ct_spatial::ZoneIndex;

use crate::class::{ALL_COMMERCIAL_VEHICLES, classify};
use crate::scenario::LinkLeave;

#[cfg(not(feature = "fx-hash"))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
#[cfg(feature = "fx-hash")]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Label → accumulated value.
pub type LabelTotals = FastMap<String, f64>;

pub struct VolumeAggregator {
    sample_factor:         f64,
    link_volumes:          FastMap<LinkId, LabelTotals>,
    distances_per_mode:    LabelTotals,
    distances_per_class:   LabelTotals,
    distances_per_vehicle: FastMap<String, FastMap<VehicleId, f64>>,
    events:                u64,
}

impl VolumeAggregator {
    /// `sample_factor` is the per-event count increment, `floor(1/s)`.
    pub fn new(sample_factor: f64) -> Self {
        Self {
            sample_factor,
            link_volumes:          FastMap::default(),
            distances_per_mode:    LabelTotals::default(),
            distances_per_class:   LabelTotals::default(),
            distances_per_vehicle: FastMap::default(),
            events:                0,
        }
    }

    /// Account one link-leave event.
    pub fn on_link_leave<Z: ZoneIndex + ?Sized>(&mut self, zones: &Z, leave: &LinkLeave<'_>) {
        let factor = self.sample_factor;
        let in_study_area = zones.in_study_area(leave.coord);
        let bucket = self.link_volumes.entry(leave.link.clone()).or_default();

        if let Some(class) = classify(leave.vehicle.as_str()) {
            add(bucket, class.label(), factor);
            if in_study_area {
                add(&mut self.distances_per_class, class.label(), leave.length_m);
            }
        }

        add(bucket, ALL_COMMERCIAL_VEHICLES, factor);
        add(bucket, leave.mode, factor);
        if in_study_area {
            add(&mut self.distances_per_mode, leave.mode, leave.length_m);
        }

        *self
            .distances_per_vehicle
            .entry(leave.vehicle_type.to_owned())
            .or_default()
            .entry(leave.vehicle.clone())
            .or_insert(0.0) += leave.length_m;

        self.events += 1;
    }

    /// Add `other`'s tables into `self`.
    ///
    /// Both aggregators must use the same sample factor.
    pub fn merge(&mut self, other: VolumeAggregator) {
        debug_assert_eq!(self.sample_factor, other.sample_factor);

        for (link, bucket) in other.link_volumes {
            let target = self.link_volumes.entry(link).or_default();
            merge_totals(target, bucket);
        }
        merge_totals(&mut self.distances_per_mode, other.distances_per_mode);
        merge_totals(&mut self.distances_per_class, other.distances_per_class);
        for (vehicle_type, per_vehicle) in other.distances_per_vehicle {
            let target = self.distances_per_vehicle.entry(vehicle_type).or_default();
            for (vehicle, meters) in per_vehicle {
                *target.entry(vehicle).or_insert(0.0) += meters;
            }
        }
        self.events += other.events;
    }

    /// Clear all tables.  The sample factor is kept.
    pub fn reset(&mut self) {
        self.link_volumes.clear();
        self.distances_per_mode.clear();
        self.distances_per_class.clear();
        self.distances_per_vehicle.clear();
        self.events = 0;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn sample_factor(&self) -> f64 {
        self.sample_factor
    }

    /// Number of link-leave events accounted since the last reset.
    pub fn event_count(&self) -> u64 {
        self.events
    }

    pub fn link_volumes(&self) -> &FastMap<LinkId, LabelTotals> {
        &self.link_volumes
    }

    /// Study-area distance (m) per network mode.
    pub fn distances_per_mode(&self) -> &LabelTotals {
        &self.distances_per_mode
    }

    /// Study-area distance (m) per traffic-class label.
    pub fn distances_per_class(&self) -> &LabelTotals {
        &self.distances_per_class
    }

    /// Whole-network distance (m) per vehicle, grouped by vehicle type.
    pub fn distances_per_vehicle(&self) -> &FastMap<String, FastMap<VehicleId, f64>> {
        &self.distances_per_vehicle
    }

    /// `true` if no event has been accounted since the last reset.
    pub fn is_empty(&self) -> bool {
        self.link_volumes.is_empty()
            && self.distances_per_mode.is_empty()
            && self.distances_per_class.is_empty()
            && self.distances_per_vehicle.is_empty()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Add `value` under `label`, allocating the key only on first touch.
#[inline]
fn add(totals: &mut LabelTotals, label: &str, value: f64) {
    match totals.get_mut(label) {
        Some(v) => *v += value,
        None => {
            totals.insert(label.to_owned(), value);
        }
    }
}

fn merge_totals(target: &mut LabelTotals, source: LabelTotals) {
    for (label, value) in source {
        *target.entry(label).or_insert(0.0) += value;
    }
}
