//! Origin/destination relations for commercial trips.
//!
//! # Families
//!
//! The person's `subpopulation` attribute (with `_trip` / `_service`
//! stripped) selects how an activity start is interpreted:
//!
//! | Family                                            | Activity      | Observed | Counterpart | On other activity |
//! |---------------------------------------------------|---------------|----------|-------------|-------------------|
//! | `goodsTraffic`, `*commercialPersonTraffic*`       | `service`     | service  | start       | `*end*` ignored, else error |
//! | `longDistanceFreight`, `FTL_kv`, `FTL`            | `freight_end` | end      | start       | ignored           |
//! | `LTL`, person id contains `WasteCollection`       | `pickup`      | pickup   | delivery    | ignored           |
//! | `LTL`, otherwise                                  | `delivery`    | delivery | pickup      | ignored           |
//! | anything else                                     |               |          |             | error             |
//!
//! WasteCollection persons are labelled `WasteCollection`; LTL persons whose
//! id contains `ParcelDelivery` are labelled `ParcelDelivery`.
//!
//! The observed coordinate comes from the event, the counterpart coordinate
//! from the person's `first_act_x` / `first_act_y` attributes.
//!
//! # Keys
//!
//! Every matched activity is one trip.  A trip is addressed by
//! [`TripKey`] (person + per-person ordinal) and mapped to a
//! [`RelationIndex`] drawn from a counter, so indices are dense and follow
//! stream order.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use ct_attributes::AttributeTable;
use ct_core::{Coord, PersonId};

use crate::{AnalysisError, AnalysisResult};

pub const SUBPOPULATION: &str = "subpopulation";
const FIRST_ACT_X: &str = "first_act_x";
const FIRST_ACT_Y: &str = "first_act_y";

// ── Keys and roles ────────────────────────────────────────────────────────────

/// Role of a coordinate within a trip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Service,
    Start,
    End,
    Pickup,
    Delivery,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Service  => "service",
            Role::Start    => "start",
            Role::End      => "end",
            Role::Pickup   => "pickup",
            Role::Delivery => "delivery",
        }
    }
}

/// One person's n-th matched trip.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripKey {
    pub person: PersonId,
    pub trip:   u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationIndex(pub u32);

impl fmt::Display for RelationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `{label}_{role}_{X|Y}`
pub fn field_name(label: &str, role: Role, axis: char) -> String {
    format!("{label}_{}_{axis}", role.as_str())
}

// ── Relation ──────────────────────────────────────────────────────────────────

/// One trip's coordinate fields.
///
/// Label and roles are fixed by the first write under a key.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    label:       String,
    observed:    Role,
    counterpart: Role,
    fields:      BTreeMap<String, f64>,
}

impl Relation {
    fn new(label: &str, observed: Role, counterpart: Role) -> Self {
        Self { label: label.to_owned(), observed, counterpart, fields: BTreeMap::new() }
    }

    /// Subpopulation label after relabelling (`goodsTraffic`, `ParcelDelivery`, ...).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn observed_role(&self) -> Role {
        self.observed
    }

    pub fn counterpart_role(&self) -> Role {
        self.counterpart
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    /// Field name → value, sorted by name.
    pub fn fields(&self) -> &BTreeMap<String, f64> {
        &self.fields
    }

    /// `true` once both coordinates are present.
    pub fn is_complete(&self) -> bool {
        self.origin().is_some() && self.destination().is_some()
    }

    /// Counterpart coordinate (the tour's first activity).
    pub fn origin(&self) -> Option<Coord> {
        self.coord(self.counterpart)
    }

    /// Event-observed coordinate.
    pub fn destination(&self) -> Option<Coord> {
        self.coord(self.observed)
    }

    fn coord(&self, role: Role) -> Option<Coord> {
        let x = self.get(&field_name(&self.label, role, 'X'))?;
        let y = self.get(&field_name(&self.label, role, 'Y'))?;
        Some(Coord::new(x, y))
    }
}

// ── RelationTable ─────────────────────────────────────────────────────────────

/// Values for one [`RelationTable::record`] call.
#[derive(Copy, Clone, Debug)]
pub struct RelationWrite<'a> {
    pub label:          &'a str,
    pub observed:       Role,
    pub observed_at:    Coord,
    pub counterpart:    Role,
    pub counterpart_at: Coord,
}

#[derive(Default)]
pub struct RelationTable {
    relations:  BTreeMap<RelationIndex, Relation>,
    keys:       HashMap<TripKey, RelationIndex>,
    next_index: u32,
}

impl RelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the four fields of `write` under `key`.
    ///
    /// The observed X/Y fields keep their first value; the counterpart X/Y
    /// fields are overwritten on every call.  A new key gets the next index.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::RelationOverflow`] once the index space is used up.
    /// The table is left unchanged.
    pub fn record(&mut self, key: TripKey, write: RelationWrite<'_>) -> AnalysisResult<RelationIndex> {
        let index = match self.keys.get(&key) {
            Some(&index) => index,
            None => {
                let index = RelationIndex(self.next_index);
                self.next_index = self
                    .next_index
                    .checked_add(1)
                    .ok_or_else(|| AnalysisError::RelationOverflow { person: key.person.clone() })?;
                self.keys.insert(key, index);
                index
            }
        };

        let relation = self
            .relations
            .entry(index)
            .or_insert_with(|| Relation::new(write.label, write.observed, write.counterpart));
        let fields = &mut relation.fields;
        fields
            .entry(field_name(write.label, write.observed, 'X'))
            .or_insert(write.observed_at.x);
        fields
            .entry(field_name(write.label, write.observed, 'Y'))
            .or_insert(write.observed_at.y);
        fields.insert(field_name(write.label, write.counterpart, 'X'), write.counterpart_at.x);
        fields.insert(field_name(write.label, write.counterpart, 'Y'), write.counterpart_at.y);

        Ok(index)
    }

    /// Table whose next new key gets `next_index`.
    #[cfg(test)]
    pub(crate) fn starting_at(next_index: u32) -> Self {
        Self { next_index, ..Self::default() }
    }

    pub fn get(&self, index: RelationIndex) -> Option<&Relation> {
        self.relations.get(&index)
    }

    pub fn index_of(&self, key: &TripKey) -> Option<RelationIndex> {
        self.keys.get(key).copied()
    }

    /// Relations in index order.
    pub fn iter(&self) -> impl Iterator<Item = (RelationIndex, &Relation)> {
        self.relations.iter().map(|(&index, relation)| (index, relation))
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Drop every relation and restart indices at 0.
    pub fn clear(&mut self) {
        self.relations.clear();
        self.keys.clear();
        self.next_index = 0;
    }
}

// ── RelationExtractor ─────────────────────────────────────────────────────────

/// Turns activity-start events into [`Relation`]s.
///
/// Must see activity starts in stream order: trip ordinals and relation
/// indices are assigned as events arrive.
#[derive(Default)]
pub struct RelationExtractor {
    table: RelationTable,
    trips: HashMap<PersonId, u32>,
}

/// How a matched activity is recorded.
#[derive(Debug, PartialEq)]
struct ActivityMatch {
    label:       String,
    observed:    Role,
    counterpart: Role,
}

impl RelationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one activity start.
    ///
    /// Returns the index written to, or `None` if the activity carries no
    /// relation for this person's family.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Attribute`]: unknown person, missing
    ///   `subpopulation`, or missing/non-numeric `first_act_x`/`first_act_y`.
    /// - [`AnalysisError::UnexpectedActivity`]: a small-scale commercial
    ///   person starts anything other than `service` or an `*end*` activity.
    /// - [`AnalysisError::UnknownSubpopulation`].
    /// - [`AnalysisError::RelationOverflow`]: trip ordinal or relation index
    ///   space exhausted.
    pub fn on_activity_start(
        &mut self,
        attributes: &AttributeTable,
        person:     &PersonId,
        activity:   &str,
        coord:      Coord,
    ) -> AnalysisResult<Option<RelationIndex>> {
        let record = attributes.lookup(person)?;
        let subpopulation = strip_markers(record.require(SUBPOPULATION)?);

        let Some(matched) = match_activity(person, &subpopulation, activity)? else {
            return Ok(None);
        };
        let counterpart_at = record.require_coord(FIRST_ACT_X, FIRST_ACT_Y)?;

        let trip = self.next_trip(person)?;
        let index = self.table.record(
            TripKey { person: person.clone(), trip },
            RelationWrite {
                label:          &matched.label,
                observed:       matched.observed,
                observed_at:    coord,
                counterpart:    matched.counterpart,
                counterpart_at,
            },
        )?;
        log::trace!("relation {index}: {person} {activity} -> {}", matched.label);
        Ok(Some(index))
    }

    pub fn relations(&self) -> &RelationTable {
        &self.table
    }

    pub fn reset(&mut self) {
        self.table.clear();
        self.trips.clear();
    }

    fn next_trip(&mut self, person: &PersonId) -> AnalysisResult<u32> {
        match self.trips.get_mut(person) {
            Some(n) => {
                *n = n
                    .checked_add(1)
                    .ok_or_else(|| AnalysisError::RelationOverflow { person: person.clone() })?;
                Ok(*n)
            }
            None => {
                self.trips.insert(person.clone(), 0);
                Ok(0)
            }
        }
    }

    /// Pretend `person` already made `trip + 1` relation trips.
    #[cfg(test)]
    pub(crate) fn seed_trip(&mut self, person: &PersonId, trip: u32) {
        self.trips.insert(person.clone(), trip);
    }
}

// ── Family dispatch ───────────────────────────────────────────────────────────

/// `goodsTraffic_trip` → `goodsTraffic`, `commercialPersonTraffic_service`
/// → `commercialPersonTraffic`.
fn strip_markers(subpopulation: &str) -> String {
    subpopulation.replace("_trip", "").replace("_service", "")
}

fn match_activity(
    person:        &PersonId,
    subpopulation: &str,
    activity:      &str,
) -> AnalysisResult<Option<ActivityMatch>> {
    let matched = |label: &str, observed, counterpart| ActivityMatch {
        label: label.to_owned(),
        observed,
        counterpart,
    };

    if subpopulation == "goodsTraffic" || subpopulation.contains("commercialPersonTraffic") {
        if activity.contains("end") {
            return Ok(None);
        }
        if activity != "service" {
            return Err(AnalysisError::UnexpectedActivity {
                person:        person.clone(),
                subpopulation: subpopulation.to_owned(),
                activity:      activity.to_owned(),
            });
        }
        return Ok(Some(matched(subpopulation, Role::Service, Role::Start)));
    }

    match subpopulation {
        "longDistanceFreight" | "FTL_kv" | "FTL" => {
            Ok((activity == "freight_end").then(|| matched(subpopulation, Role::End, Role::Start)))
        }
        "LTL" if person.contains("WasteCollection") => {
            Ok((activity == "pickup").then(|| matched("WasteCollection", Role::Pickup, Role::Delivery)))
        }
        "LTL" => {
            let label = if person.contains("ParcelDelivery") { "ParcelDelivery" } else { "LTL" };
            Ok((activity == "delivery").then(|| matched(label, Role::Delivery, Role::Pickup)))
        }
        _ => Err(AnalysisError::UnknownSubpopulation {
            person:        person.clone(),
            subpopulation: subpopulation.to_owned(),
        }),
    }
}
