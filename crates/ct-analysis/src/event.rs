//! Simulation events consumed by the engine.

use ct_core::{Coord, EventTime, LinkId, PersonId, VehicleId};

/// One event of the simulation's chronological stream.
///
/// Only the two kinds the analysis reacts to are modelled; everything else
/// is kept as [`Event::Other`] and ignored by the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// A vehicle left a link.
    LinkLeave {
        time:    EventTime,
        vehicle: VehicleId,
        link:    LinkId,
    },

    /// A person started an activity at `coord`.
    ActivityStart {
        time:     EventTime,
        person:   PersonId,
        activity: String,
        coord:    Coord,
    },

    Other { time: EventTime, kind: String },
}

impl Event {
    pub fn time(&self) -> EventTime {
        match self {
            Event::LinkLeave { time, .. }
            | Event::ActivityStart { time, .. }
            | Event::Other { time, .. } => *time,
        }
    }

    /// Event type as written in the event log.
    pub fn kind(&self) -> &str {
        match self {
            Event::LinkLeave { .. }     => LINK_LEAVE,
            Event::ActivityStart { .. } => ACTIVITY_START,
            Event::Other { kind, .. }   => kind,
        }
    }
}

pub(crate) const LINK_LEAVE: &str = "left link";
pub(crate) const ACTIVITY_START: &str = "actstart";
