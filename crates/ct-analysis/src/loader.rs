//! CSV event-log loader.
//!
//! # CSV format
//!
//! One row per event, in simulation order.  Columns that do not apply to an
//! event type are left empty.
//!
//! ```csv
//! time,type,vehicle,link,person,actType,x,y
//! 21600,actstart,,,goodsTraffic_1_trip,service,10.0,20.0
//! 21630,left link,goodsTraffic_1,l12,,,,
//! 21700,departure,,,goodsTraffic_1_trip,,,
//! ```
//!
//! | `type`      | Becomes                  | Required columns          |
//! |-------------|--------------------------|---------------------------|
//! | `left link` | [`Event::LinkLeave`]     | `vehicle`, `link`         |
//! | `actstart`  | [`Event::ActivityStart`] | `person`, `actType`, `x`, `y` |
//! | other       | [`Event::Other`]         | none                      |

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ct_core::{Coord, EventTime, LinkId, PersonId, VehicleId};

use crate::event::{ACTIVITY_START, LINK_LEAVE};
use crate::{AnalysisError, AnalysisResult, Event};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventRecord {
    time:     f64,
    #[serde(rename = "type")]
    kind:     String,
    vehicle:  Option<String>,
    link:     Option<String>,
    person:   Option<String>,
    #[serde(rename = "actType")]
    act_type: Option<String>,
    x:        Option<f64>,
    y:        Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a full event stream from a CSV file.
pub fn load_events_csv(path: &Path) -> AnalysisResult<Vec<Event>> {
    let file = std::fs::File::open(path)?;
    let events = load_events_reader(file)?;
    log::info!("loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Like [`load_events_csv`] but accepts any `Read` source.
pub fn load_events_reader<R: Read>(reader: R) -> AnalysisResult<Vec<Event>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut events = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let row: EventRecord = record.deserialize(Some(&headers))?;
        let event = to_event(row).map_err(|reason| AnalysisError::EventParse { line, reason })?;
        events.push(event);
    }

    Ok(events)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn to_event(row: EventRecord) -> Result<Event, String> {
    let time = EventTime(row.time);
    match row.kind.as_str() {
        LINK_LEAVE => Ok(Event::LinkLeave {
            time,
            vehicle: VehicleId::from(required(row.vehicle, "vehicle")?),
            link:    LinkId::from(required(row.link, "link")?),
        }),
        ACTIVITY_START => {
            let person = PersonId::from(required(row.person, "person")?);
            let activity = required(row.act_type, "actType")?;
            let (Some(x), Some(y)) = (row.x, row.y) else {
                return Err(format!("actstart event for {person} has no coordinate"));
            };
            Ok(Event::ActivityStart { time, person, activity, coord: Coord::new(x, y) })
        }
        _ => Ok(Event::Other { time, kind: row.kind }),
    }
}

fn required(value: Option<String>, column: &str) -> Result<String, String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing {column:?} column value"))
}
