//! `ct-core`: foundational types for the commercial traffic analysis workspace.
//!
//! This crate is a dependency of every other `ct-*` crate.  It has no `ct-*`
//! dependencies and no required external ones (only optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `LinkId`, `VehicleId`, `PersonId`                     |
//! | [`geo`]     | `Coord` (projected x/y), Euclidean distance           |
//! | [`time`]    | `EventTime` (seconds since simulation midnight)       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Coord;
pub use ids::{LinkId, PersonId, VehicleId};
pub use time::EventTime;
