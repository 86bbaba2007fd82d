//! `ct-analysis`: commercial traffic analysis over a simulation event stream.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`class`]     | `TrafficClass`, `classify` (ordered vehicle-id rules)        |
//! | [`volume`]    | `VolumeAggregator`: link volumes and travel distances        |
//! | [`relation`]  | `RelationExtractor`, `RelationTable`, `TripKey`              |
//! | [`engine`]    | `AggregationEngine`, `AnalysisResults`, `ProcessSummary`     |
//! | [`scenario`]  | `Scenario` (read-only registries, zones, attributes)         |
//! | [`event`]     | `Event`                                                      |
//! | [`loader`]    | `load_events_csv`, `load_events_reader`                      |
//! | [`od`]        | `OdMatrix`, `od_matrix`                                      |
//! | [`config`]    | `AnalysisConfig`                                             |
//! | [`error`]     | `AnalysisError`, `AnalysisResult<T>`                         |
//!
//! # Data flow
//!
//! ```text
//! events ──► AggregationEngine ──LinkLeave──────► VolumeAggregator ──► link volumes, distances
//!                              └─ActivityStart──► RelationExtractor ─► relations ──► OdMatrix
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                       |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | Shard link-leave aggregation by link id on Rayon's pool.     |
//! | `fx-hash`  | FxHash instead of SipHash for the aggregation tables.        |
//! | `serde`    | `Serialize`/`Deserialize` on `Event`.                        |

pub mod class;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod loader;
pub mod od;
pub mod relation;
pub mod scenario;
pub mod volume;

#[cfg(test)]
mod tests;

pub use class::{ALL_COMMERCIAL_VEHICLES, TrafficClass, classify};
pub use config::AnalysisConfig;
pub use engine::{AggregationEngine, AnalysisResults, ProcessSummary};
pub use error::{AnalysisError, AnalysisResult};
pub use event::Event;
pub use loader::{load_events_csv, load_events_reader};
pub use od::{OdMatrix, od_matrix};
pub use relation::{Relation, RelationExtractor, RelationIndex, RelationTable, RelationWrite, Role, SUBPOPULATION, TripKey, field_name};
pub use scenario::{LinkLeave, Scenario};
pub use volume::{FastMap, LabelTotals, VolumeAggregator};
