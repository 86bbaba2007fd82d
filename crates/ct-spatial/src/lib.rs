//! `ct-spatial`: network registries and zone containment.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`network`]  | `Link`, `LinkNetwork`, `LinkNetworkBuilder`                |
//! | [`vehicles`] | `Vehicle`, `VehicleRegistry`                               |
//! | [`zones`]    | `ZoneIndex` trait, `PolygonZoneIndex` (R-tree + polygons)  |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                         |
//!
//! Everything here is built once per analysis run and then read-only.  The
//! analysis engine queries the registries for every link-leave event, so
//! lookups are hash-map hits and zone queries are R-tree pre-filtered.

pub mod error;
pub mod network;
pub mod vehicles;
pub mod zones;


pub use error::{SpatialError, SpatialResult};
pub use network::{Link, LinkNetwork, LinkNetworkBuilder};
pub use vehicles::{Vehicle, VehicleRegistry};
pub use zones::{PolygonZoneIndex, PolygonZoneIndexBuilder, ZoneIndex, polygon};
