//! Zone lookup and study-area containment.
//!
//! # Interface
//!
//! [`ZoneIndex`] is the capability the analysis engine consumes:
//!
//! - `zone_of(coord)`: name of the zone polygon containing `coord`, if any;
//! - `in_study_area(coord)`: whether `coord` lies inside the distinguished
//!   study-area geometry.
//!
//! Zones and study area share the network's projected CRS.  Reprojection and
//! shapefile reading are the caller's job.
//!
//! # Implementation
//!
//! [`PolygonZoneIndex`] bulk-loads an R-tree (via `rstar`) over zone bounding
//! boxes.  A lookup first collects the boxes containing the point and then
//! confirms each candidate with an exact point-in-polygon test from `geo`.
//! Points on a polygon boundary are not contained.

use geo::{BoundingRect, Contains, LineString, MultiPolygon, Point, Polygon};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ct_core::Coord;

/// Point-in-polygon capability consumed by the analysis engine.
///
/// Implementations must be `Send + Sync`: the sharded volume aggregation
/// queries the same index from several worker threads.
pub trait ZoneIndex: Send + Sync {
    /// Name of the zone containing `coord`, or `None` if it lies outside all
    /// zones.
    fn zone_of(&self, coord: Coord) -> Option<&str>;

    /// `true` if `coord` lies strictly inside the study area.
    fn in_study_area(&self, coord: Coord) -> bool;
}

/// Build a polygon without holes from an exterior ring.  The ring is closed
/// automatically if the last point differs from the first.
pub fn polygon(ring: &[Coord]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring.iter().map(|c| (c.x, c.y)).collect::<Vec<_>>().into();
    Polygon::new(exterior, vec![])
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Bounding box of one zone plus its slot in `PolygonZoneIndex::zones`.
struct ZoneEntry {
    min:  [f64; 2],
    max:  [f64; 2],
    slot: usize,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for ZoneEntry {
    /// Squared distance from `point` to the bounding box (zero inside).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = (self.min[0] - point[0]).max(0.0).max(point[0] - self.max[0]);
        let dy = (self.min[1] - point[1]).max(0.0).max(point[1] - self.max[1]);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

// ── PolygonZoneIndex ──────────────────────────────────────────────────────────

/// [`ZoneIndex`] backed by named `geo` polygons and one study-area geometry.
///
/// Create via [`PolygonZoneIndexBuilder`].
pub struct PolygonZoneIndex {
    zones:      Vec<(String, Polygon<f64>)>,
    tree:       RTree<ZoneEntry>,
    study_area: MultiPolygon<f64>,
}

impl PolygonZoneIndex {
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Zone names in insertion order.
    pub fn zone_names(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|(name, _)| name.as_str())
    }
}

impl ZoneIndex for PolygonZoneIndex {
    fn zone_of(&self, coord: Coord) -> Option<&str> {
        let point = Point::new(coord.x, coord.y);
        // Overlapping zones resolve to the first inserted.
        let mut candidates: Vec<usize> = self
            .tree
            .locate_all_at_point(&[coord.x, coord.y])
            .map(|e| e.slot)
            .collect();
        candidates.sort_unstable();
        candidates
            .into_iter()
            .find(|&slot| self.zones[slot].1.contains(&point))
            .map(|slot| self.zones[slot].0.as_str())
    }

    #[inline]
    fn in_study_area(&self, coord: Coord) -> bool {
        self.study_area.contains(&Point::new(coord.x, coord.y))
    }
}

// ── PolygonZoneIndexBuilder ───────────────────────────────────────────────────

/// Collect zone polygons, then [`build`](Self::build) the R-tree in one bulk
/// load.
///
/// # Example
///
/// ```
/// use ct_core::Coord;
/// use ct_spatial::{PolygonZoneIndexBuilder, ZoneIndex, polygon};
///
/// let square = |x0: f64, y0: f64, s: f64| polygon(&[
///     Coord::new(x0, y0), Coord::new(x0 + s, y0),
///     Coord::new(x0 + s, y0 + s), Coord::new(x0, y0 + s),
/// ]);
/// let mut b = PolygonZoneIndexBuilder::new(square(0.0, 0.0, 10.0));
/// b.add_zone("west", square(0.0, 0.0, 5.0));
/// let index = b.build();
/// assert_eq!(index.zone_of(Coord::new(1.0, 1.0)), Some("west"));
/// assert!(index.in_study_area(Coord::new(9.0, 9.0)));
/// ```
pub struct PolygonZoneIndexBuilder {
    zones:      Vec<(String, Polygon<f64>)>,
    study_area: MultiPolygon<f64>,
}

impl PolygonZoneIndexBuilder {
    pub fn new(study_area: impl Into<MultiPolygon<f64>>) -> Self {
        Self { zones: Vec::new(), study_area: study_area.into() }
    }

    pub fn add_zone(&mut self, name: impl Into<String>, shape: Polygon<f64>) -> &mut Self {
        self.zones.push((name.into(), shape));
        self
    }

    pub fn build(self) -> PolygonZoneIndex {
        // Degenerate polygons have no bounding box and can never match.
        let entries: Vec<ZoneEntry> = self
            .zones
            .iter()
            .enumerate()
            .filter_map(|(slot, (_, shape))| {
                shape.bounding_rect().map(|r| ZoneEntry {
                    min: [r.min().x, r.min().y],
                    max: [r.max().x, r.max().y],
                    slot,
                })
            })
            .collect();
        let skipped = self.zones.len() - entries.len();
        if skipped > 0 {
            log::warn!("{skipped} zone polygon(s) are empty and will never match");
        }
        log::debug!("zone index built: {} zones", entries.len());

        PolygonZoneIndex {
            tree:       RTree::bulk_load(entries),
            zones:      self.zones,
            study_area: self.study_area,
        }
    }
}
