//! Projected coordinate type.
//!
//! All geometry in one analysis run shares a single projected CRS (metres,
//! e.g. EPSG:25832), so distances are plain Euclidean and coordinates are
//! stored as `f64` to keep sub-metre precision at regional extents.

/// A projected `(x, y)` coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance_m(self, other: Coord) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point halfway between `self` and `other`.  Link coordinates are the
    /// midpoint of their end nodes.
    #[inline]
    pub fn midpoint(self, other: Coord) -> Coord {
        Coord::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
