//! Link network registry and builder.
//!
//! # Data layout
//!
//! Links are stored densely in a `Vec<Link>` in insertion order; a
//! `HashMap<LinkId, u32>` maps ids to slots.  The analysis hot path only
//! needs `id → (length, coord)`, so there is no adjacency structure.

use std::collections::HashMap;

use ct_core::{Coord, LinkId};

use crate::{SpatialError, SpatialResult};

// ── Link ──────────────────────────────────────────────────────────────────────

/// One directed network link.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub id: LinkId,

    /// Physical length in metres.
    pub length_m: f64,

    /// Representative coordinate (midpoint of the end nodes).  Used for the
    /// study-area test.
    pub coord: Coord,

    /// Network modes allowed on this link (`"car"`, `"truck40t"`, ...).
    pub allowed_modes: Vec<String>,
}

impl Link {
    #[inline]
    pub fn allows(&self, mode: &str) -> bool {
        self.allowed_modes.iter().any(|m| m == mode)
    }
}

// ── LinkNetwork ───────────────────────────────────────────────────────────────

/// Read-only link registry.  Do not construct directly; use
/// [`LinkNetworkBuilder`].
pub struct LinkNetwork {
    links: Vec<Link>,
    slots: HashMap<LinkId, u32>,
}

impl LinkNetwork {
    /// Construct an empty network.  Every lookup fails with
    /// [`SpatialError::LinkNotFound`].
    pub fn empty() -> Self {
        Self { links: Vec::new(), slots: HashMap::new() }
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Look up a link by id.
    ///
    /// # Errors
    ///
    /// [`SpatialError::LinkNotFound`] if `id` is not part of the network.
    #[inline]
    pub fn link(&self, id: &LinkId) -> SpatialResult<&Link> {
        self.slots
            .get(id)
            .map(|&slot| &self.links[slot as usize])
            .ok_or_else(|| SpatialError::LinkNotFound(id.clone()))
    }

    /// All links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }
}

// ── LinkNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`LinkNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ct_core::{Coord, LinkId};
/// use ct_spatial::LinkNetworkBuilder;
///
/// let mut b = LinkNetworkBuilder::new();
/// b.add_link_between("a", Coord::new(0.0, 0.0), Coord::new(300.0, 400.0), &["car"]);
/// let net = b.build().unwrap();
/// assert_eq!(net.link(&LinkId::from("a")).unwrap().length_m, 500.0);
/// ```
#[derive(Default)]
pub struct LinkNetworkBuilder {
    links: Vec<Link>,
}

impl LinkNetworkBuilder {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    pub fn with_capacity(links: usize) -> Self {
        Self { links: Vec::with_capacity(links) }
    }

    /// Add a link with explicit length and coordinate.
    pub fn add_link(
        &mut self,
        id:       impl Into<LinkId>,
        coord:    Coord,
        length_m: f64,
        modes:    &[&str],
    ) -> &mut Self {
        self.links.push(Link {
            id: id.into(),
            length_m,
            coord,
            allowed_modes: modes.iter().map(|m| (*m).to_owned()).collect(),
        });
        self
    }

    /// Add a straight link between two node positions.  Length is the
    /// Euclidean distance, the coordinate is the midpoint.
    pub fn add_link_between(
        &mut self,
        id:    impl Into<LinkId>,
        from:  Coord,
        to:    Coord,
        modes: &[&str],
    ) -> &mut Self {
        self.add_link(id, from.midpoint(to), from.distance_m(to), modes)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Consume the builder and produce a [`LinkNetwork`].
    ///
    /// # Errors
    ///
    /// [`SpatialError::DuplicateLink`] if the same id was added twice.
    pub fn build(self) -> SpatialResult<LinkNetwork> {
        let mut slots = HashMap::with_capacity(self.links.len());
        for (i, link) in self.links.iter().enumerate() {
            if slots.insert(link.id.clone(), i as u32).is_some() {
                return Err(SpatialError::DuplicateLink(link.id.clone()));
            }
        }
        log::debug!("link network built: {} links", self.links.len());
        Ok(LinkNetwork { links: self.links, slots })
    }
}
