//! Read-only inputs shared by every event handler.

use ct_attributes::AttributeTable;
use ct_core::{Coord, LinkId, VehicleId};
use ct_spatial::{LinkNetwork, VehicleRegistry, ZoneIndex};

use crate::AnalysisResult;

/// Everything the engine consults but never mutates: registries, zones, and
/// person attributes.
///
/// Built once before the first iteration and shared by all handlers,
/// including the worker threads of the sharded volume pass.
pub struct Scenario<Z: ZoneIndex> {
    pub network:    LinkNetwork,
    pub vehicles:   VehicleRegistry,
    pub zones:      Z,
    pub attributes: AttributeTable,
}

/// A link-leave event with its vehicle and link resolved against the
/// registries.
#[derive(Clone, Copy, Debug)]
pub struct LinkLeave<'a> {
    pub vehicle:      &'a VehicleId,
    pub vehicle_type: &'a str,
    pub mode:         &'a str,
    pub link:         &'a LinkId,
    pub length_m:     f64,
    pub coord:        Coord,
}

impl<Z: ZoneIndex> Scenario<Z> {
    pub fn new(
        network:    LinkNetwork,
        vehicles:   VehicleRegistry,
        zones:      Z,
        attributes: AttributeTable,
    ) -> Self {
        Self { network, vehicles, zones, attributes }
    }

    /// # Errors
    ///
    /// [`AnalysisError::Lookup`](crate::AnalysisError::Lookup) if either id
    /// is unknown.
    #[inline]
    pub fn resolve_link_leave(&self, vehicle: &VehicleId, link: &LinkId) -> AnalysisResult<LinkLeave<'_>> {
        let vehicle = self.vehicles.vehicle(vehicle)?;
        let link = self.network.link(link)?;
        Ok(LinkLeave {
            vehicle:      &vehicle.id,
            vehicle_type: &vehicle.vehicle_type,
            mode:         &vehicle.network_mode,
            link:         &link.id,
            length_m:     link.length_m,
            coord:        link.coord,
        })
    }
}
