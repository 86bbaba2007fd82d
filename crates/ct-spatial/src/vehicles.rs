//! Vehicle registry: vehicle id → vehicle type and network mode.

use std::collections::HashMap;

use ct_core::VehicleId;

use crate::{SpatialError, SpatialResult};

/// One simulated vehicle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,

    /// Vehicle type name (`"light8t"`, `"vwCaddy"`, ...).
    pub vehicle_type: String,

    /// Network mode the vehicle's type drives with (`"car"`, `"truck8t"`, ...).
    pub network_mode: String,
}

/// Read-only vehicle lookup.
///
/// Also records every distinct network mode in first-seen order so report
/// writers can add one column per mode.
#[derive(Default)]
pub struct VehicleRegistry {
    vehicles: HashMap<VehicleId, Vehicle>,
    modes:    Vec<String>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vehicle.  A second insert for the same id replaces the
    /// first.
    pub fn insert(
        &mut self,
        id:           impl Into<VehicleId>,
        vehicle_type: impl Into<String>,
        network_mode: impl Into<String>,
    ) -> &mut Self {
        let id = id.into();
        let network_mode = network_mode.into();
        if !self.modes.contains(&network_mode) {
            self.modes.push(network_mode.clone());
        }
        self.vehicles.insert(
            id.clone(),
            Vehicle { id, vehicle_type: vehicle_type.into(), network_mode },
        );
        self
    }

    /// Look up a vehicle by id.
    ///
    /// # Errors
    ///
    /// [`SpatialError::VehicleNotFound`] if `id` was never registered.
    #[inline]
    pub fn vehicle(&self, id: &VehicleId) -> SpatialResult<&Vehicle> {
        self.vehicles
            .get(id)
            .ok_or_else(|| SpatialError::VehicleNotFound(id.clone()))
    }

    /// Distinct network modes in first-registered order.
    pub fn network_modes(&self) -> &[String] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
