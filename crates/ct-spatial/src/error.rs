//! Spatial-subsystem error type.

use thiserror::Error;

use ct_core::{LinkId, VehicleId};

/// Errors produced by `ct-spatial`.
///
/// The two `NotFound` variants mean the event stream does not match the
/// network it was generated against; callers treat them as fatal.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("link {0} not found in network")]
    LinkNotFound(LinkId),

    #[error("vehicle {0} not found in vehicle registry")]
    VehicleNotFound(VehicleId),

    #[error("link {0} added twice")]
    DuplicateLink(LinkId),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
