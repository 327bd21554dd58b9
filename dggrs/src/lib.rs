//! Discrete global grid reference systems.
//!
//! A grid reference system partitions the globe into discrete cells
//! ("zones") at a series of refinement levels, and can encode a
//! geographic point to the identifier of the zone containing it, or
//! decode an identifier back to the zone's polygonal extent.
//!
//! # References
//!
//! 1. [OGC Topic 21: Discrete Global Grid Systems](https://docs.ogc.org/as/20-040r3/20-040r3.html)
//! 1. [H3 indexing overview](https://h3geo.org/docs/core-library/overview)

mod error;
mod h3;

pub use crate::{error::GridError, h3::H3Grid};
use geo::{geometry::Coord, Polygon};
use std::ops::RangeInclusive;

/// Refinement/precision level of a tessellation.
///
/// Higher levels subdivide the globe into smaller zones.
pub type Level = u8;

/// Opaque identifier of a single zone of a tessellation.
///
/// Consumers must treat the inner value as a token: it is hashable and
/// totally ordered by construction, but its bit layout belongs to the
/// grid system that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(u64);

impl ZoneId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// A decoded zone: its identifier plus its polygonal extent in
/// geographic (lon/lat degree) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub polygon: Polygon<f64>,
}

/// A hierarchical tessellation of the globe.
pub trait GridSystem: Send + Sync {
    /// Returns the zone for `id`.
    fn decode(&self, id: ZoneId) -> Result<Zone, GridError>;

    /// Mints a fresh coder positioned at this system's coarsest level.
    ///
    /// Coders are stateful and intentionally not shared; callers that
    /// evaluate concurrently each take their own.
    fn coder(&self) -> Box<dyn ZoneCoder + Send>;

    /// Levels this tessellation supports.
    fn level_range(&self) -> RangeInclusive<Level>;

    /// Returns the level whose typical zone size best matches a ground
    /// resolution of `meters`.
    fn level_for_resolution(&self, meters: f64) -> Level;
}

/// Stateful point-to-zone encoder at a configurable level.
pub trait ZoneCoder {
    /// Selects the level used by subsequent [`encode`](Self::encode)
    /// calls.
    fn set_level(&mut self, level: Level) -> Result<(), GridError>;

    /// The currently selected level.
    fn level(&self) -> Level;

    /// Returns the identifier of the zone containing `coord` at the
    /// current level.
    ///
    /// Fails with [`GridError::OutsideDomain`] when the point lies
    /// outside the area the tessellation supports at that level.
    fn encode(&self, coord: Coord<f64>) -> Result<ZoneId, GridError>;
}
