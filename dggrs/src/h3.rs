//! H3 realization of [`GridSystem`].

use crate::{GridError, GridSystem, Level, Zone, ZoneCoder, ZoneId};
use geo::{geometry::Coord, LineString, Polygon};
use h3o::{CellIndex, LatLng, Resolution};
use std::ops::RangeInclusive;

const MIN_LEVEL: Level = 0;
const MAX_LEVEL: Level = 15;

/// The H3 hexagonal hierarchical tessellation.
///
/// Zone identifiers are raw H3 cell indexes.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Grid;

impl H3Grid {
    fn resolution(level: Level) -> Result<Resolution, GridError> {
        Resolution::try_from(level).map_err(|_| GridError::InvalidLevel(level))
    }
}

impl GridSystem for H3Grid {
    fn decode(&self, id: ZoneId) -> Result<Zone, GridError> {
        let cell = CellIndex::try_from(id.into_raw())
            .map_err(|_| GridError::InvalidZone(id.into_raw()))?;
        let mut ring: Vec<Coord<f64>> = cell
            .boundary()
            .iter()
            .map(|vertex| Coord {
                x: vertex.lng(),
                y: vertex.lat(),
            })
            .collect();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        Ok(Zone {
            id,
            polygon: Polygon::new(LineString::from(ring), vec![]),
        })
    }

    fn coder(&self) -> Box<dyn ZoneCoder + Send> {
        Box::new(H3Coder {
            resolution: Resolution::Zero,
        })
    }

    fn level_range(&self) -> RangeInclusive<Level> {
        MIN_LEVEL..=MAX_LEVEL
    }

    fn level_for_resolution(&self, meters: f64) -> Level {
        let mut best = MIN_LEVEL;
        let mut best_gap = f64::INFINITY;
        for resolution in (MIN_LEVEL..=MAX_LEVEL).filter_map(|l| Resolution::try_from(l).ok()) {
            let gap = (resolution.edge_length_m() - meters).abs();
            if gap < best_gap {
                best_gap = gap;
                best = resolution.into();
            }
        }
        best
    }
}

struct H3Coder {
    resolution: Resolution,
}

impl ZoneCoder for H3Coder {
    fn set_level(&mut self, level: Level) -> Result<(), GridError> {
        self.resolution = H3Grid::resolution(level)?;
        Ok(())
    }

    fn level(&self) -> Level {
        self.resolution.into()
    }

    fn encode(&self, coord: Coord<f64>) -> Result<ZoneId, GridError> {
        // H3 normalizes any finite lat/lng, so the domain check is ours.
        if !(-90.0..=90.0).contains(&coord.y) || !(-180.0..=180.0).contains(&coord.x) {
            return Err(GridError::OutsideDomain {
                x: coord.x,
                y: coord.y,
            });
        }
        let latlng = LatLng::new(coord.y, coord.x).map_err(|_| GridError::OutsideDomain {
            x: coord.x,
            y: coord.y,
        })?;
        Ok(ZoneId::from_raw(latlng.to_cell(self.resolution).into()))
    }
}
