//! A tiny tessellation of the unit square for exercising the engine
//! without a real global grid.

use crate::{GridGeometry, ZoneRange};
use dggrs::{GridError, GridSystem, Level, Zone, ZoneCoder, ZoneId};
use geo::{geometry::Coord, polygon};
use std::{ops::RangeInclusive, sync::Arc};

/// Tessellates the unit square `[0,1]²` into a `cols` × `rows` lattice
/// that materializes at exactly one refinement level.
///
/// Zone ids are row-major cell offsets with row 0 along the top edge,
/// so a north-up raster aligned 1:1 with the lattice sees zones in
/// reading order.
pub(crate) struct LatticeGrid {
    pub cols: u64,
    pub rows: u64,
    /// The single level the lattice exists at; encoding at any other
    /// level reports the point outside the supported domain.
    pub level: Level,
}

impl GridSystem for LatticeGrid {
    fn decode(&self, id: ZoneId) -> Result<Zone, GridError> {
        let raw = id.into_raw();
        if raw >= self.cols * self.rows {
            return Err(GridError::InvalidZone(raw));
        }
        let col = raw % self.cols;
        let row = raw / self.cols;
        #[allow(clippy::cast_precision_loss)]
        let (width, height) = (1.0 / self.cols as f64, 1.0 / self.rows as f64);
        #[allow(clippy::cast_precision_loss)]
        let west = col as f64 * width;
        #[allow(clippy::cast_precision_loss)]
        let north = 1.0 - row as f64 * height;
        let polygon = polygon![
            (x: west, y: north - height),
            (x: west + width, y: north - height),
            (x: west + width, y: north),
            (x: west, y: north),
            (x: west, y: north - height),
        ];
        Ok(Zone { id, polygon })
    }

    fn coder(&self) -> Box<dyn ZoneCoder + Send> {
        Box::new(LatticeCoder {
            cols: self.cols,
            rows: self.rows,
            native: self.level,
            level: 0,
        })
    }

    fn level_range(&self) -> RangeInclusive<Level> {
        0..=15
    }

    fn level_for_resolution(&self, _meters: f64) -> Level {
        self.level
    }
}

struct LatticeCoder {
    cols: u64,
    rows: u64,
    native: Level,
    level: Level,
}

impl ZoneCoder for LatticeCoder {
    fn set_level(&mut self, level: Level) -> Result<(), GridError> {
        if level > 15 {
            return Err(GridError::InvalidLevel(level));
        }
        self.level = level;
        Ok(())
    }

    fn level(&self) -> Level {
        self.level
    }

    fn encode(&self, coord: Coord<f64>) -> Result<ZoneId, GridError> {
        let inside = (0.0..=1.0).contains(&coord.x) && (0.0..=1.0).contains(&coord.y);
        if self.level != self.native || !inside {
            return Err(GridError::OutsideDomain {
                x: coord.x,
                y: coord.y,
            });
        }
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let col = ((coord.x * self.cols as f64) as u64).min(self.cols - 1);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let from_bottom = ((coord.y * self.rows as f64) as u64).min(self.rows - 1);
        let row = self.rows - 1 - from_bottom;
        Ok(ZoneId::from_raw(row * self.cols + col))
    }
}

/// A lattice geometry whose zones form the computed index
/// `0, 1, .., cols*rows - 1`, native to level 1.
pub(crate) fn lattice_geometry(cols: u64, rows: u64) -> GridGeometry {
    lattice_geometry_at(cols, rows, 1, 1..=1)
}

pub(crate) fn lattice_geometry_at(
    cols: u64,
    rows: u64,
    native: Level,
    levels: RangeInclusive<Level>,
) -> GridGeometry {
    let system = Arc::new(LatticeGrid {
        cols,
        rows,
        level: native,
    });
    #[allow(clippy::cast_possible_truncation)]
    let index = ZoneRange::new(0, 1, (cols * rows) as usize).unwrap();
    GridGeometry::new(system, index, levels).unwrap()
}
