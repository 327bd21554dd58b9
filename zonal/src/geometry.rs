//! Grid geometries: the zonal domain of a coverage, and the
//! conventional rectangular rasters it is rendered into.

use crate::{transform::Crs, ZonalError, ZoneIndex};
use dggrs::{GridSystem, Level};
use geo::geometry::Coord;
use std::{ops::RangeInclusive, sync::Arc};

/// The domain of a coded coverage: which zones it covers, under which
/// grid reference system, across which refinement levels.
#[derive(Clone)]
pub struct GridGeometry {
    system: Arc<dyn GridSystem>,
    index: ZoneIndex,
    levels: RangeInclusive<Level>,
}

impl GridGeometry {
    pub fn new(
        system: Arc<dyn GridSystem>,
        index: impl Into<ZoneIndex>,
        levels: RangeInclusive<Level>,
    ) -> Result<Self, ZonalError> {
        let supported = system.level_range();
        if levels.is_empty()
            || !supported.contains(levels.start())
            || !supported.contains(levels.end())
        {
            return Err(ZonalError::Grid(dggrs::GridError::InvalidLevel(
                *levels.end(),
            )));
        }
        Ok(Self {
            system,
            index: index.into(),
            levels,
        })
    }

    pub fn system(&self) -> &Arc<dyn GridSystem> {
        &self.system
    }

    pub fn index(&self) -> &ZoneIndex {
        &self.index
    }

    pub fn levels(&self) -> RangeInclusive<Level> {
        self.levels.clone()
    }

    pub fn zone_count(&self) -> usize {
        self.index.len()
    }
}

impl std::fmt::Debug for GridGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridGeometry")
            .field("zones", &self.index.len())
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

/// GDAL-order affine georeferencing coefficients.
///
/// `x = c[0] + col*c[1] + row*c[2]`, `y = c[3] + col*c[4] + row*c[5]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform([f64; 6]);

impl GeoTransform {
    pub fn from_gdal(coefficients: [f64; 6]) -> Self {
        Self(coefficients)
    }

    /// North-up transform with the raster origin at the northwest
    /// corner.
    pub fn north_up(origin: Coord<f64>, pixel_width: f64, pixel_height: f64) -> Self {
        Self([origin.x, pixel_width, 0.0, origin.y, 0.0, -pixel_height])
    }

    pub fn pixel_to_world(&self, col: f64, row: f64) -> Coord<f64> {
        let c = &self.0;
        Coord {
            x: c[0] + col * c[1] + row * c[2],
            y: c[3] + col * c[4] + row * c[5],
        }
    }

    pub fn world_to_pixel(&self, coord: Coord<f64>) -> (f64, f64) {
        let c = &self.0;
        let det = c[1] * c[5] - c[2] * c[4];
        let dx = coord.x - c[0];
        let dy = coord.y - c[3];
        ((dx * c[5] - dy * c[2]) / det, (dy * c[1] - dx * c[4]) / det)
    }

    /// Pixel sizes along the two raster axes.
    pub fn resolution(&self) -> (f64, f64) {
        let c = &self.0;
        (c[1].hypot(c[4]), c[2].hypot(c[5]))
    }

    fn is_invertible(&self) -> bool {
        let c = &self.0;
        let det = c[1] * c[5] - c[2] * c[4];
        det != 0.0 && det.is_finite()
    }
}

/// A conventional rectangular raster target.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGeometry {
    width: usize,
    height: usize,
    transform: GeoTransform,
    crs: Crs,
}

impl RasterGeometry {
    pub fn new(
        width: usize,
        height: usize,
        transform: GeoTransform,
        crs: Crs,
    ) -> Result<Self, ZonalError> {
        if width == 0 || height == 0 {
            return Err(ZonalError::RasterGeometry("zero-sized raster"));
        }
        if !transform.is_invertible() {
            return Err(ZonalError::RasterGeometry(
                "georeferencing transform is not invertible",
            ));
        }
        Ok(Self {
            width,
            height,
            transform,
            crs,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// World coordinates of the center of pixel `(col, row)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_center(&self, col: usize, row: usize) -> Coord<f64> {
        self.transform
            .pixel_to_world(col as f64 + 0.5, row as f64 + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Crs, GeoTransform, RasterGeometry};
    use crate::ZonalError;
    use approx::assert_relative_eq;

    #[test]
    fn test_north_up_round_trip() {
        let transform = GeoTransform::north_up(Coord { x: -72.0, y: 45.0 }, 0.25, 0.5);
        let world = transform.pixel_to_world(3.0, 2.0);
        assert_relative_eq!(world.x, -71.25);
        assert_relative_eq!(world.y, 44.0);
        let (col, row) = transform.world_to_pixel(world);
        assert_relative_eq!(col, 3.0);
        assert_relative_eq!(row, 2.0);
    }

    #[test]
    fn test_resolution() {
        let transform = GeoTransform::north_up(Coord { x: 0.0, y: 0.0 }, 0.25, 0.5);
        let (x, y) = transform.resolution();
        assert_relative_eq!(x, 0.25);
        assert_relative_eq!(y, 0.5);
    }

    #[test]
    fn test_pixel_center() {
        let geometry = RasterGeometry::new(
            2,
            2,
            GeoTransform::north_up(Coord { x: 0.0, y: 1.0 }, 0.5, 0.5),
            Crs::wgs84(),
        )
        .unwrap();
        let center = geometry.pixel_center(0, 0);
        assert_relative_eq!(center.x, 0.25);
        assert_relative_eq!(center.y, 0.75);
    }

    #[test]
    fn test_rejects_degenerate_geometry() {
        let transform = GeoTransform::from_gdal([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            RasterGeometry::new(2, 2, transform, Crs::wgs84()),
            Err(ZonalError::RasterGeometry(_))
        ));
        let ok = GeoTransform::north_up(Coord { x: 0.0, y: 0.0 }, 1.0, 1.0);
        assert!(matches!(
            RasterGeometry::new(0, 2, ok, Crs::wgs84()),
            Err(ZonalError::RasterGeometry(_))
        ));
    }
}
