//! Rendering a coded coverage onto a conventional rectangular raster.

use crate::{
    transform::{CoordTransform, Crs, TransformProvider},
    Band, CodedCoverage, Evaluator, RasterGeometry, ZonalError, ZoneCursor,
};
use geo::{
    geometry::{Coord, Point, Polygon},
    BoundingRect, Contains, MapCoords,
};
use log::debug;
use rayon::prelude::*;

/// How to turn zones into pixels.
///
/// The choice is the caller's: mask painting amortizes better when
/// zones are large relative to pixels, point evaluation is simpler and
/// embarrassingly parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Forward scan of the coverage's zones, painting each zone's
    /// footprint and claiming the pixels it covers.
    Mask,

    /// Independent evaluation of every output pixel's center.
    PointEvaluation,
}

/// A rendered raster: one NaN-initialized sample plane per band.
#[derive(Debug, Clone)]
pub struct RasterData {
    geometry: RasterGeometry,
    bands: Vec<Band>,
    planes: Vec<Vec<f64>>,
}

impl RasterData {
    pub fn geometry(&self) -> &RasterGeometry {
        &self.geometry
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn plane(&self, band: usize) -> Result<&[f64], ZonalError> {
        self.planes
            .get(band)
            .map(Vec::as_slice)
            .ok_or(ZonalError::Band(band))
    }

    pub fn value(&self, band: usize, col: usize, row: usize) -> Result<f64, ZonalError> {
        let plane = self.planes.get(band).ok_or(ZonalError::Band(band))?;
        Ok(plane[row * self.geometry.width() + col])
    }
}

/// Renders `coverage` onto `target`.
///
/// Pixels no zone contributes to are left NaN; a partially filled
/// raster is the expected steady state, not an error.
pub fn rasterize(
    coverage: &dyn CodedCoverage,
    target: &RasterGeometry,
    strategy: Strategy,
    transforms: &dyn TransformProvider,
) -> Result<RasterData, ZonalError> {
    let now = std::time::Instant::now();
    let planes = match strategy {
        Strategy::Mask => mask_pass(coverage, target, transforms),
        Strategy::PointEvaluation => point_pass(coverage, target, transforms),
    }?;
    debug!(
        "rasterized {} zones onto {}x{} via {strategy:?} in {:?}",
        coverage.zone_count(),
        target.width(),
        target.height(),
        now.elapsed(),
    );
    Ok(RasterData {
        geometry: target.clone(),
        bands: coverage.bands().to_vec(),
        planes,
    })
}

/// Zone-order painting. Cost scales with zone count times average
/// zone footprint, not with output resolution directly.
fn mask_pass(
    coverage: &dyn CodedCoverage,
    target: &RasterGeometry,
    transforms: &dyn TransformProvider,
) -> Result<Vec<Vec<f64>>, ZonalError> {
    let geometry = coverage.geometry();
    let to_target = transforms.between(&Crs::wgs84(), target.crs())?;
    let (width, height) = (target.width(), target.height());
    let band_count = coverage.bands().len();
    let mut planes = vec![vec![f64::NAN; width * height]; band_count];
    let mut resolved = vec![false; width * height];
    let mut samples = Vec::with_capacity(band_count);

    let mut cursor = coverage.cursor();
    while cursor.advance() {
        let Some(position) = cursor.position() else {
            break;
        };
        let zone = geometry.index().zone_at(position)?;
        let footprint = pixel_footprint(&geometry.system().decode(zone)?.polygon, &to_target, target);
        let Some(bounds) = footprint.bounding_rect() else {
            continue;
        };
        // Clip the footprint's bounds to the raster rectangle.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let col_min = bounds.min().x.floor().max(0.0) as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let row_min = bounds.min().y.floor().max(0.0) as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let col_max = (bounds.max().x.ceil().max(0.0) as usize).min(width);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let row_max = (bounds.max().y.ceil().max(0.0) as usize).min(height);
        if col_min >= col_max || row_min >= row_max {
            continue;
        }
        cursor.samples(&mut samples)?;
        for row in row_min..row_max {
            for col in col_min..col_max {
                let pixel = row * width + col;
                if resolved[pixel] {
                    // An earlier zone claimed this pixel; scan order
                    // decides overlaps.
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let center = Point::new(col as f64 + 0.5, row as f64 + 0.5);
                if footprint.contains(&center) {
                    resolved[pixel] = true;
                    for (plane, &value) in planes.iter_mut().zip(&samples) {
                        plane[pixel] = value;
                    }
                }
            }
        }
    }
    Ok(planes)
}

/// The zone's polygon in the raster's fractional pixel space.
fn pixel_footprint(
    polygon: &Polygon<f64>,
    to_target: &CoordTransform,
    target: &RasterGeometry,
) -> Polygon<f64> {
    polygon.map_coords(|coord| {
        let (col, row) = target.transform().world_to_pixel(to_target.apply(coord));
        Coord { x: col, y: row }
    })
}

/// Pixel-independent evaluation, parallel across pixels with one
/// evaluator per worker.
fn point_pass(
    coverage: &dyn CodedCoverage,
    target: &RasterGeometry,
    transforms: &dyn TransformProvider,
) -> Result<Vec<Vec<f64>>, ZonalError> {
    let to_geographic = transforms.between(target.crs(), &Crs::wgs84())?;
    let width = target.width();
    let pixels: Vec<Option<Vec<f64>>> = (0..target.pixel_count())
        .into_par_iter()
        .map_init(
            || Evaluator::new(coverage),
            |evaluator, pixel| {
                let center = target.pixel_center(pixel % width, pixel / width);
                evaluator.evaluate(to_geographic.apply(center), true)
            },
        )
        .collect::<Result<_, _>>()?;

    let mut planes = vec![vec![f64::NAN; target.pixel_count()]; coverage.bands().len()];
    for (pixel, resolved) in pixels.into_iter().enumerate() {
        if let Some(samples) = resolved {
            for (plane, value) in planes.iter_mut().zip(samples) {
                plane[pixel] = value;
            }
        }
    }
    Ok(planes)
}
