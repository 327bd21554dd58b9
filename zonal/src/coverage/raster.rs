//! Raster sample backing: zone samples packed into a conventional 2D
//! pixel buffer, addressed through a caller-supplied zone↔pixel
//! mapping.

use super::{CodedCoverage, Track, ZoneCursor, ZoneCursorMut};
use crate::{Band, GridGeometry, RecordSchema, ZonalError, ZoneIndex};
use dggrs::ZoneId;
use std::sync::OnceLock;

/// A width × height pixel buffer with one `f64` plane per band.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    planes: Vec<Vec<f64>>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, planes: Vec<Vec<f64>>) -> Result<Self, ZonalError> {
        let expected = width * height;
        for (band, plane) in planes.iter().enumerate() {
            if plane.len() != expected {
                return Err(ZonalError::PlaneSize {
                    band,
                    len: plane.len(),
                    expected,
                });
            }
        }
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    /// A grid of `bands` NaN-filled planes.
    pub fn filled(width: usize, height: usize, bands: usize) -> Self {
        Self {
            width,
            height,
            planes: vec![vec![f64::NAN; width * height]; bands],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn band_count(&self) -> usize {
        self.planes.len()
    }

    pub fn value(&self, band: usize, col: usize, row: usize) -> Result<f64, ZonalError> {
        let plane = self.planes.get(band).ok_or(ZonalError::Band(band))?;
        Ok(plane[row * self.width + col])
    }

    pub fn set_value(
        &mut self,
        band: usize,
        col: usize,
        row: usize,
        value: f64,
    ) -> Result<(), ZonalError> {
        let width = self.width;
        let plane = self.planes.get_mut(band).ok_or(ZonalError::Band(band))?;
        plane[row * width + col] = value;
        Ok(())
    }
}

/// Bijective mapping between zone identifiers and pixel coordinates of
/// the backing buffer.
pub trait ZonePixelMap: Send + Sync {
    fn to_pixel(&self, zone: ZoneId) -> (usize, usize);

    /// Reverse direction of the mapping. Present for completeness;
    /// nothing in the engine calls it yet.
    fn to_zone(&self, col: usize, row: usize) -> ZoneId;
}

/// The canonical packing: a zone's raw identifier is its row-major
/// pixel offset.
#[derive(Debug, Clone, Copy)]
pub struct RowMajorMap {
    pub width: usize,
}

impl ZonePixelMap for RowMajorMap {
    fn to_pixel(&self, zone: ZoneId) -> (usize, usize) {
        #[allow(clippy::cast_possible_truncation)]
        let offset = zone.into_raw() as usize;
        (offset % self.width, offset / self.width)
    }

    fn to_zone(&self, col: usize, row: usize) -> ZoneId {
        ZoneId::from_raw((row * self.width + col) as u64)
    }
}

/// Coverage whose samples live in a [`PixelGrid`].
pub struct RasterCoverage {
    geometry: GridGeometry,
    bands: Vec<Band>,
    grid: PixelGrid,
    map: Box<dyn ZonePixelMap>,
    schema: OnceLock<RecordSchema>,
}

impl RasterCoverage {
    /// Couples a geometry with a pixel buffer holding one pixel per
    /// zone.
    ///
    /// The buffer's area must equal the zone count and it must carry
    /// one plane per band; both are construction-time configuration
    /// errors otherwise.
    pub fn new(
        geometry: GridGeometry,
        bands: Vec<Band>,
        grid: PixelGrid,
        map: Box<dyn ZonePixelMap>,
    ) -> Result<Self, ZonalError> {
        let count = geometry.zone_count();
        if grid.width() * grid.height() != count {
            return Err(ZonalError::PixelCount {
                width: grid.width(),
                height: grid.height(),
                count,
            });
        }
        if bands.len() != grid.band_count() {
            return Err(ZonalError::BandCount {
                bands: bands.len(),
                columns: grid.band_count(),
            });
        }
        Ok(Self {
            geometry,
            bands,
            grid,
            map,
            schema: OnceLock::new(),
        })
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }
}

impl CodedCoverage for RasterCoverage {
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    fn bands(&self) -> &[Band] {
        &self.bands
    }

    fn schema(&self) -> &RecordSchema {
        self.schema
            .get_or_init(|| RecordSchema::from_bands(&self.bands))
    }

    fn cursor(&self) -> Box<dyn ZoneCursor + '_> {
        Box::new(RasterCursor {
            index: self.geometry.index(),
            map: self.map.as_ref(),
            grid: &self.grid,
            track: Track::new(self.geometry.zone_count()),
        })
    }

    fn cursor_mut(&mut self) -> Box<dyn ZoneCursorMut + '_> {
        let track = Track::new(self.geometry.zone_count());
        Box::new(RasterCursorMut {
            index: self.geometry.index(),
            map: self.map.as_ref(),
            grid: &mut self.grid,
            track,
        })
    }
}

/// Resolves the zone at `position` to a pixel coordinate through the
/// caller's mapping.
fn pixel_at(
    index: &ZoneIndex,
    map: &dyn ZonePixelMap,
    grid_width: usize,
    grid_height: usize,
    position: usize,
) -> Result<(usize, usize), ZonalError> {
    let zone = index.zone_at(position)?;
    let (col, row) = map.to_pixel(zone);
    if col >= grid_width || row >= grid_height {
        return Err(ZonalError::PixelMap {
            zone,
            width: grid_width,
            height: grid_height,
        });
    }
    Ok((col, row))
}

struct RasterCursor<'a> {
    index: &'a ZoneIndex,
    map: &'a dyn ZonePixelMap,
    grid: &'a PixelGrid,
    track: Track,
}

impl ZoneCursor for RasterCursor<'_> {
    fn advance(&mut self) -> bool {
        self.track.advance()
    }

    fn rewind(&mut self) {
        self.track.rewind();
    }

    fn seek(&mut self, position: usize) -> Result<(), ZonalError> {
        self.track.seek(position)
    }

    fn position(&self) -> Option<usize> {
        self.track.position()
    }

    fn band_count(&self) -> usize {
        self.grid.band_count()
    }

    fn sample(&self, band: usize) -> Result<f64, ZonalError> {
        let position = self.track.current()?;
        let (col, row) = pixel_at(
            self.index,
            self.map,
            self.grid.width(),
            self.grid.height(),
            position,
        )?;
        self.grid.value(band, col, row)
    }
}

struct RasterCursorMut<'a> {
    index: &'a ZoneIndex,
    map: &'a dyn ZonePixelMap,
    grid: &'a mut PixelGrid,
    track: Track,
}

impl ZoneCursor for RasterCursorMut<'_> {
    fn advance(&mut self) -> bool {
        self.track.advance()
    }

    fn rewind(&mut self) {
        self.track.rewind();
    }

    fn seek(&mut self, position: usize) -> Result<(), ZonalError> {
        self.track.seek(position)
    }

    fn position(&self) -> Option<usize> {
        self.track.position()
    }

    fn band_count(&self) -> usize {
        self.grid.band_count()
    }

    fn sample(&self, band: usize) -> Result<f64, ZonalError> {
        let position = self.track.current()?;
        let (col, row) = pixel_at(
            self.index,
            self.map,
            self.grid.width(),
            self.grid.height(),
            position,
        )?;
        self.grid.value(band, col, row)
    }
}

impl ZoneCursorMut for RasterCursorMut<'_> {
    fn set_sample(&mut self, band: usize, value: f64) -> Result<(), ZonalError> {
        let position = self.track.current()?;
        let (col, row) = pixel_at(
            self.index,
            self.map,
            self.grid.width(),
            self.grid.height(),
            position,
        )?;
        self.grid.set_value(band, col, row, value)
    }
}
