//! Columnar sample backing: one vector per band, one slot per zone.

use super::{CodedCoverage, Track, ZoneCursor, ZoneCursorMut};
use crate::{Band, GridGeometry, RecordSchema, ZonalError};
use std::sync::OnceLock;

/// Coverage backed by per-band sample vectors.
pub struct ColumnCoverage {
    geometry: GridGeometry,
    bands: Vec<Band>,
    columns: Vec<Vec<f64>>,
    schema: OnceLock<RecordSchema>,
}

impl ColumnCoverage {
    /// Couples a geometry with one sample column per band.
    ///
    /// Every column must hold exactly one sample per zone; any
    /// disagreement is a construction-time configuration error.
    pub fn new(
        geometry: GridGeometry,
        bands: Vec<Band>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, ZonalError> {
        if bands.len() != columns.len() {
            return Err(ZonalError::BandCount {
                bands: bands.len(),
                columns: columns.len(),
            });
        }
        let count = geometry.zone_count();
        for (band, column) in bands.iter().zip(&columns) {
            if column.len() != count {
                return Err(ZonalError::SampleCount {
                    band: band.name().to_string(),
                    count,
                    samples: column.len(),
                });
            }
        }
        Ok(Self {
            geometry,
            bands,
            columns,
            schema: OnceLock::new(),
        })
    }

    /// The raw sample column for `band`.
    pub fn column(&self, band: usize) -> Result<&[f64], ZonalError> {
        self.columns
            .get(band)
            .map(Vec::as_slice)
            .ok_or(ZonalError::Band(band))
    }
}

impl CodedCoverage for ColumnCoverage {
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
        Box::new(ColumnCursor {
            columns: &self.columns,
            track: Track::new(self.geometry.zone_count()),
        })
    }

    fn cursor_mut(&mut self) -> Box<dyn ZoneCursorMut + '_> {
        let track = Track::new(self.geometry.zone_count());
        Box::new(ColumnCursorMut {
            columns: &mut self.columns,
            track,
        })
    }
}

struct ColumnCursor<'a> {
    columns: &'a [Vec<f64>],
    track: Track,
}

impl ZoneCursor for ColumnCursor<'_> {
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
        self.columns.len()
    }

    fn sample(&self, band: usize) -> Result<f64, ZonalError> {
        let position = self.track.current()?;
        let column = self.columns.get(band).ok_or(ZonalError::Band(band))?;
        Ok(column[position])
    }
}

struct ColumnCursorMut<'a> {
    columns: &'a mut [Vec<f64>],
    track: Track,
}

impl ZoneCursor for ColumnCursorMut<'_> {
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
        self.columns.len()
    }

    fn sample(&self, band: usize) -> Result<f64, ZonalError> {
        let position = self.track.current()?;
        let column = self.columns.get(band).ok_or(ZonalError::Band(band))?;
        Ok(column[position])
    }
}

impl ZoneCursorMut for ColumnCursorMut<'_> {
    fn set_sample(&mut self, band: usize, value: f64) -> Result<(), ZonalError> {
        let position = self.track.current()?;
        let column = self.columns.get_mut(band).ok_or(ZonalError::Band(band))?;
        column[position] = value;
        Ok(())
    }
}
