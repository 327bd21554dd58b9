//! Coded coverages: gridded datasets addressed by zone rather than by
//! raster pixel, over pluggable sample backings.

mod column;
mod raster;

pub use self::{
    column::ColumnCoverage,
    raster::{PixelGrid, RasterCoverage, RowMajorMap, ZonePixelMap},
};
use crate::{Band, GridGeometry, RecordSchema, ZonalError};

/// A gridded dataset whose addressable units are zones.
///
/// Backings differ in how samples are stored; all of them expose the
/// same narrow cursor contract, selected at construction and never
/// switched afterwards.
pub trait CodedCoverage: Send + Sync {
    fn geometry(&self) -> &GridGeometry;

    fn bands(&self) -> &[Band];

    /// The named-field schema of this coverage's sample records.
    ///
    /// Built on first access and cached; field order is stable for the
    /// coverage's lifetime.
    fn schema(&self) -> &RecordSchema;

    /// A fresh read cursor, positioned before the first zone.
    fn cursor(&self) -> Box<dyn ZoneCursor + '_>;

    /// A fresh writable cursor, positioned before the first zone.
    ///
    /// Requires exclusive access: the engine provides no
    /// synchronization for concurrent writers.
    fn cursor_mut(&mut self) -> Box<dyn ZoneCursorMut + '_>;

    fn zone_count(&self) -> usize {
        self.geometry().zone_count()
    }
}

/// Stateful cursor over a coverage's zones.
///
/// A cursor has exactly one position variable. It starts logically
/// before the first zone, so the first [`advance`](Self::advance)
/// lands on position 0.
pub trait ZoneCursor {
    /// Moves to the next zone; false once the zones are exhausted.
    fn advance(&mut self) -> bool;

    /// Returns to the before-first state.
    fn rewind(&mut self);

    /// Random access to `position`.
    fn seek(&mut self, position: usize) -> Result<(), ZonalError>;

    /// Current position, or `None` before the first advance.
    fn position(&self) -> Option<usize>;

    fn band_count(&self) -> usize;

    /// Sample of `band` at the current position.
    fn sample(&self, band: usize) -> Result<f64, ZonalError>;

    /// All bands' samples at the current position, into `out`.
    fn samples(&self, out: &mut Vec<f64>) -> Result<(), ZonalError> {
        out.clear();
        for band in 0..self.band_count() {
            out.push(self.sample(band)?);
        }
        Ok(())
    }
}

/// A [`ZoneCursor`] that can also mutate samples in place.
///
/// Mutation never changes the zone count or order, only values.
pub trait ZoneCursorMut: ZoneCursor {
    fn set_sample(&mut self, band: usize, value: f64) -> Result<(), ZonalError>;
}

/// Shared position bookkeeping for cursor implementations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Track {
    position: Option<usize>,
    len: usize,
}

impl Track {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            position: None,
            len,
        }
    }

    pub(crate) fn advance(&mut self) -> bool {
        let next = self.position.map_or(0, |position| position + 1);
        if next < self.len {
            self.position = Some(next);
            true
        } else {
            false
        }
    }

    pub(crate) fn rewind(&mut self) {
        self.position = None;
    }

    pub(crate) fn seek(&mut self, position: usize) -> Result<(), ZonalError> {
        if position < self.len {
            self.position = Some(position);
            Ok(())
        } else {
            Err(ZonalError::Position {
                position,
                len: self.len,
            })
        }
    }

    pub(crate) fn position(&self) -> Option<usize> {
        self.position
    }

    /// Current position, or [`ZonalError::Unpositioned`] before the
    /// first advance.
    pub(crate) fn current(&self) -> Result<usize, ZonalError> {
        self.position.ok_or(ZonalError::Unpositioned)
    }
}
