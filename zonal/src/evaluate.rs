//! Multi-resolution point evaluation.

use crate::{CodedCoverage, ZonalError, ZoneCursor};
use dggrs::{GridError, ZoneCoder};
use geo::geometry::Coord;
use log::debug;

/// Evaluates a coverage at geographic points.
///
/// Each evaluator owns its own coder and its own read cursor, so
/// concurrent evaluation uses one evaluator per thread; a single
/// evaluator is deliberately not shareable.
pub struct Evaluator<'a> {
    coverage: &'a dyn CodedCoverage,
    coder: Box<dyn ZoneCoder + Send>,
    cursor: Box<dyn ZoneCursor + 'a>,
}

impl<'a> Evaluator<'a> {
    pub fn new(coverage: &'a dyn CodedCoverage) -> Self {
        let coder = coverage.geometry().system().coder();
        let cursor = coverage.cursor();
        Self {
            coverage,
            coder,
            cursor,
        }
    }

    /// Returns the sample vector of the zone containing `point`.
    ///
    /// Tries each refinement level of the coverage's supported range
    /// in turn, encoding the point to a zone id at that level and
    /// looking it up; the first level with an indexed zone wins. A
    /// level at which the point falls outside the tessellation's
    /// supported area is skipped, not an error.
    ///
    /// When no level resolves the point, returns `Ok(None)` if
    /// `allow_missing`, and [`ZonalError::PointOutsideDomain`]
    /// otherwise.
    pub fn evaluate(
        &mut self,
        point: Coord<f64>,
        allow_missing: bool,
    ) -> Result<Option<Vec<f64>>, ZonalError> {
        let coverage = self.coverage;
        let geometry = coverage.geometry();
        for level in geometry.levels() {
            self.coder.set_level(level)?;
            let zone = match self.coder.encode(point) {
                Ok(zone) => zone,
                Err(GridError::OutsideDomain { .. }) => continue,
                Err(e) => return Err(e.into()),
            };
            if let Some(position) = geometry.index().position_of(zone) {
                self.cursor.seek(position)?;
                let mut samples = Vec::with_capacity(self.cursor.band_count());
                self.cursor.samples(&mut samples)?;
                debug!(
                    "({}, {}) resolved to zone {zone} at level {level}",
                    point.x, point.y
                );
                return Ok(Some(samples));
            }
        }
        if allow_missing {
            Ok(None)
        } else {
            Err(ZonalError::PointOutsideDomain {
                x: point.x,
                y: point.y,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Evaluator};
    use crate::{
        testgrid::{lattice_geometry, lattice_geometry_at},
        Band, ColumnCoverage, ZonalError,
    };

    fn elevation_coverage() -> ColumnCoverage {
        ColumnCoverage::new(
            lattice_geometry(2, 2),
            vec![Band::new("elevation")],
            vec![vec![10.0, 20.0, 30.0, 40.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_zone_center_returns_stored_vector() {
        let coverage = elevation_coverage();
        let mut evaluator = Evaluator::new(&coverage);
        // Center of zone 2, the lattice's southwest cell.
        let samples = evaluator
            .evaluate(Coord { x: 0.25, y: 0.25 }, false)
            .unwrap();
        assert_eq!(samples, Some(vec![30.0]));
    }

    #[test]
    fn test_missing_point_policy() {
        let coverage = elevation_coverage();
        let mut evaluator = Evaluator::new(&coverage);
        let outside = Coord { x: 2.0, y: 2.0 };
        assert_eq!(evaluator.evaluate(outside, true).unwrap(), None);
        assert!(matches!(
            evaluator.evaluate(outside, false),
            Err(ZonalError::PointOutsideDomain { .. })
        ));
    }

    #[test]
    fn test_unsupported_levels_are_skipped() {
        // The lattice only materializes at level 3; the coverage
        // claims 1..=3, so evaluation walks through two dead levels
        // first.
        let coverage = ColumnCoverage::new(
            lattice_geometry_at(2, 2, 3, 1..=3),
            vec![Band::new("elevation")],
            vec![vec![10.0, 20.0, 30.0, 40.0]],
        )
        .unwrap();
        let mut evaluator = Evaluator::new(&coverage);
        let samples = evaluator
            .evaluate(Coord { x: 0.75, y: 0.75 }, false)
            .unwrap();
        assert_eq!(samples, Some(vec![20.0]));
    }

    #[test]
    fn test_evaluators_do_not_interfere() {
        let coverage = elevation_coverage();
        let mut first = Evaluator::new(&coverage);
        let mut second = Evaluator::new(&coverage);
        let a = first.evaluate(Coord { x: 0.25, y: 0.75 }, false).unwrap();
        let b = second.evaluate(Coord { x: 0.75, y: 0.25 }, false).unwrap();
        let c = first.evaluate(Coord { x: 0.25, y: 0.75 }, false).unwrap();
        assert_eq!(a, Some(vec![10.0]));
        assert_eq!(b, Some(vec![40.0]));
        assert_eq!(a, c);
    }
}
