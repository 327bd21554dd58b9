//! Coordinate reference systems and transforms between them.

use crate::ZonalError;
use geo::geometry::Coord;
use std::collections::HashMap;

/// Identifier of a coordinate reference system.
///
/// The engine never interprets the name; equality is all that matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs(String);

impl Crs {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The geographic (lon/lat degree) system grid reference systems
    /// decode zones into.
    pub fn wgs84() -> Self {
        Self("EPSG:4326".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 2D affine coordinate transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordTransform {
    // x' = a*x + b*y + c
    // y' = d*x + e*y + f
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl CoordTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Translation followed by per-axis scaling.
    pub fn scale_offset(scale_x: f64, scale_y: f64, offset_x: f64, offset_y: f64) -> Self {
        Self::new(scale_x, 0.0, offset_x, 0.0, scale_y, offset_y)
    }

    pub fn apply(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.a * coord.x + self.b * coord.y + self.c,
            y: self.d * coord.x + self.e * coord.y + self.f,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    fn inverted(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let a = self.e / det;
        let b = -self.b / det;
        let d = -self.d / det;
        let e = self.a / det;
        Some(Self {
            a,
            b,
            c: -(a * self.c + b * self.f),
            d,
            e,
            f: -(d * self.c + e * self.f),
        })
    }
}

/// Looks up the transform taking coordinates from one reference system
/// into another.
pub trait TransformProvider: Send + Sync {
    /// Fails with [`ZonalError::Transform`] when no transform relates
    /// the two systems; a missing transform is a configuration
    /// problem, and callers abort the enclosing operation.
    fn between(&self, from: &Crs, to: &Crs) -> Result<CoordTransform, ZonalError>;
}

/// Registry of known transforms between reference-system pairs.
///
/// A lookup first tries the requested direction, then falls back to
/// inverting the reverse entry.
#[derive(Debug, Default)]
pub struct TransformRegistry {
    entries: HashMap<(Crs, Crs), CoordTransform>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: Crs, to: Crs, transform: CoordTransform) {
        self.entries.insert((from, to), transform);
    }
}

impl TransformProvider for TransformRegistry {
    fn between(&self, from: &Crs, to: &Crs) -> Result<CoordTransform, ZonalError> {
        if from == to {
            return Ok(CoordTransform::identity());
        }
        if let Some(transform) = self.entries.get(&(from.clone(), to.clone())) {
            return Ok(*transform);
        }
        if let Some(reverse) = self.entries.get(&(to.clone(), from.clone())) {
            return reverse.inverted().ok_or_else(|| ZonalError::Singular {
                from: to.to_string(),
                to: from.to_string(),
            });
        }
        Err(ZonalError::Transform {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, CoordTransform, Crs, TransformProvider, TransformRegistry};
    use crate::ZonalError;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_when_systems_match() {
        let registry = TransformRegistry::new();
        let transform = registry.between(&Crs::wgs84(), &Crs::wgs84()).unwrap();
        assert!(transform.is_identity());
    }

    #[test]
    fn test_direct_lookup() {
        let mut registry = TransformRegistry::new();
        let meters = Crs::new("EPSG:3857");
        registry.insert(
            Crs::wgs84(),
            meters.clone(),
            CoordTransform::scale_offset(2.0, 2.0, 10.0, -10.0),
        );
        let transform = registry.between(&Crs::wgs84(), &meters).unwrap();
        let out = transform.apply(Coord { x: 1.0, y: 1.0 });
        assert_relative_eq!(out.x, 12.0);
        assert_relative_eq!(out.y, -8.0);
    }

    #[test]
    fn test_reverse_lookup_inverts() {
        let mut registry = TransformRegistry::new();
        let meters = Crs::new("EPSG:3857");
        registry.insert(
            Crs::wgs84(),
            meters.clone(),
            CoordTransform::scale_offset(2.0, 4.0, 10.0, -10.0),
        );
        let back = registry.between(&meters, &Crs::wgs84()).unwrap();
        let out = back.apply(Coord { x: 12.0, y: -6.0 });
        assert_relative_eq!(out.x, 1.0);
        assert_relative_eq!(out.y, 1.0);
    }

    #[test]
    fn test_missing_transform_is_an_error() {
        let registry = TransformRegistry::new();
        assert!(matches!(
            registry.between(&Crs::wgs84(), &Crs::new("EPSG:3857")),
            Err(ZonalError::Transform { .. })
        ));
    }

    #[test]
    fn test_singular_reverse_is_an_error() {
        let mut registry = TransformRegistry::new();
        let flat = Crs::new("flat");
        registry.insert(
            Crs::wgs84(),
            flat.clone(),
            CoordTransform::scale_offset(0.0, 1.0, 0.0, 0.0),
        );
        assert!(matches!(
            registry.between(&flat, &Crs::wgs84()),
            Err(ZonalError::Singular { .. })
        ));
    }
}
