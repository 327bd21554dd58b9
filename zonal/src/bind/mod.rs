//! Spatial join of vector feature attributes onto grid zones.

mod quadtree;

pub use self::quadtree::QuadTree;
use crate::{
    transform::{Crs, TransformProvider},
    Band, ColumnCoverage, GridGeometry, ZonalError,
};
use geo::{
    geometry::{Geometry, Polygon, Rect},
    BoundingRect, Intersects, MapCoords,
};
use log::debug;
use rayon::prelude::*;
use std::sync::Mutex;

/// Kind of a feature attribute field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain numeric attribute; the only kind zone records carry.
    Numeric,
    Text,
    Geometry,
    /// Association to another record; reserved/convention fields.
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// Named, kinded fields of a feature source's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    fields: Vec<Field>,
}

impl FeatureSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }
}

/// One vector feature: a geometry plus attribute values in the order
/// they were selected.
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub values: Vec<f64>,
}

/// A streaming vector feature source.
pub trait FeatureSet: Send + Sync {
    /// Reference system of the feature geometries.
    fn crs(&self) -> Crs;

    fn schema(&self) -> &FeatureSchema;

    /// A restartable, finite stream of features projected onto the
    /// named fields, in that order. Projection is limited to
    /// named-field selection; an unknown name fails with
    /// [`ZonalError::Field`].
    fn select(
        &self,
        names: &[&str],
    ) -> Result<Box<dyn Iterator<Item = Result<Feature, ZonalError>> + '_>, ZonalError>;
}

/// Assigns feature attributes to every zone whose polygon intersects
/// the feature's geometry.
pub struct ZoneBinder<'a> {
    geometry: &'a GridGeometry,
    transforms: &'a dyn TransformProvider,
}

impl<'a> ZoneBinder<'a> {
    pub fn new(geometry: &'a GridGeometry, transforms: &'a dyn TransformProvider) -> Self {
        Self {
            geometry,
            transforms,
        }
    }

    /// Runs the join and returns one record per target zone.
    ///
    /// Zones no feature intersects keep NaN fields; that partial
    /// output is the expected steady state. A zone is claimed by at
    /// most one feature: the first in stream order wins, and claiming
    /// removes the zone from further consideration. Transform
    /// failures abort the whole join.
    pub fn bind(
        &self,
        features: &dyn FeatureSet,
        fields: &[&str],
    ) -> Result<ColumnCoverage, ZonalError> {
        let count = self.geometry.zone_count();
        let feature_crs = features.crs();
        let to_features = self.transforms.between(&Crs::wgs84(), &feature_crs)?;
        let to_zones = self.transforms.between(&feature_crs, &Crs::wgs84())?;

        // Decode every target zone, keeping its exact polygon in zone
        // space and its bounding box in feature space.
        let zones: Vec<Option<(Rect<f64>, Polygon<f64>)>> = (0..count)
            .into_par_iter()
            .map(|position| {
                let id = self.geometry.index().zone_at(position)?;
                let zone = self.geometry.system().decode(id)?;
                let footprint = zone.polygon.map_coords(|coord| to_features.apply(coord));
                Ok(footprint
                    .bounding_rect()
                    .map(|bounds| (bounds, zone.polygon)))
            })
            .collect::<Result<_, ZonalError>>()?;

        let world = zones
            .iter()
            .flatten()
            .map(|(bounds, _)| *bounds)
            .reduce(merge)
            .unwrap_or(Rect::new((0.0, 0.0), (0.0, 0.0)));
        let tree = Mutex::new(QuadTree::new(world));
        // Insertion order does not matter; the shared tree is the one
        // synchronization point of this phase.
        zones.par_iter().enumerate().for_each(|(position, entry)| {
            if let Some((bounds, _)) = entry {
                tree.lock().unwrap().insert(position, *bounds);
            }
        });
        let mut tree = tree.into_inner().unwrap();

        let mut columns = vec![vec![f64::NAN; count]; fields.len()];
        let mut candidates = Vec::new();
        let mut claimed = 0_usize;
        for feature in features.select(fields)? {
            let feature = feature?;
            if feature.values.len() != fields.len() {
                return Err(ZonalError::BandCount {
                    bands: fields.len(),
                    columns: feature.values.len(),
                });
            }
            let Some(bounds) = feature.geometry.bounding_rect() else {
                continue;
            };
            candidates.clear();
            tree.query(&bounds, &mut candidates);
            if candidates.is_empty() {
                continue;
            }
            let local = if to_zones.is_identity() {
                feature.geometry.clone()
            } else {
                feature.geometry.map_coords(|coord| to_zones.apply(coord))
            };
            for &position in &candidates {
                let Some((_, polygon)) = &zones[position] else {
                    continue;
                };
                if local.intersects(polygon) {
                    for (column, &value) in columns.iter_mut().zip(&feature.values) {
                        column[position] = value;
                    }
                    tree.remove(position);
                    claimed += 1;
                }
            }
        }
        debug!("bound {claimed} of {count} zones from the feature stream");

        let bands = fields.iter().map(|&name| Band::new(name)).collect();
        ColumnCoverage::new(self.geometry.clone(), bands, columns)
    }
}

fn merge(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        geo::geometry::Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        geo::geometry::Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{Feature, FeatureSchema, FeatureSet, Field, FieldKind, ZoneBinder};
    use crate::{
        testgrid::lattice_geometry,
        transform::{CoordTransform, Crs, TransformRegistry},
        CodedCoverage, ColumnCoverage, ZonalError,
    };
    use geo::{geometry::Geometry, polygon};

    /// In-memory feature set over the unit square.
    struct Features {
        crs: Crs,
        schema: FeatureSchema,
        features: Vec<Feature>,
    }

    impl Features {
        fn new(crs: Crs, features: Vec<Feature>) -> Self {
            Self {
                crs,
                schema: FeatureSchema::new(vec![
                    Field::new("population", FieldKind::Numeric),
                    Field::new("name", FieldKind::Text),
                ]),
                features,
            }
        }
    }

    impl FeatureSet for Features {
        fn crs(&self) -> Crs {
            self.crs.clone()
        }

        fn schema(&self) -> &FeatureSchema {
            &self.schema
        }

        fn select(
            &self,
            names: &[&str],
        ) -> Result<
            Box<dyn Iterator<Item = Result<Feature, ZonalError>> + '_>,
            ZonalError,
        > {
            for &name in names {
                if self.schema.field(name).is_none() {
                    return Err(ZonalError::Field(name.to_string()));
                }
            }
            Ok(Box::new(self.features.iter().cloned().map(Ok)))
        }
    }

    /// A polygon slightly inset from the cell of zone `(col, row)` on
    /// a 2×2 lattice, so it touches no neighboring zone.
    fn inset_cell(col: f64, row: f64) -> Geometry<f64> {
        let (west, north) = (col * 0.5, 1.0 - row * 0.5);
        Geometry::Polygon(polygon![
            (x: west + 0.1, y: north - 0.4),
            (x: west + 0.4, y: north - 0.4),
            (x: west + 0.4, y: north - 0.1),
            (x: west + 0.1, y: north - 0.1),
            (x: west + 0.1, y: north - 0.4),
        ])
    }

    fn population(coverage: &ColumnCoverage) -> Vec<f64> {
        coverage.column(0).unwrap().to_vec()
    }

    #[test]
    fn test_single_feature_claims_single_zone() {
        let geometry = lattice_geometry(2, 2);
        let registry = TransformRegistry::new();
        let features = Features::new(
            Crs::wgs84(),
            vec![Feature {
                geometry: inset_cell(1.0, 1.0),
                values: vec![1234.0],
            }],
        );
        let binder = ZoneBinder::new(&geometry, &registry);
        let coverage = binder.bind(&features, &["population"]).unwrap();
        let values = population(&coverage);
        assert_eq!(values[3], 1234.0);
        for &value in &values[..3] {
            assert!(value.is_nan());
        }
        assert_eq!(coverage.schema().field("population"), Some(0));
    }

    #[test]
    fn test_first_feature_in_stream_order_wins() {
        let geometry = lattice_geometry(2, 2);
        let registry = TransformRegistry::new();
        let features = Features::new(
            Crs::wgs84(),
            vec![
                Feature {
                    geometry: inset_cell(0.0, 0.0),
                    values: vec![111.0],
                },
                Feature {
                    geometry: inset_cell(0.0, 0.0),
                    values: vec![222.0],
                },
            ],
        );
        let binder = ZoneBinder::new(&geometry, &registry);
        let coverage = binder.bind(&features, &["population"]).unwrap();
        assert_eq!(population(&coverage)[0], 111.0);
    }

    #[test]
    fn test_feature_spanning_all_zones_claims_them_all() {
        let geometry = lattice_geometry(2, 2);
        let registry = TransformRegistry::new();
        let features = Features::new(
            Crs::wgs84(),
            vec![Feature {
                geometry: Geometry::Polygon(polygon![
                    (x: 0.1, y: 0.1),
                    (x: 0.9, y: 0.1),
                    (x: 0.9, y: 0.9),
                    (x: 0.1, y: 0.9),
                    (x: 0.1, y: 0.1),
                ]),
                values: vec![7.0],
            }],
        );
        let binder = ZoneBinder::new(&geometry, &registry);
        let coverage = binder.bind(&features, &["population"]).unwrap();
        assert_eq!(population(&coverage), vec![7.0; 4]);
    }

    #[test]
    fn test_reprojected_feature_crs() {
        // Features live in a doubled coordinate space.
        let geometry = lattice_geometry(2, 2);
        let mut registry = TransformRegistry::new();
        let doubled = Crs::new("doubled");
        registry.insert(
            Crs::wgs84(),
            doubled.clone(),
            CoordTransform::scale_offset(2.0, 2.0, 0.0, 0.0),
        );
        let features = Features::new(
            doubled,
            vec![Feature {
                geometry: Geometry::Polygon(polygon![
                    (x: 1.2, y: 0.2),
                    (x: 1.8, y: 0.2),
                    (x: 1.8, y: 0.8),
                    (x: 1.2, y: 0.8),
                    (x: 1.2, y: 0.2),
                ]),
                values: vec![42.0],
            }],
        );
        let binder = ZoneBinder::new(&geometry, &registry);
        let coverage = binder.bind(&features, &["population"]).unwrap();
        let values = population(&coverage);
        // The doubled-space box maps back to zone 3's cell.
        assert_eq!(values[3], 42.0);
        assert!(values[0].is_nan());
    }

    #[test]
    fn test_unknown_field_aborts() {
        let geometry = lattice_geometry(2, 2);
        let registry = TransformRegistry::new();
        let features = Features::new(Crs::wgs84(), vec![]);
        let binder = ZoneBinder::new(&geometry, &registry);
        assert!(matches!(
            binder.bind(&features, &["missing"]),
            Err(ZonalError::Field(_))
        ));
    }

    #[test]
    fn test_missing_transform_aborts() {
        let geometry = lattice_geometry(2, 2);
        let registry = TransformRegistry::new();
        let features = Features::new(Crs::new("unrelated"), vec![]);
        let binder = ZoneBinder::new(&geometry, &registry);
        assert!(matches!(
            binder.bind(&features, &["population"]),
            Err(ZonalError::Transform { .. })
        ));
    }
}
