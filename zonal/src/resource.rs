//! Adapters exposing conventional data sources as zone-queryable
//! resources.

use crate::{
    bind::{FeatureSet, FieldKind, ZoneBinder},
    transform::TransformProvider,
    Band, CodedCoverage, ColumnCoverage, GridGeometry, ZonalError,
};
use dggrs::{GridSystem, Level};
use geo::{geometry::Point, geometry::Rect, HaversineDistance};
use log::debug;
use std::sync::{Arc, OnceLock};

/// A data source readable as coded coverages.
pub trait ZonalResource: Send + Sync {
    /// Deepest refinement level this resource can sensibly serve.
    fn max_level(&self) -> Level;

    /// Materializes a coverage over `geometry`, restricted to the
    /// selected bands (all bands when `None`).
    fn read(
        &self,
        geometry: &GridGeometry,
        bands: Option<&[usize]>,
    ) -> Result<Arc<dyn CodedCoverage>, ZonalError>;
}

/// A conventional rectangular-grid data source: band metadata, an
/// envelope and resolution in geographic degrees, and an external
/// resample/reprojection processor.
pub trait GridSource: Send + Sync {
    fn bands(&self) -> &[Band];

    fn envelope(&self) -> Rect<f64>;

    /// (x, y) pixel sizes in degrees.
    fn resolution(&self) -> (f64, f64);

    /// Resamples the source onto the target zones, one column per
    /// requested band.
    fn resample(
        &self,
        target: &GridGeometry,
        bands: &[usize],
    ) -> Result<Vec<Vec<f64>>, ZonalError>;
}

/// Wraps a rectangular grid as a zone-queryable resource.
///
/// The maximum refinement level is fixed at construction from the
/// source's measured ground resolution.
pub struct GridResource {
    source: Arc<dyn GridSource>,
    max_level: Level,
}

impl GridResource {
    pub fn new(source: Arc<dyn GridSource>, system: &dyn GridSystem) -> Self {
        let resolution = mean_pixel_resolution_m(source.as_ref());
        let max_level = system.level_for_resolution(resolution);
        debug!("source resolution {resolution:.1} m/px maps to level {max_level}");
        Self { source, max_level }
    }
}

impl ZonalResource for GridResource {
    fn max_level(&self) -> Level {
        self.max_level
    }

    fn read(
        &self,
        geometry: &GridGeometry,
        bands: Option<&[usize]>,
    ) -> Result<Arc<dyn CodedCoverage>, ZonalError> {
        let available = self.source.bands();
        let all: Vec<usize> = (0..available.len()).collect();
        let selection = bands.unwrap_or(&all);
        for &band in selection {
            if band >= available.len() {
                return Err(ZonalError::Band(band));
            }
        }
        let columns = self.source.resample(geometry, selection)?;
        let bands = selection
            .iter()
            .map(|&band| available[band].clone())
            .collect();
        Ok(Arc::new(ColumnCoverage::new(
            geometry.clone(),
            bands,
            columns,
        )?))
    }
}

/// Average geodesic ground distance covered by one pixel, measured at
/// the envelope's horizontal center.
fn mean_pixel_resolution_m(source: &dyn GridSource) -> f64 {
    let center = source.envelope().center();
    let (res_x, _) = source.resolution();
    let origin = Point::new(center.x, center.y);
    let offset = Point::new(center.x + res_x, center.y);
    origin.haversine_distance(&offset)
}

/// Wraps a vector feature set as a zone-queryable resource.
///
/// Reading runs the feature-to-zone binder over the source's numeric
/// attribute fields; geometry-typed, text and reference/convention
/// fields are excluded from the record schema.
pub struct FeatureResource {
    features: Arc<dyn FeatureSet>,
    transforms: Arc<dyn TransformProvider>,
    system: Arc<dyn GridSystem>,
    selected: OnceLock<Vec<String>>,
}

impl FeatureResource {
    pub fn new(
        features: Arc<dyn FeatureSet>,
        transforms: Arc<dyn TransformProvider>,
        system: Arc<dyn GridSystem>,
    ) -> Self {
        Self {
            features,
            transforms,
            system,
            selected: OnceLock::new(),
        }
    }

    /// Names of the numeric fields zone records will carry, in schema
    /// order. Computed once on first use.
    fn selected(&self) -> &[String] {
        self.selected.get_or_init(|| {
            self.features
                .schema()
                .fields()
                .iter()
                .filter(|field| field.kind() == FieldKind::Numeric)
                .map(|field| field.name().to_string())
                .collect()
        })
    }
}

impl ZonalResource for FeatureResource {
    fn max_level(&self) -> Level {
        *self.system.level_range().end()
    }

    fn read(
        &self,
        geometry: &GridGeometry,
        bands: Option<&[usize]>,
    ) -> Result<Arc<dyn CodedCoverage>, ZonalError> {
        let selected = self.selected();
        let names: Vec<&str> = match bands {
            None => selected.iter().map(String::as_str).collect(),
            Some(indexes) => indexes
                .iter()
                .map(|&band| {
                    selected
                        .get(band)
                        .map(String::as_str)
                        .ok_or(ZonalError::Band(band))
                })
                .collect::<Result<_, _>>()?,
        };
        let binder = ZoneBinder::new(geometry, self.transforms.as_ref());
        let coverage = binder.bind(self.features.as_ref(), &names)?;
        Ok(Arc::new(coverage))
    }
}

/// A single precomputed coverage, returned as-is.
pub struct MemoryResource {
    coverage: Arc<dyn CodedCoverage>,
}

impl MemoryResource {
    pub fn new(coverage: Arc<dyn CodedCoverage>) -> Self {
        Self { coverage }
    }
}

impl ZonalResource for MemoryResource {
    /// Memory resources support no refinement selection.
    fn max_level(&self) -> Level {
        0
    }

    fn read(
        &self,
        _geometry: &GridGeometry,
        _bands: Option<&[usize]>,
    ) -> Result<Arc<dyn CodedCoverage>, ZonalError> {
        Ok(Arc::clone(&self.coverage))
    }
}
