//! # Zonal
//!
//! `zonal` stores and queries data sampled over a discrete global
//! grid system: a hierarchical tessellation of the globe into zones
//! rather than a regular raster. Coverages couple a zone index with a
//! pluggable sample backing; they are evaluated at geographic points,
//! rendered onto conventional rasters, and populated from vector
//! features by a quad-tree spatial join.
//!
//! The tessellation itself is delegated to a [`dggrs::GridSystem`].

mod band;
mod bind;
mod coverage;
mod error;
mod evaluate;
mod geometry;
mod index;
mod rasterize;
mod resource;
#[cfg(test)]
mod testgrid;
mod transform;

pub use {
    crate::{
        band::{Band, RecordSchema},
        bind::{Feature, FeatureSchema, FeatureSet, Field, FieldKind, QuadTree, ZoneBinder},
        coverage::{
            CodedCoverage, ColumnCoverage, PixelGrid, RasterCoverage, RowMajorMap, ZoneCursor,
            ZoneCursorMut, ZonePixelMap,
        },
        error::ZonalError,
        evaluate::Evaluator,
        geometry::{GeoTransform, GridGeometry, RasterGeometry},
        index::{ZoneIndex, ZoneList, ZoneRange},
        rasterize::{rasterize, RasterData, Strategy},
        resource::{FeatureResource, GridResource, GridSource, MemoryResource, ZonalResource},
        transform::{CoordTransform, Crs, TransformProvider, TransformRegistry},
    },
    dggrs,
};
