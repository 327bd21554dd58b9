use dggrs::{GridError, ZoneId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZonalError {
    #[error("band '{band}' has {samples} samples for {count} zones")]
    SampleCount {
        band: String,
        count: usize,
        samples: usize,
    },

    #[error("{bands} band descriptors but {columns} sample columns")]
    BandCount { bands: usize, columns: usize },

    #[error("{width}x{height} pixel buffer cannot back {count} zones")]
    PixelCount {
        width: usize,
        height: usize,
        count: usize,
    },

    #[error("pixel plane {band} has {len} samples, expected {expected}")]
    PlaneSize {
        band: usize,
        len: usize,
        expected: usize,
    },

    #[error("duplicate zone {0} in index")]
    DuplicateZone(ZoneId),

    #[error("computed zone index must have a non-zero step")]
    ZeroStep,

    #[error("invalid slice {from}..{to} of {len} zones")]
    Slice { from: usize, to: usize, len: usize },

    #[error("position {position} out of range for {len} zones")]
    Position { position: usize, len: usize },

    #[error("no band at index {0}")]
    Band(usize),

    #[error("unknown field '{0}'")]
    Field(String),

    #[error("cursor is not positioned on a zone")]
    Unpositioned,

    #[error("zone {zone} maps outside the {width}x{height} pixel buffer")]
    PixelMap {
        zone: ZoneId,
        width: usize,
        height: usize,
    },

    #[error("point ({x}, {y}) is outside the coverage domain at every supported level")]
    PointOutsideDomain { x: f64, y: f64 },

    #[error("no coordinate transform from {from} to {to}")]
    Transform { from: String, to: String },

    #[error("transform from {from} to {to} is not invertible")]
    Singular { from: String, to: String },

    #[error("invalid raster geometry: {0}")]
    RasterGeometry(&'static str),

    #[error("{0}")]
    Grid(#[from] GridError),
}
