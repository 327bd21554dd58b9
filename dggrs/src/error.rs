use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("invalid zone identifier {0:#x}")]
    InvalidZone(u64),

    #[error("unsupported refinement level {0}")]
    InvalidLevel(u8),

    #[error("point ({x}, {y}) is outside the tessellation domain")]
    OutsideDomain { x: f64, y: f64 },
}
