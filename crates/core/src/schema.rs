use thiserror::Error;

/// The per-point record shape shared by every point of a cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointSchema {
    Xyz,
    XyzRgb,
}

impl PointSchema {
    pub fn has_color(self) -> bool {
        matches!(self, PointSchema::XyzRgb)
    }
}

/// Why a cloud's columns disagree with the schema they claim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("coordinate columns differ in length: x={x}, y={y}, z={z}")]
    Coordinates { x: usize, y: usize, z: usize },

    #[error("color channel `{channel}` has {found} entries, cloud has {expected} points")]
    ColorChannel {
        channel: char,
        expected: usize,
        found: usize,
    },

    #[error("organized layout {width}x{height} does not cover {points} points")]
    Layout {
        width: u64,
        height: u64,
        points: usize,
    },
}
