use std::fmt::{self, Write as _};

use super::header::{DataMode, IDENTITY_VIEWPOINT};

/// How floats are rendered in an ascii body.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FloatFormat {
    /// Shortest text that parses back to the same `f32`.
    #[default]
    Shortest,
    /// Scientific notation with this many significant digits, clamped to
    /// `1..=9`. Nine digits are always enough to recover an `f32` exactly.
    Significant(u8),
}

impl FloatFormat {
    pub(crate) fn push(self, out: &mut String, v: f32) -> fmt::Result {
        match self {
            FloatFormat::Shortest => write!(out, "{v}"),
            FloatFormat::Significant(digits) => {
                let decimals = usize::from(digits.clamp(1, 9) - 1);
                write!(out, "{v:.decimals$e}")
            }
        }
    }
}

/// Knobs for the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub mode: DataMode,
    pub float_format: FloatFormat,
    /// Sensor pose as `tx ty tz qw qx qy qz`.
    pub viewpoint: [f32; 7],
    /// Organized `(width, height)`; `None` writes an unorganized `len x 1` cloud.
    pub layout: Option<(u32, u32)>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            mode: DataMode::Binary,
            float_format: FloatFormat::default(),
            viewpoint: IDENTITY_VIEWPOINT,
            layout: None,
        }
    }
}

impl WriteOptions {
    pub fn ascii() -> Self {
        Self::default().with_mode(DataMode::Ascii)
    }

    pub fn binary() -> Self {
        Self::default().with_mode(DataMode::Binary)
    }

    pub fn with_mode(mut self, mode: DataMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_float_format(mut self, float_format: FloatFormat) -> Self {
        self.float_format = float_format;
        self
    }

    pub fn with_viewpoint(mut self, viewpoint: [f32; 7]) -> Self {
        self.viewpoint = viewpoint;
        self
    }

    /// Marks the cloud as organized, e.g. the row-major pixels of a depth frame.
    pub fn with_layout(mut self, width: u32, height: u32) -> Self {
        self.layout = Some((width, height));
        self
    }
}
