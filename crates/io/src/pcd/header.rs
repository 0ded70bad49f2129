use std::fmt;
use std::str::FromStr;

use depthcloud_core::{PointCloud, PointSchema, SchemaMismatch};

use super::options::WriteOptions;

pub(crate) const IDENTITY_VIEWPOINT: [f32; 7] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

/// Header of a PCD file.
///
/// Instances come either from [`PcdHeader::for_cloud`] (what the encoder
/// writes) or from the decoder. In both cases `width * height == points`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcdHeader {
    pub(crate) version: PcdVersion,
    pub(crate) fields: Vec<PcdField>,
    pub(crate) width: u64,
    pub(crate) height: u64,
    pub(crate) viewpoint: [f32; 7],
    pub(crate) points: u64,
    pub(crate) dense: bool,
    pub(crate) data: DataMode,
}

impl PcdHeader {
    /// Describes `cloud` the way the encoder lays it out: `x y z` as 4-byte
    /// floats, followed by a packed unsigned `rgb` for colored clouds.
    pub fn for_cloud(cloud: &PointCloud, options: &WriteOptions) -> Result<Self, SchemaMismatch> {
        cloud.validate()?;

        let points = cloud.len() as u64;
        let (width, height) = match options.layout {
            Some((w, h)) => (u64::from(w), u64::from(h)),
            None => (points, 1),
        };
        if width.checked_mul(height) != Some(points) {
            return Err(SchemaMismatch::Layout {
                width,
                height,
                points: cloud.len(),
            });
        }

        let mut fields = vec![
            PcdField::new("x", FieldKind::F32, 1),
            PcdField::new("y", FieldKind::F32, 1),
            PcdField::new("z", FieldKind::F32, 1),
        ];
        if cloud.schema() == PointSchema::XyzRgb {
            fields.push(PcdField::new("rgb", FieldKind::U32, 1));
        }

        Ok(Self {
            version: PcdVersion::V0_7,
            fields,
            width,
            height,
            viewpoint: options.viewpoint,
            points,
            dense: cloud.is_dense(),
            data: options.mode,
        })
    }

    pub fn version(&self) -> PcdVersion {
        self.version
    }

    pub fn fields(&self) -> &[PcdField] {
        &self.fields
    }

    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn viewpoint(&self) -> &[f32; 7] {
        &self.viewpoint
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    /// The `DENSE` flag. When a file has no `DENSE` line, a full decode
    /// derives it from the data, while a header-only read reports `false`.
    pub fn is_dense(&self) -> bool {
        self.dense
    }

    pub fn data_mode(&self) -> DataMode {
        self.data
    }

    pub fn field(&self, name: &str) -> Option<&PcdField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Bytes taken by one point in a binary body.
    pub fn record_size(&self) -> u64 {
        self.fields
            .iter()
            .map(|f| f.kind.size() as u64 * f.count)
            .sum()
    }

    /// Tokens expected on each line of an ascii body.
    ///
    /// `FIELDS x y z rgb` with `COUNT 1 2 3 4` means 1 + 2 + 3 + 4 = 10 values.
    pub fn values_per_point(&self) -> u64 {
        self.fields.iter().map(|f| f.count).sum()
    }

    /// Bytes the binary body must hold.
    pub fn body_size(&self) -> Option<u64> {
        self.record_size().checked_mul(self.points)
    }

    fn join_fields(&self, map: impl Fn(&PcdField) -> String) -> String {
        self.fields.iter().map(map).collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for PcdHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# .PCD v0.7 - Point Cloud Data file format")?;
        writeln!(f, "VERSION {}", self.version)?;
        writeln!(f, "FIELDS {}", self.join_fields(|fd| fd.name.clone()))?;
        writeln!(f, "SIZE {}", self.join_fields(|fd| fd.kind.size().to_string()))?;
        writeln!(f, "TYPE {}", self.join_fields(|fd| fd.kind.type_code().to_string()))?;
        writeln!(f, "COUNT {}", self.join_fields(|fd| fd.count.to_string()))?;
        writeln!(f, "WIDTH {}", self.width)?;
        writeln!(f, "HEIGHT {}", self.height)?;
        let vp = self.viewpoint;
        writeln!(
            f,
            "VIEWPOINT {} {} {} {} {} {} {}",
            vp[0], vp[1], vp[2], vp[3], vp[4], vp[5], vp[6]
        )?;
        writeln!(f, "POINTS {}", self.points)?;
        writeln!(f, "DENSE {}", u8::from(self.dense))?;
        writeln!(f, "DATA {}", self.data)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PcdVersion {
    V0_6,
    V0_7,
}

impl fmt::Display for PcdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V0_6 => f.write_str("0.6"),
            Self::V0_7 => f.write_str("0.7"),
        }
    }
}

impl FromStr for PcdVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0.6" | ".6" => Ok(Self::V0_6),
            "0.7" | ".7" => Ok(Self::V0_7),
            _ => Err(format!("version {s} not supported")),
        }
    }
}

/// Storage mode of the body, as named on the `DATA` line.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DataMode {
    Ascii,
    Binary,
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii => f.write_str("ascii"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for DataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(Self::Ascii),
            "binary" => Ok(Self::Binary),
            "binary_compressed" | "compressed_binary" => {
                Err(format!("{s} bodies are not supported"))
            }
            _ => Err(format!("unknown data mode: {s}")),
        }
    }
}

/// One `FIELDS` entry with its `SIZE`, `TYPE` and `COUNT`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PcdField {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) count: u64,
}

impl PcdField {
    pub fn new(name: impl Into<String>, kind: FieldKind, count: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// A valid `SIZE`/`TYPE` pair.
///
/// `TYPE F` only exists with sizes 4 and 8, so `(1, 'F')` and friends are
/// rejected when the header is parsed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FieldKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl FieldKind {
    pub fn from_size_and_type(size: u8, type_code: char) -> Result<Self, String> {
        match (size, type_code) {
            (1, 'U') => Ok(Self::U8),
            (1, 'I') => Ok(Self::I8),
            (2, 'U') => Ok(Self::U16),
            (2, 'I') => Ok(Self::I16),
            (4, 'U') => Ok(Self::U32),
            (4, 'I') => Ok(Self::I32),
            (4, 'F') => Ok(Self::F32),
            (8, 'F') => Ok(Self::F64),
            _ => Err(format!(
                "field combination of size {size} and type {type_code} not supported"
            )),
        }
    }

    pub fn size(self) -> u8 {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    pub fn type_code(self) -> char {
        match self {
            Self::U8 | Self::U16 | Self::U32 => 'U',
            Self::I8 | Self::I16 | Self::I32 => 'I',
            Self::F32 | Self::F64 => 'F',
        }
    }
}
