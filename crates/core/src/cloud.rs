use crate::{HasColor, HasPosition, PointSchema, SchemaMismatch};

/// A point cloud stored column-wise.
///
/// The columns are public so producers (a depth projector, a decoder) can
/// fill them directly. Nothing stops a caller from leaving them ragged, so
/// anything that serializes a cloud should call [`PointCloud::validate`]
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub colors: Option<Colors>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl Colors {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            r: Vec::with_capacity(n),
            g: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, [r, g, b]: [u8; 3]) {
        self.r.push(r);
        self.g.push(g);
        self.b.push(b);
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    pub fn from_xyz_rgb(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>, colors: Colors) -> Self {
        let mut cloud = Self::from_xyz(x, y, z);
        assert_eq!(cloud.len(), colors.r.len(), "r must have one entry per point");
        assert_eq!(cloud.len(), colors.g.len(), "g must have one entry per point");
        assert_eq!(cloud.len(), colors.b.len(), "b must have one entry per point");
        cloud.colors = Some(colors);
        cloud
    }

    /// Builds an uncolored cloud from interleaved `x y z` triples.
    pub fn from_array(data: &[f32], num_points: usize) -> Self {
        assert_eq!(
            data.len(),
            num_points * 3,
            "interleaved xyz input must have num_points * 3 floats"
        );

        let mut x = Vec::with_capacity(num_points);
        let mut y = Vec::with_capacity(num_points);
        let mut z = Vec::with_capacity(num_points);

        for chunk in data.chunks_exact(3).take(num_points) {
            x.push(chunk[0]);
            y.push(chunk[1]);
            z.push(chunk[2]);
        }

        Self::from_xyz(x, y, z)
    }

    pub fn from_points<P: HasPosition>(points: &[P]) -> Self {
        let mut x = Vec::with_capacity(points.len());
        let mut y = Vec::with_capacity(points.len());
        let mut z = Vec::with_capacity(points.len());

        for p in points {
            let [px, py, pz] = p.position();
            x.push(px);
            y.push(py);
            z.push(pz);
        }

        Self::from_xyz(x, y, z)
    }

    pub fn from_colored_points<P: HasPosition + HasColor>(points: &[P]) -> Self {
        let mut cloud = Self::from_points(points);
        let mut colors = Colors::with_capacity(points.len());
        for p in points {
            colors.push(p.color());
        }
        cloud.colors = Some(colors);
        cloud
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn schema(&self) -> PointSchema {
        if self.colors.is_some() {
            PointSchema::XyzRgb
        } else {
            PointSchema::Xyz
        }
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Color of point `i`, or `None` for an uncolored cloud.
    pub fn color(&self, i: usize) -> Option<[u8; 3]> {
        self.colors.as_ref().map(|c| [c.r[i], c.g[i], c.b[i]])
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// True when no coordinate is NaN or infinite.
    ///
    /// Depth frames mark missing samples with NaN, so a cloud projected from
    /// an unfiltered frame is usually not dense.
    pub fn is_dense(&self) -> bool {
        self.iter_points().all(|p| p.iter().all(|v| v.is_finite()))
    }

    /// Checks that every column has one entry per point.
    pub fn validate(&self) -> Result<(), SchemaMismatch> {
        let n = self.x.len();
        if self.y.len() != n || self.z.len() != n {
            return Err(SchemaMismatch::Coordinates {
                x: n,
                y: self.y.len(),
                z: self.z.len(),
            });
        }

        if let Some(c) = &self.colors {
            for (channel, len) in [('r', c.r.len()), ('g', c.g.len()), ('b', c.b.len())] {
                if len != n {
                    return Err(SchemaMismatch::ColorChannel {
                        channel,
                        expected: n,
                        found: len,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn to_array(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 3);
        for p in self.iter_points() {
            out.extend_from_slice(&p);
        }
        out
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}
