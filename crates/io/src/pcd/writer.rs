use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use depthcloud_core::{pack_rgb, PointCloud};
use log::debug;
use tempfile::NamedTempFile;

use super::error::Result;
use super::header::{DataMode, PcdHeader};
use super::options::{FloatFormat, WriteOptions};

/// Writes `cloud` to `path` with default options and the given body mode.
pub fn write_pcd(path: impl AsRef<Path>, cloud: &PointCloud, mode: DataMode) -> Result<()> {
    write_pcd_with(path, cloud, &WriteOptions::default().with_mode(mode))
}

/// Writes `cloud` to `path`.
///
/// The cloud is validated before anything touches the disk, and the bytes go
/// to a temporary file next to `path` that is renamed over it only once
/// complete. A failed write leaves any previous file at `path` untouched.
pub fn write_pcd_with(
    path: impl AsRef<Path>,
    cloud: &PointCloud,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let header = PcdHeader::for_cloud(cloud, options)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        Writer::new(cloud, &header, options.float_format, &mut out).write()?;
        out.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(
        "wrote {} points ({}) to {}",
        cloud.len(),
        header.data_mode(),
        path.display()
    );
    Ok(())
}

/// Writes `cloud` as a PCD document into any writer.
pub fn write_pcd_to<W: Write>(writer: W, cloud: &PointCloud, options: &WriteOptions) -> Result<()> {
    let header = PcdHeader::for_cloud(cloud, options)?;
    Writer::new(cloud, &header, options.float_format, writer).write()
}

struct Writer<'a, W: Write> {
    writer: W,
    cloud: &'a PointCloud,
    header: &'a PcdHeader,
    float_format: FloatFormat,
}

impl<'a, W: Write> Writer<'a, W> {
    fn new(
        cloud: &'a PointCloud,
        header: &'a PcdHeader,
        float_format: FloatFormat,
        writer: W,
    ) -> Self {
        Self {
            writer,
            cloud,
            header,
            float_format,
        }
    }

    fn write(mut self) -> Result<()> {
        write!(self.writer, "{}", self.header)?;
        match self.header.data_mode() {
            DataMode::Ascii => self.write_ascii()?,
            DataMode::Binary => self.write_binary()?,
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_ascii(&mut self) -> std::io::Result<()> {
        let mut s = String::new();
        for (i, p) in self.cloud.iter_points().enumerate() {
            s.clear();
            for v in p {
                self.float_format
                    .push(&mut s, v)
                    .map_err(std::io::Error::other)?;
                s.push(' ');
            }
            match self.cloud.color(i) {
                Some([r, g, b]) => s.push_str(&pack_rgb(r, g, b).to_string()),
                None => {
                    s.pop();
                }
            }
            s.push('\n');
            self.writer.write_all(s.as_bytes())?;
        }
        Ok(())
    }

    /// Records are `x@0 y@4 z@8`, plus `rgb@12` when colored, all little-endian.
    fn write_binary(&mut self) -> std::io::Result<()> {
        for (i, [x, y, z]) in self.cloud.iter_points().enumerate() {
            self.writer.write_f32::<LittleEndian>(x)?;
            self.writer.write_f32::<LittleEndian>(y)?;
            self.writer.write_f32::<LittleEndian>(z)?;
            if let Some([r, g, b]) = self.cloud.color(i) {
                self.writer.write_u32::<LittleEndian>(pack_rgb(r, g, b))?;
            }
        }
        Ok(())
    }
}
