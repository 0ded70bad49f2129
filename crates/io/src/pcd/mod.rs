//! Point Cloud Data (PCD) files.
//!
//! Reads and writes version 0.7 of the
//! [PCD format](https://pcl.readthedocs.io/projects/tutorials/en/master/pcd_file_format.html)
//! with either an `ascii` or a `binary` body. Both variants share the same
//! text header; the decoder picks the body parser from the `DATA` line.
//!
//! # Examples
//!
//! ```no_run
//! use depthcloud_core::PointCloud;
//! use depthcloud_io::{read_pcd, write_pcd, DataMode, PcdError};
//!
//! fn main() -> Result<(), PcdError> {
//!     let cloud = PointCloud::from_xyz(vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]);
//!     write_pcd("cloud_ascii.pcd", &cloud, DataMode::Ascii)?;
//!     write_pcd("cloud_bin.pcd", &cloud, DataMode::Binary)?;
//!
//!     let loaded = read_pcd("cloud_bin.pcd")?;
//!     assert_eq!(loaded, cloud);
//!     Ok(())
//! }
//! ```

mod error;
mod header;
mod options;
mod reader;
mod writer;

pub use error::{PcdError, Result};
pub use header::{DataMode, FieldKind, PcdField, PcdHeader, PcdVersion};
pub use options::{FloatFormat, WriteOptions};
pub use reader::{read_pcd, read_pcd_from, read_pcd_header, read_pcd_with_header};
pub use writer::{write_pcd, write_pcd_to, write_pcd_with};
