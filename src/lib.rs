//! Point clouds captured from depth cameras, stored as PCD files.
//!
//! This crate re-exports the workspace members: `depthcloud-core` holds the
//! in-memory cloud, `depthcloud-io` the PCD codec.

#![forbid(unsafe_code)]

pub use depthcloud_core::{
    pack_rgb, unpack_rgb, Colors, HasColor, HasPosition, PointCloud, PointSchema, PointXYZ,
    PointXYZRGB, SchemaMismatch,
};
pub use depthcloud_io::{
    read_pcd, read_pcd_from, read_pcd_header, read_pcd_with_header, write_pcd, write_pcd_to,
    write_pcd_with, DataMode, FieldKind, FloatFormat, PcdError, PcdField, PcdHeader, PcdVersion,
    WriteOptions,
};
