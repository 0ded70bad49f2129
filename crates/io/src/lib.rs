#![forbid(unsafe_code)]

pub mod pcd;

pub use pcd::{
    read_pcd, read_pcd_from, read_pcd_header, read_pcd_with_header, write_pcd, write_pcd_to,
    write_pcd_with, DataMode, FieldKind, FloatFormat, PcdError, PcdField, PcdHeader, PcdVersion,
    WriteOptions,
};
