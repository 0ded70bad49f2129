#![forbid(unsafe_code)]

pub mod cloud;
pub mod color;
pub mod point;
pub mod schema;
pub mod traits;

pub use cloud::{Colors, PointCloud};
pub use color::{pack_rgb, unpack_rgb};
pub use point::{PointXYZ, PointXYZRGB};
pub use schema::{PointSchema, SchemaMismatch};
pub use traits::{HasColor, HasPosition};
