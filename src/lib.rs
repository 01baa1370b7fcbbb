#[cfg(feature = "cli")]
pub mod cli;
pub mod combine;
pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod path_data;
pub mod transform;

#[cfg(feature = "cli")]
pub use cli::run;
pub use combine::{Conversion, combine, convert_document};
pub use config::{Config, load_config};
pub use error::Error;
pub use extract::extract_shapes;
pub use geometry::Point;
pub use path_data::{Outline, PathSeg, parse_path, to_path_data};
pub use transform::{Transform, parse_transform, resolve_transform};
