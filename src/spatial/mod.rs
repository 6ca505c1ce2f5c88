//! Pixel <-> geographic mapping and geometric filtering.
//!
//! Geometries use `geo` types with longitude on the x axis and latitude on
//! the y axis, matching WGS84 (EPSG:4326) axis order in GIS tooling.

mod boundary;
mod filter;
mod georef;

pub use boundary::BoundaryMask;
pub use filter::{CrownMatch, fuse, join, keep, mask};
pub use georef::{AffineTransform, GeoDetection, LatLon, convert, to_pixels};
