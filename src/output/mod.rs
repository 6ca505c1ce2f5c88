//! Annotated images and crown table writers.

mod annotate;
mod csv;
mod geojson;
pub mod progress;
mod types;
mod writer;

pub use annotate::{annotate_image, annotated_path};
pub use csv::CsvCrownWriter;
pub use geojson::GeoJsonCrownWriter;
pub use types::{CrownRow, rect_ring, rect_to_wkt};
pub use writer::CrownTableWriter;
