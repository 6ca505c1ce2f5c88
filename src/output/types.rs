//! Output type definitions.

use crate::constants::COORD_DECIMAL_PLACES;
use crate::inventory::InventoryRecord;
use crate::spatial::GeoDetection;
use geo::Rect;

/// One row of a crown table.
#[derive(Debug, Clone, Copy)]
pub struct CrownRow<'a> {
    /// Image file name the crown was detected in.
    pub image: &'a str,
    /// Crown index within its image.
    pub crown_id: usize,
    /// The georeferenced crown.
    pub crown: &'a GeoDetection,
    /// Matched inventory tree (fusion pipeline only).
    pub record: Option<&'a InventoryRecord>,
}

/// Closed WKT polygon for a rectangle, counter-clockwise from the south-west corner.
pub fn rect_to_wkt(rect: &Rect<f64>) -> String {
    let ring: Vec<String> = rect_ring(rect)
        .iter()
        .map(|(x, y)| format!("{x:.prec$} {y:.prec$}", prec = COORD_DECIMAL_PLACES))
        .collect();
    format!("POLYGON (({}))", ring.join(", "))
}

/// Closed exterior ring of a rectangle as `(lon, lat)` pairs.
pub fn rect_ring(rect: &Rect<f64>) -> [(f64, f64); 5] {
    let (min, max) = (rect.min(), rect.max());
    [
        (min.x, min.y),
        (max.x, min.y),
        (max.x, max.y),
        (min.x, max.y),
        (min.x, min.y),
    ]
}
