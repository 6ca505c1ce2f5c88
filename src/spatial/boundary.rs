//! Buffered convex hull around the inventory.

use crate::constants::BUFFER_SEGMENTS;
use crate::error::{Error, Result};
use crate::inventory::InventoryPointSet;
use crate::spatial::LatLon;
use geo::{ConvexHull, Coord, Intersects, MultiPoint, Point, Polygon, Rect};
use std::f64::consts::PI;
use tracing::debug;

/// Region that is known to hold inventory trees.
///
/// Convex hull of every inventory point grown outward by `tolerance`
/// degrees. The buffer disc is approximated by a polygon that circumscribes
/// the true circle, so the mask always covers the exact buffered hull.
#[derive(Debug, Clone)]
pub struct BoundaryMask {
    polygon: Polygon<f64>,
    tolerance: f64,
}

impl BoundaryMask {
    /// Build the mask from a set of points.
    ///
    /// A single point yields a disc and two points a stadium shape.
    pub fn build<I>(points: I, tolerance: f64) -> Result<Self>
    where
        I: IntoIterator<Item = LatLon>,
    {
        let coords: Vec<Coord<f64>> = points.into_iter().map(LatLon::to_coord).collect();
        if coords.is_empty() {
            return Err(Error::EmptyInventory);
        }

        let hull = MultiPoint::from(coords).convex_hull();
        let polygon = if tolerance > 0.0 {
            buffer_convex(&hull, tolerance)
        } else {
            hull
        };

        debug!(
            "Boundary mask: {} vertices, tolerance {}",
            polygon.exterior().0.len(),
            tolerance
        );

        Ok(Self { polygon, tolerance })
    }

    /// Build the mask from every record of an inventory.
    pub fn from_inventory(inventory: &InventoryPointSet, tolerance: f64) -> Result<Self> {
        Self::build(inventory.records().iter().map(|r| r.position()), tolerance)
    }

    /// Mask outline.
    pub const fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Buffer distance in degrees.
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether the rectangle shares any area or boundary with the mask.
    pub fn intersects(&self, rect: &Rect<f64>) -> bool {
        self.polygon.intersects(rect)
    }
}

/// Minkowski sum of a convex polygon and a disc.
///
/// For a convex input this equals the hull of discs centred on its vertices.
fn buffer_convex(hull: &Polygon<f64>, distance: f64) -> Polygon<f64> {
    #[allow(clippy::cast_precision_loss)]
    let step = 2.0 * PI / BUFFER_SEGMENTS as f64;
    let radius = distance / (step / 2.0).cos();

    let points: Vec<Point<f64>> = hull
        .exterior()
        .coords()
        .flat_map(|c| {
            (0..BUFFER_SEGMENTS).map(move |i| {
                #[allow(clippy::cast_precision_loss)]
                let angle = step * i as f64;
                Point::new(c.x + radius * angle.cos(), c.y + radius * angle.sin())
            })
        })
        .collect();

    MultiPoint::from(points).convex_hull()
}
