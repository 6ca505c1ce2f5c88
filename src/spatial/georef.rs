//! Affine georeferencing of image pixels.

use crate::detect::{Detection, PixelBox};
use crate::error::{Error, Result};
use geo::{Coord, Rect};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude (-90.0 to 90.0).
    pub lat: f64,
    /// Longitude (-180.0 to 180.0).
    pub lon: f64,
}

impl LatLon {
    /// Create a new position.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Position as a `geo` coordinate (x = longitude, y = latitude).
    pub const fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Linear pixel -> degree mapping for one image.
///
/// Anchored at the image's top-left corner (row 0, column 0). Image `y`
/// grows downward while latitude grows upward, so latitude is the
/// reference latitude *minus* the scaled row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    lon_per_pixel: f64,
    lat_per_pixel: f64,
    ref_lat: f64,
    ref_lon: f64,
}

impl AffineTransform {
    /// Build the transform from image size and its top-right / bottom-left corners.
    ///
    /// Rejects zero pixel dimensions, zero geographic extent, non-finite
    /// coordinates and inverted corners with [`Error::DegenerateFrame`].
    pub fn from_corners(
        width: u32,
        height: u32,
        top_right: LatLon,
        bottom_left: LatLon,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::DegenerateFrame {
                reason: format!("image has zero pixel extent ({width}x{height})"),
            });
        }

        let coords = [top_right.lat, top_right.lon, bottom_left.lat, bottom_left.lon];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(Error::DegenerateFrame {
                reason: "corner coordinates must be finite".to_string(),
            });
        }

        let lat_extent = top_right.lat - bottom_left.lat;
        let lon_extent = top_right.lon - bottom_left.lon;

        if lat_extent == 0.0 || lon_extent == 0.0 {
            return Err(Error::DegenerateFrame {
                reason: format!(
                    "corners span zero geographic extent (lat {lat_extent}, lon {lon_extent})"
                ),
            });
        }
        if lat_extent < 0.0 {
            return Err(Error::DegenerateFrame {
                reason: format!(
                    "top-right latitude {} is south of bottom-left latitude {} (corners inverted)",
                    top_right.lat, bottom_left.lat
                ),
            });
        }
        if lon_extent < 0.0 {
            return Err(Error::DegenerateFrame {
                reason: format!(
                    "top-right longitude {} is west of bottom-left longitude {} (corners inverted)",
                    top_right.lon, bottom_left.lon
                ),
            });
        }

        Ok(Self {
            lon_per_pixel: lon_extent / f64::from(width),
            lat_per_pixel: lat_extent / f64::from(height),
            ref_lat: top_right.lat,
            ref_lon: bottom_left.lon,
        })
    }

    /// Degrees of longitude per pixel column.
    pub const fn lon_per_pixel(&self) -> f64 {
        self.lon_per_pixel
    }

    /// Degrees of latitude per pixel row.
    pub const fn lat_per_pixel(&self) -> f64 {
        self.lat_per_pixel
    }

    /// Geographic position of pixel (0, 0).
    pub const fn reference(&self) -> LatLon {
        LatLon::new(self.ref_lat, self.ref_lon)
    }

    /// Map a pixel position to a geographic coordinate.
    pub fn forward(&self, x: f64, y: f64) -> Coord<f64> {
        Coord {
            x: self.ref_lon + x * self.lon_per_pixel,
            y: self.ref_lat - y * self.lat_per_pixel,
        }
    }

    /// Map a geographic coordinate back to a pixel position `(x, y)`.
    pub fn inverse(&self, coord: Coord<f64>) -> (f64, f64) {
        (
            (coord.x - self.ref_lon) / self.lon_per_pixel,
            (self.ref_lat - coord.y) / self.lat_per_pixel,
        )
    }
}

/// A detection with its crown mapped to a geographic rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDetection {
    /// The source detection.
    pub detection: Detection,
    /// Crown extent in degrees (x = longitude, y = latitude).
    pub rect: Rect<f64>,
}

/// Map a detection's pixel box to a geographic rectangle.
///
/// The y flip inverts latitude ordering, so the rectangle is rebuilt from
/// the two mapped corners and re-normalized rather than assumed ordered.
pub fn convert(detection: &Detection, transform: &AffineTransform) -> GeoDetection {
    let bbox = &detection.bbox;
    let a = transform.forward(bbox.xmin, bbox.ymin);
    let b = transform.forward(bbox.xmax, bbox.ymax);

    GeoDetection {
        detection: detection.clone(),
        rect: Rect::new(a, b),
    }
}

/// Map a geographic rectangle back to a pixel box.
pub fn to_pixels(rect: &Rect<f64>, transform: &AffineTransform) -> PixelBox {
    // The northern edge (max latitude) is the top row.
    let (x1, y1) = transform.inverse(Coord {
        x: rect.min().x,
        y: rect.max().y,
    });
    let (x2, y2) = transform.inverse(Coord {
        x: rect.max().x,
        y: rect.min().y,
    });

    PixelBox::new(x1, y1, x2, y2)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn hk_transform() -> AffineTransform {
        AffineTransform::from_corners(
            100,
            100,
            LatLon::new(22.301, 114.171),
            LatLon::new(22.299, 114.169),
        )
        .unwrap()
    }

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{a} != {b} (tolerance {tol})");
    }

    #[test]
    fn test_scales_and_reference() {
        let t = hk_transform();
        assert_close(t.lon_per_pixel(), 0.002 / 100.0, 1e-12);
        assert_close(t.lat_per_pixel(), 0.002 / 100.0, 1e-12);
        assert_eq!(t.reference(), LatLon::new(22.301, 114.169));
    }

    #[test]
    fn test_origin_maps_to_top_left_corner() {
        let t = hk_transform();
        let c = t.forward(0.0, 0.0);
        assert_eq!(c.x, 114.169);
        assert_eq!(c.y, 22.301);

        let c = t.forward(100.0, 100.0);
        assert_close(c.x, 114.171, 1e-9);
        assert_close(c.y, 22.299, 1e-9);
    }

    #[test]
    fn test_increasing_y_decreases_latitude() {
        let t = hk_transform();
        let upper = t.forward(50.0, 10.0);
        let lower = t.forward(50.0, 90.0);
        assert!(lower.y < upper.y);
        assert_eq!(lower.x, upper.x);
    }

    #[test]
    fn test_increasing_x_increases_longitude() {
        let t = hk_transform();
        let left = t.forward(10.0, 50.0);
        let right = t.forward(90.0, 50.0);
        assert!(right.x > left.x);
        assert_eq!(left.y, right.y);
    }

    #[test]
    fn test_convert_normalizes_latitude_order() {
        let t = hk_transform();
        let det = Detection::new(PixelBox::new(40.0, 40.0, 60.0, 60.0), 0.9);
        let geo = convert(&det, &t);

        assert!(geo.rect.min().y < geo.rect.max().y);
        assert!(geo.rect.min().x < geo.rect.max().x);
        assert_close(geo.rect.min().x, 114.1698, 1e-9);
        assert_close(geo.rect.max().x, 114.1702, 1e-9);
        assert_close(geo.rect.min().y, 22.2998, 1e-9);
        assert_close(geo.rect.max().y, 22.3002, 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let transforms = [
            hk_transform(),
            AffineTransform::from_corners(
                4000,
                3000,
                LatLon::new(51.5012, -0.1201),
                LatLon::new(51.4987, -0.1263),
            )
            .unwrap(),
            AffineTransform::from_corners(
                640,
                480,
                LatLon::new(-33.85, 151.22),
                LatLon::new(-33.87, 151.20),
            )
            .unwrap(),
        ];
        let boxes = [
            PixelBox::new(0.0, 0.0, 1.0, 1.0),
            PixelBox::new(12.5, 7.25, 88.0, 63.75),
            PixelBox::new(300.0, 200.0, 412.3, 279.9),
        ];

        for t in &transforms {
            for bbox in &boxes {
                let det = Detection::new(*bbox, 0.7);
                let back = to_pixels(&convert(&det, t).rect, t);
                let tol = 1e-6 * bbox.xmax.max(bbox.ymax).max(1.0);
                assert_close(back.xmin, bbox.xmin, tol);
                assert_close(back.ymin, bbox.ymin, tol);
                assert_close(back.xmax, bbox.xmax, tol);
                assert_close(back.ymax, bbox.ymax, tol);
            }
        }
    }

    #[test]
    fn test_zero_width_is_degenerate() {
        let result = AffineTransform::from_corners(
            0,
            100,
            LatLon::new(22.301, 114.171),
            LatLon::new(22.299, 114.169),
        );
        assert!(matches!(result, Err(Error::DegenerateFrame { .. })));
    }

    #[test]
    fn test_identical_corners_are_degenerate() {
        let corner = LatLon::new(22.3, 114.17);
        let result = AffineTransform::from_corners(100, 100, corner, corner);
        assert!(matches!(result, Err(Error::DegenerateFrame { .. })));
    }

    #[test]
    fn test_zero_longitude_extent_is_degenerate() {
        let result = AffineTransform::from_corners(
            100,
            100,
            LatLon::new(22.301, 114.17),
            LatLon::new(22.299, 114.17),
        );
        assert!(matches!(result, Err(Error::DegenerateFrame { .. })));
    }

    #[test]
    fn test_inverted_corners_rejected() {
        let result = AffineTransform::from_corners(
            100,
            100,
            LatLon::new(22.299, 114.171),
            LatLon::new(22.301, 114.169),
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn test_non_finite_corner_rejected() {
        let result = AffineTransform::from_corners(
            100,
            100,
            LatLon::new(f64::NAN, 114.171),
            LatLon::new(22.299, 114.169),
        );
        assert!(matches!(result, Err(Error::DegenerateFrame { .. })));
    }
}
