//! Annotated image output.

use crate::constants::annotate::OUTLINE_RGB;
use crate::detect::PixelBox;
use crate::error::{Error, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Output path for an annotated image.
///
/// Only the file name is prefixed. A relative directory in the identifier is
/// kept under `output_dir`, so `flight2/park_01.jpg` becomes
/// `<output_dir>/flight2/<prefix>_park_01.jpg`. Root and `..` components are
/// dropped so the output never leaves `output_dir`.
pub fn annotated_path(output_dir: &Path, prefix: &str, image_file_name: &str) -> PathBuf {
    let image = Path::new(image_file_name);
    let name = image
        .file_name()
        .map_or_else(|| image_file_name.into(), |n| n.to_string_lossy());

    let mut dir = output_dir.to_path_buf();
    if let Some(parent) = image.parent() {
        dir.extend(parent.components().filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        }));
    }

    dir.join(format!("{prefix}_{name}"))
}

/// Outline `boxes` on a copy of `source` and write it to `dest`.
///
/// With no boxes the source file is copied byte for byte.
pub fn annotate_image(source: &Path, dest: &Path, boxes: &[PixelBox], line_width: u32) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::ImageWrite {
            path: dest.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?;
    }

    if boxes.is_empty() {
        debug!("No crowns to draw, copying {}", source.display());
        std::fs::copy(source, dest).map_err(|e| Error::ImageWrite {
            path: dest.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?;
        return Ok(());
    }

    let mut img = image::open(source)
        .map_err(|e| Error::ImageRead {
            path: source.to_path_buf(),
            source: e,
        })?
        .to_rgb8();

    for bbox in boxes {
        draw_outline(&mut img, bbox, line_width);
    }

    img.save(dest).map_err(|e| Error::ImageWrite {
        path: dest.to_path_buf(),
        source: e,
    })
}

/// Draw a box outline `line_width` pixels thick, growing inward.
#[allow(clippy::cast_possible_truncation)]
fn draw_outline(img: &mut RgbImage, bbox: &PixelBox, line_width: u32) {
    let color = Rgb(OUTLINE_RGB);
    let x0 = bbox.xmin.round() as i32;
    let y0 = bbox.ymin.round() as i32;
    let x1 = bbox.xmax.round() as i32;
    let y1 = bbox.ymax.round() as i32;

    for inset in 0..line_width.min(i32::MAX as u32) {
        let inset = inset as i32;
        let width = x1 - x0 + 1 - 2 * inset;
        let height = y1 - y0 + 1 - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }

        #[allow(clippy::cast_sign_loss)]
        let rect = Rect::at(x0 + inset, y0 + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(img, rect, color);
    }
}
