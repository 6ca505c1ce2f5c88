//! Patch windows for tiled inference over large images.

/// A square-ish crop of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Split an image into overlapping patch windows.
///
/// Patches step by `patch_size * (1 - overlap)`. The last patch on each
/// axis is pulled back so it ends flush with the image edge; images smaller
/// than a patch yield one window covering the whole image.
///
/// # Arguments
///
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `patch_size` - Patch edge length in pixels
/// * `overlap` - Fractional overlap between neighbouring patches (0.0 - <1.0)
pub fn compute_windows(width: u32, height: u32, patch_size: u32, overlap: f32) -> Vec<Window> {
    if width == 0 || height == 0 || patch_size == 0 {
        return Vec::new();
    }

    let xs = axis_offsets(width, patch_size, overlap);
    let ys = axis_offsets(height, patch_size, overlap);

    ys.iter()
        .flat_map(|&y| {
            xs.iter().map(move |&x| Window {
                x,
                y,
                width: patch_size.min(width),
                height: patch_size.min(height),
            })
        })
        .collect()
}

fn axis_offsets(length: u32, patch_size: u32, overlap: f32) -> Vec<u32> {
    if length <= patch_size {
        return vec![0];
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let stride = ((f64::from(patch_size) * (1.0 - f64::from(overlap))).round() as u32).max(1);

    let last = length - patch_size;
    let mut offsets: Vec<u32> = (0..last).step_by(stride as usize).collect();
    offsets.push(last);
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_image_single_window() {
        let windows = compute_windows(100, 80, 400, 0.1);
        assert_eq!(
            windows,
            vec![Window {
                x: 0,
                y: 0,
                width: 100,
                height: 80
            }]
        );
    }

    #[test]
    fn test_exact_fit_no_overlap() {
        let windows = compute_windows(800, 400, 400, 0.0);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].x, 0);
        assert_eq!(windows[1].x, 400);
    }

    #[test]
    fn test_overlap_steps() {
        // stride 360: offsets 0, 360, then flush at 600
        let windows = compute_windows(1000, 400, 400, 0.1);
        let xs: Vec<u32> = windows.iter().map(|w| w.x).collect();
        assert_eq!(xs, vec![0, 360, 600]);
    }

    #[test]
    fn test_windows_cover_image() {
        let (width, height) = (1234, 987);
        let windows = compute_windows(width, height, 400, 0.25);

        for w in &windows {
            assert!(w.x + w.width <= width);
            assert!(w.y + w.height <= height);
        }
        assert!(windows.iter().any(|w| w.x + w.width == width));
        assert!(windows.iter().any(|w| w.y + w.height == height));
    }

    #[test]
    fn test_empty_image() {
        assert!(compute_windows(0, 100, 400, 0.1).is_empty());
    }
}
