//! Display sizing for images and placeholders.

use crate::consts::PLACEHOLDER_ASPECT;

/// Size in points at which an image or placeholder is displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

/// Fit an image of natural size `width` x `height` into `max_width`.
///
/// Wider images are scaled down proportionally; others keep their native size.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn scaled_size(width: u32, height: u32, max_width: f32) -> DisplaySize {
    let (width, height) = (width as f32, height as f32);
    if width > max_width {
        DisplaySize {
            width: max_width,
            height: height * (max_width / width),
        }
    } else {
        DisplaySize { width, height }
    }
}

/// Size of the placeholder shown while an image is missing.
#[must_use]
pub fn placeholder_size(max_width: f32) -> DisplaySize {
    DisplaySize {
        width: max_width,
        height: max_width * PLACEHOLDER_ASPECT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_image_is_scaled_down() {
        let size = scaled_size(600, 400, 300.0);
        assert_eq!(size, DisplaySize {
            width: 300.0,
            height: 200.0
        });
    }

    #[test]
    fn test_narrow_image_keeps_native_size() {
        let size = scaled_size(120, 90, 300.0);
        assert_eq!(size, DisplaySize {
            width: 120.0,
            height: 90.0
        });
    }

    #[test]
    fn test_exact_width_is_not_scaled() {
        assert_eq!(scaled_size(300, 10, 300.0).width, 300.0);
        assert_eq!(scaled_size(300, 10, 300.0).height, 10.0);
    }

    #[test]
    fn test_placeholder_size() {
        assert_eq!(placeholder_size(300.0), DisplaySize {
            width: 300.0,
            height: 180.0
        });
    }
}
