//! Scale bar geometry
//!
//! Pure arithmetic: bar length from pixel pitch, and placement of the bar and
//! its label for a given image size. The renderer draws exactly the rectangles
//! computed here, so the bounds checks in this file are what keep the
//! annotation inside the image.

use crate::error::LayoutError;
use crate::scalebar::options::{ScaleBarConfig, TextAlignment, TextPosition};

/// Real-world length represented by the scale bar, in micrometers (1 mm)
pub const REFERENCE_LENGTH_UM: f64 = 1000.0;

/// Number of pixels covering 1 mm at the given pitch: `round(1000 / pitch_um)`
pub fn scalebar_length_px(pitch_um: f64) -> Result<u32, LayoutError> {
    if !pitch_um.is_finite() || pitch_um <= 0.0 {
        return Err(LayoutError::InvalidPitch(pitch_um));
    }

    let length = (REFERENCE_LENGTH_UM / pitch_um).round();
    if length < 1.0 {
        return Err(LayoutError::DegenerateBar(pitch_um));
    }
    if length > u32::MAX as f64 {
        return Err(LayoutError::InvalidPitch(pitch_um));
    }

    Ok(length as u32)
}

/// Axis-aligned rectangle in image coordinates, half-open: `[x, x + width)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }

    /// True if every pixel of the rectangle lies in `[0, width) x [0, height)`
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width as i64 && self.bottom() <= height as i64
    }

    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Where the bar and the label go on one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleBarLayout {
    pub bar: PixelRect,
    pub label: PixelRect,
}

impl ScaleBarLayout {
    /// Smallest rectangle containing both bar and label
    pub fn bounds(&self) -> PixelRect {
        let x = self.bar.x.min(self.label.x);
        let y = self.bar.y.min(self.label.y);
        let right = self.bar.right().max(self.label.right());
        let bottom = self.bar.bottom().max(self.label.bottom());
        PixelRect {
            x,
            y,
            width: (right - x) as u32,
            height: (bottom - y) as u32,
        }
    }
}

/// Place the bar and its label on an image of `image_width` x `image_height`.
///
/// The bar and label are treated as one block: the label is aligned to the bar
/// horizontally and separated from it by `text_bar_margin` vertically, then the
/// block is anchored at the configured corner with `x_margin` / `y_margin` from
/// the nearest edges. A block that does not fit is an error, never clamped.
pub fn compute_layout(
    image_width: u32,
    image_height: u32,
    bar_length: u32,
    text_size: (u32, u32),
    config: &ScaleBarConfig,
) -> Result<ScaleBarLayout, LayoutError> {
    if bar_length == 0 || config.scalebar_height == 0 {
        return Err(LayoutError::EmptyBar);
    }

    let bar_length = bar_length as i64;
    let bar_height = config.scalebar_height as i64;
    let gap = config.text_bar_margin as i64;
    let (text_width, text_height) = (text_size.0 as i64, text_size.1 as i64);

    // Label x relative to the bar's left edge
    let label_dx = match config.text_alignment {
        TextAlignment::Left => 0,
        TextAlignment::Center => (bar_length - text_width).div_euclid(2),
        TextAlignment::Right => bar_length - text_width,
    };

    // Horizontal extent of the block relative to the bar's left edge
    let min_dx = label_dx.min(0);
    let max_dx = (label_dx + text_width).max(bar_length);
    let block_width = max_dx - min_dx;
    let block_height = bar_height + gap + text_height;

    // Vertical offsets of label and bar inside the block
    let (label_dy, bar_dy) = match config.text_position {
        TextPosition::Above => (0, text_height + gap),
        TextPosition::Below => (bar_height + gap, 0),
    };

    let block_x = if config.corner.is_right() {
        image_width as i64 - config.x_margin as i64 - block_width
    } else {
        config.x_margin as i64
    };
    let block_y = if config.corner.is_bottom() {
        image_height as i64 - config.y_margin as i64 - block_height
    } else {
        config.y_margin as i64
    };

    let block = PixelRect {
        x: block_x,
        y: block_y,
        width: u32::try_from(block_width).unwrap_or(u32::MAX),
        height: u32::try_from(block_height).unwrap_or(u32::MAX),
    };
    if !block.fits_within(image_width, image_height) {
        return Err(LayoutError::OutOfBounds {
            x: block.x,
            y: block.y,
            width: block.width,
            height: block.height,
            image_width,
            image_height,
        });
    }

    let bar_x = block_x - min_dx;
    let layout = ScaleBarLayout {
        bar: PixelRect {
            x: bar_x,
            y: block_y + bar_dy,
            width: bar_length as u32,
            height: bar_height as u32,
        },
        label: PixelRect {
            x: bar_x + label_dx,
            y: block_y + label_dy,
            width: text_width as u32,
            height: text_height as u32,
        },
    };
    debug_assert!(!layout.bar.intersects(&layout.label));

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalebar::font::LabelFont;
    use crate::scalebar::options::Corner;

    const TEXT: (u32, u32) = (230, 70);

    #[test]
    fn test_length_from_pitch() {
        assert_eq!(scalebar_length_px(500.0), Ok(2));
        assert_eq!(scalebar_length_px(250.0), Ok(4));
        assert_eq!(scalebar_length_px(4.5), Ok(222));
        assert_eq!(scalebar_length_px(3.0), Ok(333));
        assert_eq!(scalebar_length_px(1.6), Ok(625));
    }

    #[test]
    fn test_length_rejects_invalid_pitch() {
        assert_eq!(scalebar_length_px(0.0), Err(LayoutError::InvalidPitch(0.0)));
        assert_eq!(scalebar_length_px(-2.0), Err(LayoutError::InvalidPitch(-2.0)));
        assert!(scalebar_length_px(f64::NAN).is_err());
        assert!(scalebar_length_px(f64::INFINITY).is_err());
        assert_eq!(scalebar_length_px(5000.0), Err(LayoutError::DegenerateBar(5000.0)));
    }

    #[test]
    fn test_default_placement() {
        let config = ScaleBarConfig::default();
        let layout = compute_layout(2000, 2000, 222, TEXT, &config).unwrap();

        // Bottom right, label above and right-aligned, label wider than the bar
        assert_eq!(layout.label.right(), 2000 - 50);
        assert_eq!(layout.bar.right(), layout.label.right());
        assert_eq!(layout.bar.bottom(), 2000 - 150);
        assert_eq!(layout.label.bottom() + 20, layout.bar.y);
    }

    #[test]
    fn test_every_combination_fits_default_image() {
        let config = ScaleBarConfig::default();

        for corner in Corner::ALL {
            for text_position in TextPosition::ALL {
                for text_alignment in TextAlignment::ALL {
                    for bar_length in [2, 222, 625] {
                        let config = ScaleBarConfig {
                            corner,
                            text_position,
                            text_alignment,
                            ..config.clone()
                        };
                        let layout = compute_layout(2000, 2000, bar_length, TEXT, &config)
                            .unwrap_or_else(|e| panic!("{corner}/{text_position}/{text_alignment}: {e}"));

                        assert!(layout.bar.fits_within(2000, 2000));
                        assert!(layout.label.fits_within(2000, 2000));
                        assert!(!layout.bar.intersects(&layout.label));
                        assert_eq!(layout.bar.width, bar_length);
                        assert_eq!(layout.bar.height, 10);

                        match text_position {
                            TextPosition::Above => assert!(layout.label.bottom() <= layout.bar.y),
                            TextPosition::Below => assert!(layout.bar.bottom() <= layout.label.y),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_corners_are_distinct() {
        let base = ScaleBarConfig::default();
        let mut bars = Vec::new();
        for corner in Corner::ALL {
            let config = ScaleBarConfig { corner, ..base.clone() };
            bars.push(compute_layout(2000, 2000, 222, TEXT, &config).unwrap().bar);
        }
        for i in 0..bars.len() {
            for j in (i + 1)..bars.len() {
                assert_ne!(bars[i], bars[j]);
            }
        }
    }

    #[test]
    fn test_alignment() {
        let base = ScaleBarConfig {
            corner: Corner::TopLeft,
            ..ScaleBarConfig::default()
        };
        let wide_bar = 600;

        let left = ScaleBarConfig { text_alignment: TextAlignment::Left, ..base.clone() };
        let layout = compute_layout(2000, 2000, wide_bar, TEXT, &left).unwrap();
        assert_eq!(layout.label.x, layout.bar.x);

        let center = ScaleBarConfig { text_alignment: TextAlignment::Center, ..base.clone() };
        let layout = compute_layout(2000, 2000, wide_bar, TEXT, &center).unwrap();
        assert_eq!(layout.label.x - layout.bar.x, (600 - 230) / 2);

        let right = ScaleBarConfig { text_alignment: TextAlignment::Right, ..base };
        let layout = compute_layout(2000, 2000, wide_bar, TEXT, &right).unwrap();
        assert_eq!(layout.label.right(), layout.bar.right());
    }

    #[test]
    fn test_top_left_respects_margins() {
        let config = ScaleBarConfig {
            corner: Corner::TopLeft,
            text_position: TextPosition::Below,
            text_alignment: TextAlignment::Left,
            ..ScaleBarConfig::default()
        };
        let layout = compute_layout(2000, 2000, 222, TEXT, &config).unwrap();
        assert_eq!(layout.bounds().x, 50);
        assert_eq!(layout.bounds().y, 150);
        assert_eq!(layout.bar.y, 150);
        assert_eq!(layout.label.y, 150 + 10 + 20);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let config = ScaleBarConfig {
            x_margin: 1900,
            ..ScaleBarConfig::default()
        };
        let result = compute_layout(2000, 2000, 222, TEXT, &config);
        assert!(matches!(result, Err(LayoutError::OutOfBounds { .. })));

        // Small image, default margins
        let result = compute_layout(200, 200, 222, TEXT, &ScaleBarConfig::default());
        assert!(matches!(result, Err(LayoutError::OutOfBounds { .. })));
    }

    #[test]
    fn test_huge_label_is_out_of_bounds() {
        let huge = LabelFont::Builtin.measure("1 mm", u32::MAX);
        for corner in [Corner::TopLeft, Corner::BottomRight] {
            for text_alignment in [TextAlignment::Left, TextAlignment::Center, TextAlignment::Right] {
                let config = ScaleBarConfig {
                    corner,
                    text_alignment,
                    ..ScaleBarConfig::default()
                };
                let result = compute_layout(2000, 2000, 222, huge, &config);
                assert!(matches!(result, Err(LayoutError::OutOfBounds { .. })), "{corner:?} {text_alignment:?}");
            }
        }
    }

    #[test]
    fn test_empty_bar_is_an_error() {
        let result = compute_layout(2000, 2000, 0, TEXT, &ScaleBarConfig::default());
        assert_eq!(result, Err(LayoutError::EmptyBar));
    }
}
