//! Sharpening filters
//!
//! Unsharp mask followed by a high-pass overlay, both built from a gaussian
//! blur and a saturating weighted sum of two images.

use image::{imageops, DynamicImage, Rgb, RgbImage};

use crate::sharpen::SharpenConfig;

/// `a * weight_a + b * weight_b`, rounded and clamped to 0..=255 per channel
fn add_weighted(a: &RgbImage, weight_a: f32, b: &RgbImage, weight_b: f32) -> RgbImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());

    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let value = pa[c] as f32 * weight_a + pb[c] as f32 * weight_b;
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

/// Unsharp mask: boost the difference between the image and its blur.
///
/// `radius` is the gaussian sigma, `percent` the strength (150 = 1.5x).
pub fn unsharp_mask(image: &RgbImage, radius: f32, percent: f32) -> RgbImage {
    let blurred = imageops::blur(image, radius);
    let amount = percent / 100.0;
    add_weighted(image, 1.0 + amount, &blurred, -amount)
}

/// High-pass overlay: `1.5 * image - 0.5 * blur(image)`
pub fn high_pass_overlay(image: &RgbImage, radius: f32) -> RgbImage {
    let blurred = imageops::blur(image, radius);
    add_weighted(image, 1.5, &blurred, -0.5)
}

/// Full sharpening pass. The result is always 8-bit RGB.
pub fn sharpen(image: &DynamicImage, config: &SharpenConfig) -> RgbImage {
    let rgb = image.to_rgb8();
    let unsharp = unsharp_mask(&rgb, config.unsharp_radius, config.unsharp_percent);
    high_pass_overlay(&unsharp, config.highpass_radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image() -> RgbImage {
        RgbImage::from_fn(20, 20, |x, _| if x < 10 { Rgb([100, 100, 100]) } else { Rgb([150, 150, 150]) })
    }

    #[test]
    fn test_flat_image_is_unchanged() {
        let flat = RgbImage::from_pixel(16, 12, Rgb([120, 60, 200]));
        let result = sharpen(&DynamicImage::ImageRgb8(flat.clone()), &SharpenConfig::default());

        assert_eq!(result.dimensions(), (16, 12));
        for (a, b) in result.pixels().zip(flat.pixels()) {
            for c in 0..3 {
                assert!((a[c] as i32 - b[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_edges_are_amplified() {
        let image = step_image();
        let result = unsharp_mask(&image, 1.5, 150.0);

        assert!(result.get_pixel(9, 10)[0] < 100);
        assert!(result.get_pixel(10, 10)[0] > 150);
        // Far from the edge nothing changes
        assert_eq!(result.get_pixel(0, 10)[0], 100);
        assert_eq!(result.get_pixel(19, 10)[0], 150);
    }

    #[test]
    fn test_high_pass_overlay_increases_contrast() {
        let image = step_image();
        let result = high_pass_overlay(&image, 1.0);

        let before = image.get_pixel(10, 5)[0] as i32 - image.get_pixel(9, 5)[0] as i32;
        let after = result.get_pixel(10, 5)[0] as i32 - result.get_pixel(9, 5)[0] as i32;
        assert!(after > before);
    }

    #[test]
    fn test_saturation() {
        let a = RgbImage::from_pixel(2, 2, Rgb([250, 5, 128]));
        let b = RgbImage::from_pixel(2, 2, Rgb([0, 255, 128]));
        let out = add_weighted(&a, 2.0, &b, -1.0);
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 128]);
    }
}
