//! Page image normalization ahead of recognition.
//!
//! Every page goes through the same three steps, in order: grayscale,
//! contrast boost, sharpen. There are no parameters.

use image::{imageops, DynamicImage, GrayImage, Luma};

/// Contrast gain applied around the channel midpoint.
pub const CONTRAST_FACTOR: f32 = 2.0;

/// 3x3 sharpening kernel, row-major, divided by [`SHARPEN_SCALE`].
const SHARPEN_KERNEL: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];
const SHARPEN_SCALE: i32 = 16;

/// Normalize a rendered page for recognition and table detection.
pub fn preprocess(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let contrasted = enhance_contrast(&gray, CONTRAST_FACTOR);
    sharpen(&contrasted)
}

/// Scale intensities away from the channel midpoint by `factor`.
pub fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    imageops::contrast(image, contrast_percent(factor))
}

/// `imageops::contrast` squares `(100 + c) / 100` to get its gain.
fn contrast_percent(factor: f32) -> f32 {
    (factor.max(0.0).sqrt() - 1.0) * 100.0
}

/// Apply the fixed sharpening kernel. Border pixels are copied unchanged.
pub fn sharpen(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = 0i32;
            for (i, k) in SHARPEN_KERNEL.iter().enumerate() {
                let sx = x + (i % 3) as u32 - 1;
                let sy = y + (i / 3) as u32 - 1;
                acc += k * image.get_pixel(sx, sy)[0] as i32;
            }
            let value = (acc + SHARPEN_SCALE / 2).div_euclid(SHARPEN_SCALE);
            out.put_pixel(x, y, Luma([value.clamp(0, 255) as u8]));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_preprocess_is_grayscale_same_size() {
        let rgb = RgbImage::from_pixel(20, 10, Rgb([200, 10, 10]));
        let out = preprocess(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(out.dimensions(), (20, 10));
    }

    #[test]
    fn test_contrast_pushes_away_from_midpoint() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([100]));
        img.put_pixel(1, 0, Luma([160]));
        img.put_pixel(2, 0, Luma([255]));

        let out = enhance_contrast(&img, CONTRAST_FACTOR);
        assert!(out.get_pixel(0, 0)[0] < 100);
        assert!(out.get_pixel(1, 0)[0] > 160);
        assert_eq!(out.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_contrast_factor_one_is_identity() {
        let img = GrayImage::from_fn(8, 8, |x, y| Luma([(x * 30 + y) as u8]));
        let out = enhance_contrast(&img, 1.0);
        for (a, b) in img.pixels().zip(out.pixels()) {
            assert!((a[0] as i32 - b[0] as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_sharpen_uniform_is_identity() {
        let img = GrayImage::from_pixel(5, 5, Luma([90]));
        assert_eq!(sharpen(&img), img);
    }

    #[test]
    fn test_sharpen_boosts_isolated_dot() {
        let mut img = GrayImage::from_pixel(5, 5, Luma([100]));
        img.put_pixel(2, 2, Luma([120]));
        let out = sharpen(&img);
        // (32 * 120 - 16 * 100) / 16 = 140
        assert_eq!(out.get_pixel(2, 2)[0], 140);
        assert!(out.get_pixel(1, 2)[0] < 100);
        // borders untouched
        assert_eq!(out.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_sharpen_keeps_binary_images_binary() {
        let img = GrayImage::from_fn(9, 9, |x, _| Luma([if x < 4 { 0 } else { 255 }]));
        let out = sharpen(&img);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
