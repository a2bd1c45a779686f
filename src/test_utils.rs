//! Test utilities for imageops-papers
//!
//! This module provides common functionality for testing image operations.
//! It is only compiled when running tests.

use crate::Image;
use image::{Luma, Pixel, Primitive, Rgb};

/// Creates a test RGB image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// Creates a larger RGB image filled with a checkerboard pattern.
pub fn create_large_test_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([200, 150, 100])
        } else {
            Rgb([100, 150, 200])
        }
    })
}

/// Creates an RGB image whose left half is `left` and right half is `right`.
pub fn create_step_image(width: u32, height: u32, left: Rgb<u8>, right: Rgb<u8>) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, _| if x < width / 2 { left } else { right })
}

/// Creates a gray image with a horizontal ramp.
pub fn create_gray_ramp(width: u32, height: u32) -> Image<Luma<u8>> {
    let last = width.saturating_sub(1).max(1);
    Image::from_fn(width, height, |x, _| Luma([(x * 255 / last) as u8]))
}

/// Compares two pixel values with a tolerance for floating-point precision errors.
pub fn pixels_approx_equal<P>(expected: P, actual: P, tolerance: f32) -> bool
where
    P: Pixel,
    P::Subpixel: Primitive,
    f32: From<P::Subpixel>,
{
    expected
        .channels()
        .iter()
        .zip(actual.channels())
        .all(|(e, a)| (f32::from(*e) - f32::from(*a)).abs() <= tolerance)
}

/// Compares two images pixel by pixel with a tolerance for floating-point errors.
pub fn images_approx_equal<P>(expected: &Image<P>, actual: &Image<P>, tolerance: f32) -> bool
where
    P: Pixel,
    P::Subpixel: Primitive,
    f32: From<P::Subpixel>,
{
    expected.dimensions() == actual.dimensions()
        && expected
            .pixels()
            .zip(actual.pixels())
            .all(|(e, a)| pixels_approx_equal(*e, *a, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_large_test_image_with_valid_input_creates_checkerboard() {
        let image = create_large_test_image(10, 10);
        assert_eq!(image.dimensions(), (10, 10));
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 150, 100]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([100, 150, 200]));
    }

    #[test]
    fn create_gray_ramp_spans_full_range() {
        let ramp = create_gray_ramp(6, 2);
        assert_eq!(ramp.get_pixel(0, 0)[0], 0);
        assert_eq!(ramp.get_pixel(5, 1)[0], 255);
    }

    #[test]
    fn images_approx_equal_with_tolerant_comparison_returns_true() {
        let image1 = create_test_rgb_image();
        let mut image2 = create_test_rgb_image();
        image2.put_pixel(0, 0, Rgb([201, 150, 100]));

        assert!(images_approx_equal(&image1, &image2, 1.5));
        assert!(!images_approx_equal(&image1, &image2, 0.5));
    }
}
