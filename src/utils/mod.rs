//! Internal utility functions for imageops-papers.
//!
//! This module contains common functionality used across different image operations.

use crate::Image;
use image::{Luma, Primitive, Rgb};
use imageproc::definitions::Clamp;
use imageproc::map::map_colors;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Clamps a floating-point value to the range of a primitive type.
///
/// This function ensures that the input value is within the valid range
/// of the target primitive type.
///
/// # Arguments
///
/// * `value` - The floating-point value to clamp
///
/// # Returns
///
/// The clamped value as the target primitive type
#[inline]
pub fn clamp_f32_to_primitive<T: Primitive + Clamp<f32>>(value: f32) -> T {
    T::clamp(value)
}

/// Converts an 8-bit RGB image to floating point with channels in `[0, 1]`.
pub fn rgb_to_unit_f32(image: &Image<Rgb<u8>>) -> Image<Rgb<f32>> {
    map_colors(image, |Rgb([r, g, b])| {
        Rgb([
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        ])
    })
}

/// Converts a floating point RGB image with channels in `[0, 1]` back to 8 bits.
///
/// Values are rounded to the nearest integer and saturated.
pub fn rgb_from_unit_f32(image: &Image<Rgb<f32>>) -> Image<Rgb<u8>> {
    map_colors(image, |Rgb(channels)| Rgb(channels.map(unit_to_u8)))
}

/// Converts an 8-bit gray image to floating point with values in `[0, 1]`.
pub fn luma_to_unit_f32(image: &Image<Luma<u8>>) -> Image<Luma<f32>> {
    map_colors(image, |Luma([l])| Luma([f32::from(l) / 255.0]))
}

/// Converts a floating point gray image with values in `[0, 1]` back to 8 bits.
pub fn luma_from_unit_f32(image: &Image<Luma<f32>>) -> Image<Luma<u8>> {
    map_colors(image, |Luma([l])| Luma([unit_to_u8(l)]))
}

#[inline]
fn unit_to_u8(value: f32) -> u8 {
    clamp_f32_to_primitive::<u8>((value * 255.0).round())
}

/// Creates the random generator used by randomized operations.
///
/// A fixed seed gives reproducible output, `None` seeds from the operating system.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
/// * `context` - A description of the context for error messages
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise an error
pub fn validate_non_empty_image(width: u32, height: u32, context: &str) -> Result<(), String> {
    if width == 0 || height == 0 {
        Err(format!("{}: Image dimensions must be non-zero", context))
    } else {
        Ok(())
    }
}

/// Validates that two images have matching dimensions.
///
/// # Arguments
///
/// * `first` - The (width, height) of the first image
/// * `second` - The (width, height) of the second image
/// * `context` - A description of the context for error messages
///
/// # Returns
///
/// `Ok(())` if the dimensions match, otherwise an error
pub fn validate_matching_dimensions(
    first: (u32, u32),
    second: (u32, u32),
    context: &str,
) -> Result<(), String> {
    if first != second {
        Err(format!(
            "{}: Image dimensions must match. Got {}x{} and {}x{}",
            context, first.0, first.1, second.0, second.1
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_clamp_f32_to_primitive() {
        assert_eq!(clamp_f32_to_primitive::<u8>(-10.0), 0);
        assert_eq!(clamp_f32_to_primitive::<u8>(0.0), 0);
        assert_eq!(clamp_f32_to_primitive::<u8>(255.0), 255);
        assert_eq!(clamp_f32_to_primitive::<u8>(300.0), 255);
    }

    #[test]
    fn unit_conversion_with_rgb_image_is_lossless() {
        let mut image: Image<Rgb<u8>> = Image::new(2, 1);
        image.put_pixel(0, 0, Rgb([0, 127, 255]));
        image.put_pixel(1, 0, Rgb([1, 2, 3]));

        let unit = rgb_to_unit_f32(&image);
        assert_eq!(unit.get_pixel(0, 0)[2], 1.0);
        assert_eq!(rgb_from_unit_f32(&unit), image);
    }

    #[test]
    fn unit_conversion_saturates_out_of_range_values() {
        let mut image: Image<Luma<f32>> = Image::new(2, 1);
        image.put_pixel(0, 0, Luma([-0.5]));
        image.put_pixel(1, 0, Luma([1.5]));

        let result = luma_from_unit_f32(&image);
        assert_eq!(result.get_pixel(0, 0)[0], 0);
        assert_eq!(result.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn seeded_rng_with_same_seed_repeats() {
        let a: u64 = seeded_rng(Some(7)).random();
        let b: u64 = seeded_rng(Some(7)).random();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate_non_empty_image() {
        assert!(validate_non_empty_image(100, 100, "test").is_ok());
        assert!(validate_non_empty_image(1, 1, "test").is_ok());
        assert!(validate_non_empty_image(0, 100, "test").is_err());
        assert!(validate_non_empty_image(100, 0, "test").is_err());
    }

    #[test]
    fn test_validate_matching_dimensions() {
        assert!(validate_matching_dimensions((100, 100), (100, 100), "test").is_ok());
        assert!(validate_matching_dimensions((100, 100), (100, 50), "test").is_err());
        assert!(validate_matching_dimensions((100, 100), (50, 100), "test").is_err());
    }
}
