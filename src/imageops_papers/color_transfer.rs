use crate::error::ColorTransferError;
use crate::imageops_papers::color_space::{lab_to_rgb, rgb_to_lab};
use crate::utils::{rgb_from_unit_f32, rgb_to_unit_f32, validate_non_empty_image};
use crate::Image;
use image::Rgb;
use imageproc::map::map_colors;

/// Color transfer between images (Reinhard et al. 2001).
///
/// The color distribution of a reference image is imposed on `self` by
/// matching the mean and standard deviation of each `Lαβ` channel.
/// The two images may have different sizes.
///
/// # Examples
///
/// ```rust
/// use imageops_papers::{ColorTransfer, Image};
/// use image::Rgb;
///
/// let target: Image<Rgb<u8>> = Image::from_pixel(4, 4, Rgb([200, 40, 40]));
/// let reference: Image<Rgb<u8>> = Image::from_pixel(8, 2, Rgb([40, 40, 200]));
/// let result = target.transfer_color(&reference).unwrap();
/// assert!(result.get_pixel(0, 0)[2] > result.get_pixel(0, 0)[0]);
/// ```
pub trait ColorTransfer {
    /// Returns `self` recolored with the statistics of `reference`.
    ///
    /// # Errors
    ///
    /// * `ColorTransferError::EmptyImage` - If either image has no pixels
    fn transfer_color(&self, reference: &Self) -> Result<Self, ColorTransferError>
    where
        Self: Sized;
}

impl ColorTransfer for Image<Rgb<u8>> {
    fn transfer_color(&self, reference: &Self) -> Result<Self, ColorTransferError> {
        for image in [self, reference] {
            let (width, height) = image.dimensions();
            validate_non_empty_image(width, height, "Color transfer")
                .map_err(|_| ColorTransferError::EmptyImage { width, height })?;
        }

        let target = rgb_to_unit_f32(self);
        let target_stats = LabStatistics::from_image(&target);
        let reference_stats = LabStatistics::from_image(&rgb_to_unit_f32(reference));
        log::debug!(
            "target lab mean {:?}, reference lab mean {:?}",
            target_stats.mean,
            reference_stats.mean
        );

        let scale: [f64; 3] = std::array::from_fn(|c| {
            if target_stats.std_dev[c] > 0.0 {
                reference_stats.std_dev[c] / target_stats.std_dev[c]
            } else {
                1.0
            }
        });

        let transferred = map_colors(&target, |pixel| {
            let lab = rgb_to_lab(pixel);
            let mapped: [f32; 3] = std::array::from_fn(|c| {
                ((f64::from(lab[c]) - target_stats.mean[c]) * scale[c] + reference_stats.mean[c])
                    as f32
            });
            lab_to_rgb(mapped)
        });

        Ok(rgb_from_unit_f32(&transferred))
    }
}

/// Per-channel mean and standard deviation of an image in `Lαβ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabStatistics {
    /// Channel means
    pub mean: [f64; 3],
    /// Channel population standard deviations
    pub std_dev: [f64; 3],
}

impl LabStatistics {
    /// Computes the statistics of an RGB image with channels in `[0, 1]`.
    pub fn from_image(image: &Image<Rgb<f32>>) -> Self {
        let count = f64::from(image.width()) * f64::from(image.height());
        let mut sum = [0.0f64; 3];
        let mut sum_sq = [0.0f64; 3];

        for pixel in image.pixels() {
            let lab = rgb_to_lab(*pixel);
            for c in 0..3 {
                let v = f64::from(lab[c]);
                sum[c] += v;
                sum_sq[c] += v * v;
            }
        }

        let mean = sum.map(|s| s / count);
        let std_dev = std::array::from_fn(|c| (sum_sq[c] / count - mean[c] * mean[c]).max(0.0).sqrt());
        Self { mean, std_dev }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_large_test_image, create_test_rgb_image};
    use approx::assert_abs_diff_eq;

    #[test]
    fn transfer_color_onto_itself_is_identity() {
        let image = create_test_rgb_image();
        let result = image.transfer_color(&image).unwrap();
        for (a, b) in image.pixels().zip(result.pixels()) {
            for c in 0..3 {
                assert!((i16::from(a[c]) - i16::from(b[c])).abs() <= 3);
            }
        }
    }

    #[test]
    fn transfer_color_matches_reference_statistics() {
        let target = create_test_rgb_image();
        let reference = create_large_test_image(6, 6);
        let result = target.transfer_color(&reference).unwrap();

        let result_stats = LabStatistics::from_image(&rgb_to_unit_f32(&result));
        let reference_stats = LabStatistics::from_image(&rgb_to_unit_f32(&reference));
        assert_abs_diff_eq!(result_stats.mean[0], reference_stats.mean[0], epsilon = 0.1);
    }

    #[test]
    fn transfer_color_with_flat_target_shifts_only_the_mean() {
        let target: Image<Rgb<u8>> = Image::from_pixel(3, 3, Rgb([100, 100, 100]));
        let reference: Image<Rgb<u8>> = Image::from_pixel(2, 2, Rgb([180, 60, 60]));
        let result = target.transfer_color(&reference).unwrap();
        let pixel = result.get_pixel(1, 1);
        assert!(pixel[0] > pixel[1]);
        assert!(result.pixels().all(|p| p == pixel));
    }

    #[test]
    fn transfer_color_with_empty_reference_returns_error() {
        let target = create_test_rgb_image();
        let reference: Image<Rgb<u8>> = Image::new(0, 4);
        assert_eq!(
            target.transfer_color(&reference),
            Err(ColorTransferError::EmptyImage {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn lab_statistics_of_constant_image_has_zero_deviation() {
        let image: Image<Rgb<f32>> = Image::from_pixel(4, 4, Rgb([0.3, 0.6, 0.2]));
        let stats = LabStatistics::from_image(&image);
        for c in 0..3 {
            assert_abs_diff_eq!(stats.std_dev[c], 0.0, epsilon = 1e-4);
        }
    }
}
