use crate::error::LocalLaplacianError;
use crate::imageops_papers::pyramid::{gaussian_blur, pyr_down, pyr_up};
use crate::utils::{rgb_from_unit_f32, rgb_to_unit_f32, validate_non_empty_image};
use crate::Image;
use image::{ImageBuffer, Rgb};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Parameters of the local Laplacian filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalLaplacianParams {
    /// Threshold between detail and edge amplitudes on the `[0, 1]` scale
    pub sigma_r: f32,
    /// Number of Laplacian levels
    pub levels: usize,
    /// Detail exponent; below 1 enhances detail, above 1 smooths it
    pub alpha: f32,
    /// Blend between the power curve and the identity for details
    pub tau: f32,
    /// Edge amplitude scale; below 1 compresses tone
    pub beta: f32,
    /// Gaussian blur applied before every downsampling, 0 to skip
    pub presmooth_sigma: f32,
}

impl Default for LocalLaplacianParams {
    fn default() -> Self {
        Self {
            sigma_r: 0.2,
            levels: 3,
            alpha: 4.0,
            tau: 0.8,
            beta: 1.0,
            presmooth_sigma: 2.0,
        }
    }
}

impl LocalLaplacianParams {
    fn validate(&self) -> Result<(), LocalLaplacianError> {
        let sigma_r_valid = self.sigma_r.is_finite() && self.sigma_r > 0.0;
        let presmooth_valid = self.presmooth_sigma.is_finite() && self.presmooth_sigma >= 0.0;
        if !(sigma_r_valid && presmooth_valid) {
            return Err(LocalLaplacianError::InvalidSigma {
                sigma_r: self.sigma_r,
                presmooth_sigma: self.presmooth_sigma,
            });
        }
        if self.levels == 0 {
            return Err(LocalLaplacianError::InvalidLevels {
                levels: self.levels,
            });
        }
        let tau_in_range = (0.0..=1.0).contains(&self.tau);
        if !(self.alpha > 0.0 && self.beta >= 0.0 && tau_in_range) {
            return Err(LocalLaplacianError::InvalidRemapping {
                alpha: self.alpha,
                beta: self.beta,
                tau: self.tau,
            });
        }
        Ok(())
    }
}

/// Edge-aware detail manipulation with local Laplacian pyramids,
/// Paris, Hasinoff and Kautz, "Local Laplacian Filters" (2011).
///
/// Every Laplacian coefficient is recomputed from a window of the input whose
/// intensities were remapped around the Gaussian pyramid value at that
/// position. Small differences (below `sigma_r`) are reshaped by the detail
/// curve, larger ones are treated as edges and scaled by `beta`.
pub trait LocalLaplacianFilter {
    /// Filtered image type
    type Output;

    /// Applies the filter.
    ///
    /// # Errors
    ///
    /// * `LocalLaplacianError::EmptyImage` - If the image has no pixels
    /// * `LocalLaplacianError::InvalidSigma` - If `sigma_r` is not positive or `presmooth_sigma` is negative, or either is not finite
    /// * `LocalLaplacianError::InvalidLevels` - If `levels` is zero
    /// * `LocalLaplacianError::InvalidRemapping` - If `alpha`, `beta` or `tau` is out of range
    fn local_laplacian_filter(
        &self,
        params: &LocalLaplacianParams,
    ) -> Result<Self::Output, LocalLaplacianError>;
}

impl LocalLaplacianFilter for Image<Rgb<f32>> {
    type Output = Self;

    fn local_laplacian_filter(
        &self,
        params: &LocalLaplacianParams,
    ) -> Result<Self::Output, LocalLaplacianError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "Local Laplacian filter")
            .map_err(|_| LocalLaplacianError::EmptyImage)?;
        params.validate()?;
        Ok(filter(self, params))
    }
}

impl LocalLaplacianFilter for Image<Rgb<u8>> {
    type Output = Self;

    fn local_laplacian_filter(
        &self,
        params: &LocalLaplacianParams,
    ) -> Result<Self::Output, LocalLaplacianError> {
        let filtered = rgb_to_unit_f32(self).local_laplacian_filter(params)?;
        Ok(rgb_from_unit_f32(&filtered))
    }
}

/// Intensity remapping around a reference color `g0`.
struct Remapping<'a> {
    g0: [f32; 3],
    params: &'a LocalLaplacianParams,
}

impl Remapping<'_> {
    fn detail(&self, d: f32) -> f32 {
        self.params.tau * d.powf(self.params.alpha) + (1.0 - self.params.tau) * d
    }

    fn apply(&self, Rgb(i): Rgb<f32>) -> Rgb<f32> {
        let diff: [f32; 3] = std::array::from_fn(|c| i[c] - self.g0[c]);
        let norm = diff.iter().map(|d| d * d).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Rgb(self.g0);
        }

        let sigma_r = self.params.sigma_r;
        let magnitude = if norm <= sigma_r {
            sigma_r * self.detail(norm / sigma_r)
        } else {
            self.params.beta * (norm - sigma_r) + sigma_r
        };
        Rgb(std::array::from_fn(|c| self.g0[c] + diff[c] / norm * magnitude))
    }
}

fn downsample(image: &Image<Rgb<f32>>, presmooth_sigma: f32) -> Image<Rgb<f32>> {
    if presmooth_sigma > 0.0 {
        pyr_down(&gaussian_blur(image, presmooth_sigma))
    } else {
        pyr_down(image)
    }
}

fn gaussian_pyramid(
    image: &Image<Rgb<f32>>,
    levels: usize,
    presmooth_sigma: f32,
) -> Vec<Image<Rgb<f32>>> {
    let mut pyramid = Vec::with_capacity(levels + 1);
    pyramid.push(image.clone());
    for l in 0..levels {
        let next = downsample(&pyramid[l], presmooth_sigma);
        pyramid.push(next);
    }
    pyramid
}

/// Laplacian coefficient of level `level` at `(x, y)` computed from the
/// remapped neighbourhood of its full resolution footprint.
fn remapped_coefficient(
    input: &Image<Rgb<f32>>,
    level: usize,
    x: u32,
    y: u32,
    g0: Rgb<f32>,
    params: &LocalLaplacianParams,
) -> Rgb<f32> {
    let (width, height) = (u64::from(input.width()), u64::from(input.height()));
    let (rx, ry) = (u64::from(x) << level, u64::from(y) << level);
    let radius = 3 * ((4u64 << level) - 1);

    // Aligned to the level grid so that subsampling the window hits (rx, ry).
    let x0 = (rx.saturating_sub(radius) >> level) << level;
    let y0 = (ry.saturating_sub(radius) >> level) << level;
    let x1 = (rx + radius).min(width - 1);
    let y1 = (ry + radius).min(height - 1);

    // The footprint and the window lie inside the image, so they fit in u32.
    let (x0, y0, x1, y1) = (x0 as u32, y0 as u32, x1 as u32, y1 as u32);
    let (rx, ry) = (rx as u32, ry as u32);

    let remapping = Remapping { g0: g0.0, params };
    let window: Image<Rgb<f32>> = ImageBuffer::from_fn(x1 - x0 + 1, y1 - y0 + 1, |wx, wy| {
        remapping.apply(*input.get_pixel(x0 + wx, y0 + wy))
    });

    let pyramid = gaussian_pyramid(&window, level + 1, params.presmooth_sigma);
    let fine = &pyramid[level];
    let coarse = pyr_up(&pyramid[level + 1], fine.width(), fine.height());

    let (px, py) = ((rx - x0) >> level, (ry - y0) >> level);
    let f = fine.get_pixel(px, py);
    let c = coarse.get_pixel(px, py);
    Rgb([f[0] - c[0], f[1] - c[1], f[2] - c[2]])
}

fn laplacian_level(
    input: &Image<Rgb<f32>>,
    gaussian: &Image<Rgb<f32>>,
    level: usize,
    params: &LocalLaplacianParams,
) -> Image<Rgb<f32>> {
    let (width, height) = gaussian.dimensions();
    let row = |y: u32| -> Vec<Rgb<f32>> {
        (0..width)
            .map(|x| remapped_coefficient(input, level, x, y, *gaussian.get_pixel(x, y), params))
            .collect()
    };

    #[cfg(feature = "rayon")]
    let rows: Vec<Vec<Rgb<f32>>> = (0..height).into_par_iter().map(row).collect();
    #[cfg(not(feature = "rayon"))]
    let rows: Vec<Vec<Rgb<f32>>> = (0..height).map(row).collect();

    ImageBuffer::from_fn(width, height, |x, y| rows[y as usize][x as usize])
}

/// Number of `pyr_down` steps that take a `width x height` image to 1x1.
fn pyramid_depth(width: u32, height: u32) -> usize {
    (u32::BITS - (width.max(height).max(1) - 1).leading_zeros()) as usize
}

fn filter(image: &Image<Rgb<f32>>, params: &LocalLaplacianParams) -> Image<Rgb<f32>> {
    // Levels below 1x1 repeat the same pixel and carry no detail.
    let levels = params.levels.min(pyramid_depth(image.width(), image.height()));
    if levels < params.levels {
        log::debug!("local Laplacian pyramid limited to {levels} levels");
    }
    let gaussian = gaussian_pyramid(image, levels, params.presmooth_sigma);

    let laplacian: Vec<Image<Rgb<f32>>> = (0..levels)
        .map(|level| {
            log::debug!(
                "local Laplacian level {level} ({}x{})",
                gaussian[level].width(),
                gaussian[level].height()
            );
            laplacian_level(image, &gaussian[level], level, params)
        })
        .collect();

    let mut result = gaussian[levels].clone();
    for (level, details) in laplacian.iter().enumerate().rev() {
        let mut upsampled = pyr_up(&result, details.width(), details.height());
        for (r, d) in upsampled.pixels_mut().zip(details.pixels()) {
            for c in 0..3 {
                r[c] += d[c];
            }
        }
        log::debug!("local Laplacian reconstructed level {level}");
        result = upsampled;
    }
    result
}
