use crate::error::DomainTransformError;
use crate::utils::{
    luma_from_unit_f32, luma_to_unit_f32, rgb_from_unit_f32, rgb_to_unit_f32,
    validate_non_empty_image,
};
use crate::Image;
use image::{Luma, Pixel, Rgb};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// How the filter sigma evolves across iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigmaSchedule {
    /// Every iteration uses `sigma_s`
    #[default]
    Constant,
    /// Iteration `i` of `N` uses `sigma_s * sqrt(3) * 2^(N - i - 1) / sqrt(4^N - 1)`,
    /// so the combined variance of all passes equals `sigma_s^2`
    Halving,
}

/// Parameters of the domain transform recursive filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainTransformParams {
    /// Spatial standard deviation in pixels
    pub sigma_s: f32,
    /// Range standard deviation on the `[0, 1]` intensity scale
    pub sigma_r: f32,
    /// Number of horizontal + vertical pass pairs
    pub iterations: u32,
    /// Per-iteration sigma schedule
    pub schedule: SigmaSchedule,
}

impl Default for DomainTransformParams {
    fn default() -> Self {
        Self {
            sigma_s: 25.0,
            sigma_r: 0.1,
            iterations: 10,
            schedule: SigmaSchedule::Constant,
        }
    }
}

impl DomainTransformParams {
    /// Filter sigma of iteration `i` (0-based).
    pub fn sigma_at(&self, i: u32) -> f32 {
        match self.schedule {
            SigmaSchedule::Constant => self.sigma_s,
            SigmaSchedule::Halving => {
                let n = self.iterations as i32;
                let numerator = 3f64.sqrt() * 0.5f64.powi(i as i32 + 1);
                let denominator = (1.0 - 0.25f64.powi(n)).sqrt();
                (f64::from(self.sigma_s) * numerator / denominator) as f32
            }
        }
    }

    fn validate(&self) -> Result<(), DomainTransformError> {
        if !(self.sigma_s > 0.0 && self.sigma_r > 0.0) {
            return Err(DomainTransformError::InvalidSigma {
                sigma_s: self.sigma_s,
                sigma_r: self.sigma_r,
            });
        }
        if self.iterations == 0 {
            return Err(DomainTransformError::InvalidIterations);
        }
        Ok(())
    }
}

/// Edge-preserving smoothing with the recursive domain transform filter of
/// Gastal and Oliveira, "Domain Transform for Edge-Aware Image and Video Processing" (2011).
///
/// Each 1-D signal is warped so that the distance between neighbours grows with
/// their intensity difference, then blurred with a first order recursive filter
/// running forward and backward along rows and columns.
///
/// # Examples
///
/// ```rust
/// use imageops_papers::{DomainTransformFilter, DomainTransformParams, Image};
/// use image::Rgb;
///
/// let image: Image<Rgb<u8>> = Image::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 0]));
/// let smoothed = image.domain_transform_filter(&DomainTransformParams::default()).unwrap();
/// assert_eq!(smoothed.dimensions(), (16, 16));
/// ```
pub trait DomainTransformFilter {
    /// Filtered image type
    type Output;

    /// Applies the filter.
    ///
    /// # Errors
    ///
    /// * `DomainTransformError::EmptyImage` - If the image has no pixels
    /// * `DomainTransformError::InvalidSigma` - If a sigma is not positive
    /// * `DomainTransformError::InvalidIterations` - If `iterations` is zero
    fn domain_transform_filter(
        &self,
        params: &DomainTransformParams,
    ) -> Result<Self::Output, DomainTransformError>;
}

impl DomainTransformFilter for Image<Rgb<f32>> {
    type Output = Self;

    fn domain_transform_filter(
        &self,
        params: &DomainTransformParams,
    ) -> Result<Self::Output, DomainTransformError> {
        validate(self, params)?;
        Ok(filter(self, params))
    }
}

impl DomainTransformFilter for Image<Rgb<u8>> {
    type Output = Self;

    fn domain_transform_filter(
        &self,
        params: &DomainTransformParams,
    ) -> Result<Self::Output, DomainTransformError> {
        validate(self, params)?;
        Ok(rgb_from_unit_f32(&filter(&rgb_to_unit_f32(self), params)))
    }
}

impl DomainTransformFilter for Image<Luma<u8>> {
    type Output = Self;

    fn domain_transform_filter(
        &self,
        params: &DomainTransformParams,
    ) -> Result<Self::Output, DomainTransformError> {
        validate(self, params)?;
        Ok(luma_from_unit_f32(&filter(&luma_to_unit_f32(self), params)))
    }
}

fn validate<P: Pixel>(
    image: &Image<P>,
    params: &DomainTransformParams,
) -> Result<(), DomainTransformError> {
    let (width, height) = image.dimensions();
    validate_non_empty_image(width, height, "Domain transform")
        .map_err(|_| DomainTransformError::EmptyImage)?;
    params.validate()
}

/// Derivatives of the transformed domain between horizontal and vertical neighbours.
///
/// `horizontal` is `height x (width - 1)` and `vertical` is `(height - 1) x width`,
/// both row-major.
struct DomainDerivatives {
    horizontal: Vec<f32>,
    vertical: Vec<f32>,
}

impl DomainDerivatives {
    fn new(data: &[f32], width: usize, height: usize, channels: usize, ratio: f32) -> Self {
        let distance = |a: usize, b: usize| -> f32 {
            let sum: f32 = (0..channels)
                .map(|c| (data[a * channels + c] - data[b * channels + c]).abs())
                .sum();
            1.0 + ratio * sum
        };

        let mut horizontal = Vec::with_capacity(height * width.saturating_sub(1));
        for y in 0..height {
            for x in 0..width.saturating_sub(1) {
                let i = y * width + x;
                horizontal.push(distance(i + 1, i));
            }
        }

        let mut vertical = Vec::with_capacity(height.saturating_sub(1) * width);
        for y in 0..height.saturating_sub(1) {
            for x in 0..width {
                let i = y * width + x;
                vertical.push(distance(i + width, i));
            }
        }

        Self {
            horizontal,
            vertical,
        }
    }
}

fn filter<P>(image: &Image<P>, params: &DomainTransformParams) -> Image<P>
where
    P: Pixel<Subpixel = f32>,
{
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let channels = P::CHANNEL_COUNT as usize;

    let derivatives = DomainDerivatives::new(image, w, h, channels, params.sigma_s / params.sigma_r);

    let mut output = image.clone();
    for i in 0..params.iterations {
        let sigma_h = params.sigma_at(i);
        let a = (-(2f32.sqrt()) / sigma_h).exp();
        log::debug!("domain transform iteration {} (sigma_h = {sigma_h:.3})", i + 1);

        let data: &mut [f32] = &mut output;
        if w > 1 {
            let coefficients: Vec<f32> = derivatives.horizontal.iter().map(|d| a.powf(*d)).collect();
            filter_rows(data, &coefficients, w, channels);
        }
        if h > 1 {
            let coefficients: Vec<f32> = derivatives.vertical.iter().map(|d| a.powf(*d)).collect();
            filter_columns(data, &coefficients, w, h, channels);
        }
    }

    output
}

fn filter_rows(data: &mut [f32], coefficients: &[f32], width: usize, channels: usize) {
    let stride = width * channels;

    #[cfg(feature = "rayon")]
    data.par_chunks_mut(stride)
        .zip(coefficients.par_chunks(width - 1))
        .for_each(|(row, coef)| recursive_filter_row(row, coef, channels));

    #[cfg(not(feature = "rayon"))]
    data.chunks_mut(stride)
        .zip(coefficients.chunks(width - 1))
        .for_each(|(row, coef)| recursive_filter_row(row, coef, channels));
}

/// Causal then anti-causal first order recursive filter along one row.
fn recursive_filter_row(row: &mut [f32], coefficients: &[f32], channels: usize) {
    let width = coefficients.len() + 1;
    for x in 1..width {
        let p = coefficients[x - 1];
        for c in 0..channels {
            let i = x * channels + c;
            row[i] = (1.0 - p) * row[i] + p * row[i - channels];
        }
    }
    for x in (0..width - 1).rev() {
        let p = coefficients[x];
        for c in 0..channels {
            let i = x * channels + c;
            row[i] = p * row[i + channels] + (1.0 - p) * row[i];
        }
    }
}

/// Same recursion as `recursive_filter_row` along columns, advancing all
/// columns together one row at a time.
fn filter_columns(
    data: &mut [f32],
    coefficients: &[f32],
    width: usize,
    height: usize,
    channels: usize,
) {
    let stride = width * channels;

    for y in 1..height {
        let (before, after) = data.split_at_mut(y * stride);
        let previous = &before[(y - 1) * stride..];
        let current = &mut after[..stride];
        let coef = &coefficients[(y - 1) * width..y * width];
        for x in 0..width {
            let p = coef[x];
            for c in 0..channels {
                let i = x * channels + c;
                current[i] = (1.0 - p) * current[i] + p * previous[i];
            }
        }
    }

    for y in (0..height - 1).rev() {
        let (before, after) = data.split_at_mut((y + 1) * stride);
        let current = &mut before[y * stride..];
        let next = &after[..stride];
        let coef = &coefficients[y * width..(y + 1) * width];
        for x in 0..width {
            let p = coef[x];
            for c in 0..channels {
                let i = x * channels + c;
                current[i] = p * next[i] + (1.0 - p) * current[i];
            }
        }
    }
}
