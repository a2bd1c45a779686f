//! Separable filtering and Gaussian pyramid primitives for floating point images.
//!
//! All filters treat borders with reflect-101 extension (`dcb|abcd|cba`),
//! which keeps the kernels normalised up to the image edge.

use crate::Image;
use image::{ImageBuffer, Pixel};

/// 5-tap binomial kernel used by `pyr_down` and `pyr_up`.
const PYRAMID_KERNEL: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

/// Maps an out-of-range index into `0..len` by reflect-101.
#[inline]
pub(crate) fn reflect101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    let period = 2 * (n - 1);
    let i = index.rem_euclid(period);
    (if i >= n { period - i } else { i }) as usize
}

/// Kernel radius beyond which a Gaussian is truncated.
const MAX_KERNEL_RADIUS: f32 = 4096.0;

/// Builds a normalised Gaussian kernel of radius `ceil(3 * sigma)`, capped
/// at 4096 taps each side.
///
/// A sigma that is not finite and positive, or too small for `2 * sigma^2`
/// to be representable, yields the identity kernel `[1.0]`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    let denominator = 2.0 * sigma * sigma;
    if !(sigma.is_finite() && denominator.is_normal()) {
        return vec![1.0];
    }
    let radius = (3.0 * sigma).ceil().clamp(1.0, MAX_KERNEL_RADIUS) as isize;
    let kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i * i) as f32 / denominator).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.into_iter().map(|k| k / sum).collect()
}

/// Correlates every channel of `image` with `kernel_x` along rows, then with
/// `kernel_y` along columns. Kernels must have odd length.
pub fn convolve_separable<P>(image: &Image<P>, kernel_x: &[f32], kernel_y: &[f32]) -> Image<P>
where
    P: Pixel<Subpixel = f32>,
{
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let channels = P::CHANNEL_COUNT as usize;
    let stride = w * channels;
    let src: &[f32] = image;

    let rx = (kernel_x.len() / 2) as isize;
    let mut rows = vec![0.0f32; src.len()];
    for (src_row, dst_row) in src.chunks_exact(stride.max(1)).zip(rows.chunks_exact_mut(stride.max(1))) {
        for x in 0..w {
            let out = &mut dst_row[x * channels..(x + 1) * channels];
            for (k, weight) in kernel_x.iter().enumerate() {
                let sx = reflect101(x as isize + k as isize - rx, w);
                let input = &src_row[sx * channels..(sx + 1) * channels];
                for (o, i) in out.iter_mut().zip(input) {
                    *o += weight * i;
                }
            }
        }
    }

    let ry = (kernel_y.len() / 2) as isize;
    let mut output: Image<P> = ImageBuffer::new(width, height);
    let dst: &mut [f32] = &mut output;
    for y in 0..h {
        let dst_row = &mut dst[y * stride..(y + 1) * stride];
        for (k, weight) in kernel_y.iter().enumerate() {
            let sy = reflect101(y as isize + k as isize - ry, h);
            let src_row = &rows[sy * stride..(sy + 1) * stride];
            for (o, i) in dst_row.iter_mut().zip(src_row) {
                *o += weight * i;
            }
        }
    }

    output
}

/// Isotropic Gaussian blur.
pub fn gaussian_blur<P>(image: &Image<P>, sigma: f32) -> Image<P>
where
    P: Pixel<Subpixel = f32>,
{
    let kernel = gaussian_kernel_1d(sigma);
    convolve_separable(image, &kernel, &kernel)
}

/// Blurs with the binomial kernel and keeps every other sample.
///
/// The result is `ceil(w / 2) x ceil(h / 2)`.
pub fn pyr_down<P>(image: &Image<P>) -> Image<P>
where
    P: Pixel<Subpixel = f32>,
{
    let blurred = convolve_separable(image, &PYRAMID_KERNEL, &PYRAMID_KERNEL);
    let (width, height) = image.dimensions();
    ImageBuffer::from_fn(width.div_ceil(2), height.div_ceil(2), |x, y| {
        *blurred.get_pixel(2 * x, 2 * y)
    })
}

/// Upsamples to `width x height` by zero insertion followed by the binomial
/// kernel scaled by four.
pub fn pyr_up<P>(image: &Image<P>, width: u32, height: u32) -> Image<P>
where
    P: Pixel<Subpixel = f32>,
{
    let mut upsampled: Image<P> = ImageBuffer::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let (ux, uy) = (2 * x, 2 * y);
        if ux < width && uy < height {
            upsampled.put_pixel(ux, uy, *pixel);
        }
    }
    // A single sample axis has no inserted zeros to fill.
    let kernel = PYRAMID_KERNEL.map(|k| 2.0 * k);
    let kernel_x: &[f32] = if width > 1 { &kernel } else { &[1.0] };
    let kernel_y: &[f32] = if height > 1 { &kernel } else { &[1.0] };
    convolve_separable(&upsampled, kernel_x, kernel_y)
}

/// 4-neighbour discrete Laplacian `up + down + left + right - 4 * center`.
pub fn laplacian_3x3<P>(image: &Image<P>) -> Image<P>
where
    P: Pixel<Subpixel = f32>,
{
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    ImageBuffer::from_fn(width, height, |x, y| {
        let (xi, yi) = (x as isize, y as isize);
        let left = image.get_pixel(reflect101(xi - 1, w) as u32, y);
        let right = image.get_pixel(reflect101(xi + 1, w) as u32, y);
        let up = image.get_pixel(x, reflect101(yi - 1, h) as u32);
        let down = image.get_pixel(x, reflect101(yi + 1, h) as u32);
        let center = image.get_pixel(x, y);

        let mut out = *center;
        for (c, value) in out.channels_mut().iter_mut().enumerate() {
            *value = left.channels()[c] + right.channels()[c] + up.channels()[c]
                + down.channels()[c]
                - 4.0 * center.channels()[c];
        }
        out
    })
}
