use crate::error::ColorizationError;
use crate::imageops_papers::color_space::{rgb_to_ycrcb, ycrcb_to_rgb};
use crate::utils::{validate_matching_dimensions, validate_non_empty_image};
use crate::Image;
use image::{ImageBuffer, Luma, Rgb};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Offset added to the geodesic distance before inversion so that scribbled
/// pixels get a finite weight.
const DISTANCE_EPSILON: f64 = 1e-8;

/// Parameters of scribble based colorization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorizationParams {
    /// Maximum number of scribble colors blended at a single pixel
    pub max_colors: usize,
    /// Exponent `b` of the blending weight `1 / (d^b + eps)`
    pub exponent: f64,
}

impl Default for ColorizationParams {
    fn default() -> Self {
        Self {
            max_colors: 3,
            exponent: 3.0,
        }
    }
}

/// Colorization of a gray image from sparse color scribbles, following
/// Yatziv and Sapiro, "Fast image and video colorization using chrominance blending".
///
/// Every non-black pixel of the scribble image seeds its color. Colors spread
/// over the 4-connected pixel grid along geodesic paths whose length is the sum
/// of absolute gray differences. Each pixel keeps the nearest `max_colors`
/// labels and blends their chrominance with inverse distance weights; the
/// luminance always comes from the gray input.
pub trait Colorize {
    /// Colorizes `self` with the colors of `scribbles`.
    ///
    /// # Errors
    ///
    /// * `ColorizationError::EmptyImage` - If the gray image has no pixels
    /// * `ColorizationError::DimensionMismatch` - If the scribble image has a different size
    /// * `ColorizationError::NoScribbles` - If the scribble image is completely black
    fn colorize(
        &self,
        scribbles: &Image<Rgb<u8>>,
        params: &ColorizationParams,
    ) -> Result<Image<Rgb<u8>>, ColorizationError>;
}

impl Colorize for Image<Luma<u8>> {
    fn colorize(
        &self,
        scribbles: &Image<Rgb<u8>>,
        params: &ColorizationParams,
    ) -> Result<Image<Rgb<u8>>, ColorizationError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "Colorization")
            .map_err(|_| ColorizationError::EmptyImage)?;
        validate_matching_dimensions(self.dimensions(), scribbles.dimensions(), "Colorization")
            .map_err(|_| ColorizationError::DimensionMismatch {
                expected: self.dimensions(),
                actual: scribbles.dimensions(),
            })?;
        if params.max_colors == 0 {
            return Err(ColorizationError::InvalidMaxColors {
                max_colors: params.max_colors,
            });
        }
        if !(params.exponent.is_finite() && params.exponent > 0.0) {
            return Err(ColorizationError::InvalidExponent {
                exponent: params.exponent,
            });
        }

        let propagation = propagate_scribbles(self, scribbles, params.max_colors)?;
        log::debug!(
            "colorization: {} distinct scribble colors",
            propagation.palette.len()
        );

        Ok(ImageBuffer::from_fn(width, height, |x, y| {
            let index = (y * width + x) as usize;
            let gray = f32::from(self.get_pixel(x, y)[0]);
            let blended = propagation.blend(index, params.exponent).unwrap_or([gray; 3]);
            let [_, cr, cb] = rgb_to_ycrcb(blended);
            ycrcb_to_rgb([gray, cr, cb])
        }))
    }
}

/// Result of the geodesic propagation: for each pixel the color labels that
/// reached it with their distances.
struct Propagation {
    palette: Vec<Rgb<u8>>,
    labels: Vec<Vec<(usize, u32)>>,
}

impl Propagation {
    fn blend(&self, index: usize, exponent: f64) -> Option<[f32; 3]> {
        let labels = &self.labels[index];
        if labels.is_empty() {
            return None;
        }

        let mut weight_sum = 0.0f64;
        let mut color_sum = [0.0f64; 3];
        for &(color, distance) in labels {
            let weight = 1.0 / (f64::from(distance).powf(exponent) + DISTANCE_EPSILON);
            let Rgb(rgb) = self.palette[color];
            for c in 0..3 {
                color_sum[c] += weight * f64::from(rgb[c]);
            }
            weight_sum += weight;
        }
        Some(color_sum.map(|c| (c / weight_sum) as f32))
    }
}

fn propagate_scribbles(
    gray: &Image<Luma<u8>>,
    scribbles: &Image<Rgb<u8>>,
    max_colors: usize,
) -> Result<Propagation, ColorizationError> {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    let luma: &[u8] = gray;

    let mut palette = Vec::new();
    let mut palette_index: HashMap<[u8; 3], usize> = HashMap::new();
    let mut labels: Vec<Vec<(usize, u32)>> = vec![Vec::new(); w * h];
    let mut queue = BinaryHeap::new();

    for (x, y, pixel) in scribbles.enumerate_pixels() {
        if pixel.0 == [0, 0, 0] {
            continue;
        }
        let color = *palette_index.entry(pixel.0).or_insert_with(|| {
            palette.push(*pixel);
            palette.len() - 1
        });
        let index = y as usize * w + x as usize;
        labels[index].push((color, 0));
        queue.push(Reverse((0u32, color, index)));
    }

    if palette.is_empty() {
        return Err(ColorizationError::NoScribbles);
    }

    while let Some(Reverse((distance, color, index))) = queue.pop() {
        let stale = labels[index]
            .iter()
            .any(|&(c, d)| c == color && d < distance);
        if stale {
            continue;
        }

        let (x, y) = (index % w, index / w);
        let neighbors = [
            (x > 0).then(|| index - 1),
            (y > 0).then(|| index - w),
            (y + 1 < h).then(|| index + w),
            (x + 1 < w).then(|| index + 1),
        ];
        for next in neighbors.into_iter().flatten() {
            let step = u32::from(luma[index].abs_diff(luma[next]));
            let next_distance = distance + step;
            let entries = &mut labels[next];
            match entries.iter_mut().find(|(c, _)| *c == color) {
                Some(entry) => {
                    if entry.1 > next_distance {
                        entry.1 = next_distance;
                        queue.push(Reverse((next_distance, color, next)));
                    }
                }
                None => {
                    if entries.len() < max_colors {
                        entries.push((color, next_distance));
                        queue.push(Reverse((next_distance, color, next)));
                    }
                }
            }
        }
    }

    Ok(Propagation { palette, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_gray_ramp;

    fn scribble_ends(width: u32, height: u32, left: Rgb<u8>, right: Rgb<u8>) -> Image<Rgb<u8>> {
        let mut scribbles: Image<Rgb<u8>> = Image::new(width, height);
        for y in 0..height {
            scribbles.put_pixel(0, y, left);
            scribbles.put_pixel(width - 1, y, right);
        }
        scribbles
    }

    #[test]
    fn colorize_spreads_each_scribble_to_its_side() {
        let gray = create_gray_ramp(10, 4);
        let scribbles = scribble_ends(10, 4, Rgb([255, 0, 0]), Rgb([0, 0, 255]));

        let result = gray.colorize(&scribbles, &ColorizationParams::default()).unwrap();

        let left = result.get_pixel(1, 2);
        let right = result.get_pixel(8, 2);
        assert!(left[0] > left[2]);
        assert!(right[2] > right[0]);
    }

    #[test]
    fn colorize_keeps_gray_luminance() {
        let gray = create_gray_ramp(8, 3);
        let scribbles = scribble_ends(8, 3, Rgb([30, 160, 60]), Rgb([30, 160, 60]));

        let result = gray.colorize(&scribbles, &ColorizationParams::default()).unwrap();

        for (x, y, pixel) in result.enumerate_pixels() {
            let Rgb([r, g, b]) = *pixel;
            let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
            let expected = f32::from(gray.get_pixel(x, y)[0]);
            // Saturated channels can only move luma toward the clipped side.
            if (1..=254).contains(&r) && (1..=254).contains(&g) && (1..=254).contains(&b) {
                assert!((luma - expected).abs() <= 2.0, "({x}, {y}): {luma} vs {expected}");
            }
        }
    }

    #[test]
    fn colorize_blocks_color_at_strong_edges() {
        // Dark left half, bright right half: the edge costs 200 per crossing.
        let gray: Image<Luma<u8>> =
            Image::from_fn(10, 1, |x, _| Luma([if x < 5 { 40 } else { 240 }]));
        let scribbles = scribble_ends(10, 1, Rgb([255, 0, 0]), Rgb([0, 0, 255]));

        let result = gray
            .colorize(
                &scribbles,
                &ColorizationParams {
                    max_colors: 2,
                    exponent: 3.0,
                },
            )
            .unwrap();

        let near_edge_left = result.get_pixel(4, 0);
        assert!(near_edge_left[0] > near_edge_left[2]);
    }

    #[test]
    fn colorize_without_scribbles_returns_error() {
        let gray = create_gray_ramp(4, 4);
        let scribbles: Image<Rgb<u8>> = Image::new(4, 4);
        assert_eq!(
            gray.colorize(&scribbles, &ColorizationParams::default()),
            Err(ColorizationError::NoScribbles)
        );
    }

    #[test]
    fn colorize_with_mismatched_scribbles_returns_error() {
        let gray = create_gray_ramp(4, 4);
        let scribbles: Image<Rgb<u8>> = Image::new(4, 5);
        assert!(matches!(
            gray.colorize(&scribbles, &ColorizationParams::default()),
            Err(ColorizationError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn propagation_limits_labels_per_pixel() {
        let gray: Image<Luma<u8>> = Image::from_pixel(3, 3, Luma([10]));
        let mut scribbles: Image<Rgb<u8>> = Image::new(3, 3);
        scribbles.put_pixel(0, 0, Rgb([255, 0, 0]));
        scribbles.put_pixel(2, 0, Rgb([0, 255, 0]));
        scribbles.put_pixel(0, 2, Rgb([0, 0, 255]));

        let propagation = propagate_scribbles(&gray, &scribbles, 2).unwrap();
        assert_eq!(propagation.palette.len(), 3);
        assert!(propagation.labels.iter().all(|l| !l.is_empty() && l.len() <= 2));
    }
}
