use crate::error::PoissonError;
use crate::imageops_papers::pyramid::laplacian_3x3;
use crate::utils::{rgb_from_unit_f32, rgb_to_unit_f32, seeded_rng, validate_matching_dimensions};
use crate::Image;
use image::{GrayImage, Luma, Rgb};
use itertools::iproduct;
use rand::rngs::StdRng;
use rand::Rng;

/// Parameters of Poisson blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonParams {
    /// Largest deviation from the base image a rectangle may keep without being split
    pub tolerance: f32,
    /// Gauss-Seidel sweeps per rectangle
    pub sweeps: u32,
    /// Maximum quad-tree depth
    pub max_depth: u32,
    /// Radius of the window around unchanged pixels that keeps the base guidance
    pub mask_radius: u32,
    /// Seed of the region colors, `None` for OS entropy
    pub seed: Option<u64>,
}

impl Default for PoissonParams {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            sweeps: 20,
            max_depth: 8,
            mask_radius: 4,
            seed: None,
        }
    }
}

/// Result of Poisson blending.
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonOutput {
    /// Blended image
    pub image: Image<Rgb<u8>>,
    /// Leaf rectangles of the solver, each painted with a random gray level
    pub regions: GrayImage,
}

/// Gradient domain blending (Pérez, Gangnet and Blake, "Poisson Image Editing", 2003).
///
/// The guidance field is the Laplacian of the blend image, except around
/// pixels where base and blend agree, where the base Laplacian is kept.
/// The Poisson equation is solved with Gauss-Seidel sweeps on the interior of
/// the image with the base image as boundary condition and initial guess.
/// Rectangles that still move away from the base by more than `tolerance`
/// are split into quadrants and refined recursively.
pub trait PoissonBlend {
    /// Blends `blend` into `self`.
    ///
    /// # Errors
    ///
    /// * `PoissonError::DimensionMismatch` - If the images differ in size
    /// * `PoissonError::ImageTooSmall` - If the image is narrower or shorter than 3 pixels
    /// * `PoissonError::InvalidSweeps` - If `sweeps` is zero
    fn poisson_blend(
        &self,
        blend: &Image<Rgb<u8>>,
        params: &PoissonParams,
    ) -> Result<PoissonOutput, PoissonError>;
}

impl PoissonBlend for Image<Rgb<u8>> {
    fn poisson_blend(
        &self,
        blend: &Image<Rgb<u8>>,
        params: &PoissonParams,
    ) -> Result<PoissonOutput, PoissonError> {
        validate_matching_dimensions(self.dimensions(), blend.dimensions(), "Poisson blending")
            .map_err(|_| PoissonError::DimensionMismatch {
                expected: self.dimensions(),
                actual: blend.dimensions(),
            })?;
        let (width, height) = self.dimensions();
        if width < 3 || height < 3 {
            return Err(PoissonError::ImageTooSmall { width, height });
        }
        if params.sweeps == 0 {
            return Err(PoissonError::InvalidSweeps);
        }

        let base = rgb_to_unit_f32(self);
        let guidance = guidance_field(self, blend, &base, params.mask_radius);

        let mut solver = Solver {
            base: &base,
            guidance: &guidance,
            result: base.clone(),
            regions: GrayImage::new(width, height),
            rng: seeded_rng(params.seed),
            params,
            leaves: 0,
        };
        solver.solve(
            Rect {
                left: 1,
                top: 1,
                right: width - 1,
                bottom: height - 1,
            },
            0,
        );
        log::debug!("Poisson blending solved {} leaf regions", solver.leaves);

        Ok(PoissonOutput {
            image: rgb_from_unit_f32(&solver.result),
            regions: solver.regions,
        })
    }
}

fn guidance_field(
    base_u8: &Image<Rgb<u8>>,
    blend_u8: &Image<Rgb<u8>>,
    base: &Image<Rgb<f32>>,
    radius: u32,
) -> Image<Rgb<f32>> {
    let (width, height) = base.dimensions();
    let mut guidance = laplacian_3x3(&rgb_to_unit_f32(blend_u8));
    let base_laplacian = laplacian_3x3(base);

    for ((x, y, b), p) in base_u8.enumerate_pixels().zip(blend_u8.pixels()) {
        if b != p {
            continue;
        }
        iproduct!(
            y.saturating_sub(radius)..=(y + radius).min(height - 1),
            x.saturating_sub(radius)..=(x + radius).min(width - 1)
        )
        .for_each(|(yy, xx)| guidance.put_pixel(xx, yy, *base_laplacian.get_pixel(xx, yy)));
    }
    guidance
}

/// Half-open pixel rectangle `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Rect {
    fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    fn quadrants(&self) -> [Rect; 4] {
        let mid_x = (self.left + self.right) / 2;
        let mid_y = (self.top + self.bottom) / 2;
        [
            Rect {
                right: mid_x,
                bottom: mid_y,
                ..*self
            },
            Rect {
                top: mid_y,
                right: mid_x,
                ..*self
            },
            Rect {
                left: mid_x,
                bottom: mid_y,
                ..*self
            },
            Rect {
                left: mid_x,
                top: mid_y,
                ..*self
            },
        ]
    }
}

struct Solver<'a> {
    base: &'a Image<Rgb<f32>>,
    guidance: &'a Image<Rgb<f32>>,
    result: Image<Rgb<f32>>,
    regions: GrayImage,
    rng: StdRng,
    params: &'a PoissonParams,
    leaves: usize,
}

impl Solver<'_> {
    fn solve(&mut self, rect: Rect, depth: u32) {
        if rect.is_empty() {
            return;
        }

        for _ in 0..self.params.sweeps {
            for c in 0..3 {
                self.sweep(rect, c);
            }
        }

        if depth < self.params.max_depth && self.deviates(rect) {
            for quadrant in rect.quadrants() {
                self.solve(quadrant, depth + 1);
            }
            return;
        }

        self.leaves += 1;
        let level: u8 = self.rng.random_range(0..255);
        iproduct!(rect.top..rect.bottom, rect.left..rect.right)
            .for_each(|(y, x)| self.regions.put_pixel(x, y, Luma([level])));
    }

    /// One Gauss-Seidel sweep of channel `c` over `rect`.
    fn sweep(&mut self, rect: Rect, c: usize) {
        let (width, height) = self.result.dimensions();
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                let neighbors = [
                    (x > 0).then(|| (x - 1, y)),
                    (x + 1 < width).then(|| (x + 1, y)),
                    (y > 0).then(|| (x, y - 1)),
                    (y + 1 < height).then(|| (x, y + 1)),
                ];
                let (sum, count) = neighbors
                    .into_iter()
                    .flatten()
                    .fold((0.0f32, 0.0f32), |(sum, count), (nx, ny)| {
                        (sum + self.result.get_pixel(nx, ny)[c], count + 1.0)
                    });
                let value = (sum - self.guidance.get_pixel(x, y)[c]) / count;
                self.result.get_pixel_mut(x, y)[c] = value;
            }
        }
    }

    fn deviates(&self, rect: Rect) -> bool {
        (rect.top..rect.bottom).any(|y| {
            (rect.left..rect.right).any(|x| {
                let r = self.result.get_pixel(x, y);
                let b = self.base.get_pixel(x, y);
                (0..3).any(|c| (r[c] - b[c]).abs() > self.params.tolerance)
            })
        })
    }
}
