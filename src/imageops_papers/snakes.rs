use crate::error::SnakesError;
use crate::imageops_papers::color_space::luma;
use crate::imageops_papers::pyramid::{convolve_separable, gaussian_blur};
use crate::utils::validate_non_empty_image;
use crate::Image;
use image::{ImageBuffer, Luma, Rgb};
use imageproc::drawing::draw_line_segment_mut;
use itertools::iproduct;
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

/// A point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    /// Column coordinate
    pub x: f64,
    /// Row coordinate
    pub y: f64,
}

impl Point2 {
    /// Creates a point from its column and row.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared Euclidean length.
    pub fn norm_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

impl Add for Point2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// A closed contour.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    points: Vec<Point2>,
}

impl Snake {
    /// Default number of points of a circular snake.
    pub const DEFAULT_POINTS: usize = 80;

    /// Samples `count` points evenly on a circle, starting at angle zero.
    ///
    /// # Errors
    ///
    /// * `SnakesError::TooFewPoints` - If `count` is below 3
    /// * `SnakesError::InvalidRadius` - If `radius` is negative or not finite
    pub fn circle(center: Point2, radius: f64, count: usize) -> Result<Self, SnakesError> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(SnakesError::InvalidRadius { radius });
        }
        let points = (0..count)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / count as f64;
                center + Point2::new(theta.cos(), theta.sin()) * radius
            })
            .collect();
        Self::from_points(points)
    }

    /// Builds a snake from its points in contour order.
    ///
    /// # Errors
    ///
    /// * `SnakesError::TooFewPoints` - If there are fewer than 3 points
    pub fn from_points(points: Vec<Point2>) -> Result<Self, SnakesError> {
        if points.len() < 3 {
            return Err(SnakesError::TooFewPoints {
                count: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Contour vertices in order; the last connects back to the first.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed snake, which has at least three points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean distance between consecutive points, closing the loop.
    pub fn mean_spacing(&self) -> f64 {
        mean_spacing(&self.points)
    }
}

/// Parameters of the greedy snake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnakeParams {
    /// Weight of the continuity energy
    pub alpha: f64,
    /// Weight of the curvature energy
    pub beta: f64,
    /// Weight of the image energy
    pub gamma: f64,
    /// Side of the square search window around each point
    pub window: u32,
    /// Upper bound on the number of passes over the contour
    pub max_iterations: u32,
    /// The contour is considered stable once fewer points than this move in a pass
    pub threshold: usize,
}

impl Default for SnakeParams {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            beta: 0.8,
            gamma: 0.5,
            window: 12,
            max_iterations: 1000,
            threshold: 5,
        }
    }
}

/// Result of a snake evolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SnakeOutcome {
    /// Final contour
    pub snake: Snake,
    /// Number of passes performed
    pub iterations: u32,
}

/// Active contours with the greedy algorithm of Williams and Shah (1992)
/// for the energy of Kass, Witkin and Terzopoulos, "Snakes" (1988).
///
/// Each point in turn moves to the pixel of its search window minimising
/// a weighted sum of continuity, curvature and image energy. Every energy
/// term is min/max normalised within the window before weighting.
pub trait ActiveContour {
    /// Evolves `snake` on `self` until it stabilises.
    ///
    /// # Errors
    ///
    /// * `SnakesError::EmptyImage` - If the image has no pixels
    /// * `SnakesError::InvalidWindow` - If the search window is zero
    fn evolve_snake(&self, snake: &Snake, params: &SnakeParams) -> Result<SnakeOutcome, SnakesError>;
}

impl ActiveContour for Image<Rgb<u8>> {
    fn evolve_snake(&self, snake: &Snake, params: &SnakeParams) -> Result<SnakeOutcome, SnakesError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "Snakes").map_err(|_| SnakesError::EmptyImage)?;
        if params.window == 0 {
            return Err(SnakesError::InvalidWindow {
                window: params.window,
            });
        }

        let edges = edge_strength(self);
        let mut points = snake.points.clone();
        let mut iterations = 0;

        while iterations < params.max_iterations {
            iterations += 1;
            let moved = greedy_pass(&mut points, &edges, params);
            log::debug!("snake pass {iterations}: {moved} points moved");
            if moved < params.threshold {
                break;
            }
        }
        log::info!("snake settled after {iterations} iterations");

        Ok(SnakeOutcome {
            snake: Snake { points },
            iterations,
        })
    }
}

/// Squared Sobel gradient magnitude of the Gaussian smoothed gray image.
pub fn edge_strength(image: &Image<Rgb<u8>>) -> Image<Luma<f32>> {
    let gray: Image<Luma<f32>> = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let Rgb(rgb) = *image.get_pixel(x, y);
        Luma([luma(rgb.map(f32::from))])
    });
    let smoothed = gaussian_blur(&gray, 1.0);

    let derivative = [-1.0, 0.0, 1.0];
    let smoothing = [1.0, 2.0, 1.0];
    let gx = convolve_separable(&smoothed, &derivative, &smoothing);
    let gy = convolve_separable(&smoothed, &smoothing, &derivative);

    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let (dx, dy) = (gx.get_pixel(x, y)[0], gy.get_pixel(x, y)[0]);
        Luma([dx * dx + dy * dy])
    })
}

fn mean_spacing(points: &[Point2]) -> f64 {
    let n = points.len();
    let total: f64 = (0..n)
        .map(|i| (points[i] - points[(i + 1) % n]).norm())
        .sum();
    total / n as f64
}

/// Min/max normaliser of one energy term over a window.
#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |r, v| Self {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        )
    }

    fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (value - self.min) / span
        } else {
            0.0
        }
    }
}

struct Candidate {
    x: u32,
    y: u32,
    continuity: f64,
    curvature: f64,
    image: f64,
}

/// Moves every point once, in order, and returns how many moved.
fn greedy_pass(points: &mut [Point2], edges: &Image<Luma<f32>>, params: &SnakeParams) -> usize {
    let (width, height) = edges.dimensions();
    let n = points.len();
    let half = i64::from(params.window / 2);
    let spacing = mean_spacing(points);
    let mut moved = 0;

    for i in 0..n {
        let current = points[i];
        let previous = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        let (cx, cy) = (current.x as i64, current.y as i64);

        let top = (cy - half).max(0);
        let bottom = (cy + half).min(i64::from(height) - 1);
        let left = (cx - half).max(0);
        let right = (cx + half).min(i64::from(width) - 1);

        let candidates: Vec<Candidate> = iproduct!(top..=bottom, left..=right)
            .map(|(y, x)| {
                let (x, y) = (x as u32, y as u32);
                let c = Point2::new(f64::from(x), f64::from(y));
                Candidate {
                    x,
                    y,
                    continuity: (spacing - (c - next).norm()).abs(),
                    curvature: (previous - c * 2.0 + next).norm_squared(),
                    image: f64::from(edges.get_pixel(x, y)[0]),
                }
            })
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let continuity = Range::of(candidates.iter().map(|c| c.continuity));
        let curvature = Range::of(candidates.iter().map(|c| c.curvature));
        let image = Range::of(candidates.iter().map(|c| c.image));

        let mut best: Option<(f64, u32, u32)> = None;
        for candidate in &candidates {
            let energy = params.alpha * continuity.normalize(candidate.continuity)
                + params.beta * curvature.normalize(candidate.curvature)
                - params.gamma * image.normalize(candidate.image);
            if best.is_none_or(|(e, _, _)| energy < e) {
                best = Some((energy, candidate.x, candidate.y));
            }
        }

        if let Some((_, x, y)) = best {
            if i64::from(x) != cx || i64::from(y) != cy {
                points[i] = Point2::new(f64::from(x), f64::from(y));
                moved += 1;
            }
        }
    }

    moved
}

/// Draws the closed contour on a copy of `image`.
pub fn draw_snake(image: &Image<Rgb<u8>>, snake: &Snake, color: Rgb<u8>) -> Image<Rgb<u8>> {
    let mut canvas = image.clone();
    let n = snake.points.len();
    for i in 0..n {
        let (a, b) = (snake.points[i], snake.points[(i + 1) % n]);
        draw_line_segment_mut(
            &mut canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(size: u32, center: Point2, radius: f64) -> Image<Rgb<u8>> {
        Image::from_fn(size, size, |x, y| {
            let d = (Point2::new(f64::from(x), f64::from(y)) - center).norm();
            if d <= radius {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn circle_samples_points_on_radius() {
        let center = Point2::new(10.0, 20.0);
        let snake = Snake::circle(center, 5.0, 8).unwrap();
        assert_eq!(snake.len(), 8);
        assert!(snake.points().iter().all(|p| ((*p - center).norm() - 5.0).abs() < 1e-9));
        assert_eq!(snake.points()[0], Point2::new(15.0, 20.0));
    }

    #[test]
    fn mean_spacing_of_square_is_side_length() {
        let square = Snake::from_points(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ])
        .unwrap();
        assert!((square.mean_spacing() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn snake_locks_onto_disc_boundary() {
        let center = Point2::new(32.0, 32.0);
        let image = disc(64, center, 20.0);
        let snake = Snake::circle(center, 24.0, 40).unwrap();
        let params = SnakeParams {
            alpha: 0.1,
            beta: 0.1,
            gamma: 2.0,
            ..Default::default()
        };

        let outcome = image.evolve_snake(&snake, &params).unwrap();
        for p in outcome.snake.points() {
            let r = (*p - center).norm();
            assert!((r - 20.0).abs() <= 2.5, "point {p:?} at radius {r}");
        }
    }

    #[test]
    fn evolution_on_flat_image_terminates_inside_bounds() {
        let image: Image<Rgb<u8>> = Image::from_pixel(40, 30, Rgb([90, 90, 90]));
        let snake = Snake::circle(Point2::new(20.0, 15.0), 10.0, Snake::DEFAULT_POINTS).unwrap();
        let params = SnakeParams {
            max_iterations: 50,
            ..Default::default()
        };

        let outcome = image.evolve_snake(&snake, &params).unwrap();
        assert!(outcome.iterations >= 1 && outcome.iterations <= 50);
        assert_eq!(outcome.snake.len(), Snake::DEFAULT_POINTS);
        assert!(outcome
            .snake
            .points()
            .iter()
            .all(|p| p.x >= 0.0 && p.x < 40.0 && p.y >= 0.0 && p.y < 30.0));
    }

    #[test]
    fn edge_strength_peaks_at_step() {
        let image = crate::test_utils::create_step_image(10, 5, Rgb([0, 0, 0]), Rgb([200, 200, 200]));
        let edges = edge_strength(&image);
        let at_edge = edges.get_pixel(5, 2)[0];
        assert!(at_edge > edges.get_pixel(1, 2)[0]);
        assert!(at_edge > edges.get_pixel(9, 2)[0]);
    }

    #[test]
    fn draw_snake_colors_the_contour() {
        let image: Image<Rgb<u8>> = Image::new(10, 10);
        let snake = Snake::from_points(vec![
            Point2::new(1.0, 1.0),
            Point2::new(8.0, 1.0),
            Point2::new(8.0, 8.0),
        ])
        .unwrap();
        let drawn = draw_snake(&image, &snake, Rgb([0, 255, 0]));
        assert_eq!(drawn.get_pixel(4, 1), &Rgb([0, 255, 0]));
        assert_eq!(drawn.get_pixel(8, 5), &Rgb([0, 255, 0]));
        assert_eq!(drawn.get_pixel(1, 8), &Rgb([0, 0, 0]));
    }

    #[test]
    fn invalid_input_returns_error() {
        assert_eq!(
            Snake::from_points(vec![Point2::default(); 2]),
            Err(SnakesError::TooFewPoints { count: 2 })
        );
        assert!(matches!(
            Snake::circle(Point2::default(), -1.0, 10),
            Err(SnakesError::InvalidRadius { .. })
        ));

        let snake = Snake::circle(Point2::new(2.0, 2.0), 1.0, 4).unwrap();
        let empty: Image<Rgb<u8>> = Image::new(0, 0);
        assert_eq!(
            empty.evolve_snake(&snake, &SnakeParams::default()),
            Err(SnakesError::EmptyImage)
        );

        let image: Image<Rgb<u8>> = Image::new(4, 4);
        let params = SnakeParams {
            window: 0,
            ..Default::default()
        };
        assert_eq!(
            image.evolve_snake(&snake, &params),
            Err(SnakesError::InvalidWindow { window: 0 })
        );
    }
}
