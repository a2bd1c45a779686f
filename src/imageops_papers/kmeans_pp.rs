use crate::error::KMeansError;
use crate::utils::seeded_rng;
use crate::Image;
use image::{ImageBuffer, Rgb};
use rand::rngs::StdRng;
use rand::Rng;

/// Parameters of k-means++ clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansParams {
    /// Number of clusters `k`
    pub clusters: usize,
    /// Upper bound on Lloyd iterations
    pub max_iterations: u32,
    /// Seed of the center sampling, `None` for OS entropy
    pub seed: Option<u64>,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            clusters: 8,
            max_iterations: 10,
            seed: None,
        }
    }
}

/// Result of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster centers, one `dim`-long vector per cluster
    pub centers: Vec<Vec<f32>>,
    /// Cluster index of every sample
    pub labels: Vec<usize>,
    /// Number of samples assigned to every cluster
    pub counts: Vec<usize>,
    /// Lloyd iterations actually performed
    pub iterations: u32,
}

/// k-means clustering seeded with k-means++ (Arthur and Vassilvitskii, 2007).
///
/// # Examples
///
/// ```rust
/// use imageops_papers::{KMeans, KMeansParams};
///
/// let samples = [0.0, 0.0, 0.1, 0.0, 10.0, 10.0, 10.1, 10.0];
/// let kmeans = KMeans::new(KMeansParams { clusters: 2, max_iterations: 10, seed: Some(1) }).unwrap();
/// let clustering = kmeans.fit(&samples, 2).unwrap();
/// assert_eq!(clustering.labels[0], clustering.labels[1]);
/// assert_ne!(clustering.labels[0], clustering.labels[2]);
/// ```
#[derive(Debug, Clone)]
pub struct KMeans {
    params: KMeansParams,
}

impl KMeans {
    /// Creates a clusterer.
    ///
    /// # Errors
    ///
    /// * `KMeansError::InvalidClusterCount` - If `clusters` is zero
    /// * `KMeansError::InvalidIterations` - If `max_iterations` is zero
    pub fn new(params: KMeansParams) -> Result<Self, KMeansError> {
        if params.clusters == 0 {
            return Err(KMeansError::InvalidClusterCount {
                clusters: 0,
                samples: 0,
            });
        }
        if params.max_iterations == 0 {
            return Err(KMeansError::InvalidIterations);
        }
        Ok(Self { params })
    }

    /// Clusters `samples`, a row-major buffer of `samples.len() / dim` points.
    ///
    /// # Errors
    ///
    /// * `KMeansError::EmptySamples` - If `samples` is empty
    /// * `KMeansError::InvalidDimension` - If `dim` is zero or does not divide `samples.len()`
    /// * `KMeansError::InvalidClusterCount` - If there are fewer samples than clusters
    pub fn fit(&self, samples: &[f32], dim: usize) -> Result<Clustering, KMeansError> {
        if samples.is_empty() {
            return Err(KMeansError::EmptySamples);
        }
        if dim == 0 || samples.len() % dim != 0 {
            return Err(KMeansError::InvalidDimension {
                dim,
                len: samples.len(),
            });
        }
        let count = samples.len() / dim;
        let k = self.params.clusters;
        if k > count {
            return Err(KMeansError::InvalidClusterCount {
                clusters: k,
                samples: count,
            });
        }

        let points: Vec<&[f32]> = samples.chunks_exact(dim).collect();
        let mut rng = seeded_rng(self.params.seed);
        let mut centers = seed_centers(&points, k, &mut rng);

        let mut labels = vec![usize::MAX; count];
        let mut counts = vec![0usize; k];
        let mut iterations = 0;

        while iterations < self.params.max_iterations {
            iterations += 1;

            let mut changed = false;
            counts.iter_mut().for_each(|c| *c = 0);
            for (label, point) in labels.iter_mut().zip(&points) {
                let nearest = nearest_center(&centers, point);
                changed |= *label != nearest;
                *label = nearest;
                counts[nearest] += 1;
            }

            if !changed {
                log::debug!("k-means converged after {iterations} iterations");
                break;
            }

            let mut sums = vec![vec![0.0f64; dim]; k];
            for (label, point) in labels.iter().zip(&points) {
                for (s, v) in sums[*label].iter_mut().zip(point.iter()) {
                    *s += f64::from(*v);
                }
            }
            for ((center, sum), n) in centers.iter_mut().zip(sums).zip(&counts) {
                // Empty clusters keep their previous center.
                if *n > 0 {
                    for (c, s) in center.iter_mut().zip(sum) {
                        *c = (s / *n as f64) as f32;
                    }
                }
            }
        }

        Ok(Clustering {
            centers,
            labels,
            counts,
            iterations,
        })
    }
}

#[inline]
fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum()
}

fn nearest_center(centers: &[Vec<f32>], point: &[f32]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (k, center) in centers.iter().enumerate() {
        let distance = squared_distance(center, point);
        if distance < best_distance {
            best_distance = distance;
            best = k;
        }
    }
    best
}

/// k-means++ seeding: the first center is uniform, each next one is drawn with
/// probability proportional to the squared distance to the nearest center so far.
fn seed_centers(points: &[&[f32]], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut centers = Vec::with_capacity(k);
    let first = rng.random_range(0..points.len());
    centers.push(points[first].to_vec());

    let mut nearest = vec![f64::INFINITY; points.len()];
    while centers.len() < k {
        let last = &centers[centers.len() - 1];
        for (d, point) in nearest.iter_mut().zip(points) {
            *d = d.min(squared_distance(last, point));
        }

        let total: f64 = nearest.iter().sum();
        let index = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut accum = 0.0;
            nearest
                .iter()
                .position(|d| {
                    accum += d;
                    accum > target
                })
                .unwrap_or(points.len() - 1)
        } else {
            first
        };
        centers.push(points[index].to_vec());
    }

    centers
}

/// Color quantization of an image with k-means++ over its RGB values.
pub trait QuantizeColors {
    /// Replaces every pixel with the center of its cluster, truncated to 8 bits.
    ///
    /// # Errors
    ///
    /// * `KMeansError::EmptySamples` - If the image has no pixels
    /// * `KMeansError::InvalidClusterCount` - If `clusters` is zero or exceeds the pixel count
    /// * `KMeansError::InvalidIterations` - If `max_iterations` is zero
    fn quantize_colors(
        &self,
        params: &KMeansParams,
    ) -> Result<(Image<Rgb<u8>>, Clustering), KMeansError>;
}

impl QuantizeColors for Image<Rgb<u8>> {
    fn quantize_colors(
        &self,
        params: &KMeansParams,
    ) -> Result<(Image<Rgb<u8>>, Clustering), KMeansError> {
        let samples: Vec<f32> = self.as_raw().iter().map(|&v| f32::from(v)).collect();
        let clustering = KMeans::new(*params)?.fit(&samples, 3)?;
        log::info!(
            "k-means: {} clusters after {} iterations",
            clustering.centers.len(),
            clustering.iterations
        );

        let (width, height) = self.dimensions();
        let output = ImageBuffer::from_fn(width, height, |x, y| {
            let center = &clustering.centers[clustering.labels[(y * width + x) as usize]];
            Rgb([center[0] as u8, center[1] as u8, center[2] as u8])
        });
        Ok((output, clustering))
    }
}
