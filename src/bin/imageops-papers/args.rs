//! Command-line argument definitions for imageops-papers.

use clap::{Args, Parser, Subcommand, ValueEnum};
use imageops_papers::{
    ColorizationParams, DomainTransformParams, EnergyFunction, KMeansParams, LocalLaplacianParams,
    PoissonParams, SeamCarvingParams, SeamMode, SeamOrientation, SigmaSchedule, SnakeParams,
};
use std::path::PathBuf;

/// Run classic image processing algorithms on image files.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Impose the color statistics of a reference image (Reinhard et al.).
    ColorTransfer(ColorTransferArgs),
    /// Colorize a gray image from color scribbles (Yatziv and Sapiro).
    Colorize(ColorizeArgs),
    /// Edge-preserving smoothing with the recursive domain transform filter.
    DomainTransform(DomainTransformArgs),
    /// Quantize colors with k-means++ and print the cluster centers.
    Kmeans(KMeansArgs),
    /// Detail manipulation with the local Laplacian filter.
    LocalLaplacian(LocalLaplacianArgs),
    /// Gradient domain blending of two images of the same size.
    Poisson(PoissonArgs),
    /// Content-aware resizing by seam removal or insertion.
    SeamCarve(SeamCarveArgs),
    /// Fit a closed active contour starting from a circle.
    Snakes(SnakesArgs),
}

#[derive(Debug, Args)]
pub struct ColorTransferArgs {
    /// Image to recolor.
    pub target: PathBuf,

    /// Image providing the color statistics.
    pub reference: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ColorizeArgs {
    /// Gray input image (color images are converted to gray).
    pub gray: PathBuf,

    /// Scribble image of the same size; non-black pixels are color seeds.
    pub scribbles: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Maximum number of scribble colors blended per pixel.
    #[arg(long, default_value_t = 3)]
    pub max_colors: usize,

    /// Exponent of the inverse distance blending weight.
    #[arg(long, default_value_t = 3.0)]
    pub exponent: f64,
}

impl From<&ColorizeArgs> for ColorizationParams {
    fn from(args: &ColorizeArgs) -> Self {
        Self {
            max_colors: args.max_colors,
            exponent: args.exponent,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ScheduleArg {
    /// Same sigma for every iteration.
    Constant,
    /// Sigma halves every iteration, preserving the total variance.
    Halving,
}

impl From<ScheduleArg> for SigmaSchedule {
    fn from(value: ScheduleArg) -> Self {
        match value {
            ScheduleArg::Constant => SigmaSchedule::Constant,
            ScheduleArg::Halving => SigmaSchedule::Halving,
        }
    }
}

#[derive(Debug, Args)]
pub struct DomainTransformArgs {
    /// Input image path.
    pub input: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Spatial standard deviation (pixels).
    #[arg(long, default_value_t = 25.0)]
    pub sigma_s: f32,

    /// Range standard deviation (intensities in 0..1).
    #[arg(long, default_value_t = 0.1)]
    pub sigma_r: f32,

    /// Number of filtering iterations.
    #[arg(long, default_value_t = 10)]
    pub iterations: u32,

    /// Per-iteration sigma schedule.
    #[arg(long, value_enum, default_value_t = ScheduleArg::Constant)]
    pub schedule: ScheduleArg,
}

impl From<&DomainTransformArgs> for DomainTransformParams {
    fn from(args: &DomainTransformArgs) -> Self {
        Self {
            sigma_s: args.sigma_s,
            sigma_r: args.sigma_r,
            iterations: args.iterations,
            schedule: args.schedule.into(),
        }
    }
}

#[derive(Debug, Args)]
pub struct KMeansArgs {
    /// Input image path.
    pub input: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of clusters.
    #[arg(short = 'k', long, default_value_t = 8)]
    pub clusters: usize,

    /// Maximum number of Lloyd iterations.
    #[arg(long, default_value_t = 10)]
    pub max_iterations: u32,

    /// Random seed for reproducible center sampling.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<&KMeansArgs> for KMeansParams {
    fn from(args: &KMeansArgs) -> Self {
        Self {
            clusters: args.clusters,
            max_iterations: args.max_iterations,
            seed: args.seed,
        }
    }
}

#[derive(Debug, Args)]
pub struct LocalLaplacianArgs {
    /// Input image path.
    pub input: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Detail/edge threshold (intensities in 0..1).
    #[arg(long, default_value_t = 0.2)]
    pub sigma_r: f32,

    /// Number of pyramid levels.
    #[arg(long, default_value_t = 3)]
    pub levels: usize,

    /// Detail exponent (< 1 enhances, > 1 smooths).
    #[arg(long, default_value_t = 4.0)]
    pub alpha: f32,

    /// Blend between the detail curve and the identity.
    #[arg(long, default_value_t = 0.8)]
    pub tau: f32,

    /// Edge scale (< 1 compresses tone).
    #[arg(long, default_value_t = 1.0)]
    pub beta: f32,

    /// Gaussian blur before each downsampling (0 disables).
    #[arg(long, default_value_t = 2.0)]
    pub presmooth_sigma: f32,
}

impl From<&LocalLaplacianArgs> for LocalLaplacianParams {
    fn from(args: &LocalLaplacianArgs) -> Self {
        Self {
            sigma_r: args.sigma_r,
            levels: args.levels,
            alpha: args.alpha,
            tau: args.tau,
            beta: args.beta,
            presmooth_sigma: args.presmooth_sigma,
        }
    }
}

#[derive(Debug, Args)]
pub struct PoissonArgs {
    /// Base image path.
    pub base: PathBuf,

    /// Blend image path (same size as the base).
    pub blend: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Optional path for the solver region map.
    #[arg(long)]
    pub regions: Option<PathBuf>,

    /// Deviation from the base that triggers a quadrant split.
    #[arg(long, default_value_t = 0.05)]
    pub tolerance: f32,

    /// Gauss-Seidel sweeps per region.
    #[arg(long, default_value_t = 20)]
    pub sweeps: u32,

    /// Maximum quad-tree depth.
    #[arg(long, default_value_t = 8)]
    pub max_depth: u32,

    /// Radius around unchanged pixels that keeps the base gradients.
    #[arg(long, default_value_t = 4)]
    pub mask_radius: u32,

    /// Random seed for the region map colors.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<&PoissonArgs> for PoissonParams {
    fn from(args: &PoissonArgs) -> Self {
        Self {
            tolerance: args.tolerance,
            sweeps: args.sweeps,
            max_depth: args.max_depth,
            mask_radius: args.mask_radius,
            seed: args.seed,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum OrientationArg {
    /// Vertical seams, changes the width.
    Vertical,
    /// Horizontal seams, changes the height.
    Horizontal,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ModeArg {
    /// Remove seams.
    Remove,
    /// Duplicate seams.
    Insert,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum EnergyArg {
    /// Absolute 3x3 Laplacian.
    Laplacian,
    /// Sobel gradient magnitude.
    Sobel,
}

#[derive(Debug, Args)]
pub struct SeamCarveArgs {
    /// Input image path.
    pub input: PathBuf,

    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of seams.
    #[arg(short = 'n', long)]
    pub seams: u32,

    /// Seam direction.
    #[arg(long, value_enum, default_value_t = OrientationArg::Vertical)]
    pub orientation: OrientationArg,

    /// Remove or insert seams.
    #[arg(long, value_enum, default_value_t = ModeArg::Remove)]
    pub mode: ModeArg,

    /// Energy function.
    #[arg(long, value_enum, default_value_t = EnergyArg::Laplacian)]
    pub energy: EnergyArg,
}

impl From<&SeamCarveArgs> for SeamCarvingParams {
    fn from(args: &SeamCarveArgs) -> Self {
        Self {
            seams: args.seams,
            orientation: match args.orientation {
                OrientationArg::Vertical => SeamOrientation::Vertical,
                OrientationArg::Horizontal => SeamOrientation::Horizontal,
            },
            mode: match args.mode {
                ModeArg::Remove => SeamMode::Remove,
                ModeArg::Insert => SeamMode::Insert,
            },
            energy: match args.energy {
                EnergyArg::Laplacian => EnergyFunction::Laplacian,
                EnergyArg::Sobel => EnergyFunction::Sobel,
            },
        }
    }
}

#[derive(Debug, Args)]
pub struct SnakesArgs {
    /// Input image path.
    pub input: PathBuf,

    /// Output image path with the contour drawn.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Initial circle center x (defaults to the image center).
    #[arg(long)]
    pub center_x: Option<f64>,

    /// Initial circle center y (defaults to the image center).
    #[arg(long)]
    pub center_y: Option<f64>,

    /// Initial circle radius (defaults to 40% of the shorter side).
    #[arg(long)]
    pub radius: Option<f64>,

    /// Number of contour points.
    #[arg(long, default_value_t = 80)]
    pub points: usize,

    /// Continuity weight.
    #[arg(long, default_value_t = 0.9)]
    pub alpha: f64,

    /// Curvature weight.
    #[arg(long, default_value_t = 0.8)]
    pub beta: f64,

    /// Image energy weight.
    #[arg(long, default_value_t = 0.5)]
    pub gamma: f64,

    /// Search window side (pixels).
    #[arg(long, default_value_t = 12)]
    pub window: u32,

    /// Maximum number of passes.
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: u32,

    /// Stop once fewer points than this move in a pass.
    #[arg(long, default_value_t = 5)]
    pub threshold: usize,
}

impl From<&SnakesArgs> for SnakeParams {
    fn from(args: &SnakesArgs) -> Self {
        Self {
            alpha: args.alpha,
            beta: args.beta,
            gamma: args.gamma,
            window: args.window,
            max_iterations: args.max_iterations,
            threshold: args.threshold,
        }
    }
}
