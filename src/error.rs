use thiserror::Error;

/// Error type for color transfer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorTransferError {
    /// The target or the reference image has no pixels
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

/// Error type for scribble based colorization
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorizationError {
    /// The gray image has no pixels
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// Gray image and scribble image differ in size
    #[error("Gray and scribble dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The scribble image does not contain a single non-black pixel
    #[error("Scribble image contains no colored pixels")]
    NoScribbles,

    /// At least one color label per pixel is required
    #[error("Maximum number of colors per pixel must be positive, got {max_colors}")]
    InvalidMaxColors { max_colors: usize },

    /// Blending exponent must be finite and positive
    #[error("Blending exponent must be positive, got {exponent}")]
    InvalidExponent { exponent: f64 },
}

/// Error type for the domain transform filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainTransformError {
    /// The image has no pixels
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// Spatial or range sigma is not positive
    #[error("Sigma values must be positive, got sigma_s = {sigma_s}, sigma_r = {sigma_r}")]
    InvalidSigma { sigma_s: f32, sigma_r: f32 },

    /// Zero iterations requested
    #[error("Iteration count must be positive")]
    InvalidIterations,
}

/// Error type for k-means++ clustering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KMeansError {
    /// No samples were provided
    #[error("Sample set is empty")]
    EmptySamples,

    /// Sample dimension is zero or does not divide the sample buffer
    #[error("Invalid sample dimension {dim} for a buffer of {len} values")]
    InvalidDimension { dim: usize, len: usize },

    /// Cluster count is zero or larger than the number of samples
    #[error("Cluster count must be in 1..={samples}, got {clusters}")]
    InvalidClusterCount { clusters: usize, samples: usize },

    /// Zero iterations requested
    #[error("Iteration count must be positive")]
    InvalidIterations,
}

/// Error type for the local Laplacian filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocalLaplacianError {
    /// The image has no pixels
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// Range sigma is not positive or pre-smoothing sigma is negative
    #[error("Invalid sigma: sigma_r = {sigma_r}, presmooth_sigma = {presmooth_sigma}")]
    InvalidSigma { sigma_r: f32, presmooth_sigma: f32 },

    /// Pyramid depth is zero
    #[error("Pyramid must have at least one level, got {levels}")]
    InvalidLevels { levels: usize },

    /// Remapping parameters out of range
    #[error("Invalid remapping parameters: alpha = {alpha}, beta = {beta}, tau = {tau}")]
    InvalidRemapping { alpha: f32, beta: f32, tau: f32 },
}

/// Error type for Poisson blending
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoissonError {
    /// Base and blend images differ in size
    #[error("Base and blend dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// No interior pixel to solve for
    #[error("Image must be at least 3x3, got {width}x{height}")]
    ImageTooSmall { width: u32, height: u32 },

    /// Zero Gauss-Seidel sweeps requested
    #[error("Number of sweeps must be positive")]
    InvalidSweeps,
}

/// Error type for seam carving
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeamCarvingError {
    /// The image has no pixels
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// More seams requested than the image can provide
    #[error("Cannot process {seams} seams on an image of extent {extent}")]
    TooManySeams { seams: u32, extent: u32 },

    /// A seam does not fit the image it is applied to
    #[error("Seam of length {seam_len} does not match image extent {extent}")]
    InvalidSeam { seam_len: usize, extent: u32 },
}

/// Error type for active contours
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnakesError {
    /// The image has no pixels
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// A closed contour needs at least three points
    #[error("Snake needs at least 3 points, got {count}")]
    TooFewPoints { count: usize },

    /// Circle radius is negative or not finite
    #[error("Invalid circle radius {radius}")]
    InvalidRadius { radius: f64 },

    /// Search window must contain more than the current point
    #[error("Search window must be positive, got {window}")]
    InvalidWindow { window: u32 },
}
