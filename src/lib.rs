mod error;
mod imageops_papers;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use error::{
    ColorTransferError, ColorizationError, DomainTransformError, KMeansError, LocalLaplacianError,
    PoissonError, SeamCarvingError, SnakesError,
};
pub use imageops_papers::color_space::{lab_to_rgb, luma, rgb_to_lab, rgb_to_ycrcb, ycrcb_to_rgb};
pub use imageops_papers::color_transfer::{ColorTransfer, LabStatistics};
pub use imageops_papers::colorization::{ColorizationParams, Colorize};
pub use imageops_papers::domain_transform::{
    DomainTransformFilter, DomainTransformParams, SigmaSchedule,
};
pub use imageops_papers::kmeans_pp::{Clustering, KMeans, KMeansParams, QuantizeColors};
pub use imageops_papers::local_laplacian::{LocalLaplacianFilter, LocalLaplacianParams};
pub use imageops_papers::poisson::{PoissonBlend, PoissonOutput, PoissonParams};
pub use imageops_papers::pyramid::{
    convolve_separable, gaussian_blur, gaussian_kernel_1d, laplacian_3x3, pyr_down, pyr_up,
};
pub use imageops_papers::seam_carving::{
    energy_map, find_vertical_seam, insert_vertical_seam, remove_vertical_seam, transpose,
    EnergyFunction, SeamCarving, SeamCarvingParams, SeamMode, SeamOrientation,
};
pub use imageops_papers::snakes::{
    draw_snake, edge_strength, ActiveContour, Point2, Snake, SnakeOutcome, SnakeParams,
};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
