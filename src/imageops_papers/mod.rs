pub mod color_space;
pub mod color_transfer;
pub mod colorization;
pub mod domain_transform;
pub mod kmeans_pp;
pub mod local_laplacian;
pub mod poisson;
pub mod pyramid;
pub mod seam_carving;
pub mod snakes;
