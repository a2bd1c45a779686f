mod args;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use args::{
    Cli, ColorTransferArgs, ColorizeArgs, Command, DomainTransformArgs, KMeansArgs,
    LocalLaplacianArgs, PoissonArgs, SeamCarveArgs, SnakesArgs,
};
use clap::Parser;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageops_papers::{
    draw_snake, ActiveContour, ColorTransfer, Colorize, DomainTransformFilter,
    LocalLaplacianFilter, Point2, PoissonBlend, QuantizeColors, SeamCarving, Snake,
};
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Command::ColorTransfer(args) => color_transfer(args),
        Command::Colorize(args) => colorize(args),
        Command::DomainTransform(args) => domain_transform(args),
        Command::Kmeans(args) => kmeans(args),
        Command::LocalLaplacian(args) => local_laplacian(args),
        Command::Poisson(args) => poisson(args),
        Command::SeamCarve(args) => seam_carve(args),
        Command::Snakes(args) => snakes(args),
    }
}

fn load(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to load image \"{}\"", path.display()))?;
    info!(
        "loaded \"{}\" ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

fn load_rgb(path: &Path) -> Result<RgbImage> {
    Ok(load(path)?.to_rgb8())
}

fn save(image: impl Into<DynamicImage>, path: &Path) -> Result<()> {
    image
        .into()
        .save(path)
        .with_context(|| format!("failed to write image \"{}\"", path.display()))?;
    info!("wrote \"{}\"", path.display());
    Ok(())
}

fn timed<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let output = f();
    info!("{name} finished in {:.2?}", start.elapsed());
    output
}

fn color_transfer(args: &ColorTransferArgs) -> Result<()> {
    let target = load_rgb(&args.target)?;
    let reference = load_rgb(&args.reference)?;
    let result = timed("color transfer", || target.transfer_color(&reference))?;
    save(result, &args.output)
}

fn colorize(args: &ColorizeArgs) -> Result<()> {
    let gray: GrayImage = load(&args.gray)?.to_luma8();
    let scribbles = load_rgb(&args.scribbles)?;
    let result = timed("colorization", || gray.colorize(&scribbles, &args.into()))?;
    save(result, &args.output)
}

fn domain_transform(args: &DomainTransformArgs) -> Result<()> {
    let input = load_rgb(&args.input)?;
    let result = timed("domain transform", || input.domain_transform_filter(&args.into()))?;
    save(result, &args.output)
}

fn kmeans(args: &KMeansArgs) -> Result<()> {
    let input = load_rgb(&args.input)?;
    let (result, clustering) = timed("k-means++", || input.quantize_colors(&args.into()))?;

    println!("\n **** Centers **** ");
    for (k, (center, count)) in clustering.centers.iter().zip(&clustering.counts).enumerate() {
        println!(
            "  No. {:2}: ({:3}, {:3}, {:3})  {count} pixels",
            k + 1,
            center[0] as u8,
            center[1] as u8,
            center[2] as u8
        );
    }
    println!();

    save(result, &args.output)
}

fn local_laplacian(args: &LocalLaplacianArgs) -> Result<()> {
    let input = load_rgb(&args.input)?;
    let result = timed("local Laplacian filter", || input.local_laplacian_filter(&args.into()))?;
    save(result, &args.output)
}

fn poisson(args: &PoissonArgs) -> Result<()> {
    let base = load_rgb(&args.base)?;
    let blend = load_rgb(&args.blend)?;
    let output = timed("Poisson blending", || base.poisson_blend(&blend, &args.into()))?;
    if let Some(path) = &args.regions {
        save(output.regions, path)?;
    }
    save(output.image, &args.output)
}

fn seam_carve(args: &SeamCarveArgs) -> Result<()> {
    let input = load_rgb(&args.input)?;
    let result = timed("seam carving", || input.carve_seams(&args.into()))?;
    info!(
        "resized {}x{} -> {}x{}",
        input.width(),
        input.height(),
        result.width(),
        result.height()
    );
    save(result, &args.output)
}

fn snakes(args: &SnakesArgs) -> Result<()> {
    let input = load_rgb(&args.input)?;
    let (width, height) = (f64::from(input.width()), f64::from(input.height()));
    let center = Point2::new(
        args.center_x.unwrap_or(width / 2.0),
        args.center_y.unwrap_or(height / 2.0),
    );
    let radius = args.radius.unwrap_or(0.4 * width.min(height));
    let snake = Snake::circle(center, radius, args.points)?;

    let outcome = timed("snakes", || input.evolve_snake(&snake, &args.into()))?;
    info!("contour settled after {} iterations", outcome.iterations);
    save(draw_snake(&input, &outcome.snake, Rgb([0, 255, 0])), &args.output)
}
