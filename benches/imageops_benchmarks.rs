//! Performance benchmarks for imageops-papers
//!
//! This benchmark suite measures the performance of all major operations
//! to ensure they meet performance expectations and to track regressions.

use criterion::*;
use image::{Luma, Rgb};
use imageops_papers::{
    ActiveContour, ColorTransfer, Colorize, ColorizationParams, DomainTransformFilter,
    DomainTransformParams, EnergyFunction, Image, KMeansParams, LocalLaplacianFilter,
    LocalLaplacianParams, Point2, PoissonBlend, PoissonParams, QuantizeColors, SeamCarving,
    SeamCarvingParams, SigmaSchedule, Snake, SnakeParams,
};
use itertools::iproduct;
use std::hint::black_box;

/// Helper function to create a test RGB image with specific dimensions
fn create_rgb_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(width, height);

    // Gradient background with a bright disc in the middle
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = width.min(height) as f32 / 4.0;
    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let pixel = if (x as f32 - center_x).hypot(y as f32 - center_y) < radius {
            Rgb([230, 200, 170])
        } else {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = ((x + y) * 255 / (width + height)) as u8;
            Rgb([r, g, b])
        };
        image.put_pixel(x, y, pixel);
    });

    image
}

/// Helper function to create sparse color scribbles over a gray image
fn create_scribbles(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut scribbles: Image<Rgb<u8>> = Image::new(width, height);
    iproduct!((0..height).step_by(16), (0..width).step_by(16)).for_each(|(y, x)| {
        let color = if (x + y) % 32 == 0 {
            Rgb([220, 60, 40])
        } else {
            Rgb([40, 80, 220])
        };
        scribbles.put_pixel(x, y, color);
    });
    scribbles
}

fn bench_color_transfer(c: &mut Criterion) {
    let sizes = vec![(100, 100), (500, 500), (1000, 1000)];

    let mut group = c.benchmark_group("color_transfer");
    group.sample_size(10);

    for (width, height) in sizes {
        group.throughput(Throughput::Elements((width * height) as u64));

        let target = create_rgb_image(width, height);
        let reference = create_rgb_image(height, width);

        group.bench_with_input(
            BenchmarkId::new("transfer_color", format!("{}x{}", width, height)),
            &(target, reference),
            |b, (target, reference)| b.iter(|| black_box(target.transfer_color(reference).unwrap())),
        );
    }

    group.finish();
}

fn bench_colorization(c: &mut Criterion) {
    let sizes = vec![(64, 64), (128, 128), (256, 256)];

    let mut group = c.benchmark_group("colorization");
    group.sample_size(10);

    for (width, height) in sizes {
        group.throughput(Throughput::Elements((width * height) as u64));

        let gray: Image<Luma<u8>> = image::imageops::grayscale(&create_rgb_image(width, height));
        let scribbles = create_scribbles(width, height);

        group.bench_with_input(
            BenchmarkId::new("colorize", format!("{}x{}", width, height)),
            &(gray, scribbles),
            |b, (gray, scribbles)| {
                b.iter(|| black_box(gray.colorize(scribbles, &ColorizationParams::default()).unwrap()))
            },
        );
    }

    group.finish();
}

/// Benchmark the domain transform across sigma schedules
fn bench_domain_transform(c: &mut Criterion) {
    let sizes = vec![(200, 200), (500, 500), (1000, 1000)];
    let schedules = vec![SigmaSchedule::Constant, SigmaSchedule::Halving];

    let mut group = c.benchmark_group("domain_transform");
    group.sample_size(10);

    for ((width, height), schedule) in iproduct!(sizes, schedules) {
        group.throughput(Throughput::Elements((width * height) as u64));

        let image = create_rgb_image(width, height);
        let params = DomainTransformParams {
            schedule,
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::new(
                "domain_transform_filter",
                format!("{}x{}_{:?}", width, height, schedule),
            ),
            &(image, params),
            |b, (img, params)| b.iter(|| black_box(img.domain_transform_filter(params).unwrap())),
        );
    }

    group.finish();
}

fn bench_kmeans(c: &mut Criterion) {
    let sizes = vec![(100, 100), (300, 300)];
    let clusters = vec![4, 8, 16];

    let mut group = c.benchmark_group("kmeans_pp");
    group.sample_size(10);

    for ((width, height), k) in iproduct!(sizes, clusters) {
        group.throughput(Throughput::Elements((width * height) as u64));

        let image = create_rgb_image(width, height);
        let params = KMeansParams {
            clusters: k,
            max_iterations: 10,
            seed: Some(42),
        };

        group.bench_with_input(
            BenchmarkId::new("quantize_colors", format!("{}x{}_k{}", width, height, k)),
            &(image, params),
            |b, (img, params)| b.iter(|| black_box(img.quantize_colors(params).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark the local Laplacian filter; fewer samples, it is the slowest operation
fn bench_local_laplacian(c: &mut Criterion) {
    let sizes = vec![(32, 32), (64, 64), (128, 128)];

    let mut group = c.benchmark_group("local_laplacian");
    group.sample_size(10);

    for (width, height) in sizes {
        group.throughput(Throughput::Elements((width * height) as u64));

        let image = create_rgb_image(width, height);

        group.bench_with_input(
            BenchmarkId::new("local_laplacian_filter", format!("{}x{}", width, height)),
            &image,
            |b, img| {
                b.iter(|| black_box(img.local_laplacian_filter(&LocalLaplacianParams::default()).unwrap()))
            },
        );
    }

    group.finish();
}

fn bench_poisson(c: &mut Criterion) {
    let sizes = vec![(64, 64), (256, 256)];

    let mut group = c.benchmark_group("poisson");
    group.sample_size(10);

    for (width, height) in sizes {
        group.throughput(Throughput::Elements((width * height) as u64));

        let base = create_rgb_image(width, height);
        let blend = create_rgb_image(height, width);
        let params = PoissonParams {
            seed: Some(7),
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::new("poisson_blend", format!("{}x{}", width, height)),
            &(base, blend, params),
            |b, (base, blend, params)| b.iter(|| black_box(base.poisson_blend(blend, params).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark seam removal with both energy functions
fn bench_seam_carving(c: &mut Criterion) {
    let sizes = vec![(100, 100), (300, 200)];
    let energies = vec![EnergyFunction::Laplacian, EnergyFunction::Sobel];

    let mut group = c.benchmark_group("seam_carving");
    group.sample_size(10);

    for ((width, height), energy) in iproduct!(sizes, energies) {
        group.throughput(Throughput::Elements((width * height) as u64));

        let image = create_rgb_image(width, height);
        let params = SeamCarvingParams {
            seams: width / 10,
            energy,
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::new("carve_seams", format!("{}x{}_{:?}", width, height, energy)),
            &(image, params),
            |b, (img, params)| b.iter(|| black_box(img.carve_seams(params).unwrap())),
        );
    }

    group.finish();
}

fn bench_snakes(c: &mut Criterion) {
    let sizes = vec![(200, 200), (400, 400)];

    let mut group = c.benchmark_group("snakes");
    group.sample_size(10);

    for (width, height) in sizes {
        group.throughput(Throughput::Elements((width * height) as u64));

        let image = create_rgb_image(width, height);
        let center = Point2::new(f64::from(width) / 2.0, f64::from(height) / 2.0);
        let snake = Snake::circle(center, 0.4 * f64::from(width.min(height)), 80).unwrap();

        group.bench_with_input(
            BenchmarkId::new("evolve_snake", format!("{}x{}", width, height)),
            &(image, snake),
            |b, (img, snake)| {
                b.iter(|| black_box(img.evolve_snake(snake, &SnakeParams::default()).unwrap()))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_color_transfer,
    bench_colorization,
    bench_domain_transform,
    bench_kmeans,
    bench_local_laplacian,
    bench_poisson,
    bench_seam_carving,
    bench_snakes,
);
criterion_main!(benches);
