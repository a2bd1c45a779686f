use crate::error::SeamCarvingError;
use crate::utils::validate_non_empty_image;
use crate::Image;
use image::{imageops, ImageBuffer, Luma, Pixel};
use imageproc::filter::laplacian_filter;
use imageproc::gradients::sobel_gradients;
use imageproc::map::map_colors;

/// Direction of the seams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeamOrientation {
    /// Top-to-bottom seams, changing the width
    #[default]
    Vertical,
    /// Left-to-right seams, changing the height
    Horizontal,
}

/// Whether seams are removed or duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeamMode {
    /// Shrink the image
    #[default]
    Remove,
    /// Enlarge the image by duplicating the lowest energy seams
    Insert,
}

/// Pixel energy used to rank seams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyFunction {
    /// Absolute response of the 3x3 Laplacian of the gray image
    #[default]
    Laplacian,
    /// Sobel gradient magnitude of the gray image
    Sobel,
}

/// Parameters of seam carving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeamCarvingParams {
    /// Number of seams to remove or insert
    pub seams: u32,
    /// Seam direction
    pub orientation: SeamOrientation,
    /// Remove or insert
    pub mode: SeamMode,
    /// Energy function
    pub energy: EnergyFunction,
}

/// Content-aware resizing (Avidan and Shamir, "Seam Carving for
/// Content-Aware Image Resizing", 2007).
///
/// A seam is an 8-connected path of one pixel per row (or column) with the
/// lowest accumulated energy. Removing seams one at a time, recomputing the
/// energy after each, shrinks the image while keeping high energy content.
///
/// # Examples
///
/// ```rust
/// use imageops_papers::{Image, SeamCarving, SeamCarvingParams};
/// use image::Rgb;
///
/// let image: Image<Rgb<u8>> = Image::from_fn(12, 6, |x, _| Rgb([(x * 20) as u8, 0, 0]));
/// let params = SeamCarvingParams { seams: 4, ..Default::default() };
/// assert_eq!(image.carve_seams(&params).unwrap().dimensions(), (8, 6));
/// ```
pub trait SeamCarving {
    /// Removes or inserts `params.seams` seams.
    ///
    /// # Errors
    ///
    /// * `SeamCarvingError::EmptyImage` - If the image has no pixels
    /// * `SeamCarvingError::TooManySeams` - If removal would leave no pixels, or
    ///   insertion asks for more seams than the image extent
    fn carve_seams(&self, params: &SeamCarvingParams) -> Result<Self, SeamCarvingError>
    where
        Self: Sized;
}

impl<P> SeamCarving for Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    fn carve_seams(&self, params: &SeamCarvingParams) -> Result<Self, SeamCarvingError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "Seam carving")
            .map_err(|_| SeamCarvingError::EmptyImage)?;

        match params.orientation {
            SeamOrientation::Vertical => carve_vertical(self, params),
            SeamOrientation::Horizontal => {
                let carved = carve_vertical(&transpose(self), params)?;
                Ok(transpose(&carved))
            }
        }
    }
}

fn carve_vertical<P>(image: &Image<P>, params: &SeamCarvingParams) -> Result<Image<P>, SeamCarvingError>
where
    P: Pixel<Subpixel = u8>,
{
    let extent = image.width();
    let limit = match params.mode {
        SeamMode::Remove => extent - 1,
        SeamMode::Insert => extent,
    };
    if params.seams > limit {
        return Err(SeamCarvingError::TooManySeams {
            seams: params.seams,
            extent,
        });
    }
    if params.seams == 0 {
        return Ok(image.clone());
    }

    match params.mode {
        SeamMode::Remove => {
            let mut carved = image.clone();
            for i in 0..params.seams {
                let seam = find_vertical_seam(&energy_map(&carved, params.energy));
                carved = remove_vertical_seam(&carved, &seam)?;
                log::debug!("removed seam {}/{}", i + 1, params.seams);
            }
            Ok(carved)
        }
        SeamMode::Insert => {
            let columns = lowest_energy_columns(image, params.seams, params.energy)?;
            Ok(duplicate_columns(image, &columns))
        }
    }
}

/// Per-pixel energy of an image.
pub fn energy_map<P>(image: &Image<P>, energy: EnergyFunction) -> Image<Luma<u32>>
where
    P: Pixel<Subpixel = u8>,
{
    let gray = imageops::grayscale(image);
    match energy {
        // Absolute response saturated to the 8-bit range.
        EnergyFunction::Laplacian => map_colors(&laplacian_filter(&gray), |Luma([v])| {
            Luma([u32::from(v.unsigned_abs().min(255))])
        }),
        EnergyFunction::Sobel => map_colors(&sobel_gradients(&gray), |Luma([v])| Luma([u32::from(v)])),
    }
}

/// Finds the vertical seam of least total energy.
///
/// Returns the seam column of every row. Among equal costs the leftmost end
/// point is chosen, and when tracing back the smallest offset wins.
pub fn find_vertical_seam(energy: &Image<Luma<u32>>) -> Vec<u32> {
    let (width, height) = energy.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut cost: Vec<u64> = Vec::with_capacity(w * h);
    let mut parent: Vec<u32> = Vec::with_capacity(w * h);

    for x in 0..width {
        cost.push(u64::from(energy.get_pixel(x, 0)[0]));
        parent.push(x);
    }
    for y in 1..h {
        let previous = (y - 1) * w;
        for x in 0..w {
            let lo = x.saturating_sub(1);
            let hi = (x + 1).min(w - 1);
            let mut best = lo;
            for candidate in lo + 1..=hi {
                if cost[previous + candidate] < cost[previous + best] {
                    best = candidate;
                }
            }
            cost.push(cost[previous + best] + u64::from(energy.get_pixel(x as u32, y as u32)[0]));
            parent.push(best as u32);
        }
    }

    let last_row = &cost[(h - 1) * w..];
    let mut x = last_row
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| **c)
        .map_or(0, |(x, _)| x);

    let mut seam = vec![0u32; h];
    for y in (0..h).rev() {
        seam[y] = x as u32;
        x = parent[y * w + x] as usize;
    }
    seam
}

fn validate_seam<P: Pixel>(image: &Image<P>, seam: &[u32]) -> Result<(), SeamCarvingError> {
    let (width, height) = image.dimensions();
    if seam.len() != height as usize || seam.iter().any(|x| *x >= width) {
        return Err(SeamCarvingError::InvalidSeam {
            seam_len: seam.len(),
            extent: height,
        });
    }
    Ok(())
}

/// Removes one pixel per row at the seam columns.
///
/// # Errors
///
/// * `SeamCarvingError::InvalidSeam` - If the seam length differs from the height,
///   a column is out of range, or the image is a single column
pub fn remove_vertical_seam<P: Pixel>(image: &Image<P>, seam: &[u32]) -> Result<Image<P>, SeamCarvingError> {
    validate_seam(image, seam)?;
    let (width, height) = image.dimensions();
    if width < 2 {
        return Err(SeamCarvingError::InvalidSeam {
            seam_len: seam.len(),
            extent: height,
        });
    }

    Ok(ImageBuffer::from_fn(width - 1, height, |x, y| {
        let source = if x < seam[y as usize] { x } else { x + 1 };
        *image.get_pixel(source, y)
    }))
}

/// Inserts one pixel per row right after the seam column, the average of
/// the seam pixel and its right neighbour.
///
/// # Errors
///
/// * `SeamCarvingError::InvalidSeam` - If the seam length differs from the height
///   or a column is out of range
pub fn insert_vertical_seam<P>(image: &Image<P>, seam: &[u32]) -> Result<Image<P>, SeamCarvingError>
where
    P: Pixel<Subpixel = u8>,
{
    validate_seam(image, seam)?;
    let columns: Vec<Vec<u32>> = seam.iter().map(|x| vec![*x]).collect();
    Ok(duplicate_columns(image, &columns))
}

/// Widens every row by the listed original columns, each followed by the
/// average with its right neighbour. `columns[y]` must be sorted and distinct.
fn duplicate_columns<P>(image: &Image<P>, columns: &[Vec<u32>]) -> Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let added = columns.first().map_or(0, |c| c.len()) as u32;
    let mut output: Image<P> = ImageBuffer::new(width + added, height);

    for (y, row) in columns.iter().enumerate() {
        let y = y as u32;
        let mut next = row.iter().peekable();
        let mut out_x = 0;
        for x in 0..width {
            let pixel = *image.get_pixel(x, y);
            output.put_pixel(out_x, y, pixel);
            out_x += 1;
            if next.next_if(|c| **c == x).is_some() {
                let right = *image.get_pixel((x + 1).min(width - 1), y);
                let average = pixel.map2(&right, |a, b| ((u16::from(a) + u16::from(b)) / 2) as u8);
                output.put_pixel(out_x, y, average);
                out_x += 1;
            }
        }
    }
    output
}

/// Finds `count` distinct seams by removing them one after another from a
/// working copy, and returns for every row the original columns they cover.
fn lowest_energy_columns<P>(
    image: &Image<P>,
    count: u32,
    energy: EnergyFunction,
) -> Result<Vec<Vec<u32>>, SeamCarvingError>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let mut positions: Vec<Vec<u32>> = (0..height).map(|_| (0..width).collect()).collect();
    let mut columns: Vec<Vec<u32>> = vec![Vec::with_capacity(count as usize); height as usize];
    let mut working = image.clone();

    for i in 0..count {
        let seam = find_vertical_seam(&energy_map(&working, energy));
        for ((row_positions, row_columns), x) in positions.iter_mut().zip(&mut columns).zip(&seam) {
            row_columns.push(row_positions.remove(*x as usize));
        }
        if i + 1 < count {
            working = remove_vertical_seam(&working, &seam)?;
        }
    }

    for row in &mut columns {
        row.sort_unstable();
    }
    log::debug!("selected {count} seams for insertion");
    Ok(columns)
}

/// Swaps rows and columns.
pub fn transpose<P: Pixel>(image: &Image<P>) -> Image<P> {
    let (width, height) = image.dimensions();
    ImageBuffer::from_fn(height, width, |x, y| *image.get_pixel(y, x))
}
