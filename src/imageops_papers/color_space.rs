//! Color space conversions shared by the color operations.
//!
//! `Lαβ` follows Reinhard et al., "Color Transfer between Images" (2001):
//! RGB is taken to LMS cone space, compressed with `log10` and decorrelated.
//! `YCrCb` follows the full range BT.601 definition used for 8-bit images.

use image::Rgb;

const RGB_TO_LMS: [[f32; 3]; 3] = [
    [0.3811, 0.5783, 0.0402],
    [0.1967, 0.7244, 0.0782],
    [0.0241, 0.1288, 0.8444],
];

const LMS_TO_RGB: [[f32; 3]; 3] = [
    [4.4679, -3.5873, 0.1193],
    [-1.2186, 2.3809, -0.1624],
    [0.0497, -0.2439, 1.2045],
];

/// Lower bound applied to cone responses before taking the logarithm.
const MIN_LMS: f32 = 1e-6;

const GRAY_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];
const CHROMA_OFFSET: f32 = 128.0;

#[inline]
fn mat3_mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Converts an RGB triple in `[0, 1]` to `Lαβ`.
pub fn rgb_to_lab(Rgb(rgb): Rgb<f32>) -> [f32; 3] {
    let [l, m, s] = mat3_mul(&RGB_TO_LMS, rgb).map(|c| c.max(MIN_LMS).log10());

    [
        (l + m + s) / 3f32.sqrt(),
        (l + m - 2.0 * s) / 6f32.sqrt(),
        (l - m) / 2f32.sqrt(),
    ]
}

/// Converts `Lαβ` back to RGB. The result is not clamped.
pub fn lab_to_rgb(lab: [f32; 3]) -> Rgb<f32> {
    let a = lab[0] / 3f32.sqrt();
    let b = lab[1] / 6f32.sqrt();
    let c = lab[2] / 2f32.sqrt();

    let lms = [a + b + c, a + b - c, a - 2.0 * b].map(|v| 10f32.powf(v));
    Rgb(mat3_mul(&LMS_TO_RGB, lms))
}

/// Luma of an RGB triple with BT.601 weights, in the same scale as the input.
#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    GRAY_WEIGHTS[0] * rgb[0] + GRAY_WEIGHTS[1] * rgb[1] + GRAY_WEIGHTS[2] * rgb[2]
}

/// Converts 8-bit range RGB to `[Y, Cr, Cb]` without quantization.
pub fn rgb_to_ycrcb(rgb: [f32; 3]) -> [f32; 3] {
    let y = luma(rgb);
    let cr = (rgb[0] - y) * 0.713 + CHROMA_OFFSET;
    let cb = (rgb[2] - y) * 0.564 + CHROMA_OFFSET;
    [y, cr, cb]
}

/// Converts `[Y, Cr, Cb]` to an 8-bit RGB pixel, rounding and saturating.
pub fn ycrcb_to_rgb([y, cr, cb]: [f32; 3]) -> Rgb<u8> {
    let cr = cr - CHROMA_OFFSET;
    let cb = cb - CHROMA_OFFSET;
    let rgb = [
        y + 1.403 * cr,
        y - 0.714 * cr - 0.344 * cb,
        y + 1.773 * cb,
    ];
    Rgb(rgb.map(|c| c.round().clamp(0.0, 255.0) as u8))
}
