//! 3x3 kernels and the per-pixel convolver.
//!
//! # Kernels
//!
//! - [`Kernel3::BOX_BLUR`] - all nine weights `1/9`, normalized
//! - [`Kernel3::LAPLACE`] - Laplacian edge detector, raw sum
//! - [`Kernel3::SHARPEN`] - centre 5 / cross -1, raw sum
//!
//! # Border policy
//!
//! Taps that fall outside the image are skipped: they add nothing to the
//! weighted sum and nothing to the weight total. Border pixels therefore see
//! a smaller kernel instead of a zero- or edge-padded one. For normalized
//! kernels the sum is divided by the weight actually applied, so a uniform
//! image stays uniform right up to the corners.
//!
//! # Example
//!
//! ```rust
//! use pnmconv_core::{Image, ImageFormat, Pixel};
//! use pnmconv_ops::filter::{apply, Kernel3};
//!
//! let img = Image::from_samples(ImageFormat::Grayscale, 1, 1, 255, vec![42]).unwrap();
//! assert_eq!(apply(&img, &Kernel3::BOX_BLUR, 0, 0), Pixel::Gray(42));
//! ```

use crate::{OpsError, OpsResult};
use pnmconv_core::{BandMut, Image, ImageFormat, Pixel};
use std::fmt;
use std::str::FromStr;
#[allow(unused_imports)]
use tracing::{debug, trace};

const BLUR_WEIGHT: f32 = 1.0 / 9.0;

/// 3x3 convolution kernel.
///
/// `weights[ky + 1][kx + 1]` is the weight of the neighbour at offset
/// `(kx, ky)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3 {
    /// Row-major weights, top row first.
    pub weights: [[f32; 3]; 3],
    /// Divide by the applied weight total before rounding.
    pub normalize: bool,
}

impl Kernel3 {
    /// Simple average blur.
    pub const BOX_BLUR: Self = Self::new([[BLUR_WEIGHT; 3]; 3], true);

    /// Laplacian edge detection.
    #[rustfmt::skip]
    pub const LAPLACE: Self = Self::new(
        [
            [ 0.0, -1.0,  0.0],
            [-1.0,  4.0, -1.0],
            [ 0.0, -1.0,  0.0],
        ],
        false,
    );

    /// Sharpening (identity plus Laplacian).
    #[rustfmt::skip]
    pub const SHARPEN: Self = Self::new(
        [
            [ 0.0, -1.0,  0.0],
            [-1.0,  5.0, -1.0],
            [ 0.0, -1.0,  0.0],
        ],
        false,
    );

    /// Creates a kernel from its weights.
    pub const fn new(weights: [[f32; 3]; 3], normalize: bool) -> Self {
        Self { weights, normalize }
    }

    /// Weight of the tap at offset `(kx, ky)`, each in `-1..=1`.
    #[inline]
    pub fn weight(&self, kx: isize, ky: isize) -> f32 {
        self.weights[(ky + 1) as usize][(kx + 1) as usize]
    }

    /// Sum of all nine weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().flatten().sum()
    }
}

/// The built-in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Box blur.
    Blur,
    /// Laplacian edge detection.
    Laplace,
    /// Sharpen.
    Sharpen,
}

impl FilterKind {
    /// Every filter, in canonical order.
    pub const ALL: [Self; 3] = [Self::Blur, Self::Laplace, Self::Sharpen];

    /// Kernel applied by this filter.
    #[inline]
    pub fn kernel(self) -> Kernel3 {
        match self {
            Self::Blur => Kernel3::BOX_BLUR,
            Self::Laplace => Kernel3::LAPLACE,
            Self::Sharpen => Kernel3::SHARPEN,
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Laplace => "laplace",
            Self::Sharpen => "sharpen",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blur" | "box" => Ok(Self::Blur),
            "laplace" | "laplacian" | "edge" => Ok(Self::Laplace),
            "sharpen" => Ok(Self::Sharpen),
            _ => Err(OpsError::UnknownFilter(s.to_string())),
        }
    }
}

/// Computes output pixel `(x, y)` of `input` convolved with `kernel`.
///
/// The result is rounded half-up and clamped into `[0, max_value]`. RGB
/// channels are filtered independently with the same spatial weights.
///
/// # Panics
///
/// Panics if `(x, y)` is outside `input`.
pub fn apply(input: &Image, kernel: &Kernel3, x: usize, y: usize) -> Pixel {
    assert!(
        x < input.width() as usize && y < input.height() as usize,
        "pixel ({x}, {y}) out of bounds for {}x{}",
        input.width(),
        input.height()
    );
    match input.format() {
        ImageFormat::Grayscale => Pixel::from(convolve_at::<1>(input, kernel, x, y)),
        ImageFormat::Rgb => Pixel::from(convolve_at::<3>(input, kernel, x, y)),
    }
}

/// Naive single-threaded sweep: one [`apply`] call per pixel, row by row.
///
/// This is the reference every scheduler must match exactly.
pub fn convolve_sequential(input: &Image, kernel: &Kernel3) -> OpsResult<Image> {
    trace!(?input, normalize = kernel.normalize, "convolve_sequential");
    let mut output = input.blank_like()?;
    let (width, height) = (input.width() as usize, input.height() as usize);
    {
        let mut band = output.full_band_mut();
        for y in 0..height {
            for x in 0..width {
                let px = apply(input, kernel, x, y);
                band.put(x, y, px.as_slice());
            }
        }
    }
    Ok(output)
}

/// Fills every pixel of `band` from `input`.
///
/// `band` must come from an image with the same geometry as `input`.
pub(crate) fn sweep_band(input: &Image, kernel: &Kernel3, band: &mut BandMut<'_>) {
    debug_assert_eq!(band.width(), input.width() as usize);
    debug_assert_eq!(band.channels(), input.channels());
    match input.format() {
        ImageFormat::Grayscale => sweep::<1>(input, kernel, band),
        ImageFormat::Rgb => sweep::<3>(input, kernel, band),
    }
}

fn sweep<const N: usize>(input: &Image, kernel: &Kernel3, band: &mut BandMut<'_>) {
    let width = input.width() as usize;
    for y in band.rows() {
        for x in 0..width {
            let px = convolve_at::<N>(input, kernel, x, y);
            band.put(x, y, &px);
        }
    }
}

#[inline]
fn convolve_at<const N: usize>(input: &Image, kernel: &Kernel3, x: usize, y: usize) -> [u32; N] {
    let samples = input.samples();
    let mut acc = [0.0f32; N];
    let mut weight_sum = 0.0f32;

    for ky in -1isize..=1 {
        for kx in -1isize..=1 {
            let nx = x as isize + kx;
            let ny = y as isize + ky;
            if !input.contains(nx, ny) {
                continue;
            }
            let w = kernel.weight(kx, ky);
            let base = input.index(nx as usize, ny as usize);
            for (c, sum) in acc.iter_mut().enumerate() {
                *sum += samples[base + c] as f32 * w;
            }
            weight_sum += w;
        }
    }

    let max_value = input.max_value();
    let scale = kernel.normalize && weight_sum > 0.0;
    acc.map(|sum| quantize(if scale { sum / weight_sum } else { sum }, max_value))
}

/// Round half-up, then clamp into `[0, max_value]`.
#[inline]
fn quantize(value: f32, max_value: u32) -> u32 {
    ((value + 0.5) as i64).clamp(0, i64::from(max_value)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gray(width: u32, height: u32, max_value: u32, samples: Vec<u32>) -> Image {
        Image::from_samples(ImageFormat::Grayscale, width, height, max_value, samples).unwrap()
    }

    fn rgb(width: u32, height: u32, max_value: u32, samples: Vec<u32>) -> Image {
        Image::from_samples(ImageFormat::Rgb, width, height, max_value, samples).unwrap()
    }

    #[test]
    fn test_kernel_weights() {
        assert_relative_eq!(Kernel3::BOX_BLUR.sum(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(Kernel3::LAPLACE.sum(), 0.0);
        assert_relative_eq!(Kernel3::SHARPEN.sum(), 1.0);

        for v in Kernel3::BOX_BLUR.weights.iter().flatten() {
            assert_eq!(*v, 1.0f32 / 9.0);
        }
        assert_eq!(Kernel3::LAPLACE.weight(0, 0), 4.0);
        assert_eq!(Kernel3::SHARPEN.weight(0, 0), 5.0);
        assert_eq!(Kernel3::SHARPEN.weight(-1, 0), -1.0);
        assert_eq!(Kernel3::SHARPEN.weight(1, -1), 0.0);

        assert!(Kernel3::BOX_BLUR.normalize);
        assert!(!Kernel3::LAPLACE.normalize);
        assert!(!Kernel3::SHARPEN.normalize);
    }

    #[test]
    fn test_filter_names() {
        assert_eq!("blur".parse::<FilterKind>().unwrap(), FilterKind::Blur);
        assert_eq!("BOX".parse::<FilterKind>().unwrap(), FilterKind::Blur);
        assert_eq!("laplace".parse::<FilterKind>().unwrap(), FilterKind::Laplace);
        assert_eq!("Laplacian".parse::<FilterKind>().unwrap(), FilterKind::Laplace);
        assert_eq!("edge".parse::<FilterKind>().unwrap(), FilterKind::Laplace);
        assert_eq!(" sharpen ".parse::<FilterKind>().unwrap(), FilterKind::Sharpen);

        for kind in FilterKind::ALL {
            assert_eq!(kind.to_string().parse::<FilterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_filter() {
        let err = "emboss".parse::<FilterKind>().unwrap_err();
        assert!(matches!(err, OpsError::UnknownFilter(ref name) if name == "emboss"));
    }

    #[test]
    fn test_blur_uniform_including_corners() {
        for v in [0, 1, 37, 100, 254, 255] {
            let img = gray(5, 4, 255, vec![v; 20]);
            let out = convolve_sequential(&img, &Kernel3::BOX_BLUR).unwrap();
            assert!(out.samples().iter().all(|&s| s == v), "v = {v}");
        }

        let img = rgb(4, 3, 1000, [10, 500, 1000].repeat(12));
        let out = convolve_sequential(&img, &Kernel3::BOX_BLUR).unwrap();
        assert_eq!(out.samples(), img.samples());
    }

    #[test]
    fn test_blur_uniform_at_16_bit_white() {
        for v in [1, 255, 4097, 65534, 65535] {
            let img = gray(7, 5, 65535, vec![v; 35]);
            let out = convolve_sequential(&img, &Kernel3::BOX_BLUR).unwrap();
            assert!(out.samples().iter().all(|&s| s == v), "v = {v}");
        }

        let img = rgb(3, 3, 65535, [65535, 32768, 1].repeat(9));
        let out = convolve_sequential(&img, &Kernel3::BOX_BLUR).unwrap();
        assert_eq!(out.samples(), img.samples());
    }

    #[test]
    fn test_blur_3x3_of_hundreds() {
        let img = gray(3, 3, 255, vec![100; 9]);
        let out = convolve_sequential(&img, &Kernel3::BOX_BLUR).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_single_pixel_blur_is_identity() {
        let img = gray(1, 1, 255, vec![42]);
        assert_eq!(apply(&img, &Kernel3::BOX_BLUR, 0, 0), Pixel::Gray(42));

        let img = rgb(1, 1, 255, vec![1, 128, 255]);
        assert_eq!(apply(&img, &Kernel3::BOX_BLUR, 0, 0), Pixel::Rgb([1, 128, 255]));
    }

    #[test]
    fn test_single_pixel_raw_kernels_scale_center() {
        let img = rgb(1, 1, 255, vec![10, 20, 30]);
        assert_eq!(apply(&img, &Kernel3::SHARPEN, 0, 0), Pixel::Rgb([50, 100, 150]));
        assert_eq!(apply(&img, &Kernel3::LAPLACE, 0, 0), Pixel::Rgb([40, 80, 120]));
    }

    #[test]
    fn test_laplace_on_single_column() {
        // Left and right taps are always outside; only the vertical arm applies.
        let img = gray(1, 5, 255, vec![10, 20, 30, 40, 50]);
        let out = convolve_sequential(&img, &Kernel3::LAPLACE).unwrap();
        // y=0: 4*10 - 20          = 20
        // y=1: 4*20 - 10 - 30     = 40
        // y=2: 4*30 - 20 - 40     = 60
        // y=3: 4*40 - 30 - 50     = 80
        // y=4: 4*50 - 40          = 160
        assert_eq!(out.samples(), &[20, 40, 60, 80, 160]);
    }

    #[test]
    fn test_round_half_up() {
        // Each pixel averages 0 and 1 over two taps: exactly 0.5.
        let img = gray(2, 1, 255, vec![0, 1]);
        let out = convolve_sequential(&img, &Kernel3::BOX_BLUR).unwrap();
        assert_eq!(out.samples(), &[1, 1]);
    }

    #[test]
    fn test_result_is_clamped() {
        let img = gray(3, 1, 255, vec![0, 0, 200]);
        let out = convolve_sequential(&img, &Kernel3::LAPLACE).unwrap();
        // x=1: -200 -> 0, x=2: 800 -> 255
        assert_eq!(out.samples(), &[0, 0, 255]);
    }

    #[test]
    fn test_rgb_channels_are_independent() {
        let img = rgb(2, 1, 255, vec![0, 10, 200, 2, 20, 100]);
        let out = convolve_sequential(&img, &Kernel3::BOX_BLUR).unwrap();
        assert_eq!(out.samples(), &[1, 15, 150, 1, 15, 150]);
    }

    #[test]
    fn test_output_keeps_geometry() {
        let img = rgb(3, 2, 511, vec![7; 18]);
        let out = convolve_sequential(&img, &Kernel3::SHARPEN).unwrap();
        assert_eq!(out.format(), ImageFormat::Rgb);
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(out.max_value(), 511);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_apply_out_of_bounds_panics() {
        let img = gray(2, 2, 255, vec![0; 4]);
        apply(&img, &Kernel3::BOX_BLUR, 2, 0);
    }
}
