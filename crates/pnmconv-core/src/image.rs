//! Owned integer raster and disjoint row bands.
//!
//! # Memory Layout
//!
//! Samples are stored row-major, top-to-bottom, channel-interleaved:
//!
//! ```text
//! Grayscale: [V V V V ...]        <- Row 0
//! Rgb:       [R G B R G B ...]    <- Row 0
//!            [R G B R G B ...]    <- Row 1
//! ```
//!
//! Sample `c` of pixel `(x, y)` lives at `(y * width + x) * channels + c`.
//!
//! # Ownership
//!
//! The buffer is a plain `Vec<u32>` owned by exactly one [`Image`]. Parallel
//! writers never share it: [`Image::bands_mut`] hands out non-overlapping
//! [`BandMut`] slices, one per worker.
//!
//! # Usage
//!
//! ```rust
//! use pnmconv_core::{Image, ImageFormat, Pixel};
//!
//! let img = Image::from_samples(ImageFormat::Grayscale, 2, 1, 255, vec![10, 300]).unwrap();
//! assert_eq!(img.pixel(1, 0), Pixel::Gray(255)); // clamped to max_value
//! ```

use crate::{Error, ImageFormat, Pixel, Result};
use std::fmt;
use std::ops::Range;

/// Largest white point the pixel-map format allows.
///
/// Filters accumulate in `f32`, which is exact for every integer up to
/// this bound.
pub const MAX_SAMPLE_VALUE: u32 = 65535;

/// Owned grayscale or RGB raster with a declared white point.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    format: ImageFormat,
    width: u32,
    height: u32,
    max_value: u32,
    data: Vec<u32>,
}

impl Image {
    /// Creates a zero-filled image.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if width or height is zero, or the
    ///   sample count overflows
    /// - [`Error::InvalidMaxValue`] if `max_value` is zero or above
    ///   [`MAX_SAMPLE_VALUE`]
    /// - [`Error::AllocationFailed`] if the buffer cannot be reserved
    pub fn new(format: ImageFormat, width: u32, height: u32, max_value: u32) -> Result<Self> {
        let len = sample_count(format, width, height)?;
        check_max_value(max_value)?;
        let mut data = Self::sample_buffer(format, width, height)?;
        data.resize(len, 0);
        Ok(Self {
            format,
            width,
            height,
            max_value,
            data,
        })
    }

    /// Builds an image from raw samples, clamping each into `[0, max_value]`.
    ///
    /// # Errors
    ///
    /// Same as [`Image::new`], plus [`Error::SampleCountMismatch`] when
    /// `samples.len() != width * height * channels`.
    pub fn from_samples(
        format: ImageFormat,
        width: u32,
        height: u32,
        max_value: u32,
        mut samples: Vec<u32>,
    ) -> Result<Self> {
        let expected = sample_count(format, width, height)?;
        check_max_value(max_value)?;
        if samples.len() != expected {
            return Err(Error::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        for s in &mut samples {
            *s = (*s).min(max_value);
        }
        Ok(Self {
            format,
            width,
            height,
            max_value,
            data: samples,
        })
    }

    /// Creates a zero-filled image with the same format, geometry and
    /// white point as `self`.
    pub fn blank_like(&self) -> Result<Self> {
        Self::new(self.format, self.width, self.height, self.max_value)
    }

    /// Returns an empty vector with room for exactly
    /// `width * height * channels` samples.
    ///
    /// Decoders fill it incrementally and hand it to [`Image::from_samples`].
    pub fn sample_buffer(format: ImageFormat, width: u32, height: u32) -> Result<Vec<u32>> {
        let len = sample_count(format, width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::AllocationFailed {
                requested: len,
                reason: e.to_string(),
            })?;
        Ok(data)
    }

    /// Raster format.
    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel (1 or 3).
    #[inline]
    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    /// Declared white point.
    #[inline]
    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: zero-area images cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw samples in storage order.
    #[inline]
    pub fn samples(&self) -> &[u32] {
        &self.data
    }

    /// Consumes the image, returning its sample buffer.
    pub fn into_samples(self) -> Vec<u32> {
        self.data
    }

    /// Index of the first sample of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * self.channels()
    }

    /// Returns `true` if `(x, y)` lies inside the raster.
    #[inline]
    pub fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width as usize && (y as usize) < self.height as usize
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        assert!(
            x < self.width as usize && y < self.height as usize,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        let i = self.index(x, y);
        match self.format {
            ImageFormat::Grayscale => Pixel::Gray(self.data[i]),
            ImageFormat::Rgb => Pixel::Rgb([self.data[i], self.data[i + 1], self.data[i + 2]]),
        }
    }

    /// Smallest and largest stored sample.
    pub fn sample_range(&self) -> (u32, u32) {
        self.data
            .iter()
            .fold((u32::MAX, 0), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Splits the buffer into disjoint mutable row bands.
    ///
    /// `rows` must be ascending, contiguous, start at 0 and end at `height`;
    /// empty ranges are allowed. Band `i` covers exactly `rows[i]`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pnmconv_core::{Image, ImageFormat};
    ///
    /// let mut img = Image::new(ImageFormat::Grayscale, 4, 3, 255).unwrap();
    /// let bands = img.bands_mut(&[0..1, 1..3]).unwrap();
    /// assert_eq!(bands.len(), 2);
    /// assert_eq!(bands[1].rows(), 1..3);
    /// ```
    pub fn bands_mut(&mut self, rows: &[Range<usize>]) -> Result<Vec<BandMut<'_>>> {
        let height = self.height as usize;
        let mut next = 0usize;
        for r in rows {
            if r.start != next {
                return Err(Error::invalid_region(
                    self.height,
                    format!("range {r:?} does not start at row {next}"),
                ));
            }
            if r.end < r.start || r.end > height {
                return Err(Error::invalid_region(
                    self.height,
                    format!("range {r:?} is reversed or past the last row"),
                ));
            }
            next = r.end;
        }
        if next != height {
            return Err(Error::invalid_region(
                self.height,
                format!("ranges stop at row {next}"),
            ));
        }

        let width = self.width as usize;
        let channels = self.channels();
        let max_value = self.max_value;
        let row_len = width * channels;

        let mut rest: &mut [u32] = &mut self.data;
        let mut bands = Vec::with_capacity(rows.len());
        for r in rows {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(r.len() * row_len);
            rest = tail;
            bands.push(BandMut {
                rows: r.clone(),
                width,
                channels,
                max_value,
                data: head,
            });
        }
        Ok(bands)
    }

    /// A single band spanning every row.
    pub fn full_band_mut(&mut self) -> BandMut<'_> {
        BandMut {
            rows: 0..self.height as usize,
            width: self.width as usize,
            channels: self.channels(),
            max_value: self.max_value,
            data: &mut self.data,
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("max_value", &self.max_value)
            .finish_non_exhaustive()
    }
}

/// Mutable view over a contiguous run of rows of one [`Image`].
///
/// Writes through [`put`](Self::put) are clamped to the image's white point.
pub struct BandMut<'a> {
    rows: Range<usize>,
    width: usize,
    channels: usize,
    max_value: u32,
    data: &'a mut [u32],
}

impl BandMut<'_> {
    /// Image rows covered by this band.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Row width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Stores pixel `(x, y)`, where `y` is an absolute image row.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the band or `samples.len()` differs
    /// from the channel count.
    #[inline]
    pub fn put(&mut self, x: usize, y: usize, samples: &[u32]) {
        assert!(
            x < self.width && self.rows.contains(&y),
            "pixel ({x}, {y}) outside band rows {:?}",
            self.rows
        );
        assert_eq!(samples.len(), self.channels, "channel count mismatch");
        let offset = ((y - self.rows.start) * self.width + x) * self.channels;
        let max = self.max_value;
        for (dst, &v) in self.data[offset..offset + self.channels].iter_mut().zip(samples) {
            *dst = v.min(max);
        }
    }
}

fn sample_count(format: ImageFormat, width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "width and height must be > 0",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(format.channels()))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "sample count overflows"))
}

fn check_max_value(max_value: u32) -> Result<()> {
    if max_value == 0 || max_value > MAX_SAMPLE_VALUE {
        return Err(Error::InvalidMaxValue(max_value));
    }
    Ok(())
}
