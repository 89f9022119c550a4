//! Raster format discriminator.
//!
//! The ASCII pixel-map family has two members this crate handles:
//!
//! | Variant | Tag | Channels | Extension |
//! |---------|-----|----------|-----------|
//! | [`ImageFormat::Grayscale`] | `P2` | 1 | `pgm` |
//! | [`ImageFormat::Rgb`] | `P3` | 3 | `ppm` |

use std::fmt;

/// Grayscale or RGB raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// One sample per pixel (`P2`).
    Grayscale,
    /// Three interleaved samples per pixel, R G B (`P3`).
    Rgb,
}

impl ImageFormat {
    /// Number of samples per pixel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Rgb => 3,
        }
    }

    /// Two-character header tag.
    #[inline]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Grayscale => "P2",
            Self::Rgb => "P3",
        }
    }

    /// Conventional file extension, without the dot.
    #[inline]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Grayscale => "pgm",
            Self::Rgb => "ppm",
        }
    }

    /// Looks up a format from its header tag.
    ///
    /// ```rust
    /// use pnmconv_core::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_tag("P3"), Some(ImageFormat::Rgb));
    /// assert_eq!(ImageFormat::from_tag("P6"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "P2" => Some(Self::Grayscale),
            "P3" => Some(Self::Rgb),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale => write!(f, "grayscale ({})", self.tag()),
            Self::Rgb => write!(f, "rgb ({})", self.tag()),
        }
    }
}
