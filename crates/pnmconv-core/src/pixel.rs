//! Single-pixel value type.

/// One pixel's samples: a scalar for grayscale, a triple for RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    /// Grayscale intensity.
    Gray(u32),
    /// Red, green, blue.
    Rgb([u32; 3]),
}

impl Pixel {
    /// Samples in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        match self {
            Self::Gray(v) => std::slice::from_ref(v),
            Self::Rgb(rgb) => rgb,
        }
    }
}

impl From<[u32; 1]> for Pixel {
    #[inline]
    fn from(v: [u32; 1]) -> Self {
        Self::Gray(v[0])
    }
}

impl From<[u32; 3]> for Pixel {
    #[inline]
    fn from(rgb: [u32; 3]) -> Self {
        Self::Rgb(rgb)
    }
}
