use std::fmt;

use serde::{Deserialize, Serialize};
#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, ShamirError};
use crate::finite_field::next_prime;

/// Color layout of a pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Single channel per pixel
    Grayscale,
    /// Three interleaved channels per pixel
    Rgb,
}

impl ColorMode {
    /// Number of values stored per pixel
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Grayscale => 1,
            ColorMode::Rgb => 3,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Grayscale => write!(f, "grayscale"),
            ColorMode::Rgb => write!(f, "rgb"),
        }
    }
}

/// Narrowest unsigned integer width that holds a value range
///
/// Reconstruction produces values in [0, prime), which may be wider than the
/// secret's native byte width. The caller picks an encoding width for the
/// image I/O layer with an explicit range check instead of clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PixelDepth {
    U8,
    U16,
    U32,
}

impl PixelDepth {
    /// Narrowest width that holds every value in [0, value]
    pub fn for_max_value(value: u64) -> Self {
        if value <= u64::from(u8::MAX) {
            PixelDepth::U8
        } else if value <= u64::from(u16::MAX) {
            PixelDepth::U16
        } else {
            PixelDepth::U32
        }
    }

    /// Width in bits
    pub fn bits(self) -> u32 {
        match self {
            PixelDepth::U8 => 8,
            PixelDepth::U16 => 16,
            PixelDepth::U32 => 32,
        }
    }
}

/// Detected properties of a pixel grid
///
/// The `recommended_prime` is the smallest prime strictly above the maximum
/// pixel value, i.e. the smallest field the grid splits in without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProperties {
    pub mode: ColorMode,
    pub height: usize,
    pub width: usize,
    pub min_value: u64,
    pub max_value: u64,
    pub recommended_prime: u64,
    pub bit_depth: PixelDepth,
}

/// An immutable grid of non-negative pixel values
///
/// Row-major storage with channels interleaved: a grayscale grid holds
/// `height * width` values, an RGB grid `height * width * 3`. This is the
/// secret input to [`ImageShamir::split`](crate::ImageShamir::split) and the
/// output of [`ImageShamir::reconstruct`](crate::ImageShamir::reconstruct);
/// decoding image files into grids (and back) is the job of an image I/O
/// layer, not this crate.
///
/// With the `zeroize` feature the pixel buffer is wiped when the grid is
/// dropped.
///
/// # Example
/// ```
/// use image_shamir::{ColorMode, PixelGrid};
///
/// let grid = PixelGrid::grayscale(2, 3, vec![0, 10, 20, 30, 40, 255]).unwrap();
/// assert_eq!(grid.shape(), (2, 3));
/// assert_eq!(grid.mode(), ColorMode::Grayscale);
/// assert_eq!(grid.max_value(), 255);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "zeroize", derive(Zeroize, ZeroizeOnDrop))]
pub struct PixelGrid {
    #[cfg_attr(feature = "zeroize", zeroize(skip))]
    mode: ColorMode,
    height: usize,
    width: usize,
    data: Vec<u64>,
}

impl PixelGrid {
    /// Creates a grid, validating that the buffer matches the shape
    pub fn new(mode: ColorMode, height: usize, width: usize, data: Vec<u64>) -> Result<Self> {
        let expected = height * width * mode.channels();
        if data.len() != expected {
            return Err(ShamirError::GridShapeMismatch {
                height,
                width,
                mode,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            mode,
            height,
            width,
            data,
        })
    }

    /// Single-channel grid of `height * width` values
    pub fn grayscale(height: usize, width: usize, data: Vec<u64>) -> Result<Self> {
        Self::new(ColorMode::Grayscale, height, width, data)
    }

    /// Three-channel grid of `height * width * 3` interleaved values
    pub fn rgb(height: usize, width: usize, data: Vec<u64>) -> Result<Self> {
        Self::new(ColorMode::Rgb, height, width, data)
    }

    #[inline]
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// (height, width) of the pixel grid, channels excluded
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    /// Total number of stored values, channels included
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u64] {
        &self.data
    }

    /// Largest stored value, 0 for an empty grid
    pub fn max_value(&self) -> u64 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Smallest stored value, 0 for an empty grid
    pub fn min_value(&self) -> u64 {
        self.data.iter().copied().min().unwrap_or(0)
    }

    /// Narrowest output width that holds every value in the grid
    pub fn depth(&self) -> PixelDepth {
        PixelDepth::for_max_value(self.max_value())
    }

    /// Detects mode, value range, bit depth, and the recommended field prime
    ///
    /// # Example
    /// ```
    /// use image_shamir::PixelGrid;
    ///
    /// let grid = PixelGrid::grayscale(1, 3, vec![3, 7, 200]).unwrap();
    /// let props = grid.properties();
    /// assert_eq!(props.max_value, 200);
    /// assert_eq!(props.recommended_prime, 211);
    /// ```
    pub fn properties(&self) -> ImageProperties {
        let max_value = self.max_value();
        ImageProperties {
            mode: self.mode,
            height: self.height,
            width: self.width,
            min_value: self.min_value(),
            max_value,
            recommended_prime: next_prime(max_value),
            bit_depth: PixelDepth::for_max_value(max_value),
        }
    }

    /// Lossless downcast for 8-bit encoders; `None` if any value exceeds 255
    pub fn to_u8_pixels(&self) -> Option<Vec<u8>> {
        self.data
            .iter()
            .map(|&v| u8::try_from(v).ok())
            .collect()
    }

    /// Lossless downcast for 16-bit encoders; `None` if any value exceeds 65535
    pub fn to_u16_pixels(&self) -> Option<Vec<u16>> {
        self.data
            .iter()
            .map(|&v| u16::try_from(v).ok())
            .collect()
    }
}
