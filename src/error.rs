use std::io;
use thiserror::Error;

use crate::pixel::ColorMode;

/// Error type for image secret sharing operations
#[derive(Error, Debug)]
pub enum ShamirError {
    /// Invalid threshold value (must be >= 2)
    #[error("Invalid threshold value {0}, need at least 2")]
    InvalidThreshold(u16),

    /// Invalid total shares count (must be >= 1)
    #[error("Invalid share count {0}")]
    InvalidShareCount(u16),

    /// Threshold exceeds total shares
    #[error("Threshold {threshold} exceeds total shares {total_shares}")]
    ThresholdTooLarge { threshold: u16, total_shares: u16 },

    /// The configured field modulus is not prime
    #[error("Modulus {0} is not prime")]
    NotPrime(u64),

    /// A pixel value does not fit in the field
    #[error("Pixel value {value} must be less than prime {prime}")]
    SecretOutOfField { value: u64, prime: u64 },

    /// Pixel buffer length does not match the declared shape
    #[error("Pixel buffer holds {got} values but {height}x{width} {mode} needs {expected}")]
    GridShapeMismatch {
        height: usize,
        width: usize,
        mode: ColorMode,
        expected: usize,
        got: usize,
    },

    /// Insufficient shares for reconstruction
    #[error("Need at least {needed} shares, got {got}")]
    InsufficientShares { needed: u16, got: u16 },

    /// No shares were provided at all
    #[error("No shares provided")]
    EmptyShareSet,

    /// Zero has no multiplicative inverse mod p
    #[error("No inverse exists for {value} mod {prime}")]
    NoInverse { value: u64, prime: u64 },

    /// Two shares claim the same x-coordinate
    #[error("Duplicate share x-coordinate {0}")]
    DuplicateShareIndex(u16),

    /// Share x-coordinate is zero, out of range, or missing from storage
    #[error("Invalid share x-coordinate {0}")]
    InvalidShareIndex(u16),

    /// Share was created over a different field
    #[error("Share {index} uses prime {found}, expected {expected}")]
    PrimeMismatch {
        index: usize,
        expected: u64,
        found: u64,
    },

    /// Share was created from an image with a different color mode
    #[error("Share {index} has color mode {found}, expected {expected}")]
    ModeMismatch {
        index: usize,
        expected: ColorMode,
        found: ColorMode,
    },

    /// Share was created from an image with a different shape
    #[error(
        "Share {index} has shape {found_height}x{found_width}, expected {expected_height}x{expected_width}"
    )]
    ShapeMismatch {
        index: usize,
        expected_height: usize,
        expected_width: usize,
        found_height: usize,
        found_width: usize,
    },

    /// Share was created under a different threshold
    #[error("Share {index} has threshold {found}, expected {expected}")]
    ThresholdMismatch {
        index: usize,
        expected: u16,
        found: u16,
    },

    /// General I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Invalid share file format or content
    #[error("Invalid share format")]
    InvalidShareFormat,

    /// Share file is compressed but the `compress` feature is disabled
    #[error("Share file is compressed; rebuild with the `compress` feature")]
    UnsupportedCompression,

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, ShamirError>;
