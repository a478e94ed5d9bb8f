//! Shamir's Secret Sharing over image pixel data
//!
//! This library splits a pixel grid into `n` shares such that any `k` of
//! them reconstruct the original image exactly, while fewer than `k` reveal
//! nothing about it. Every pixel channel value is the constant term of its
//! own random polynomial over a prime field; each share is the full set of
//! polynomials evaluated at one public x-coordinate.
//!
//! Decoding image files into [`PixelGrid`]s and encoding them back is left
//! to an image I/O layer; this crate covers the field arithmetic, the
//! split/reconstruct algorithms, the compatibility checks that guard
//! reconstruction, and a file container for persisting shares.
//!
//! # Quick Start
//!
//! ```
//! use image_shamir::{FileShareStore, ImageShamir, PixelGrid, ShareStore};
//!
//! // A 2x2 grayscale image, split into 5 shares with threshold 3
//! let image = PixelGrid::grayscale(2, 2, vec![12, 200, 7, 255]).unwrap();
//! let mut scheme = ImageShamir::builder(5, 3).build().unwrap();
//! let shares = scheme.split(&image).unwrap();
//!
//! // Persist the shares
//! let temp_dir = tempfile::tempdir().unwrap();
//! let mut store = FileShareStore::new(temp_dir.path()).unwrap();
//! for share in &shares {
//!     store.store_share(share).unwrap();
//! }
//!
//! // Any 3 shares reconstruct the exact pixel grid
//! let loaded = vec![
//!     store.load_share(1).unwrap(),
//!     store.load_share(3).unwrap(),
//!     store.load_share(5).unwrap(),
//! ];
//! let restored = ImageShamir::reconstruct(&loaded).unwrap();
//! assert_eq!(restored, image);
//! ```

mod error;
mod finite_field;
mod pixel;
mod shamir;
mod storage;

pub use error::{Result, ShamirError};
pub use finite_field::{is_prime, lagrange_coeffs_at_zero, mod_inverse, next_prime};
pub use pixel::{ColorMode, ImageProperties, PixelDepth, PixelGrid};
pub use shamir::{ImageShamir, ImageShamirBuilder, Share, validate_compatible};
pub use storage::{FileShareStore, ShareStore};

// Re-export common types for convenience
pub mod prelude {
    pub use super::{
        ColorMode, FileShareStore, ImageShamir, PixelDepth, PixelGrid, Result, ShamirError, Share,
        ShareStore, validate_compatible,
    };
}
