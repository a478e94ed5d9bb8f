use rand::Rng;
use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, ShamirError};
use crate::finite_field::{add_mod, is_prime, lagrange_coeffs_at_zero, mul_mod, next_prime};
use crate::pixel::{ColorMode, PixelGrid};

/// One share of a split image
///
/// Holds the per-position polynomial evaluations at this share's
/// x-coordinate, plus the metadata every share of a batch agrees on: the
/// field prime, the color mode and shape of the source grid, and the
/// reconstruction threshold. Values are stored as full field elements, wide
/// enough for anything up to `prime - 1` regardless of the source image's
/// byte width.
///
/// A share alone reveals nothing about the image; only `threshold` or more
/// compatible shares do.
///
/// # Example
/// ```
/// use image_shamir::{ImageShamir, PixelGrid};
///
/// let image = PixelGrid::grayscale(1, 1, vec![5]).unwrap();
/// let mut scheme = ImageShamir::builder(3, 2).with_prime(257).build().unwrap();
/// let shares = scheme.split(&image).unwrap();
///
/// assert_eq!(shares[0].x, 1);
/// assert_eq!(shares[0].prime, 257);
/// assert_eq!(shares[0].threshold, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "zeroize", derive(Zeroize, ZeroizeOnDrop))]
pub struct Share {
    /// Public x-coordinate the polynomials were evaluated at, in [1, n]
    pub x: u16,
    /// Field elements in [0, prime), one per pixel channel value
    pub data: Vec<u64>,
    /// Prime modulus of the field this share lives in
    pub prime: u64,
    /// Color mode of the source grid
    #[cfg_attr(feature = "zeroize", zeroize(skip))]
    pub mode: ColorMode,
    /// Height of the source grid
    pub height: usize,
    /// Width of the source grid
    pub width: usize,
    /// Minimum number of shares required for reconstruction
    pub threshold: u16,
}

impl Share {
    /// (height, width) of the source grid
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Shamir's Secret Sharing scheme over image pixel data
///
/// Every pixel channel value becomes the constant term of its own random
/// polynomial of degree `threshold - 1` over GF(prime); share x holds all
/// polynomials evaluated at x. Coefficients come from a ChaCha20 CSPRNG
/// seeded from the operating system, or from an explicit seed for
/// reproducible output.
///
/// # Example
/// ```
/// use image_shamir::{ImageShamir, PixelGrid};
///
/// let image = PixelGrid::grayscale(2, 2, vec![12, 200, 7, 255]).unwrap();
/// let mut scheme = ImageShamir::builder(5, 3).with_prime(257).build().unwrap();
///
/// let shares = scheme.split(&image).unwrap();
/// assert_eq!(shares.len(), 5);
///
/// let restored = ImageShamir::reconstruct(&shares[2..5]).unwrap();
/// assert_eq!(restored, image);
/// ```
pub struct ImageShamir {
    /// Total number of shares to generate
    total_shares: u16,
    /// Minimum number of shares needed for reconstruction
    threshold: u16,
    /// Field prime; `None` derives the smallest prime above each image's max
    prime: Option<u64>,
    /// Source of polynomial coefficients
    rng: ChaCha20Rng,
}

/// Builder for [`ImageShamir`] instances
///
/// # Example
/// ```
/// use image_shamir::ImageShamir;
///
/// let scheme = ImageShamir::builder(5, 3)
///     .with_prime(257)
///     .with_seed([7u8; 32])
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct ImageShamirBuilder {
    total_shares: u16,
    threshold: u16,
    prime: Option<u64>,
    seed: Option<[u8; 32]>,
}

impl ImageShamirBuilder {
    /// Creates a builder for `total_shares` shares with threshold `threshold`
    pub fn new(total_shares: u16, threshold: u16) -> Self {
        Self {
            total_shares,
            threshold,
            prime: None,
            seed: None,
        }
    }

    /// Fixes the field prime instead of deriving it per image
    ///
    /// The prime must exceed every pixel value of any image later split
    /// under it; `split` rejects images that do not fit.
    pub fn with_prime(mut self, prime: u64) -> Self {
        self.prime = Some(prime);
        self
    }

    /// Seeds the coefficient generator for reproducible shares
    ///
    /// Without a seed the generator is seeded from the operating system.
    /// Fixed seeds are for tests; reproducible shares are not hiding
    /// anything.
    pub fn with_seed(mut self, seed: [u8; 32]) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the scheme with validation
    ///
    /// # Errors
    /// - `InvalidShareCount` if `total_shares` is 0
    /// - `InvalidThreshold` if `threshold` < 2
    /// - `ThresholdTooLarge` if `threshold` > `total_shares`
    /// - `NotPrime` if a supplied prime fails the primality test
    pub fn build(self) -> Result<ImageShamir> {
        if self.total_shares == 0 {
            return Err(ShamirError::InvalidShareCount(self.total_shares));
        }
        if self.threshold < 2 {
            return Err(ShamirError::InvalidThreshold(self.threshold));
        }
        if self.threshold > self.total_shares {
            return Err(ShamirError::ThresholdTooLarge {
                threshold: self.threshold,
                total_shares: self.total_shares,
            });
        }
        if let Some(prime) = self.prime {
            if !is_prime(prime) {
                return Err(ShamirError::NotPrime(prime));
            }
        }

        let rng = match self.seed {
            Some(seed) => ChaCha20Rng::from_seed(seed),
            None => ChaCha20Rng::try_from_rng(&mut OsRng).unwrap(),
        };

        Ok(ImageShamir {
            total_shares: self.total_shares,
            threshold: self.threshold,
            prime: self.prime,
            rng,
        })
    }
}

impl ImageShamir {
    /// Creates a builder for configuring an ImageShamir instance
    pub fn builder(total_shares: u16, threshold: u16) -> ImageShamirBuilder {
        ImageShamirBuilder::new(total_shares, threshold)
    }

    /// Total number of shares generated per split
    #[inline]
    pub fn total_shares(&self) -> u16 {
        self.total_shares
    }

    /// Minimum number of shares needed for reconstruction
    #[inline]
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Configured field prime, if fixed at build time
    #[inline]
    pub fn prime(&self) -> Option<u64> {
        self.prime
    }

    /// Splits a pixel grid into `total_shares` shares
    ///
    /// Each element position gets its own polynomial: the secret value as
    /// constant term plus `threshold - 1` uniform random coefficients in
    /// [0, prime). All coefficients are drawn in one pass before evaluation,
    /// so positions stay independent when the per-coordinate evaluation runs
    /// in parallel. Share x holds every polynomial evaluated at x by Horner
    /// accumulation mod prime.
    ///
    /// Without a configured prime the field is the smallest prime above the
    /// grid's maximum value.
    ///
    /// # Errors
    /// - `SecretOutOfField` if any pixel value does not fit the field;
    ///   values are never wrapped
    /// - `InvalidShareCount` if the coordinate range 1..=n does not stay
    ///   distinct mod prime (requires n < prime)
    ///
    /// # Example
    /// ```
    /// use image_shamir::{ImageShamir, PixelGrid};
    ///
    /// let image = PixelGrid::grayscale(1, 2, vec![9, 33]).unwrap();
    /// let mut scheme = ImageShamir::builder(3, 2).build().unwrap();
    /// let shares = scheme.split(&image).unwrap();
    /// assert_eq!(shares.iter().map(|s| s.x).collect::<Vec<_>>(), vec![1, 2, 3]);
    /// ```
    pub fn split(&mut self, image: &PixelGrid) -> Result<Vec<Share>> {
        let prime = match self.prime {
            Some(p) => p,
            None => next_prime(image.max_value()),
        };

        if let Some(&value) = image.as_slice().iter().find(|&&v| v >= prime) {
            return Err(ShamirError::SecretOutOfField { value, prime });
        }
        // x = 1..=n must stay distinct and nonzero mod prime
        if u64::from(self.total_shares) >= prime {
            return Err(ShamirError::InvalidShareCount(self.total_shares));
        }

        let secrets = image.as_slice();
        let positions = secrets.len();
        let k = self.threshold as usize;

        // Coefficient j for position idx lives at idx * (k - 1) + (j - 1).
        // Drawn in one bulk pass so the parallel evaluation below never
        // touches the rng.
        let mut coefficients = vec![0u64; positions * (k - 1)];
        for coefficient in coefficients.iter_mut() {
            *coefficient = self.rng.random_range(0..prime);
        }

        let mode = image.mode();
        let (height, width) = image.shape();
        let threshold = self.threshold;

        let x_values: Vec<u16> = (1..=self.total_shares).collect();
        let shares: Vec<Share> = x_values
            .into_par_iter()
            .map(|x| {
                let xf = u64::from(x);
                let data: Vec<u64> = (0..positions)
                    .map(|idx| {
                        // Horner evaluation, highest coefficient first
                        let mut acc = 0u64;
                        for j in (0..k).rev() {
                            let coeff = if j == 0 {
                                secrets[idx]
                            } else {
                                coefficients[idx * (k - 1) + (j - 1)]
                            };
                            acc = add_mod(mul_mod(acc, xf, prime), coeff, prime);
                        }
                        acc
                    })
                    .collect();

                Share {
                    x,
                    data,
                    prime,
                    mode,
                    height,
                    width,
                    threshold,
                }
            })
            .collect();

        Ok(shares)
    }

    /// Reconstructs the pixel grid from `threshold` or more shares
    ///
    /// Computes the Lagrange basis at x = 0 once for the supplied
    /// coordinates, then collapses every element position independently:
    /// `secret = sum_i y_i * L_i (mod prime)`. Positions are processed in
    /// parallel. Supplying more than `threshold` consistent shares yields
    /// the same grid.
    ///
    /// The threshold recorded in the share metadata is enforced here, so
    /// reconstruction from too few honest shares fails instead of returning
    /// a plausible-looking wrong image. Shares whose metadata was forged to
    /// a lower threshold still reconstruct to garbage; nothing in the scheme
    /// can detect that.
    ///
    /// # Errors
    /// - `EmptyShareSet` / `InsufficientShares` on too few shares
    /// - compatibility errors from [`validate_compatible`]
    /// - `InvalidShareIndex` / `DuplicateShareIndex` on degenerate
    ///   x-coordinates
    ///
    /// # Example
    /// ```
    /// use image_shamir::{ImageShamir, PixelGrid};
    ///
    /// let image = PixelGrid::grayscale(1, 1, vec![5]).unwrap();
    /// let mut scheme = ImageShamir::builder(3, 2).with_prime(257).build().unwrap();
    /// let shares = scheme.split(&image).unwrap();
    ///
    /// // Shares at x = 1 and x = 3
    /// let subset = vec![shares[0].clone(), shares[2].clone()];
    /// assert_eq!(ImageShamir::reconstruct(&subset).unwrap(), image);
    /// ```
    pub fn reconstruct(shares: &[Share]) -> Result<PixelGrid> {
        let first = shares.first().ok_or(ShamirError::EmptyShareSet)?;

        validate_compatible(shares)?;

        let needed = first.threshold.max(2);
        if shares.len() < needed as usize {
            return Err(ShamirError::InsufficientShares {
                needed,
                got: shares.len() as u16,
            });
        }

        for (i, share) in shares.iter().enumerate() {
            if share.x == 0 {
                return Err(ShamirError::InvalidShareIndex(0));
            }
            if shares[..i].iter().any(|other| other.x == share.x) {
                return Err(ShamirError::DuplicateShareIndex(share.x));
            }
        }

        let prime = first.prime;
        let positions = first.height * first.width * first.mode.channels();
        if shares.iter().any(|s| s.data.len() != positions) {
            return Err(ShamirError::InvalidShareFormat);
        }

        let xs: Vec<u64> = shares.iter().map(|s| u64::from(s.x)).collect();
        let coeffs = lagrange_coeffs_at_zero(&xs, prime)?;

        let data: Vec<u64> = (0..positions)
            .into_par_iter()
            .map(|idx| {
                shares
                    .iter()
                    .zip(&coeffs)
                    .fold(0u64, |acc, (share, &li)| {
                        add_mod(acc, mul_mod(share.data[idx] % prime, li, prime), prime)
                    })
            })
            .collect();

        PixelGrid::new(first.mode, first.height, first.width, data)
    }
}

/// Checks that a set of shares can be reconstructed together
///
/// Pure metadata check: every share must agree with the first share on
/// prime, color mode, original shape, and threshold. The first offending
/// share's index is named in the error. Pixel data is never touched.
///
/// [`ImageShamir::reconstruct`] runs this before any arithmetic; callers
/// loading shares from disk can run it early to fail before allocating for
/// reconstruction.
pub fn validate_compatible(shares: &[Share]) -> Result<()> {
    let first = shares.first().ok_or(ShamirError::EmptyShareSet)?;

    for (index, share) in shares.iter().enumerate().skip(1) {
        if share.prime != first.prime {
            return Err(ShamirError::PrimeMismatch {
                index,
                expected: first.prime,
                found: share.prime,
            });
        }
        if share.mode != first.mode {
            return Err(ShamirError::ModeMismatch {
                index,
                expected: first.mode,
                found: share.mode,
            });
        }
        if share.shape() != first.shape() {
            return Err(ShamirError::ShapeMismatch {
                index,
                expected_height: first.height,
                expected_width: first.width,
                found_height: share.height,
                found_width: share.width,
            });
        }
        if share.threshold != first.threshold {
            return Err(ShamirError::ThresholdMismatch {
                index,
                expected: first.threshold,
                found: share.threshold,
            });
        }
    }

    Ok(())
}
