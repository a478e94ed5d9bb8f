use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, ShamirError};
use crate::pixel::ColorMode;
use crate::shamir::Share;

const MAGIC_NUMBER: &[u8] = b"PXS1";
const VERSION: u8 = 1;

const FLAG_COMPRESSED: u8 = 1;

const MODE_GRAYSCALE: u8 = 0;
const MODE_RGB: u8 = 1;

/// Trait defining storage operations for image shares
///
/// Implement this trait to create custom storage backends
///
/// # Example
/// ```
/// use image_shamir::{Share, ShareStore};
///
/// struct NullStore;
///
/// impl ShareStore for NullStore {
///     fn store_share(&mut self, _: &Share) -> image_shamir::Result<()> { Ok(()) }
///     fn load_share(&self, _: u16) -> image_shamir::Result<Share> { unimplemented!() }
///     fn list_shares(&self) -> image_shamir::Result<Vec<u16>> { Ok(Vec::new()) }
///     fn delete_share(&mut self, _: u16) -> image_shamir::Result<()> { Ok(()) }
/// }
/// ```
pub trait ShareStore {
    /// Stores a share in persistent storage
    fn store_share(&mut self, share: &Share) -> Result<()>;

    /// Retrieves a share from storage by x-coordinate
    fn load_share(&self, x: u16) -> Result<Share>;

    /// Lists all available share x-coordinates
    fn list_shares(&self) -> Result<Vec<u16>>;

    /// Deletes a share from storage
    fn delete_share(&mut self, x: u16) -> Result<()>;
}

/// File system implementation of ShareStore
///
/// Stores each share as a separate file named `share_<x>` (e.g. share_001)
/// in a binary container: magic number and version to prevent format
/// confusion, the full share metadata (x-coordinate, threshold, color mode,
/// field prime, original shape), and the payload as little-endian u64 field
/// elements. The round trip is lossless for values up to `prime - 1` and
/// preserves the shape exactly.
///
/// With the `compress` feature (default) payloads are zstd-compressed and a
/// flags bit records it; loading a compressed file from a build without the
/// feature fails instead of misreading the payload.
///
/// # Example
/// ```
/// use image_shamir::{FileShareStore, ImageShamir, PixelGrid, ShareStore};
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// let mut store = FileShareStore::new(dir.path()).unwrap();
///
/// let image = PixelGrid::grayscale(1, 2, vec![5, 200]).unwrap();
/// let mut scheme = ImageShamir::builder(3, 2).with_prime(257).build().unwrap();
/// for share in scheme.split(&image).unwrap() {
///     store.store_share(&share).unwrap();
/// }
///
/// assert_eq!(store.list_shares().unwrap(), vec![1, 2, 3]);
/// let loaded = store.load_share(2).unwrap();
/// assert_eq!(loaded.x, 2);
/// ```
pub struct FileShareStore {
    /// Base directory for storing shares
    base_dir: PathBuf,
}

impl FileShareStore {
    /// Creates a new file-based store at the specified path
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Gets the path for a share file
    fn share_path(&self, x: u16) -> PathBuf {
        self.base_dir.join(format!("share_{x:03}"))
    }
}

fn mode_to_byte(mode: ColorMode) -> u8 {
    match mode {
        ColorMode::Grayscale => MODE_GRAYSCALE,
        ColorMode::Rgb => MODE_RGB,
    }
}

fn mode_from_byte(byte: u8) -> Result<ColorMode> {
    match byte {
        MODE_GRAYSCALE => Ok(ColorMode::Grayscale),
        MODE_RGB => Ok(ColorMode::Rgb),
        _ => Err(ShamirError::InvalidShareFormat),
    }
}

fn raw_payload(data: &[u64]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(data.len() * 8);
    for value in data {
        raw.extend_from_slice(&value.to_le_bytes());
    }
    raw
}

#[cfg(feature = "compress")]
fn encode_payload(data: &[u64]) -> Result<(u8, Vec<u8>)> {
    let compressed = zstd::encode_all(raw_payload(data).as_slice(), 0)
        .map_err(|e| ShamirError::StorageError(format!("compression failed: {e}")))?;
    Ok((FLAG_COMPRESSED, compressed))
}

#[cfg(not(feature = "compress"))]
fn encode_payload(data: &[u64]) -> Result<(u8, Vec<u8>)> {
    Ok((0, raw_payload(data)))
}

#[cfg(feature = "compress")]
fn decompress(payload: Vec<u8>) -> Result<Vec<u8>> {
    zstd::decode_all(payload.as_slice())
        .map_err(|e| ShamirError::StorageError(format!("decompression failed: {e}")))
}

#[cfg(not(feature = "compress"))]
fn decompress(_payload: Vec<u8>) -> Result<Vec<u8>> {
    Err(ShamirError::UnsupportedCompression)
}

fn decode_payload(flags: u8, payload: Vec<u8>, count: usize) -> Result<Vec<u64>> {
    let raw = if flags & FLAG_COMPRESSED != 0 {
        decompress(payload)?
    } else {
        payload
    };

    if raw.len() != count * 8 {
        return Err(ShamirError::InvalidShareFormat);
    }

    Ok(raw
        .chunks_exact(8)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}

impl ShareStore for FileShareStore {
    fn store_share(&mut self, share: &Share) -> Result<()> {
        if share.x == 0 {
            return Err(ShamirError::InvalidShareIndex(0));
        }
        let height = u32::try_from(share.height)
            .map_err(|_| ShamirError::StorageError("grid height exceeds container limit".into()))?;
        let width = u32::try_from(share.width)
            .map_err(|_| ShamirError::StorageError("grid width exceeds container limit".into()))?;

        let (flags, payload) = encode_payload(&share.data)?;

        let path = self.share_path(share.x);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Header
        writer.write_all(MAGIC_NUMBER)?;
        writer.write_all(&[VERSION])?;
        writer.write_all(&[flags])?;

        // Metadata
        writer.write_all(&[mode_to_byte(share.mode)])?;
        writer.write_all(&share.x.to_le_bytes())?;
        writer.write_all(&share.threshold.to_le_bytes())?;
        writer.write_all(&share.prime.to_le_bytes())?;
        writer.write_all(&height.to_le_bytes())?;
        writer.write_all(&width.to_le_bytes())?;

        // Payload
        writer.write_all(&(share.data.len() as u64).to_le_bytes())?;
        writer.write_all(&(payload.len() as u64).to_le_bytes())?;
        writer.write_all(&payload)?;
        writer.flush()?;

        Ok(())
    }

    fn load_share(&self, x: u16) -> Result<Share> {
        let path = self.share_path(x);
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ShamirError::InvalidShareIndex(x)
            } else {
                e.into()
            }
        })?;

        // Read and verify header
        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if magic != MAGIC_NUMBER {
            return Err(ShamirError::InvalidShareFormat);
        }

        let mut version = [0u8; 1];
        file.read_exact(&mut version)?;
        if version[0] > VERSION {
            return Err(ShamirError::InvalidShareFormat);
        }

        let mut flags = [0u8; 1];
        file.read_exact(&mut flags)?;

        // Metadata
        let mut mode_byte = [0u8; 1];
        file.read_exact(&mut mode_byte)?;
        let mode = mode_from_byte(mode_byte[0])?;

        let mut u16_buf = [0u8; 2];
        file.read_exact(&mut u16_buf)?;
        let stored_x = u16::from_le_bytes(u16_buf);
        if stored_x != x {
            return Err(ShamirError::InvalidShareFormat);
        }
        file.read_exact(&mut u16_buf)?;
        let threshold = u16::from_le_bytes(u16_buf);

        let mut u64_buf = [0u8; 8];
        file.read_exact(&mut u64_buf)?;
        let prime = u64::from_le_bytes(u64_buf);

        let mut u32_buf = [0u8; 4];
        file.read_exact(&mut u32_buf)?;
        let height = u32::from_le_bytes(u32_buf) as usize;
        file.read_exact(&mut u32_buf)?;
        let width = u32::from_le_bytes(u32_buf) as usize;

        // Payload
        file.read_exact(&mut u64_buf)?;
        let count = u64::from_le_bytes(u64_buf) as usize;
        file.read_exact(&mut u64_buf)?;
        let payload_len = u64::from_le_bytes(u64_buf) as usize;

        let mut payload = vec![0u8; payload_len];
        file.read_exact(&mut payload)?;
        let data = decode_payload(flags[0], payload, count)?;

        Ok(Share {
            x,
            data,
            prime,
            mode,
            height,
            width,
            threshold,
        })
    }

    fn list_shares(&self) -> Result<Vec<u16>> {
        let mut xs = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if let Some(stripped) = file_name.strip_prefix("share_") {
                if let Ok(x) = stripped.parse::<u16>() {
                    xs.push(x);
                }
            }
        }

        xs.sort_unstable();
        Ok(xs)
    }

    fn delete_share(&mut self, x: u16) -> Result<()> {
        let path = self.share_path(x);
        fs::remove_file(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ShamirError::InvalidShareIndex(x)
            } else {
                e.into()
            }
        })?;
        Ok(())
    }
}
