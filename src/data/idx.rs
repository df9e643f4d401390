//! IDX binary layout used by MNIST.
//!
//! # IDX3 image file
//! ```text
//! bytes  0-3:   magic 0x00000803 (big-endian u32)
//! bytes  4-7:   N     (number of images)
//! bytes  8-11:  rows  (image height in pixels)
//! bytes 12-15:  cols  (image width in pixels)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file
//! ```text
//! bytes  0-3:   magic 0x00000801 (big-endian u32)
//! bytes  4-7:   N     (number of labels)
//! bytes  8..:   N bytes, one class index per image
//! ```

use std::fmt;
use std::path::PathBuf;

pub const IMAGE_MAGIC: u32 = 0x0000_0803;
pub const LABEL_MAGIC: u32 = 0x0000_0801;
pub const IMAGE_HEADER_SIZE: u64 = 16;
pub const LABEL_HEADER_SIZE: u64 = 8;

/// Decoded image-file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
}

impl ImageHeader {
    /// `rows * cols`, or `None` if that does not fit in a `usize`.
    pub fn pixels_per_image(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Parses and validates the 16-byte header.
    ///
    /// Dimensions whose total byte size cannot be represented are rejected
    /// with `IdxError::HeaderOverflow`.
    pub fn parse(bytes: &[u8; IMAGE_HEADER_SIZE as usize]) -> Result<ImageHeader, IdxError> {
        let magic = be_u32(bytes, 0);
        if magic != IMAGE_MAGIC {
            return Err(IdxError::BadMagic { file: IdxFile::Images, found: magic, expected: IMAGE_MAGIC });
        }
        let header = ImageHeader {
            count: be_u32(bytes, 4) as usize,
            rows: be_u32(bytes, 8) as usize,
            cols: be_u32(bytes, 12) as usize,
        };
        header.required_len()?;
        Ok(header)
    }

    /// Byte offset of image `index` in the image file, or `None` on overflow.
    pub fn offset_of(&self, index: usize) -> Option<u64> {
        let pixels = u64::try_from(self.pixels_per_image()?).ok()?;
        u64::try_from(index).ok()?
            .checked_mul(pixels)?
            .checked_add(IMAGE_HEADER_SIZE)
    }

    /// Minimum file length that can hold every declared image.
    pub fn required_len(&self) -> Result<u64, IdxError> {
        self.offset_of(self.count).ok_or_else(|| self.overflow())
    }

    pub(crate) fn overflow(&self) -> IdxError {
        IdxError::HeaderOverflow { count: self.count, rows: self.rows, cols: self.cols }
    }
}

/// Parses and validates the 8-byte label header, returning the item count.
pub fn parse_label_header(bytes: &[u8; LABEL_HEADER_SIZE as usize]) -> Result<usize, IdxError> {
    let magic = be_u32(bytes, 0);
    if magic != LABEL_MAGIC {
        return Err(IdxError::BadMagic { file: IdxFile::Labels, found: magic, expected: LABEL_MAGIC });
    }
    Ok(be_u32(bytes, 4) as usize)
}

fn be_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Encodes an image file: header followed by `pixels` (already row-major).
///
/// # Panics
/// Panics if `pixels.len()` is not `count * rows * cols`.
pub fn encode_images(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
    assert_eq!(pixels.len(), count as usize * rows as usize * cols as usize, "pixel buffer does not match header");
    let mut out = Vec::with_capacity(IMAGE_HEADER_SIZE as usize + pixels.len());
    for field in [IMAGE_MAGIC, count, rows, cols] {
        out.extend_from_slice(&field.to_be_bytes());
    }
    out.extend_from_slice(pixels);
    out
}

/// Encodes a label file: header followed by one byte per label.
pub fn encode_labels(labels: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LABEL_HEADER_SIZE as usize + labels.len());
    out.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
    out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    out.extend_from_slice(labels);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdxFile {
    Images,
    Labels,
}

impl fmt::Display for IdxFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdxFile::Images => f.write_str("image"),
            IdxFile::Labels => f.write_str("label"),
        }
    }
}

/// Fatal dataset problems. None of these are retried.
#[derive(Debug)]
pub enum IdxError {
    BadMagic { file: IdxFile, found: u32, expected: u32 },
    CountMismatch { images: usize, labels: usize },
    Truncated { file: IdxFile, path: PathBuf, expected: u64, actual: u64 },
    HeaderOverflow { count: usize, rows: usize, cols: usize },
    NotOpen,
}

impl fmt::Display for IdxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdxError::BadMagic { file, found, expected } => write!(
                f,
                "Unexpected {} magic: {:#010x} (expected {:#010x})",
                file, found, expected
            ),
            IdxError::CountMismatch { images, labels } => write!(
                f,
                "Image count ({}) != label count ({})",
                images, labels
            ),
            IdxError::Truncated { file, path, expected, actual } => write!(
                f,
                "IDX {} file {} too short: need at least {} bytes, found {}",
                file,
                path.display(),
                expected,
                actual
            ),
            IdxError::HeaderOverflow { count, rows, cols } => write!(
                f,
                "IDX image header declares {} images of {}x{}, which overflows the file size",
                count, rows, cols
            ),
            IdxError::NotOpen => f.write_str("IDX stream is not open; call open() first"),
        }
    }
}

impl std::error::Error for IdxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_header_round_trips_through_encoder() {
        let bytes = encode_images(2, 2, 3, &[0; 12]);
        let header = ImageHeader::parse(bytes[..16].try_into().unwrap()).unwrap();
        assert_eq!(header, ImageHeader { count: 2, rows: 2, cols: 3 });
        assert_eq!(header.offset_of(1), Some(22));
        assert_eq!(header.required_len().unwrap(), bytes.len() as u64);
    }

    #[test]
    fn oversized_header_is_rejected_not_wrapped() {
        let mut bytes = [0xFFu8; IMAGE_HEADER_SIZE as usize];
        bytes[..4].copy_from_slice(&IMAGE_MAGIC.to_be_bytes());
        let err = ImageHeader::parse(&bytes).unwrap_err();
        assert!(matches!(
            err,
            IdxError::HeaderOverflow { count: 0xFFFF_FFFF, rows: 0xFFFF_FFFF, cols: 0xFFFF_FFFF }
        ));

        let header = ImageHeader { count: 2, rows: usize::MAX, cols: 2 };
        assert_eq!(header.pixels_per_image(), None);
        assert_eq!(header.offset_of(1), None);
        assert!(header.required_len().is_err());
    }

    #[test]
    fn label_header_rejects_image_magic() {
        let bytes = encode_images(0, 1, 1, &[]);
        let err = parse_label_header(bytes[..8].try_into().unwrap()).unwrap_err();
        assert!(matches!(err, IdxError::BadMagic { file: IdxFile::Labels, found: IMAGE_MAGIC, .. }));
    }
}
