#![forbid(unsafe_code)]

//! Mapping payload bytes onto the pixels of an 8-bit RGB image, and back.
//!
//! The payload is first framed with its own length as a big-endian `u32`, so
//! that real trailing zero bytes can be told apart from the zero padding at
//! the end of the image. The framed bytes then fill a square image row by
//! row, three bytes per pixel. Every row starts with the filter type byte,
//! which is always 0 ("none").
//!
//! ```text
//! row 0: [0][len len len len p0 p1 ...]
//! row 1: [0][...                      ]
//! row n: [0][... pN 0 0 0 0 0 0 0 0 0 ]
//! ```

use alloc::{vec, vec::Vec};

use crate::{
  parser_helpers::{checked_add, checked_mul, checked_u32, try_split_off_byte_array},
  PayloadError, PayloadResult,
};

/// The filter type byte written at the start of every row.
pub const FILTER_NONE: u8 = 0;

/// Bytes used by the payload length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Bytes per pixel of 8-bit truecolor.
pub const BYTES_PER_PIXEL: usize = 3;

/// An `[r, g, b]` pixel.
pub type RGB8 = [u8; 3];

/// Pixel data laid out as PNG scanlines, each with a leading filter byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelGrid {
  bytes: Vec<u8>,
  width: u32,
  height: u32,
}
impl PixelGrid {
  /// Wraps existing scanline bytes, checking that the size matches.
  pub fn from_scanlines(bytes: Vec<u8>, width: u32, height: u32) -> PayloadResult<Self> {
    let expected = grid_len(width, height)?;
    if bytes.len() != expected {
      return Err(PayloadError::GridSizeMismatch { expected, actual: bytes.len() });
    }
    Ok(Self { bytes, width, height })
  }
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }
  /// All scanlines, filter bytes included.
  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }
  #[inline]
  #[must_use]
  pub fn into_bytes(self) -> Vec<u8> {
    self.bytes
  }
  /// The pixels of row `y`, without the filter byte.
  #[must_use]
  pub fn row_pixels(&self, y: u32) -> Option<&[RGB8]> {
    if y >= self.height {
      return None;
    }
    let line_len = 1 + (self.width as usize) * BYTES_PER_PIXEL;
    let start = (y as usize).checked_mul(line_len)?;
    let line = self.bytes.get(start..start.checked_add(line_len)?)?;
    bytemuck::try_cast_slice(&line[1..]).ok()
  }
  /// Recovers the payload that was stored in this grid.
  #[inline]
  pub fn to_payload(&self) -> PayloadResult<Vec<u8>> {
    grid_to_payload(&self.bytes, self.width, self.height)
  }
}

/// Bytes in one scanline: the filter byte, then the pixels.
#[inline]
pub fn filterline_len(width: u32) -> PayloadResult<usize> {
  checked_add(1, checked_mul(width as usize, BYTES_PER_PIXEL)?)
}

/// Bytes in all the scanlines of an image, `height * (1 + width * 3)`.
#[inline]
pub fn grid_len(width: u32, height: u32) -> PayloadResult<usize> {
  checked_mul(filterline_len(width)?, height as usize)
}

/// Smallest `r` with `r * r >= n`.
fn ceil_isqrt(n: u64) -> u64 {
  let (mut lo, mut hi) = (0_u64, 1_u64 << 32);
  while lo < hi {
    let mid = lo + (hi - lo) / 2;
    if mid * mid >= n {
      hi = mid;
    } else {
      lo = mid + 1;
    }
  }
  lo
}

/// The width (and height) of the square image that holds `framed_len` bytes.
///
/// This is `3 * ceil(ceil(sqrt(framed_len / 3)) / 3)`: enough pixels for the
/// data, rounded up to a multiple of 3.
pub fn grid_side_for(framed_len: usize) -> PayloadResult<u32> {
  if framed_len == 0 {
    return Err(PayloadError::EmptyPayload);
  }
  let cells = u64::try_from(framed_len)?.div_ceil(BYTES_PER_PIXEL as u64);
  let side = ceil_isqrt(cells).div_ceil(3) * 3;
  Ok(u32::try_from(side)?)
}

/// Lays the payload out as the scanlines of a square RGB image.
///
/// ## Failure
/// * [`PayloadError::EmptyPayload`] for a zero length payload.
/// * [`PayloadError::IntegerOverflow`] if the payload length doesn't fit in a
///   `u32`, or the image size doesn't fit in memory.
pub fn payload_to_grid(payload: &[u8]) -> PayloadResult<PixelGrid> {
  if payload.is_empty() {
    return Err(PayloadError::EmptyPayload);
  }
  let declared = checked_u32(payload.len())?;
  let side = grid_side_for(checked_add(LENGTH_PREFIX_LEN, payload.len())?)?;
  let line_len = filterline_len(side)?;

  let mut bytes = vec![0_u8; grid_len(side, side)?];
  let mut rest = payload;
  for (y, line) in bytes.chunks_exact_mut(line_len).enumerate() {
    line[0] = FILTER_NONE;
    // the prefix always fits in the first row, sides are at least 3
    let pixels = if y == 0 {
      let (prefix, pixels) = line[1..].split_at_mut(LENGTH_PREFIX_LEN);
      prefix.copy_from_slice(&declared.to_be_bytes());
      pixels
    } else {
      &mut line[1..]
    };
    let n = pixels.len().min(rest.len());
    pixels[..n].copy_from_slice(&rest[..n]);
    rest = &rest[n..];
  }
  debug_assert!(rest.is_empty());
  log::debug!("{} payload bytes laid out as a {side}x{side} grid", payload.len());
  Ok(PixelGrid { bytes, width: side, height: side })
}

/// Strips the filter bytes from each scanline and recovers the payload using
/// its length prefix.
///
/// ## Failure
/// * [`PayloadError::GridSizeMismatch`] if the bytes aren't exactly the size
///   that the dimensions call for.
/// * [`PayloadError::UnsupportedFilter`] if any row isn't filter type 0.
/// * [`PayloadError::PayloadLengthMismatch`] if the length prefix claims more
///   bytes than the grid stores.
pub fn grid_to_payload(bytes: &[u8], width: u32, height: u32) -> PayloadResult<Vec<u8>> {
  if width == 0 || height == 0 {
    return Err(PayloadError::MalformedHeader);
  }
  let line_len = filterline_len(width)?;
  let expected = grid_len(width, height)?;
  if bytes.len() != expected {
    return Err(PayloadError::GridSizeMismatch { expected, actual: bytes.len() });
  }
  let mut framed: Vec<u8> = Vec::with_capacity(expected - height as usize);
  for (row, line) in (0_u32..).zip(bytes.chunks_exact(line_len)) {
    match line.split_first() {
      Some((&FILTER_NONE, pixels)) => framed.extend_from_slice(pixels),
      Some((&marker, _)) => return Err(PayloadError::UnsupportedFilter { row, marker }),
      None => return Err(PayloadError::TruncatedBuffer),
    }
  }
  let (prefix, rest) =
    try_split_off_byte_array::<LENGTH_PREFIX_LEN>(&framed).ok_or(PayloadError::TruncatedBuffer)?;
  let declared = u32::from_be_bytes(prefix);
  if declared == 0 {
    return Err(PayloadError::EmptyPayload);
  }
  if declared as usize > rest.len() {
    return Err(PayloadError::PayloadLengthMismatch { declared, available: rest.len() });
  }
  framed.drain(..LENGTH_PREFIX_LEN);
  framed.truncate(declared as usize);
  Ok(framed)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_grid_side_for() {
    assert_eq!(grid_side_for(0), Err(PayloadError::EmptyPayload));
    for (len, ex) in [(1, 3), (2, 3), (6, 3), (27, 3), (28, 6), (108, 6), (109, 9)] {
      assert_eq!(grid_side_for(len), Ok(ex), "failed len: {len}");
    }
    // always a multiple of 3, always big enough
    for len in 1..2000 {
      let side = grid_side_for(len).unwrap() as usize;
      assert_eq!(side % 3, 0);
      assert!(side * side * 3 >= len, "failed len: {len}");
    }
  }

  #[test]
  fn test_hi_layout() {
    let grid = payload_to_grid(b"hi").unwrap();
    assert_eq!((grid.width(), grid.height()), (3, 3));
    assert_eq!(grid.as_bytes().len(), 30);
    assert_eq!(
      &grid.as_bytes()[..10],
      &[FILTER_NONE, 0, 0, 0, 2, b'h', b'i', 0, 0, 0]
    );
    // every row starts with a filter byte of 0
    assert!(grid.as_bytes().chunks_exact(10).all(|line| line[0] == FILTER_NONE));
    assert_eq!(grid.row_pixels(0), Some(&[[0, 0, 0], [2, b'h', b'i'], [0, 0, 0]][..]));
    assert_eq!(grid.row_pixels(3), None);
    assert_eq!(grid.to_payload().unwrap(), b"hi");
  }

  #[test]
  fn test_payload_spanning_rows() {
    let payload: Vec<u8> = (1..=200_u8).collect();
    let grid = payload_to_grid(&payload).unwrap();
    let line_len = filterline_len(grid.width()).unwrap();
    assert!(grid.height() > 1);
    for line in grid.as_bytes().chunks_exact(line_len) {
      assert_eq!(line[0], FILTER_NONE);
    }
    assert_eq!(grid.to_payload().unwrap(), payload);
  }

  #[test]
  fn test_trailing_zeros_survive() {
    let payload = [7, 0, 0, 0, 0];
    let grid = payload_to_grid(&payload).unwrap();
    assert_eq!(grid.to_payload().unwrap(), payload);
    let zeros = [0_u8; 40];
    assert_eq!(payload_to_grid(&zeros).unwrap().to_payload().unwrap(), zeros);
  }

  #[test]
  fn test_empty_payload_rejected() {
    assert_eq!(payload_to_grid(&[]), Err(PayloadError::EmptyPayload));
  }

  #[test]
  fn test_grid_to_payload_errors() {
    let grid = payload_to_grid(b"hello").unwrap();
    let (w, h) = (grid.width(), grid.height());
    let mut bytes = grid.into_bytes();

    assert_eq!(
      grid_to_payload(&bytes[1..], w, h),
      Err(PayloadError::GridSizeMismatch { expected: bytes.len(), actual: bytes.len() - 1 })
    );
    assert_eq!(grid_to_payload(&bytes, 0, h), Err(PayloadError::MalformedHeader));

    bytes[10] = 4;
    assert_eq!(
      grid_to_payload(&bytes, w, h),
      Err(PayloadError::UnsupportedFilter { row: 1, marker: 4 })
    );
    bytes[10] = FILTER_NONE;

    // claim more than a 3x3 grid can hold
    bytes[1..5].copy_from_slice(&100_u32.to_be_bytes());
    assert_eq!(
      grid_to_payload(&bytes, w, h),
      Err(PayloadError::PayloadLengthMismatch { declared: 100, available: 23 })
    );

    bytes[1..5].copy_from_slice(&0_u32.to_be_bytes());
    assert_eq!(grid_to_payload(&bytes, w, h), Err(PayloadError::EmptyPayload));
  }

  #[test]
  fn test_from_scanlines() {
    assert!(PixelGrid::from_scanlines(vec![0; 30], 3, 3).is_ok());
    assert_eq!(
      PixelGrid::from_scanlines(vec![0; 29], 3, 3),
      Err(PayloadError::GridSizeMismatch { expected: 30, actual: 29 })
    );
  }
}
