#![forbid(unsafe_code)]

//! Just has shorthands for the int reading and writing the PNG format needs.
//!
//! Every integer in a PNG is a big-endian `u32` (or a single byte), and every
//! conversion from a `usize` is checked rather than silently truncated.

use crate::{PayloadError, PayloadResult};

/// Reads a big-endian `u32` from the first 4 bytes, if there are 4 bytes.
#[inline]
#[must_use]
pub fn u32_be(bytes: &[u8]) -> Option<u32> {
  let (a, _) = try_split_off_byte_array::<4>(bytes)?;
  Some(u32::from_be_bytes(a))
}

/// Converts a length or count into the `u32` that the format stores.
#[inline]
pub fn checked_u32(value: usize) -> PayloadResult<u32> {
  u32::try_from(value).map_err(|_| PayloadError::IntegerOverflow)
}

/// `a * b`, or [`PayloadError::IntegerOverflow`].
#[inline]
pub fn checked_mul(a: usize, b: usize) -> PayloadResult<usize> {
  a.checked_mul(b).ok_or(PayloadError::IntegerOverflow)
}

/// `a + b`, or [`PayloadError::IntegerOverflow`].
#[inline]
pub fn checked_add(a: usize, b: usize) -> PayloadResult<usize> {
  a.checked_add(b).ok_or(PayloadError::IntegerOverflow)
}

pub fn try_split_off_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let a: [u8; N] = head.try_into().ok()?;
    Some((a, tail))
  } else {
    None
  }
}

#[test]
fn test_checked_u32() {
  assert_eq!(checked_u32(0), Ok(0));
  assert_eq!(checked_u32(u32::MAX as usize), Ok(u32::MAX));
  #[cfg(target_pointer_width = "64")]
  assert_eq!(checked_u32(u32::MAX as usize + 1), Err(PayloadError::IntegerOverflow));
}

#[test]
fn test_u32_be() {
  assert_eq!(u32_be(&[0, 0, 0, 3, 99]), Some(3));
  assert_eq!(u32_be(&[0xAE, 0x42, 0x60, 0x82]), Some(2923585666));
  assert_eq!(u32_be(&[1, 2, 3]), None);
}
