#![forbid(unsafe_code)]

//! The checksum and compression capabilities that the chunk code relies on.
//!
//! Chunk building and parsing only ever talk to these two traits, so they can
//! be tested with stub implementations. The crate supplies a table driven
//! [`Crc32`] and, with the `miniz_oxide` feature, a zlib [`ZlibProvider`].

use alloc::vec::Vec;

use crate::PayloadResult;

/// Computes the CRC-32 used by PNG chunks.
pub trait ChecksumProvider {
  /// The CRC of all the bytes given.
  fn crc32(&self, bytes: &[u8]) -> u32;

  /// The CRC of a chunk, which covers the type tag followed by the data.
  ///
  /// The default impl copies both into one buffer, implementors that can
  /// continue a running CRC should override this.
  fn chunk_crc(&self, chunk_type: [u8; 4], data: &[u8]) -> u32 {
    let mut buf = Vec::with_capacity(4 + data.len());
    buf.extend_from_slice(&chunk_type);
    buf.extend_from_slice(data);
    self.crc32(&buf)
  }

  /// The CRC of `a ++ b`, from the CRC of `a`, the CRC of `b`, and the length
  /// of `b`.
  ///
  /// A scan uses this to check many overlapping ranges of one buffer while
  /// only running [`crc32`](ChecksumProvider::crc32) over each byte once.
  fn crc32_combine(&self, crc_a: u32, crc_b: u32, len_b: usize) -> u32;
}

/// Compresses and decompresses a zlib data stream.
pub trait CompressionProvider {
  /// Compresses the bytes into a complete zlib stream.
  fn deflate(&self, raw: &[u8]) -> Vec<u8>;

  /// Decompresses a zlib stream.
  ///
  /// Producing more than `limit` bytes of output is an error.
  fn inflate(&self, compressed: &[u8], limit: usize) -> PayloadResult<Vec<u8>>;
}

const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      //
      k += 1;
    }
    out[n] = c;
    //
    n += 1;
  }
  out
}

fn update_crc(mut crc: u32, iter: impl Iterator<Item = u8>) -> u32 {
  for byte in iter {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// Multiplies two polynomials modulo the CRC polynomial, in the reflected bit
/// order. `a` must be non-zero.
const fn mult_mod_p(a: u32, mut b: u32) -> u32 {
  let mut m = 1_u32 << 31;
  let mut p = 0;
  loop {
    if (a & m) != 0 {
      p ^= b;
      if (a & (m - 1)) == 0 {
        return p;
      }
    }
    m >>= 1;
    b = if (b & 1) != 0 { (b >> 1) ^ 0xEDB8_8320_u32 } else { b >> 1 };
  }
}

/// `x^(2^k)` modulo the CRC polynomial, at index `k`.
const X2N_TABLE: [u32; 32] = make_x2n_table();

const fn make_x2n_table() -> [u32; 32] {
  let mut out = [0; 32];
  // x^1
  let mut p = 1_u32 << 30;
  out[0] = p;
  let mut n = 1;
  while n < 32 {
    p = mult_mod_p(p, p);
    out[n] = p;
    n += 1;
  }
  out
}

/// `x^(8 * len)` modulo the CRC polynomial: moving a CRC past `len` bytes.
fn x8n_mod_p(mut len: usize) -> u32 {
  // x^0
  let mut p = 1_u32 << 31;
  let mut k = 3;
  while len != 0 {
    if (len & 1) != 0 {
      p = mult_mod_p(X2N_TABLE[k & 31], p);
    }
    len >>= 1;
    k += 1;
  }
  p
}

/// Standard CRC-32 (reflected, polynomial `0xEDB88320`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Crc32;
impl ChecksumProvider for Crc32 {
  #[inline]
  fn crc32(&self, bytes: &[u8]) -> u32 {
    update_crc(u32::MAX, bytes.iter().copied()) ^ u32::MAX
  }
  #[inline]
  fn chunk_crc(&self, chunk_type: [u8; 4], data: &[u8]) -> u32 {
    update_crc(u32::MAX, chunk_type.iter().copied().chain(data.iter().copied())) ^ u32::MAX
  }
  #[inline]
  fn crc32_combine(&self, crc_a: u32, crc_b: u32, len_b: usize) -> u32 {
    mult_mod_p(x8n_mod_p(len_b), crc_a) ^ crc_b
  }
}

/// Zlib compression through `miniz_oxide`.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZlibProvider {
  level: u8,
}
#[cfg(feature = "miniz_oxide")]
impl ZlibProvider {
  /// Compression levels go from 0 (store only) to 10 (slowest), anything
  /// higher is clamped to 10.
  #[inline]
  #[must_use]
  pub const fn new(level: u8) -> Self {
    Self { level: if level > 10 { 10 } else { level } }
  }
  /// Uses the compression level from the config.
  #[inline]
  #[must_use]
  pub const fn from_config(config: &crate::Config) -> Self {
    Self::new(config.compression_level)
  }
  #[inline]
  #[must_use]
  pub const fn level(&self) -> u8 {
    self.level
  }
}
#[cfg(feature = "miniz_oxide")]
impl Default for ZlibProvider {
  #[inline]
  fn default() -> Self {
    Self::from_config(&crate::Config::default())
  }
}
#[cfg(feature = "miniz_oxide")]
impl CompressionProvider for ZlibProvider {
  #[inline]
  fn deflate(&self, raw: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(raw, self.level)
  }
  fn inflate(&self, compressed: &[u8], limit: usize) -> PayloadResult<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(compressed, limit).map_err(|e| {
      log::warn!("zlib inflate failed: {:?}", e.status);
      crate::PayloadError::Decompression
    })
  }
}
