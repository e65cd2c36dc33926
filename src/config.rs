#![forbid(unsafe_code)]

use core::num::NonZeroU32;

/// Settings for encoding and decoding.
///
/// The defaults produce a single `IDAT` chunk at zlib level 6 and refuse
/// images wider or taller than 17,000 pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
  /// zlib compression level, 0 through 10.
  pub compression_level: u8,
  /// If set, the compressed stream is split over several `IDAT` chunks with
  /// no more than this many bytes each.
  pub max_data_chunk_len: Option<NonZeroU32>,
  /// Largest allowed width or height, on both encode and decode.
  pub max_dimension: u32,
}
impl Default for Config {
  #[inline]
  fn default() -> Self {
    Self { compression_level: 6, max_data_chunk_len: None, max_dimension: 17_000 }
  }
}
impl Config {
  #[inline]
  #[must_use]
  pub const fn with_compression_level(self, compression_level: u8) -> Self {
    Self { compression_level, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_max_data_chunk_len(self, max_data_chunk_len: Option<NonZeroU32>) -> Self {
    Self { max_data_chunk_len, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_max_dimension(self, max_dimension: u32) -> Self {
    Self { max_dimension, ..self }
  }
}
