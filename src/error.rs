use core::num::TryFromIntError;

use crate::png::ChunkType;

/// Shorthand for results with a [`PayloadError`].
pub type PayloadResult<T> = Result<T, PayloadError>;

/// An error from the `png_payload` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
  /// A chunk type tag must be exactly 4 ascii bytes.
  #[error("chunk type tag is not exactly 4 ascii bytes")]
  InvalidTypeTag,

  /// The checksum stored in a chunk doesn't match its type and data.
  #[error("checksum mismatch in {chunk_type} chunk: declared {declared:#010X}, computed {computed:#010X}")]
  ChecksumMismatch {
    /// type of the chunk that failed
    chunk_type: ChunkType,
    /// the checksum stored in the chunk
    declared: u32,
    /// the checksum of the bytes actually present
    computed: u32,
  },

  /// The header chunk is missing, out of place, or not 13 bytes.
  #[error("header chunk missing or malformed")]
  MalformedHeader,

  /// A declared chunk length runs past the end of the buffer.
  #[error("buffer ends inside of a chunk")]
  TruncatedBuffer,

  /// A length or dimension doesn't fit in the 32 bits the format allows.
  #[error("value exceeds the 32-bit range of the format")]
  IntegerOverflow,

  /// There's no payload to encode.
  ///
  /// A zero length payload would need a zero area image, which PNG forbids.
  #[error("payload is empty")]
  EmptyPayload,

  /// The buffer doesn't start with the PNG signature.
  #[error("missing PNG signature")]
  MissingSignature,

  /// There's no image data chunk.
  #[error("no IDAT chunk present")]
  MissingDataChunk,

  /// The chunks ended without an `IEND` chunk.
  #[error("no IEND chunk present")]
  MissingTerminalChunk,

  /// The header describes something other than 8-bit, non-interlaced RGB.
  #[error("only 8-bit non-interlaced truecolor is supported")]
  UnsupportedHeader,

  /// A row uses a filter other than "none".
  #[error("row {row} uses filter type {marker}, only 0 is supported")]
  UnsupportedFilter {
    /// the row index
    row: u32,
    /// the marker byte found
    marker: u8,
  },

  /// The pixel data isn't the size the dimensions call for.
  #[error("pixel data is {actual} bytes, expected {expected}")]
  GridSizeMismatch {
    /// bytes required by the dimensions
    expected: usize,
    /// bytes present
    actual: usize,
  },

  /// The embedded length prefix claims more bytes than the grid holds.
  #[error("payload claims {declared} bytes but only {available} are stored")]
  PayloadLengthMismatch {
    /// the length prefix value
    declared: u32,
    /// payload bytes actually present after the prefix
    available: usize,
  },

  /// The image is too large.
  ///
  /// Both encoding and decoding limit the width and height of images to
  /// [`Config::max_dimension`](crate::Config::max_dimension) to prevent
  /// accidental out-of-memory problems.
  #[error("image dimensions exceed the configured limit")]
  DimensionsTooLarge,

  /// The zlib stream couldn't be decompressed.
  #[error("failed to decompress image data")]
  Decompression,
}
impl From<TryFromIntError> for PayloadError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::IntegerOverflow
  }
}
