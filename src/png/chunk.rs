use core::{
  fmt::{Debug, Display, Write},
  num::NonZeroU32,
  ops::Range,
};

use alloc::vec::Vec;

use crate::{
  parser_helpers::{checked_u32, u32_be},
  provider::{ChecksumProvider, CompressionProvider},
  PayloadError, PayloadResult,
};

use super::IHDR;

/// Bytes in every chunk besides the data: length, type, and checksum.
pub const CHUNK_OVERHEAD: usize = 12;

/// The complete `IEND` chunk.
///
/// It has no data, so the checksum is just the CRC of `b"IEND"`.
pub const TERMINAL_CHUNK: [u8; 12] =
  [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82];

/// The 4 byte tag that says what kind of chunk a chunk is.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
}
impl ChunkType {
  #[inline]
  #[must_use]
  pub const fn to_bytes(self) -> [u8; 4] {
    self.0
  }
}
impl TryFrom<&str> for ChunkType {
  type Error = PayloadError;
  #[inline]
  fn try_from(tag: &str) -> Result<Self, Self::Error> {
    match tag.as_bytes() {
      [a, b, c, d] if tag.is_ascii() => Ok(Self([*a, *b, *c, *d])),
      _ => Err(PayloadError::InvalidTypeTag),
    }
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char('\"')?;
    Display::fmt(self, f)?;
    f.write_char('\"')
  }
}
impl Display for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for ch in self.0.iter().copied().map(|u| u as char) {
      f.write_char(ch)?;
    }
    Ok(())
  }
}

/// Appends a complete chunk to `out`.
pub(crate) fn write_chunk(
  out: &mut Vec<u8>, chunk_type: ChunkType, data: &[u8], crc: &impl ChecksumProvider,
) -> PayloadResult<()> {
  let length = checked_u32(data.len())?;
  out.reserve(CHUNK_OVERHEAD + data.len());
  out.extend_from_slice(&length.to_be_bytes());
  out.extend_from_slice(&chunk_type.0);
  out.extend_from_slice(data);
  out.extend_from_slice(&crc.chunk_crc(chunk_type.0, data).to_be_bytes());
  Ok(())
}

/// Builds a chunk from a type tag string and the data field.
///
/// ## Failure
/// * [`PayloadError::InvalidTypeTag`] unless the tag is exactly 4 ascii
///   bytes.
/// * [`PayloadError::IntegerOverflow`] if the data is more than `u32::MAX`
///   bytes.
#[inline]
pub fn build_chunk(
  type_tag: &str, data: &[u8], crc: &impl ChecksumProvider,
) -> PayloadResult<Vec<u8>> {
  build_typed_chunk(ChunkType::try_from(type_tag)?, data, crc)
}

/// As [`build_chunk`], with an already checked type.
pub fn build_typed_chunk(
  chunk_type: ChunkType, data: &[u8], crc: &impl ChecksumProvider,
) -> PayloadResult<Vec<u8>> {
  let mut out = Vec::new();
  write_chunk(&mut out, chunk_type, data, crc)?;
  Ok(out)
}

/// Builds the 25 byte `IHDR` chunk.
#[inline]
pub fn build_header_chunk(header: &IHDR, crc: &impl ChecksumProvider) -> PayloadResult<Vec<u8>> {
  build_typed_chunk(ChunkType::IHDR, &header.to_bytes(), crc)
}

/// Compresses the scanlines and wraps them in one `IDAT` chunk.
#[inline]
pub fn build_data_chunk(
  raw: &[u8], crc: &impl ChecksumProvider, compression: &impl CompressionProvider,
) -> PayloadResult<Vec<u8>> {
  build_typed_chunk(ChunkType::IDAT, &compression.deflate(raw), crc)
}

/// Compresses the scanlines once, then splits the zlib stream over as many
/// `IDAT` chunks as it takes to keep each one within `max_len` bytes.
///
/// With `max_len` of `None` this is the same as [`build_data_chunk`].
pub fn build_data_chunks(
  raw: &[u8], max_len: Option<NonZeroU32>, crc: &impl ChecksumProvider,
  compression: &impl CompressionProvider,
) -> PayloadResult<Vec<u8>> {
  let compressed = compression.deflate(raw);
  let piece_len = match max_len {
    Some(n) => n.get() as usize,
    None => compressed.len().max(1),
  };
  let mut out = Vec::new();
  if compressed.is_empty() {
    write_chunk(&mut out, ChunkType::IDAT, &[], crc)?;
  }
  for piece in compressed.chunks(piece_len) {
    write_chunk(&mut out, ChunkType::IDAT, piece, crc)?;
  }
  log::trace!("{} compressed bytes in {} byte IDAT chunks", compressed.len(), piece_len);
  Ok(out)
}

/// The `IEND` chunk. See [`TERMINAL_CHUNK`].
#[inline]
#[must_use]
pub const fn build_terminal_chunk() -> [u8; 12] {
  TERMINAL_CHUNK
}

/// Where a chunk is within a buffer, and if its checksum is right.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedChunk {
  pub chunk_type: ChunkType,
  /// Position of the type tag. The length is the 4 bytes before this.
  pub offset: usize,
  pub length: u32,
  /// Position of the data field.
  pub data_range: Range<usize>,
  pub declared_crc: u32,
  pub computed_crc: u32,
  pub checksum_valid: bool,
}
impl ParsedChunk {
  /// The position just after this chunk's checksum.
  #[inline]
  #[must_use]
  pub const fn end(&self) -> usize {
    self.data_range.end + 4
  }
  /// The data field, taken from the same buffer that was parsed.
  #[inline]
  #[must_use]
  pub fn data<'b>(&self, buffer: &'b [u8]) -> Option<&'b [u8]> {
    buffer.get(self.data_range.clone())
  }
}

/// Parses the chunk whose type tag starts at `offset`.
///
/// A checksum mismatch is *not* an error here, it's reported in
/// [`ParsedChunk::checksum_valid`] so that a scan can keep going.
///
/// ## Failure
/// * [`PayloadError::TruncatedBuffer`] if there's no room for the length
///   before `offset`, or the declared length runs past the end of the buffer.
#[inline]
pub fn parse_chunk_at(
  buffer: &[u8], offset: usize, crc: &impl ChecksumProvider,
) -> PayloadResult<ParsedChunk> {
  parse_chunk_with(buffer, offset, |tag, data| crc.chunk_crc(tag, data))
}

/// As [`parse_chunk_at`], with the computed checksum coming from `checksum`,
/// which is given the type tag and the data field.
pub(crate) fn parse_chunk_with(
  buffer: &[u8], offset: usize, checksum: impl FnOnce([u8; 4], &[u8]) -> u32,
) -> PayloadResult<ParsedChunk> {
  let length_pos = offset.checked_sub(4).ok_or(PayloadError::TruncatedBuffer)?;
  let length = buffer.get(length_pos..).and_then(u32_be).ok_or(PayloadError::TruncatedBuffer)?;
  let type_end = offset.checked_add(4).ok_or(PayloadError::TruncatedBuffer)?;
  let tag: [u8; 4] = buffer
    .get(offset..type_end)
    .and_then(|t| t.try_into().ok())
    .ok_or(PayloadError::TruncatedBuffer)?;
  let data_end = type_end.checked_add(length as usize).ok_or(PayloadError::TruncatedBuffer)?;
  let data = buffer.get(type_end..data_end).ok_or(PayloadError::TruncatedBuffer)?;
  let declared_crc =
    buffer.get(data_end..).and_then(u32_be).ok_or(PayloadError::TruncatedBuffer)?;
  let computed_crc = checksum(tag, data);
  Ok(ParsedChunk {
    chunk_type: ChunkType(tag),
    offset,
    length,
    data_range: type_end..data_end,
    declared_crc,
    computed_crc,
    checksum_valid: declared_crc == computed_crc,
  })
}
