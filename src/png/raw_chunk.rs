use core::fmt::Debug;

use crate::{
  parser_helpers::try_split_off_byte_array, provider::ChecksumProvider, PayloadError,
  PayloadResult,
};

use super::ChunkType;

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  pub chunk_type: ChunkType,
  pub data: &'b [u8],
  pub declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl RawChunk<'_> {
  /// Errors with [`PayloadError::ChecksumMismatch`] unless the declared CRC
  /// is correct for the type and data.
  #[inline]
  pub fn verify(&self, crc: &impl ChecksumProvider) -> PayloadResult<()> {
    let computed = crc.chunk_crc(self.chunk_type.0, self.data);
    if computed == self.declared_crc {
      Ok(())
    } else {
      Err(PayloadError::ChecksumMismatch {
        chunk_type: self.chunk_type,
        declared: self.declared_crc,
        computed,
      })
    }
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// If the bytes run out partway through a chunk the iterator gives a single
/// [`PayloadError::TruncatedBuffer`] and then stops. If they run out exactly
/// at the end of a chunk it just stops.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RawChunkIter<'b>(&'b [u8]);
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, it will remove the PNG signature automatically.
  ///
  /// The signature is skipped, not checked.
  #[inline]
  pub const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self(rest),
      _ => Self(&[]),
    }
  }
  /// Iterate chunks of bytes that have no signature in front.
  #[inline]
  pub const fn from_chunk_bytes(bytes: &'b [u8]) -> Self {
    Self(bytes)
  }
  fn pull_chunk(&mut self) -> Option<RawChunk<'b>> {
    let (len_bytes, rest) = try_split_off_byte_array::<4>(self.0)?;
    let (type_bytes, rest) = try_split_off_byte_array::<4>(rest)?;
    let chunk_len = u32::from_be_bytes(len_bytes) as usize;
    if rest.len() < chunk_len {
      return None;
    }
    let (data, rest) = rest.split_at(chunk_len);
    let (crc_bytes, rest) = try_split_off_byte_array::<4>(rest)?;
    self.0 = rest;
    Some(RawChunk {
      chunk_type: ChunkType(type_bytes),
      data,
      declared_crc: u32::from_be_bytes(crc_bytes),
    })
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = PayloadResult<RawChunk<'b>>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.0.is_empty() {
      return None;
    }
    match self.pull_chunk() {
      Some(chunk) => Some(Ok(chunk)),
      None => {
        self.0 = &[];
        Some(Err(PayloadError::TruncatedBuffer))
      }
    }
  }
}
