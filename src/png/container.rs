use alloc::vec::Vec;

use crate::{
  layout::{grid_side_for, payload_to_grid, LENGTH_PREFIX_LEN},
  provider::{ChecksumProvider, CompressionProvider},
  Config, PayloadError, PayloadResult,
};

use super::{build_data_chunks, build_header_chunk, build_terminal_chunk, IHDR};

/// The first eight bytes of every PNG.
pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// Builds a complete PNG holding the payload as its pixels.
///
/// The output is the signature, an `IHDR`, one or more `IDAT` (see
/// [`Config::max_data_chunk_len`]), and the `IEND`. For the same payload,
/// config, and providers the output is always the same bytes.
///
/// ## Failure
/// * [`PayloadError::EmptyPayload`] if there's nothing to store.
/// * [`PayloadError::DimensionsTooLarge`] if the image would be wider than
///   [`Config::max_dimension`].
/// * [`PayloadError::IntegerOverflow`] if any length exceeds a `u32`.
pub fn assemble(
  payload: &[u8], config: &Config, crc: &impl ChecksumProvider,
  compression: &impl CompressionProvider,
) -> PayloadResult<Vec<u8>> {
  if !payload.is_empty() {
    // checked before the grid is allocated
    let side = grid_side_for(payload.len().saturating_add(LENGTH_PREFIX_LEN))?;
    if side > config.max_dimension {
      return Err(PayloadError::DimensionsTooLarge);
    }
  }
  let grid = payload_to_grid(payload)?;
  let header = IHDR::truecolor(grid.width(), grid.height());
  let header_chunk = build_header_chunk(&header, crc)?;
  let data_chunks = build_data_chunks(grid.as_bytes(), config.max_data_chunk_len, crc, compression)?;
  let terminal_chunk = build_terminal_chunk();

  let mut png = Vec::with_capacity(
    SIGNATURE.len() + header_chunk.len() + data_chunks.len() + terminal_chunk.len(),
  );
  png.extend_from_slice(&SIGNATURE);
  png.extend_from_slice(&header_chunk);
  png.extend_from_slice(&data_chunks);
  png.extend_from_slice(&terminal_chunk);
  log::debug!(
    "assembled {} byte PNG: {}x{} pixels, {} bytes of IDAT chunks",
    png.len(),
    header.width,
    header.height,
    data_chunks.len()
  );
  Ok(png)
}
