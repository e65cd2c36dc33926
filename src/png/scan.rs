use core::fmt::Debug;

use alloc::vec::Vec;

use crate::{
  layout::grid_to_payload,
  provider::{ChecksumProvider, CompressionProvider},
  Config, PayloadError, PayloadResult,
};

use super::{chunk::parse_chunk_with, is_signature_correct, ChunkType, RawChunkIter, IHDR};

/// Selects between the two ways of reading a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParseMode {
  /// Fail on the first problem, produce the payload. See [`decode_strict`].
  StrictDecode,
  /// Never fail, produce a report. See [`scan`].
  LenientScan,
}

/// The output of [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<'b> {
  /// The payload, from [`ParseMode::StrictDecode`].
  Payload(Vec<u8>),
  /// What was found, from [`ParseMode::LenientScan`].
  Report(ScanReport<'b>),
}

/// Reads the container in the mode given.
///
/// In [`ParseMode::LenientScan`] this always returns `Ok`.
pub fn parse<'b>(
  buffer: &'b [u8], mode: ParseMode, config: &Config, crc: &impl ChecksumProvider,
  compression: &impl CompressionProvider,
) -> PayloadResult<Parsed<'b>> {
  match mode {
    ParseMode::StrictDecode => decode_strict(buffer, config, crc, compression).map(Parsed::Payload),
    ParseMode::LenientScan => Ok(Parsed::Report(scan(buffer, crc))),
  }
}

/// One chunk found by [`scan`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScannedChunk<'b> {
  pub chunk_type: ChunkType,
  /// Counts from 1 for each chunk type separately.
  pub index: usize,
  /// Position of the type tag.
  pub offset: usize,
  pub length: u32,
  pub declared_crc: u32,
  pub computed_crc: u32,
  /// The data field, or `None` when the checksum was wrong.
  pub data: Option<&'b [u8]>,
}
impl ScannedChunk<'_> {
  #[inline]
  #[must_use]
  pub const fn checksum_valid(&self) -> bool {
    self.declared_crc == self.computed_crc
  }
}
impl Debug for ScannedChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let mut d = f.debug_struct("ScannedChunk");
    d.field("chunk_type", &self.chunk_type)
      .field("index", &self.index)
      .field("offset", &self.offset)
      .field("length", &self.length)
      .field("declared_crc", &self.declared_crc)
      .field("computed_crc", &self.computed_crc);
    match self.data {
      Some(data) => d.field("data", &(&data[..data.len().min(12)], data.len())),
      None => d.field("data", &"<checksum mismatch>"),
    };
    d.finish()
  }
}

/// Everything that [`scan`] found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport<'b> {
  /// The first `IHDR` with a correct checksum and a 13 byte data field.
  pub header: Option<IHDR>,
  /// Every chunk found, in buffer order.
  pub chunks: Vec<ScannedChunk<'b>>,
  /// If an `IEND` with a correct checksum was found.
  pub terminal_found: bool,
  /// How many type tags were found without room for a whole chunk around
  /// them.
  pub truncated: usize,
}
impl<'b> ScanReport<'b> {
  /// The `IDAT` chunks, in order.
  #[inline]
  pub fn data_chunks(&self) -> impl Iterator<Item = &ScannedChunk<'b>> + '_ {
    self.chunks.iter().filter(|c| c.chunk_type == ChunkType::IDAT)
  }
  /// The `IHDR` chunks, in order.
  #[inline]
  pub fn header_chunks(&self) -> impl Iterator<Item = &ScannedChunk<'b>> + '_ {
    self.chunks.iter().filter(|c| c.chunk_type == ChunkType::IHDR)
  }
  /// How many chunks had the wrong checksum.
  #[inline]
  #[must_use]
  pub fn checksum_mismatches(&self) -> usize {
    self.chunks.iter().filter(|c| !c.checksum_valid()).count()
  }
  /// Exactly one header, at least one data chunk, the end chunk, and nothing
  /// wrong anywhere.
  #[must_use]
  pub fn is_clean(&self) -> bool {
    self.header.is_some()
      && self.header_chunks().count() == 1
      && self.data_chunks().next().is_some()
      && self.terminal_found
      && self.truncated == 0
      && self.checksum_mismatches() == 0
  }
  /// Tries to get the payload out of whatever was found.
  ///
  /// This uses the header and every `IDAT` whose checksum was correct, in
  /// order. It still works when the damage is outside of the image data, such
  /// as a broken signature, junk in front of the PNG, or a bad `IEND`.
  pub fn recover_payload(
    &self, config: &Config, compression: &impl CompressionProvider,
  ) -> PayloadResult<Vec<u8>> {
    let header = self.header.ok_or(PayloadError::MalformedHeader)?;
    let mut compressed = Vec::new();
    for data in self.data_chunks().filter_map(|c| c.data) {
      compressed.extend_from_slice(data);
    }
    if compressed.is_empty() {
      return Err(PayloadError::MissingDataChunk);
    }
    payload_from_compressed(&header, &compressed, config, compression)
  }
}

/// The chunk types that [`scan`] looks for.
const SCANNED_TYPES: [ChunkType; 3] = [ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND];

/// Which of [`SCANNED_TYPES`] has its tag at `i`, if any.
fn scanned_type_at(buffer: &[u8], i: usize) -> Option<usize> {
  let tag = buffer.get(i..)?.get(..4)?;
  SCANNED_TYPES.iter().position(|t| tag == &t.0[..])
}

/// The CRC of `buffer[..pos]` for every position where a chunk that a scan
/// could find starts or ends.
///
/// Every byte goes through the CRC once, however many overlapping chunks the
/// data declares.
struct PrefixCrcs(Vec<(usize, u32)>);
impl PrefixCrcs {
  fn new(buffer: &[u8], crc: &impl ChecksumProvider) -> Self {
    let mut positions = Vec::new();
    for i in 0..buffer.len() {
      if scanned_type_at(buffer, i).is_none() {
        continue;
      }
      if let Ok(parsed) = parse_chunk_with(buffer, i, |_, _| 0) {
        positions.push(i);
        positions.push(parsed.data_range.end);
      }
    }
    positions.sort_unstable();
    positions.dedup();
    let mut out = Vec::with_capacity(positions.len());
    let (mut last_pos, mut last_crc) = (0, 0);
    for pos in positions {
      let step = crc.crc32(&buffer[last_pos..pos]);
      last_crc = crc.crc32_combine(last_crc, step, pos - last_pos);
      last_pos = pos;
      out.push((pos, last_crc));
    }
    Self(out)
  }
  fn get(&self, pos: usize) -> Option<u32> {
    let i = self.0.binary_search_by_key(&pos, |&(p, _)| p).ok()?;
    Some(self.0[i].1)
  }
  /// The CRC of `buffer[start..end]`.
  fn range(&self, start: usize, end: usize, crc: &impl ChecksumProvider) -> Option<u32> {
    let before = self.get(start)?;
    Some(self.get(end)? ^ crc.crc32_combine(before, 0, end - start))
  }
}

/// Searches every byte offset for `IHDR`, `IDAT`, and `IEND` chunks.
///
/// Each tag found is parsed like [`parse_chunk_at`](super::parse_chunk_at)
/// and recorded, checksum failures included. After a chunk with a correct
/// checksum the search picks up after that chunk, otherwise it continues with
/// the very next byte.
///
/// The checksums come from CRCs of buffer prefixes joined with
/// [`ChecksumProvider::crc32_combine`], so each byte is only checksummed once no
/// matter how many overlapping chunks the data claims to have.
///
/// This is for inspecting possibly damaged data and it never fails. Use
/// [`decode_strict`] to actually get a payload back.
pub fn scan<'b>(buffer: &'b [u8], crc: &impl ChecksumProvider) -> ScanReport<'b> {
  let prefixes = PrefixCrcs::new(buffer, crc);
  let mut report = ScanReport::default();
  let mut counts = [0_usize; SCANNED_TYPES.len()];
  let mut i = 0;
  while i < buffer.len() {
    let slot = match scanned_type_at(buffer, i) {
      Some(slot) => slot,
      None => {
        i += 1;
        continue;
      }
    };
    let chunk_type = SCANNED_TYPES[slot];
    let chunk_crc = |tag: [u8; 4], data: &[u8]| {
      let end = i + 4 + data.len();
      prefixes.range(i, end, crc).unwrap_or_else(|| crc.chunk_crc(tag, data))
    };
    let parsed = match parse_chunk_with(buffer, i, chunk_crc) {
      Ok(parsed) => parsed,
      Err(e) => {
        log::warn!("found {chunk_type} at {i} of {}: {e}", buffer.len());
        report.truncated += 1;
        i += 1;
        continue;
      }
    };
    counts[slot] += 1;
    log::trace!("found {chunk_type} at {i} of {}: {} bytes", buffer.len(), parsed.length);
    let data = if parsed.checksum_valid {
      parsed.data(buffer)
    } else {
      log::warn!(
        "crc mismatch in {chunk_type} chunk at {i} of {}: {:#010X} does not match {:#010X}",
        buffer.len(),
        parsed.declared_crc,
        parsed.computed_crc
      );
      None
    };
    match (chunk_type, data) {
      (ChunkType::IHDR, Some(data)) if report.header.is_none() => match IHDR::try_from(data) {
        Ok(ihdr) => report.header = Some(ihdr),
        Err(_) => log::warn!("IHDR at {i} has {} bytes of data, not {}", data.len(), IHDR::LEN),
      },
      (ChunkType::IEND, Some(_)) => report.terminal_found = true,
      _ => (),
    }
    report.chunks.push(ScannedChunk {
      chunk_type,
      index: counts[slot],
      offset: i,
      length: parsed.length,
      declared_crc: parsed.declared_crc,
      computed_crc: parsed.computed_crc,
      data,
    });
    i = if parsed.checksum_valid { parsed.end() } else { i + 1 };
  }
  report
}

/// Reads the payload back out of a container, failing on the first problem.
///
/// ## Failure
/// * [`PayloadError::MissingSignature`] if the signature is wrong.
/// * [`PayloadError::MalformedHeader`] if the first chunk isn't a 13 byte
///   `IHDR`, or there's a second `IHDR`.
/// * [`PayloadError::UnsupportedHeader`] unless the header is 8-bit RGB,
///   non-interlaced.
/// * [`PayloadError::DimensionsTooLarge`] past [`Config::max_dimension`].
/// * [`PayloadError::ChecksumMismatch`] on any chunk with a bad checksum.
/// * [`PayloadError::TruncatedBuffer`] if the data ends partway through a
///   chunk.
/// * [`PayloadError::MissingDataChunk`] or
///   [`PayloadError::MissingTerminalChunk`] if those chunks aren't there.
/// * [`PayloadError::Decompression`] and the
///   [`grid_to_payload`](crate::layout::grid_to_payload) errors if the image
///   data isn't what was expected.
pub fn decode_strict(
  buffer: &[u8], config: &Config, crc: &impl ChecksumProvider,
  compression: &impl CompressionProvider,
) -> PayloadResult<Vec<u8>> {
  if !is_signature_correct(buffer) {
    return Err(PayloadError::MissingSignature);
  }
  let mut it = RawChunkIter::new(buffer);
  let first = it.next().ok_or(PayloadError::MalformedHeader)??;
  first.verify(crc)?;
  if first.chunk_type != ChunkType::IHDR {
    return Err(PayloadError::MalformedHeader);
  }
  let header = IHDR::try_from(first.data)?;
  check_header(&header, config)?;

  let mut compressed: Vec<u8> = Vec::new();
  let mut data_chunk_count = 0_usize;
  let mut terminal_found = false;
  for raw in it {
    let raw = raw?;
    raw.verify(crc)?;
    match raw.chunk_type {
      ChunkType::IDAT => {
        compressed.extend_from_slice(raw.data);
        data_chunk_count += 1;
      }
      ChunkType::IEND => {
        terminal_found = true;
        break;
      }
      ChunkType::IHDR => return Err(PayloadError::MalformedHeader),
      other => log::debug!("skipping {other} chunk"),
    }
  }
  if data_chunk_count == 0 {
    return Err(PayloadError::MissingDataChunk);
  }
  if !terminal_found {
    return Err(PayloadError::MissingTerminalChunk);
  }
  log::debug!(
    "{}x{} image, {} compressed bytes in {data_chunk_count} IDAT chunks",
    header.width,
    header.height,
    compressed.len()
  );
  payload_from_compressed(&header, &compressed, config, compression)
}

fn check_header(header: &IHDR, config: &Config) -> PayloadResult<()> {
  if !header.is_supported() {
    return Err(PayloadError::UnsupportedHeader);
  }
  if header.width > config.max_dimension || header.height > config.max_dimension {
    return Err(PayloadError::DimensionsTooLarge);
  }
  Ok(())
}

fn payload_from_compressed(
  header: &IHDR, compressed: &[u8], config: &Config, compression: &impl CompressionProvider,
) -> PayloadResult<Vec<u8>> {
  check_header(header, config)?;
  let zlib_len = header.get_zlib_decompression_requirement()?;
  let scanlines = compression.inflate(compressed, zlib_len)?;
  grid_to_payload(&scanlines, header.width, header.height)
}
