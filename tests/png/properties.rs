//! Property-based tests using proptest
//!
//! These check the round-trip and corruption-detection behavior over many
//! random payloads.

use png_payload::{
  layout::payload_to_grid,
  png::{parse_chunk_at, scan, ChunkType, SIGNATURE},
  provider::Crc32,
  PayloadError,
};
use proptest::prelude::*;

/// Offset of the IHDR data in a container from this crate.
const IHDR_DATA_START: usize = 8 + 8;

/// Offset of the first IDAT data byte in a container from this crate.
const IDAT_DATA_START: usize = 8 + 25 + 8;

proptest! {
  #[test]
  fn prop_grid_round_trip(payload in prop::collection::vec(any::<u8>(), 1..2048)) {
    let grid = payload_to_grid(&payload).unwrap();
    prop_assert_eq!(grid.width() % 3, 0);
    prop_assert_eq!(grid.width(), grid.height());
    prop_assert_eq!(grid.to_payload().unwrap(), payload);
  }

  #[test]
  fn prop_container_round_trip(payload in prop::collection::vec(any::<u8>(), 1..2048)) {
    let png = png_payload::encode(&payload).unwrap();
    prop_assert_eq!(&png[..8], &SIGNATURE[..]);
    prop_assert_eq!(png_payload::decode(&png).unwrap(), payload);
  }

  #[test]
  fn prop_flipped_data_byte_is_detected(
    payload in prop::collection::vec(any::<u8>(), 1..512),
    pick in any::<prop::sample::Index>(),
    flip in 1_u8..=255,
  ) {
    let mut png = png_payload::encode(&payload).unwrap();
    let idat = parse_chunk_at(&png, IDAT_DATA_START - 4, &Crc32).unwrap();
    let target = IDAT_DATA_START + pick.index(idat.length as usize);
    png[target] ^= flip;

    let report = scan(&png, &Crc32);
    let first_idat = report.data_chunks().next().unwrap();
    prop_assert_eq!(first_idat.offset, IDAT_DATA_START - 4);
    prop_assert!(!first_idat.checksum_valid());
    prop_assert!(first_idat.data.is_none());
    prop_assert!(report.checksum_mismatches() >= 1);

    let strict = png_payload::decode(&png);
    let is_mismatch = matches!(strict, Err(PayloadError::ChecksumMismatch { .. }));
    prop_assert!(is_mismatch);
  }

  #[test]
  fn prop_flipped_header_byte_is_detected(
    payload in prop::collection::vec(any::<u8>(), 1..512),
    pick in 0_usize..13,
    flip in 1_u8..=255,
  ) {
    let mut png = png_payload::encode(&payload).unwrap();
    png[IHDR_DATA_START + pick] ^= flip;

    let report = scan(&png, &Crc32);
    let header = report.header_chunks().next().unwrap();
    prop_assert_eq!(header.offset, IHDR_DATA_START - 4);
    prop_assert!(!header.checksum_valid());
    prop_assert!(header.data.is_none());
    prop_assert!(report.header.is_none());

    let strict = png_payload::decode(&png);
    let is_header_mismatch =
      matches!(strict, Err(PayloadError::ChecksumMismatch { chunk_type: ChunkType::IHDR, .. }));
    prop_assert!(is_header_mismatch);
  }
}

#[test]
fn test_empty_payload_is_rejected() {
  assert_eq!(png_payload::encode(&[]), Err(PayloadError::EmptyPayload));
  assert_eq!(payload_to_grid(&[]), Err(PayloadError::EmptyPayload));
}
