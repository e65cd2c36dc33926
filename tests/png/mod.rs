use png_payload::{
  layout::{grid_to_payload, payload_to_grid},
  png::{scan, RawChunkIter, SIGNATURE, TERMINAL_CHUNK},
  provider::{ChecksumProvider, Crc32},
};
use walkdir::WalkDir;

mod properties;

#[test]
fn test_scan_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = scan(&v, &Crc32);
    for _ in RawChunkIter::new(&v) {
      //
    }
  }
  // even totally random data should never panic the scan!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    let _ = scan(&v, &Crc32);
    for _ in RawChunkIter::new(&v) {
      //
    }
  }
}

#[test]
fn test_random_payloads_round_trip() {
  for len in [1, 2, 3, 4, 5, 26, 27, 28, 100, 1000, 4096, 65_537] {
    let payload = super::rand_bytes(len);
    let grid = payload_to_grid(&payload).unwrap();
    assert_eq!(grid_to_payload(grid.as_bytes(), grid.width(), grid.height()).unwrap(), payload);

    let png = png_payload::encode(&payload).unwrap();
    assert_eq!(&png[..8], &SIGNATURE);
    assert_eq!(&png[png.len() - 12..], &TERMINAL_CHUNK);
    assert_eq!(png_payload::decode(&png).unwrap(), payload, "failed len: {len}");

    let report = scan(&png, &Crc32);
    assert!(report.is_clean(), "failed len: {len}: {report:?}");
  }
}

#[test]
fn test_chunk_integrity() {
  let png = png_payload::encode(&super::rand_bytes(5000)).unwrap();
  let mut count = 0;
  for chunk in RawChunkIter::new(&png) {
    let chunk = chunk.unwrap();
    assert_eq!(chunk.declared_crc, Crc32.chunk_crc(chunk.chunk_type.0, chunk.data));
    count += 1;
  }
  assert_eq!(count, 3);
}

#[test]
fn test_encode_is_deterministic() {
  let payload = super::rand_bytes(777);
  assert_eq!(png_payload::encode(&payload).unwrap(), png_payload::encode(&payload).unwrap());
}
