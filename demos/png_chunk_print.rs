use png_payload::{png::scan, provider::Crc32};

fn main() {
  let args: Vec<String> = std::env::args().collect();
  println!("ARGS: {args:?}");
  for file_arg in args[1..].iter() {
    let path = std::path::Path::new(file_arg);
    print!("Reading `{}`... ", path.display());
    let bytes = match std::fs::read(path) {
      Ok(bytes) => {
        println!("got {} bytes.", bytes.len());
        bytes
      }
      Err(e) => {
        println!("{e:?}");
        continue;
      }
    };
    let report = scan(&bytes, &Crc32);
    println!("header: {:?}", report.header);
    for chunk in report.chunks.iter() {
      println!("{}_{}: {chunk:?}", chunk.chunk_type, chunk.index);
    }
    println!(
      "checksum mismatches: {}, truncated: {}, IEND found: {}",
      report.checksum_mismatches(),
      report.truncated,
      report.terminal_found
    );
  }
}
