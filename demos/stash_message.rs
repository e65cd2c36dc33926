//! `stash_message OUT.png MESSAGE...` writes the message into a PNG, then
//! reads the PNG back to check it.

fn main() {
  let args: Vec<String> = std::env::args().collect();
  let (out_path, message) = match args.as_slice() {
    [_, out_path, words @ ..] if !words.is_empty() => (out_path, words.join(" ")),
    _ => {
      println!("usage: stash_message OUT.png MESSAGE...");
      return;
    }
  };
  let png = match png_payload::encode(message.as_bytes()) {
    Ok(png) => png,
    Err(e) => {
      println!("Error encoding: {e}");
      return;
    }
  };
  if let Err(e) = std::fs::write(out_path, &png) {
    println!("Error writing `{out_path}`: {e:?}");
    return;
  }
  println!("wrote {} bytes to `{out_path}`", png.len());
  match png_payload::decode(&png) {
    Ok(back) => println!("read back: {:?}", String::from_utf8_lossy(&back)),
    Err(e) => println!("Error decoding: {e}"),
  }
}
