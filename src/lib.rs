#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_debug_implementations)]

//! A crate for storing arbitrary bytes as the pixels of a PNG image.
//!
//! The payload becomes the red, green, and blue bytes of a square 8-bit RGB
//! image. The resulting file is a normal PNG that any viewer will open (it
//! just looks like noise), and this crate can get the exact bytes back out.
//!
//! ```
//! # #[cfg(feature = "miniz_oxide")] {
//! let png = png_payload::encode(b"hi").unwrap();
//! assert!(png_payload::png::is_signature_correct(&png));
//! assert_eq!(png_payload::decode(&png).unwrap(), b"hi");
//! # }
//! ```
//!
//! The pieces are all available separately:
//! * [`layout`] turns a payload into scanlines and back.
//! * [`png`] builds chunks and containers, and reads them back either
//!   strictly or as a diagnostic scan.
//! * [`provider`] has the checksum and compression traits that the chunk code
//!   is written against, so that you can supply your own.

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

mod config;
pub use config::*;

mod parser_helpers;

pub mod layout;

pub mod png;

pub mod provider;

/// Encodes the payload as a PNG with the default [`Config`].
///
/// See [`png::assemble`].
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn encode(payload: &[u8]) -> PayloadResult<alloc::vec::Vec<u8>> {
  let config = Config::default();
  png::assemble(payload, &config, &provider::Crc32, &provider::ZlibProvider::from_config(&config))
}

/// Decodes a PNG made by [`encode`] back into the payload.
///
/// See [`png::decode_strict`].
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub fn decode(png: &[u8]) -> PayloadResult<alloc::vec::Vec<u8>> {
  let config = Config::default();
  png::decode_strict(png, &config, &provider::Crc32, &provider::ZlibProvider::from_config(&config))
}
