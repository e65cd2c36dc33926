#![forbid(unsafe_code)]

//! Module for writing and reading the PNG container that holds a payload.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Container Layout
//!
//! A PNG is the 8 byte [`SIGNATURE`] followed by a series of "chunks". Each
//! chunk is:
//!
//! * a big-endian `u32` giving the length of the data field only
//! * a 4 byte ascii type tag
//! * the data field
//! * a big-endian CRC-32 computed over the type tag and the data field
//!
//! The containers made by this crate only ever have three kinds of chunk:
//!
//! * **Header** (`IHDR`) - 13 bytes of width, height, and pixel format info.
//!   This crate always writes 8-bit RGB, no interlacing.
//! * **Image Data** (`IDAT`) - One or more chunks of compressed data. All of
//!   the compressed data forms a single zlib data stream.
//! * **End** (`IEND`) - The last chunk, lets you know you had the full PNG and
//!   your data wasn't truncated accidentally. It's always the same 12 bytes.
//!
//! ## Reading
//!
//! There's two very different ways to read a container back out, selected
//! with [`ParseMode`]:
//!
//! * [`decode_strict`] walks the chunks in order from the signature and fails
//!   the whole operation on the first problem: a bad checksum, a truncated
//!   chunk, a missing header, and so on. Use this when you want the payload.
//! * [`scan`] is a diagnostic tool. It looks at *every* byte offset for a
//!   chunk type tag, so it doesn't need a signature or even correct chunk
//!   ordering. Each chunk it finds is reported along with if its checksum was
//!   correct, and data with a bad checksum is left out. It never fails, you
//!   just get less in the report. Because it's a byte-by-byte search it can
//!   also "find" tags inside of corrupted chunk data, so treat the results
//!   as an inspection aid, not as a reliable decode.
//!
//! Neither of these works on partial input. The entire PNG must be a single
//! byte slice.

mod chunk;
pub use chunk::*;

mod raw_chunk;
pub use raw_chunk::*;

mod ihdr;
pub use ihdr::*;

mod container;
pub use container::*;

mod scan;
pub use scan::*;
