use crate::{layout::grid_len, PayloadError, PayloadResult};

/// The only bit depth this crate writes.
pub const BIT_DEPTH_8: u8 = 8;

/// Color type 2: red, green, blue.
pub const COLOR_TYPE_RGB: u8 = 2;

/// Image Header
///
/// Parsing doesn't validate the fields, so that a scan can report a header even
/// when it describes a format this crate doesn't handle. See
/// [`IHDR::is_supported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: u8,
  /// always 0 (zlib)
  pub compression_method: u8,
  /// always 0 (adaptive filtering with five basic filter types)
  pub filter_method: u8,
  /// 0 for non-interlaced, 1 for Adam7
  pub interlace_method: u8,
}
impl IHDR {
  /// Bytes in the data field of an `IHDR` chunk.
  pub const LEN: usize = 13;

  /// An 8-bit RGB, non-interlaced header.
  #[inline]
  #[must_use]
  pub const fn truecolor(width: u32, height: u32) -> Self {
    Self {
      width,
      height,
      bit_depth: BIT_DEPTH_8,
      color_type: COLOR_TYPE_RGB,
      compression_method: 0,
      filter_method: 0,
      interlace_method: 0,
    }
  }

  /// Packs the header as the 13 byte chunk data.
  #[must_use]
  pub fn to_bytes(&self) -> [u8; Self::LEN] {
    let mut out = [0_u8; Self::LEN];
    out[0..4].copy_from_slice(&self.width.to_be_bytes());
    out[4..8].copy_from_slice(&self.height.to_be_bytes());
    out[8] = self.bit_depth;
    out[9] = self.color_type;
    out[10] = self.compression_method;
    out[11] = self.filter_method;
    out[12] = self.interlace_method;
    out
  }

  /// If this header is 8-bit RGB, method 0, non-interlaced, with a non-zero
  /// width and height.
  #[inline]
  #[must_use]
  pub const fn is_supported(&self) -> bool {
    self.width > 0
      && self.height > 0
      && self.bit_depth == BIT_DEPTH_8
      && self.color_type == COLOR_TYPE_RGB
      && self.compression_method == 0
      && self.filter_method == 0
      && self.interlace_method == 0
  }

  /// Gets the buffer size required to perform Zlib decompression.
  ///
  /// Each line is a filter byte followed by 3 bytes per pixel.
  #[inline]
  pub fn get_zlib_decompression_requirement(&self) -> PayloadResult<usize> {
    grid_len(self.width, self.height)
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = PayloadError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match value {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] => {
        Ok(Self {
          width: u32::from_be_bytes([*w0, *w1, *w2, *w3]),
          height: u32::from_be_bytes([*h0, *h1, *h2, *h3]),
          bit_depth: *bit_depth,
          color_type: *color_type,
          compression_method: *compression_method,
          filter_method: *filter_method,
          interlace_method: *interlace_method,
        })
      }
      _ => Err(PayloadError::MalformedHeader),
    }
  }
}
