use crate::map::palette::{self, Rgb};
use thiserror::Error;
use tracing::warn;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: u32 = 40;
const HEADER_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN as usize;
const MAGIC: [u8; 2] = *b"BM";
const BI_RGB: u32 = 0;

/// Reasons a byte buffer is not a usable map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bitmap is too short to be valid ({0} bytes, need at least 54)")]
    TooShort(usize),
    #[error("bitmap header should start with 0x42 0x4d")]
    BadMagic,
    #[error("bitmap declares {declared} bytes but is {actual} bytes long")]
    LengthMismatch { declared: u32, actual: usize },
    #[error("only bitmaps with a BITMAPINFOHEADER are supported (header size {0})")]
    UnsupportedHeader(u32),
    #[error("bitmap width must be positive (got {0})")]
    InvalidWidth(i32),
    #[error("only bitmaps with a positive height are supported (got {0})")]
    InvalidHeight(i32),
    #[error("only bitmaps with a single colour plane are supported (got {0})")]
    UnsupportedPlanes(u16),
    #[error("only 24 bits per pixel bitmaps are supported (got {0})")]
    UnsupportedBitDepth(u16),
    #[error("only uncompressed (BI_RGB) bitmaps are supported (compression {0})")]
    UnsupportedCompression(u32),
    #[error("bitmap doesn't have a full pixel array")]
    TruncatedPixelArray,
    #[error("no home found on the map, mark it with RGB(105, 255, 105)")]
    NoHomeFound,
}

/// A decoded bitmap, top row first, in RGB order.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgb>,
    /// Column and row of the home pixel.
    pub home: (usize, usize),
}

impl Bitmap {
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }
}

/// Bytes per stored row, including the padding up to a 4-byte boundary.
pub fn row_bytes(width: usize) -> usize {
    4 * ((24 * width + 31) / 32)
}

pub fn decode(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TooShort(bytes.len()));
    }

    if bytes[0..2] != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let declared = read_u32(bytes, 2);
    if declared as usize != bytes.len() {
        return Err(DecodeError::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let header_len = read_u32(bytes, 14);
    if header_len != INFO_HEADER_LEN {
        return Err(DecodeError::UnsupportedHeader(header_len));
    }

    let width = read_i32(bytes, 18);
    if width < 1 {
        return Err(DecodeError::InvalidWidth(width));
    }

    // Negative heights mean top-down rows, which we don't handle
    let height = read_i32(bytes, 22);
    if height < 1 {
        return Err(DecodeError::InvalidHeight(height));
    }

    let planes = read_u16(bytes, 26);
    if planes != 1 {
        return Err(DecodeError::UnsupportedPlanes(planes));
    }

    let bits_per_pixel = read_u16(bytes, 28);
    if bits_per_pixel != 24 {
        return Err(DecodeError::UnsupportedBitDepth(bits_per_pixel));
    }

    let compression = read_u32(bytes, 30);
    if compression != BI_RGB {
        return Err(DecodeError::UnsupportedCompression(compression));
    }

    let width = width as usize;
    let height = height as usize;
    let data_offset = read_u32(bytes, 10) as usize;
    let stride = row_bytes(width);

    // Pixels can't start inside the headers
    if data_offset < HEADER_LEN {
        return Err(DecodeError::TruncatedPixelArray);
    }

    // The last row may legitimately omit its padding
    let end = stride
        .checked_mul(height - 1)
        .and_then(|rows| rows.checked_add(3 * width))
        .and_then(|pixels| pixels.checked_add(data_offset))
        .ok_or(DecodeError::TruncatedPixelArray)?;
    if end > bytes.len() {
        return Err(DecodeError::TruncatedPixelArray);
    }

    let mut pixels = vec![[0u8; 3]; width * height];
    for stored_row in 0..height {
        let y = height - stored_row - 1;
        let row_start = data_offset + stored_row * stride;
        for x in 0..width {
            let at = row_start + 3 * x;
            pixels[y * width + x] = [bytes[at + 2], bytes[at + 1], bytes[at]];
        }
    }

    let mut homes = pixels
        .iter()
        .enumerate()
        .filter(|(_, &pixel)| pixel == palette::HOME)
        .map(|(index, _)| (index % width, index / width));

    let home = homes.next().ok_or(DecodeError::NoHomeFound)?;
    let extra = homes.count();
    if extra > 0 {
        warn!(
            home_x = home.0,
            home_y = home.1,
            extra,
            "map has more than one home pixel, using the top-left-most one"
        );
    }

    Ok(Bitmap {
        width,
        height,
        pixels,
        home,
    })
}

/// Encodes RGB pixels (top row first) as an uncompressed 24-bit bitmap.
pub fn encode(width: usize, height: usize, pixels: &[Rgb]) -> Vec<u8> {
    assert_eq!(pixels.len(), width * height, "pixel count must match size");

    let stride = row_bytes(width);
    let file_len = HEADER_LEN + stride * height;
    let mut bytes = Vec::with_capacity(file_len);

    // BITMAPFILEHEADER
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&(file_len as u32).to_le_bytes());
    bytes.extend_from_slice(&[0; 4]);
    bytes.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());

    // BITMAPINFOHEADER
    bytes.extend_from_slice(&INFO_HEADER_LEN.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&BI_RGB.to_le_bytes());
    bytes.extend_from_slice(&((stride * height) as u32).to_le_bytes());
    // 2835 pixels per metre is 72 DPI
    bytes.extend_from_slice(&2835i32.to_le_bytes());
    bytes.extend_from_slice(&2835i32.to_le_bytes());
    bytes.extend_from_slice(&[0; 8]);

    let padding = stride - 3 * width;
    for y in (0..height).rev() {
        for &[r, g, b] in &pixels[y * width..(y + 1) * width] {
            bytes.extend_from_slice(&[b, g, r]);
        }
        bytes.extend(std::iter::repeat(0).take(padding));
    }

    bytes
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    read_u32(bytes, offset) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::palette::{BACKGROUND, FOOD, HOME, WALL};
    use crate::map::sketch;

    fn valid() -> Vec<u8> {
        sketch(&["..#", ".H.", "F.."])
    }

    fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn patch_u16(bytes: &mut [u8], offset: usize, value: u16) {
        bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn when_decoding_a_valid_bitmap_rows_are_flipped_and_converted_to_rgb() {
        let bitmap = decode(&valid()).unwrap();

        assert_eq!(bitmap.width, 3);
        assert_eq!(bitmap.height, 3);
        assert_eq!(bitmap.pixel(2, 0), WALL);
        assert_eq!(bitmap.pixel(1, 1), HOME);
        assert_eq!(bitmap.pixel(0, 2), FOOD);
        assert_eq!(bitmap.pixel(0, 0), BACKGROUND);
        assert_eq!(bitmap.home, (1, 1));
    }

    #[test]
    fn when_decoding_row_padding_is_stripped() {
        // Width 3 stores 9 pixel bytes in a 12 byte row
        assert_eq!(row_bytes(3), 12);
        assert_eq!(row_bytes(4), 12);
        assert_eq!(row_bytes(1), 4);

        let mut bytes = sketch(&["H..", "...", "..#"]);
        // Junk in the padding must not leak into the pixels
        let stride = row_bytes(3);
        for row in 0..3 {
            for pad in 9..stride {
                bytes[HEADER_LEN + row * stride + pad] = 0xAB;
            }
        }

        let bitmap = decode(&bytes).unwrap();
        assert_eq!(bitmap.home, (0, 0));
        assert_eq!(bitmap.pixel(2, 2), WALL);
        assert!(bitmap
            .pixels
            .iter()
            .all(|&pixel| pixel == HOME || pixel == WALL || pixel == BACKGROUND));
    }

    #[test]
    fn when_decoding_the_home_is_reported_in_top_down_coordinates() {
        let bitmap = decode(&sketch(&["....", "....", "...H"])).unwrap();
        assert_eq!(bitmap.home, (3, 2));
    }

    #[test]
    fn when_decoding_a_map_with_several_homes_the_first_in_reading_order_wins() {
        let bitmap = decode(&sketch(&["...H", "H...", "..H."])).unwrap();
        assert_eq!(bitmap.home, (3, 0));
    }

    #[test]
    fn when_decoding_a_map_without_home_it_fails() {
        let result = decode(&sketch(&["...", ".F.", "#.."]));
        assert_eq!(result.unwrap_err(), DecodeError::NoHomeFound);
    }

    #[test]
    fn when_decoding_a_buffer_shorter_than_the_headers_it_fails() {
        let bytes = valid();
        assert_eq!(decode(&bytes[..53]).unwrap_err(), DecodeError::TooShort(53));
        assert_eq!(decode(&[]).unwrap_err(), DecodeError::TooShort(0));
    }

    #[test]
    fn when_decoding_with_the_wrong_magic_it_fails() {
        let mut bytes = valid();
        bytes[1] = b'N';
        assert_eq!(decode(&bytes).unwrap_err(), DecodeError::BadMagic);
    }

    #[test]
    fn when_decoding_with_a_mismatched_length_it_fails() {
        let mut bytes = valid();
        bytes.push(0);
        let actual = bytes.len();
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::LengthMismatch {
                declared: (actual - 1) as u32,
                actual
            }
        );
    }

    #[test]
    fn when_decoding_with_a_different_dib_header_it_fails() {
        let mut bytes = valid();
        patch_u32(&mut bytes, 14, 124);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::UnsupportedHeader(124)
        );
    }

    #[test]
    fn when_decoding_with_non_positive_dimensions_it_fails() {
        let mut bytes = valid();
        patch_u32(&mut bytes, 18, 0);
        assert_eq!(decode(&bytes).unwrap_err(), DecodeError::InvalidWidth(0));

        let mut bytes = valid();
        patch_u32(&mut bytes, 22, (-3i32) as u32);
        assert_eq!(decode(&bytes).unwrap_err(), DecodeError::InvalidHeight(-3));
    }

    #[test]
    fn when_decoding_with_unsupported_pixel_formats_it_fails() {
        let mut bytes = valid();
        patch_u16(&mut bytes, 26, 2);
        assert_eq!(decode(&bytes).unwrap_err(), DecodeError::UnsupportedPlanes(2));

        let mut bytes = valid();
        patch_u16(&mut bytes, 28, 32);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::UnsupportedBitDepth(32)
        );

        let mut bytes = valid();
        patch_u32(&mut bytes, 30, 1);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::UnsupportedCompression(1)
        );
    }

    #[test]
    fn when_decoding_a_pixel_array_past_the_end_of_the_buffer_it_fails() {
        let mut bytes = valid();
        // Claim a taller image than the data holds
        patch_u32(&mut bytes, 22, 40);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::TruncatedPixelArray
        );

        let mut bytes = valid();
        patch_u32(&mut bytes, 10, u32::MAX);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::TruncatedPixelArray
        );
    }

    #[test]
    fn when_the_pixel_array_starts_inside_the_headers_it_fails() {
        let mut bytes = valid();
        patch_u32(&mut bytes, 10, 14);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::TruncatedPixelArray
        );

        let mut bytes = valid();
        patch_u32(&mut bytes, 10, (HEADER_LEN - 1) as u32);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::TruncatedPixelArray
        );
    }

    #[test]
    fn when_encoding_the_header_declares_the_real_length() {
        let pixels = vec![BACKGROUND; 5 * 2];
        let bytes = encode(5, 2, &pixels);

        assert_eq!(bytes.len(), HEADER_LEN + row_bytes(5) * 2);
        assert_eq!(read_u32(&bytes, 2) as usize, bytes.len());
        assert_eq!(read_u32(&bytes, 10) as usize, HEADER_LEN);
    }
}
