// bdgr -- a lossless raster image codec
// Licensed under the Apache License, Version 2.0.

//! Reading and writing the raw-grayscale PGM (`P5`) format.
//!
//! This is not part of the wire format this crate defines; it exists so
//! the CLI and the test/bench fixtures have a plain, inspectable way to
//! get pixels in and out of the codec, the same supporting role `hound`
//! (WAV) plays for claxon's own test samples and CLI examples.

use std::io::{Read, Write};

use crate::error::{CodecError, CodecResult};
use crate::image::GrayImage;

/// Reads a `P5` (binary grayscale) PGM image from `reader`.
///
/// Only 8-bit samples (maxval `255`) are supported; anything else is
/// reported as [`CodecError::InvalidPgmHeader`].
pub fn read<R: Read>(mut reader: R) -> CodecResult<GrayImage> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let mut cursor = 0usize;

    let magic = read_token(&bytes, &mut cursor)?;
    if magic != "P5" {
        return Err(CodecError::InvalidPgmHeader(format!("expected magic number P5, found {magic:?}")));
    }

    let width: usize = read_token(&bytes, &mut cursor)?
        .parse()
        .map_err(|_| CodecError::InvalidPgmHeader("non-numeric width".to_string()))?;
    let height: usize = read_token(&bytes, &mut cursor)?
        .parse()
        .map_err(|_| CodecError::InvalidPgmHeader("non-numeric height".to_string()))?;
    let maxval: u32 = read_token(&bytes, &mut cursor)?
        .parse()
        .map_err(|_| CodecError::InvalidPgmHeader("non-numeric maxval".to_string()))?;
    if maxval != 255 {
        return Err(CodecError::InvalidPgmHeader(format!("only maxval 255 is supported, found {maxval}")));
    }

    // The single whitespace byte separating the header from the raster is
    // already consumed by `read_token`'s trailing-whitespace skip.
    let needed = width * height;
    let available = bytes.len() - cursor;
    if available < needed {
        return Err(CodecError::InvalidPgmHeader(format!(
            "raster truncated: need {needed} bytes, found {available}"
        )));
    }

    let pixels = bytes[cursor..cursor + needed].to_vec();
    GrayImage::new(width, height, pixels)
}

/// Writes `image` as a `P5` (binary grayscale, maxval 255) PGM image.
pub fn write<W: Write>(mut writer: W, image: &GrayImage) -> CodecResult<()> {
    write!(writer, "P5\n{} {}\n255\n", image.width, image.height)?;
    writer.write_all(&image.pixels)?;
    Ok(())
}

/// Reads one whitespace-delimited token, skipping `#`-prefixed comments
/// and leading whitespace first, and leaves `cursor` positioned right
/// after the token (and its single trailing whitespace byte, if any).
fn read_token(bytes: &[u8], cursor: &mut usize) -> CodecResult<String> {
    loop {
        while *cursor < bytes.len() && bytes[*cursor].is_ascii_whitespace() {
            *cursor += 1;
        }
        if *cursor < bytes.len() && bytes[*cursor] == b'#' {
            while *cursor < bytes.len() && bytes[*cursor] != b'\n' {
                *cursor += 1;
            }
            continue;
        }
        break;
    }

    let start = *cursor;
    while *cursor < bytes.len() && !bytes[*cursor].is_ascii_whitespace() {
        *cursor += 1;
    }
    if start == *cursor {
        return Err(CodecError::InvalidPgmHeader("unexpected end of header".to_string()));
    }
    let token = String::from_utf8_lossy(&bytes[start..*cursor]).into_owned();
    if *cursor < bytes.len() {
        *cursor += 1; // the single separating whitespace byte
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_image() {
        let image = GrayImage::new(3, 2, vec![0, 128, 255, 1, 2, 3]).unwrap();
        let mut buf = Vec::new();
        write(&mut buf, &image).unwrap();
        let read_back = read(&buf[..]).unwrap();
        assert_eq!(read_back, image);
    }

    #[test]
    fn rejects_a_non_p5_magic_number() {
        let err = read(&b"P2\n3 2\n255\n\x00\x01\x02\x03\x04\x05"[..]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidPgmHeader(_)));
    }

    #[test]
    fn rejects_an_unsupported_maxval() {
        let err = read(&b"P5\n1 1\n65535\n\x00"[..]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidPgmHeader(_)));
    }

    #[test]
    fn rejects_a_truncated_raster() {
        let err = read(&b"P5\n4 4\n255\n\x00\x01"[..]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidPgmHeader(_)));
    }

    #[test]
    fn skips_a_comment_line_in_the_header() {
        let image = GrayImage::new(2, 1, vec![10, 20]).unwrap();
        let bytes = b"P5\n# a comment\n2 1\n255\n\x0a\x14";
        let read_back = read(&bytes[..]).unwrap();
        assert_eq!(read_back, image);
    }
}
