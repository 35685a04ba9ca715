//! # Encoding Detection and Transcoding
//!
//! Detects a byte buffer's encoding (UTF-8, UTF-16LE/BE, UTF-32LE/BE) from
//! its raw bytes with no BOM handling, and transcodes between any two of
//! the five encodings via a shared `decode`-to-scalars / `encode`-from-scalars
//! pair (spec §4.B). `measure` runs the same decode pass without writing
//! output, so a caller can size an arena allocation exactly before copying
//! into it. [`decode_one`] exposes the same per-scalar decoding step the
//! parser streams over one value at a time, rather than materializing a
//! `Vec<u32>` up front. **Zero external dependencies beyond `common`.**

#![forbid(unsafe_code)]

use common::{CodeUnit, Encoding, ErrorKind};

/// Detect encoding from the leading bytes of a buffer with no BOM.
///
/// JSON's grammar guarantees the first scalar value is ASCII (whitespace,
/// `{`, `[`, `"`, a digit, `-`, or the first letter of `true`/`false`/
/// `null`), so looking at which of the first four bytes are zero reveals
/// both the code-unit width and the byte order, the same technique
/// `json.org`-style sniffers use:
///
/// | b0 | b1 | b2 | b3 | encoding |
/// |----|----|----|----|----------|
/// | 00 | 00 | 00 | xx | UTF-32BE |
/// | xx | 00 | 00 | 00 | UTF-32LE |
/// | 00 | xx | 00 | xx | UTF-16BE |
/// | xx | 00 | xx | 00 | UTF-16LE |
/// | else | | | | UTF-8 |
pub fn detect(bytes: &[u8]) -> Encoding {
    let b = |i: usize| -> u8 { bytes.get(i).copied().unwrap_or(0) };

    if bytes.len() >= 4 {
        if b(0) == 0 && b(1) == 0 && b(2) == 0 && b(3) != 0 {
            return Encoding::Utf32Be;
        }
        if b(0) != 0 && b(1) == 0 && b(2) == 0 && b(3) == 0 {
            return Encoding::Utf32Le;
        }
    }
    if bytes.len() >= 2 {
        if b(0) == 0 && b(1) != 0 && (bytes.len() < 4 || b(2) == 0 || b(3) != 0) {
            return Encoding::Utf16Be;
        }
        if b(0) != 0 && b(1) == 0 && (bytes.len() < 4 || b(3) == 0) {
            return Encoding::Utf16Le;
        }
    }
    Encoding::Utf8
}

/// Read one raw code unit (not yet combined into a scalar value) at
/// `code_unit_index` from `bytes`, honoring `encoding`'s width and byte
/// order. Caller guarantees the unit is fully in bounds.
fn read_unit(bytes: &[u8], code_unit_index: usize, encoding: Encoding) -> u32 {
    let size = encoding.code_unit_size();
    let offset = code_unit_index * size;
    match size {
        1 => bytes[offset] as u32,
        2 => {
            let pair = [bytes[offset], bytes[offset + 1]];
            match encoding.endian() {
                common::Endian::Little => u16::from_le_bytes(pair) as u32,
                common::Endian::Big => u16::from_be_bytes(pair) as u32,
            }
        }
        4 => {
            let quad = [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]];
            match encoding.endian() {
                common::Endian::Little => u32::from_le_bytes(quad),
                common::Endian::Big => u32::from_be_bytes(quad),
            }
        }
        _ => unreachable!("encoding code-unit size is always 1, 2 or 4"),
    }
}

fn write_unit(out: &mut Vec<u8>, value: u32, encoding: Encoding) {
    match encoding.code_unit_size() {
        1 => out.push(value as u8),
        2 => {
            let unit = value as u16;
            let bytes = match encoding.endian() {
                common::Endian::Little => unit.to_le_bytes(),
                common::Endian::Big => unit.to_be_bytes(),
            };
            out.extend_from_slice(&bytes);
        }
        4 => {
            let bytes = match encoding.endian() {
                common::Endian::Little => value.to_le_bytes(),
                common::Endian::Big => value.to_be_bytes(),
            };
            out.extend_from_slice(&bytes);
        }
        _ => unreachable!("encoding code-unit size is always 1, 2 or 4"),
    }
}

/// Decode a single scalar value starting at byte offset `pos`, returning
/// the scalar and the number of bytes it consumed. This is the streaming
/// primitive the parser scans with; [`decode`] is just this called in a
/// loop over the whole buffer.
pub fn decode_one(bytes: &[u8], pos: usize, encoding: Encoding) -> Result<(u32, usize), ErrorKind> {
    match encoding {
        Encoding::Utf8 => {
            let b0 = bytes[pos];
            let len = common::tables::UTF8_LENGTH[(b0 >> 2) as usize] as usize;
            if len == 0 || pos + len > bytes.len() {
                return Err(ErrorKind::InvalidEncoding);
            }
            let cp = match len {
                1 => b0 as u32,
                2 => {
                    let b1 = bytes[pos + 1];
                    if b1 & 0xC0 != 0x80 {
                        return Err(ErrorKind::InvalidEncoding);
                    }
                    let cp = ((b0 as u32 & 0x1F) << 6) | (b1 as u32 & 0x3F);
                    if cp < 0x80 {
                        return Err(ErrorKind::InvalidEncoding);
                    }
                    cp
                }
                3 => {
                    let (b1, b2) = (bytes[pos + 1], bytes[pos + 2]);
                    if b1 & 0xC0 != 0x80 || b2 & 0xC0 != 0x80 {
                        return Err(ErrorKind::InvalidEncoding);
                    }
                    let cp = ((b0 as u32 & 0x0F) << 12) | ((b1 as u32 & 0x3F) << 6) | (b2 as u32 & 0x3F);
                    if cp < 0x800 || (0xD800..=0xDFFF).contains(&cp) {
                        return Err(ErrorKind::InvalidEncoding);
                    }
                    cp
                }
                4 => {
                    let (b1, b2, b3) = (bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]);
                    if b1 & 0xC0 != 0x80 || b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                        return Err(ErrorKind::InvalidEncoding);
                    }
                    let cp = ((b0 as u32 & 0x07) << 18)
                        | ((b1 as u32 & 0x3F) << 12)
                        | ((b2 as u32 & 0x3F) << 6)
                        | (b3 as u32 & 0x3F);
                    if !(0x10000..=0x10FFFF).contains(&cp) {
                        return Err(ErrorKind::InvalidEncoding);
                    }
                    cp
                }
                _ => unreachable!(),
            };
            Ok((cp, len))
        }
        Encoding::Utf16Le | Encoding::Utf16Be => {
            if pos + 2 > bytes.len() {
                return Err(ErrorKind::InvalidEncoding);
            }
            let unit = read_unit(bytes, pos / 2, encoding);
            if (0xD800..=0xDBFF).contains(&unit) {
                if pos + 4 > bytes.len() {
                    return Err(ErrorKind::InvalidEncoding);
                }
                let low = read_unit(bytes, pos / 2 + 1, encoding);
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(ErrorKind::InvalidEncoding);
                }
                let cp = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                Ok((cp, 4))
            } else if (0xDC00..=0xDFFF).contains(&unit) {
                Err(ErrorKind::InvalidEncoding)
            } else {
                Ok((unit, 2))
            }
        }
        Encoding::Utf32Le | Encoding::Utf32Be => {
            if pos + 4 > bytes.len() {
                return Err(ErrorKind::InvalidEncoding);
            }
            let cp = read_unit(bytes, pos / 4, encoding);
            if cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
                return Err(ErrorKind::InvalidEncoding);
            }
            Ok((cp, 4))
        }
    }
}

/// Decode `bytes` (in `encoding`) into Unicode scalar values by calling
/// [`decode_one`] across the whole buffer.
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<Vec<u32>, ErrorKind> {
    let mut out = Vec::with_capacity(bytes.len() / encoding.code_unit_size().max(1));
    let mut pos = 0;
    while pos < bytes.len() {
        let (cp, len) = decode_one(bytes, pos, encoding)?;
        out.push(cp);
        pos += len;
    }
    Ok(out)
}

/// Encode Unicode scalar values into `encoding`'s byte representation.
/// Callers are expected to have validated scalars already (e.g. via
/// [`decode`]); out-of-range values are replaced with U+FFFD rather than
/// causing a panic.
pub fn encode(scalars: &[u32], encoding: Encoding) -> Vec<u8> {
    let mut out = Vec::with_capacity(scalars.len() * encoding.code_unit_size());
    for &cp in scalars {
        let cp = if cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
            0xFFFD
        } else {
            cp
        };
        match encoding {
            Encoding::Utf8 => encode_utf8(&mut out, cp),
            Encoding::Utf16Le | Encoding::Utf16Be => {
                if cp > 0xFFFF {
                    let v = cp - 0x10000;
                    let high = 0xD800 + (v >> 10);
                    let low = 0xDC00 + (v & 0x3FF);
                    write_unit(&mut out, high, encoding);
                    write_unit(&mut out, low, encoding);
                } else {
                    write_unit(&mut out, cp, encoding);
                }
            }
            Encoding::Utf32Le | Encoding::Utf32Be => write_unit(&mut out, cp, encoding),
        }
    }
    out
}

/// Append the UTF-8 encoding of a single scalar to `out`. Exposed so the
/// parser can build up a string's arena copy incrementally (one escape or
/// one literal run at a time) without an intermediate `Vec<u32>`.
pub fn encode_utf8(out: &mut Vec<u8>, cp: u32) {
    if cp < 0x80 {
        out.push(cp as u8);
    } else if cp < 0x800 {
        out.push(0xC0 | (cp >> 6) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    } else if cp < 0x10000 {
        out.push(0xE0 | (cp >> 12) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    } else {
        out.push(0xF0 | (cp >> 18) as u8);
        out.push(0x80 | ((cp >> 12) & 0x3F) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    }
}

/// Append the encoding of a single scalar, in any of the five encodings,
/// to `out`. Used by the parser to build a non-UTF-8-native document's
/// arena copy of a string one scalar at a time.
pub fn encode_one(out: &mut Vec<u8>, cp: u32, encoding: Encoding) {
    let cp = if cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
        0xFFFD
    } else {
        cp
    };
    match encoding {
        Encoding::Utf8 => encode_utf8(out, cp),
        Encoding::Utf16Le | Encoding::Utf16Be => {
            if cp > 0xFFFF {
                let v = cp - 0x10000;
                write_unit(out, 0xD800 + (v >> 10), encoding);
                write_unit(out, 0xDC00 + (v & 0x3FF), encoding);
            } else {
                write_unit(out, cp, encoding);
            }
        }
        Encoding::Utf32Le | Encoding::Utf32Be => write_unit(out, cp, encoding),
    }
}

/// Transcode a buffer from one encoding to another.
pub fn convert(bytes: &[u8], from: Encoding, to: Encoding) -> Result<Vec<u8>, ErrorKind> {
    if from == to {
        return Ok(bytes.to_vec());
    }
    let scalars = decode(bytes, from)?;
    Ok(encode(&scalars, to))
}

/// Exact byte length `convert(bytes, from, to)` would produce, without
/// building the output — used to pre-size arena allocations.
pub fn measure(bytes: &[u8], from: Encoding, to: Encoding) -> Result<usize, ErrorKind> {
    if from == to {
        return Ok(bytes.len());
    }
    let scalars = decode(bytes, from)?;
    let len = match to {
        Encoding::Utf8 => scalars
            .iter()
            .map(|&cp| if cp < 0x80 { 1 } else if cp < 0x800 { 2 } else if cp < 0x10000 { 3 } else { 4 })
            .sum(),
        Encoding::Utf16Le | Encoding::Utf16Be => scalars
            .iter()
            .map(|&cp| if cp > 0xFFFF { 4 } else { 2 })
            .sum(),
        Encoding::Utf32Le | Encoding::Utf32Be => scalars.len() * 4,
    };
    Ok(len)
}

/// Read a native code unit of width `W` from a buffer at `index`, applying
/// a byte swap if `swap` is set. Used by the parser when scanning a
/// same-width buffer that may have non-native byte order.
pub fn native_unit<W: CodeUnit>(bytes: &[u8], index: usize, swap: bool) -> u32 {
    let size = W::SIZE;
    let offset = index * size;
    match size {
        1 => bytes[offset] as u32,
        2 => {
            let pair = [bytes[offset], bytes[offset + 1]];
            if swap {
                u16::from_be_bytes(pair) as u32
            } else {
                u16::from_le_bytes(pair) as u32
            }
        }
        4 => {
            let quad = [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]];
            if swap {
                u32::from_be_bytes(quad)
            } else {
                u32::from_le_bytes(quad)
            }
        }
        _ => unreachable!(),
    }
}

pub fn is_valid_utf8(bytes: &[u8]) -> bool {
    decode(bytes, Encoding::Utf8).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_defaults_to_utf8() {
        assert_eq!(detect(b"{\"a\":1}"), Encoding::Utf8);
    }

    #[test]
    fn detect_utf16le_from_ascii_start() {
        let bytes = [b'{', 0x00, b'"', 0x00];
        assert_eq!(detect(&bytes), Encoding::Utf16Le);
    }

    #[test]
    fn detect_utf16be_from_ascii_start() {
        let bytes = [0x00, b'{', 0x00, b'"'];
        assert_eq!(detect(&bytes), Encoding::Utf16Be);
    }

    #[test]
    fn detect_utf32le_from_ascii_start() {
        let bytes = [b'{', 0x00, 0x00, 0x00];
        assert_eq!(detect(&bytes), Encoding::Utf32Le);
    }

    #[test]
    fn detect_utf32be_from_ascii_start() {
        let bytes = [0x00, 0x00, 0x00, b'{'];
        assert_eq!(detect(&bytes), Encoding::Utf32Be);
    }

    #[test]
    fn round_trip_utf8_to_utf16_and_back() {
        let original = "{\"k\":\"héllo 🎈\"}".as_bytes();
        let utf16 = convert(original, Encoding::Utf8, Encoding::Utf16Le).unwrap();
        let back = convert(&utf16, Encoding::Utf16Le, Encoding::Utf8).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn round_trip_through_utf32() {
        let original = "\"surrogate pair: 😀\"".as_bytes();
        let utf32 = convert(original, Encoding::Utf8, Encoding::Utf32Be).unwrap();
        let back = convert(&utf32, Encoding::Utf32Be, Encoding::Utf8).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn measure_matches_convert_length() {
        let original = "[1, 2, \"three 🎉\"]".as_bytes();
        let measured = measure(original, Encoding::Utf8, Encoding::Utf16Be).unwrap();
        let converted = convert(original, Encoding::Utf8, Encoding::Utf16Be).unwrap();
        assert_eq!(measured, converted.len());
    }

    #[test]
    fn rejects_truncated_utf8_sequence() {
        let bytes = [0xE2u8, 0x82]; // incomplete 3-byte sequence
        assert_eq!(decode(&bytes, Encoding::Utf8), Err(ErrorKind::InvalidEncoding));
    }

    #[test]
    fn rejects_lone_high_surrogate() {
        let bytes = [0x00, 0xD8]; // 0xD800 little-endian, no low surrogate follows
        assert_eq!(decode(&bytes, Encoding::Utf16Le), Err(ErrorKind::InvalidEncoding));
    }

    #[test]
    fn rejects_unaligned_buffer_length() {
        let bytes = [0x00, 0x00, 0x00]; // not a multiple of 2
        assert_eq!(decode(&bytes, Encoding::Utf16Le), Err(ErrorKind::InvalidEncoding));
    }

    #[test]
    fn decode_one_reports_consumed_length() {
        let bytes = "a💙".as_bytes();
        let (cp, len) = decode_one(bytes, 0, Encoding::Utf8).unwrap();
        assert_eq!(cp, 'a' as u32);
        assert_eq!(len, 1);
        let (cp2, len2) = decode_one(bytes, 1, Encoding::Utf8).unwrap();
        assert_eq!(cp2, '💙' as u32);
        assert_eq!(len2, 4);
    }

    #[test]
    fn is_valid_utf8_rejects_overlong_encoding() {
        // Overlong two-byte encoding of U+002F ('/').
        assert!(!is_valid_utf8(&[0xC0, 0xAF]));
    }
}
