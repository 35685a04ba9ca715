//! String, number and literal scanning.
//!
//! Each scan function decides, per value, whether its text can stay a
//! zero-copy span into the caller's input buffer or must be copied (and,
//! for strings, unescaped) into the document's arena — the storage-decision
//! table from spec §4.E. A span is zero-copy only when the source
//! encoding's code-unit width and byte order already match the document's
//! native width `W`; differing width/order always forces an arena copy,
//! and within a matching width a string additionally needs an arena copy
//! as soon as it contains an escape sequence.

use common::{CodeUnit, ErrorKind, ParseError};
use document::{Document, Text, ValueId};

use crate::scanner::{is_ascii_digit, Scanner};

const QUOTE: u32 = '"' as u32;
const BACKSLASH: u32 = '\\' as u32;
const MINUS: u32 = '-' as u32;
const PLUS: u32 = '+' as u32;
const DOT: u32 = '.' as u32;
const ZERO: u32 = '0' as u32;
const LOWER_E: u32 = 'e' as u32;
const UPPER_E: u32 = 'E' as u32;

fn zero_copy_possible<W: CodeUnit>(encoding: common::Encoding) -> bool {
    !encoding.swapped() && encoding.code_unit_size() == W::SIZE
}

/// Scan a `"`-delimited string starting at the current position (which must
/// be the opening quote) and return its content as a [`Text`] span.
pub(crate) fn scan_string<'buf, W: CodeUnit>(
    scanner: &mut Scanner<'buf>,
    doc: &mut Document<'buf, W>,
) -> Result<Text, ParseError> {
    debug_assert_eq!(scanner.peek()?, Some(QUOTE));
    scanner.advance()?;

    let raw_start = scanner.offset();
    let mut copy: Option<Vec<u8>> = if zero_copy_possible::<W>(scanner.encoding) {
        None
    } else {
        Some(Vec::new())
    };

    loop {
        let unit_start = scanner.offset();
        let cp = scanner
            .advance()?
            .ok_or_else(|| ParseError::new(ErrorKind::UnterminatedString, unit_start))?;

        if cp == QUOTE {
            return match copy {
                None => Ok(Text::Input {
                    start: raw_start,
                    end: unit_start,
                }),
                Some(buf) => doc.copy_into_arena(&buf).map_err(|k| ParseError::new(k, unit_start)),
            };
        }

        if cp == BACKSLASH {
            let buf = copy.get_or_insert_with(|| scanner.bytes_range(raw_start, unit_start).to_vec());
            let escaped = scan_escape(scanner, unit_start)?;
            encoding::encode_one(buf, escaped, W::ENCODING_NATIVE);
            continue;
        }

        if cp == 0 {
            return Err(ParseError::new(ErrorKind::UnterminatedString, unit_start));
        }

        if let Some(buf) = &mut copy {
            encoding::encode_one(buf, cp, W::ENCODING_NATIVE);
        }
    }
}

/// `escape_start` is the byte offset of the `\` itself — every error this
/// function (and [`scan_unicode_escape`]) raises is pinned there rather
/// than at the specific code unit that turned out to be invalid, so a
/// caller always lands on the start of the offending escape sequence.
fn scan_escape(scanner: &mut Scanner, escape_start: usize) -> Result<u32, ParseError> {
    let c = scanner
        .advance()?
        .ok_or_else(|| ParseError::new(ErrorKind::InvalidEscape, escape_start))?;

    let cp = match c {
        c if c == '"' as u32 => '"' as u32,
        c if c == '\\' as u32 => '\\' as u32,
        c if c == '/' as u32 => '/' as u32,
        c if c == 'b' as u32 => 0x08,
        c if c == 'f' as u32 => 0x0C,
        c if c == 'n' as u32 => 0x0A,
        c if c == 'r' as u32 => 0x0D,
        c if c == 't' as u32 => 0x09,
        c if c == 'u' as u32 => return scan_unicode_escape(scanner, escape_start),
        _ => return Err(ParseError::new(ErrorKind::InvalidEscape, escape_start)),
    };
    Ok(cp)
}

fn scan_unicode_escape(scanner: &mut Scanner, escape_start: usize) -> Result<u32, ParseError> {
    let hi = scan_hex4(scanner)?;
    if (0xD800..=0xDBFF).contains(&hi) {
        if scanner.peek()? != Some(BACKSLASH) {
            return Err(ParseError::new(ErrorKind::InvalidSurrogate, escape_start));
        }
        scanner.advance()?;
        if scanner.peek()? != Some('u' as u32) {
            return Err(ParseError::new(ErrorKind::InvalidSurrogate, escape_start));
        }
        scanner.advance()?;
        let lo = scan_hex4(scanner)?;
        if !(0xDC00..=0xDFFF).contains(&lo) {
            return Err(ParseError::new(ErrorKind::InvalidSurrogate, escape_start));
        }
        Ok(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00))
    } else if (0xDC00..=0xDFFF).contains(&hi) {
        Err(ParseError::new(ErrorKind::InvalidSurrogate, escape_start))
    } else {
        Ok(hi)
    }
}

fn scan_hex4(scanner: &mut Scanner) -> Result<u32, ParseError> {
    let mut value = 0u32;
    for _ in 0..4 {
        let pos = scanner.offset();
        let c = scanner.advance()?.ok_or_else(|| ParseError::new(ErrorKind::InvalidHex, pos))?;
        if c > 0xFF {
            return Err(ParseError::new(ErrorKind::InvalidHex, pos));
        }
        let nibble = common::tables::hex_nibble(c as u8).ok_or_else(|| ParseError::new(ErrorKind::InvalidHex, pos))?;
        value = (value << 4) | nibble as u32;
    }
    Ok(value)
}

/// Scan a JSON number: `-?(0|[1-9]\d*)(\.\d+)?([eE][+-]?\d+)?`.
///
/// A leading bare `.` (no integer part) is invalid JSON; rather than
/// falling through to a generic "unexpected token" at the top-level
/// dispatch, the caller routes `.` into this function so the missing
/// integer part is reported as a specific [`ErrorKind::ExpectedDigit`].
pub(crate) fn scan_number<'buf, W: CodeUnit>(
    scanner: &mut Scanner<'buf>,
    doc: &mut Document<'buf, W>,
) -> Result<ValueId, ParseError> {
    let start = scanner.offset();
    let mut text = String::new();

    if scanner.peek()? == Some(MINUS) {
        text.push('-');
        scanner.advance()?;
    }

    match scanner.peek()? {
        Some(cp) if cp == DOT => {
            return Err(ParseError::new(ErrorKind::ExpectedDigit, scanner.offset()));
        }
        Some(ZERO) => {
            text.push('0');
            scanner.advance()?;
        }
        Some(cp) if is_ascii_digit(cp) => {
            scan_digits(scanner, &mut text)?;
        }
        _ => return Err(ParseError::new(ErrorKind::ExpectedDigit, scanner.offset())),
    }

    if scanner.peek()? == Some(DOT) {
        text.push('.');
        scanner.advance()?;
        let before = text.len();
        scan_digits(scanner, &mut text)?;
        if text.len() == before {
            return Err(ParseError::new(ErrorKind::ExpectedDigit, scanner.offset()));
        }
    }

    if let Some(cp) = scanner.peek()? {
        if cp == LOWER_E || cp == UPPER_E {
            text.push('e');
            scanner.advance()?;
            if let Some(sign) = scanner.peek()? {
                if sign == PLUS || sign == MINUS {
                    text.push(if sign == PLUS { '+' } else { '-' });
                    scanner.advance()?;
                }
            }
            let before = text.len();
            scan_digits(scanner, &mut text)?;
            if text.len() == before {
                return Err(ParseError::new(ErrorKind::ExpectedDigit, scanner.offset()));
            }
        }
    }

    let end = scanner.offset();
    let value: f64 = text.parse().map_err(|_| ParseError::new(ErrorKind::ExpectedDigit, start))?;

    let original = if zero_copy_possible::<W>(scanner.encoding) {
        Text::Input { start, end }
    } else {
        let mut buf = Vec::with_capacity(text.len() * W::SIZE);
        for ch in text.chars() {
            encoding::encode_one(&mut buf, ch as u32, W::ENCODING_NATIVE);
        }
        doc.copy_into_arena(&buf).map_err(|k| ParseError::new(k, start))?
    };

    Ok(doc.new_number_with_original(value, original))
}

fn scan_digits(scanner: &mut Scanner, text: &mut String) -> Result<(), ParseError> {
    while let Some(cp) = scanner.peek()? {
        if is_ascii_digit(cp) {
            text.push((cp as u8) as char);
            scanner.advance()?;
        } else {
            break;
        }
    }
    Ok(())
}

/// Match a fixed keyword (`true`/`false`/`null`) starting at the current
/// position, which must already be known to start with the keyword's first
/// character.
pub(crate) fn scan_literal(scanner: &mut Scanner, word: &str) -> Result<(), ParseError> {
    let start = scanner.offset();
    for expected in word.chars() {
        match scanner.advance()? {
            Some(cp) if cp == expected as u32 => {}
            _ => return Err(ParseError::new(ErrorKind::UnexpectedToken, start)),
        }
    }
    Ok(())
}
