//! # Recursive-Descent JSON Parser
//!
//! Builds a [`document::Document`] from a byte buffer whose encoding is
//! either auto-detected ([`parse`]) or supplied by the caller
//! ([`parse_with_encoding`]). Grammar extensions (`TRAILING_COMMAS`,
//! `COMMENTS`) are gated by [`common::ParseFlags`] (spec §4.E).
//! **Zero external dependencies beyond `common`, `encoding` and
//! `document`.**

#![forbid(unsafe_code)]

mod grammar;
mod scanner;

use common::{CodeUnit, ErrorKind, ParseError, ParseFlags};
use document::{Document, ValueId};

use scanner::{is_ascii_digit, Scanner};

const LBRACE: u32 = '{' as u32;
const RBRACE: u32 = '}' as u32;
const LBRACKET: u32 = '[' as u32;
const RBRACKET: u32 = ']' as u32;
const QUOTE: u32 = '"' as u32;
const COLON: u32 = ':' as u32;
const COMMA: u32 = ',' as u32;
const MINUS: u32 = '-' as u32;
const DOT: u32 = '.' as u32;
const LOWER_N: u32 = 'n' as u32;
const LOWER_T: u32 = 't' as u32;
const LOWER_F: u32 = 'f' as u32;

/// Parse `input`, auto-detecting its encoding from the leading bytes
/// (spec §4.A).
pub fn parse<'buf, W: CodeUnit>(input: &'buf [u8], flags: ParseFlags) -> Result<Document<'buf, W>, ParseError> {
    let encoding = encoding::detect(input);
    parse_with_encoding(input, encoding, flags)
}

/// Parse `input`, which is already known to be encoded as `encoding`.
pub fn parse_with_encoding<'buf, W: CodeUnit>(
    input: &'buf [u8],
    encoding: common::Encoding,
    flags: ParseFlags,
) -> Result<Document<'buf, W>, ParseError> {
    flags.validate().map_err(|k| ParseError::new(k, 0))?;

    let mut scanner = Scanner::new(input, encoding);
    let mut doc = Document::with_input(input);

    scanner.skip_trivia(flags)?;
    match scanner.peek()? {
        Some(cp) if cp == LBRACE || cp == LBRACKET => {}
        _ => return Err(scanner.err(ErrorKind::UnexpectedStart)),
    }

    let root = parse_value(&mut scanner, &mut doc, flags)?;

    scanner.skip_trivia(flags)?;
    if !scanner.eof() {
        return Err(scanner.err(ErrorKind::UnexpectedTrailing));
    }

    doc.set_root(root);
    Ok(doc)
}

fn parse_value<'buf, W: CodeUnit>(
    scanner: &mut Scanner<'buf>,
    doc: &mut Document<'buf, W>,
    flags: ParseFlags,
) -> Result<ValueId, ParseError> {
    scanner.skip_trivia(flags)?;
    let cp = scanner.peek()?.ok_or_else(|| scanner.err(ErrorKind::UnexpectedToken))?;

    if cp == LBRACE {
        parse_object(scanner, doc, flags)
    } else if cp == LBRACKET {
        parse_array(scanner, doc, flags)
    } else if cp == QUOTE {
        let text = grammar::scan_string(scanner, doc)?;
        Ok(doc.new_string_from_text(text))
    } else if cp == LOWER_N {
        grammar::scan_literal(scanner, "null")?;
        Ok(doc.new_null())
    } else if cp == LOWER_T {
        grammar::scan_literal(scanner, "true")?;
        Ok(doc.new_bool(true))
    } else if cp == LOWER_F {
        grammar::scan_literal(scanner, "false")?;
        Ok(doc.new_bool(false))
    } else if cp == MINUS || cp == DOT || is_ascii_digit(cp) {
        grammar::scan_number(scanner, doc)
    } else {
        Err(scanner.err(ErrorKind::UnexpectedToken))
    }
}

fn parse_object<'buf, W: CodeUnit>(
    scanner: &mut Scanner<'buf>,
    doc: &mut Document<'buf, W>,
    flags: ParseFlags,
) -> Result<ValueId, ParseError> {
    scanner.advance()?; // consume '{'
    let object = doc.new_object();

    scanner.skip_trivia(flags)?;
    if scanner.peek()? == Some(RBRACE) {
        scanner.advance()?;
        return Ok(object);
    }

    loop {
        scanner.skip_trivia(flags)?;
        if scanner.peek()? != Some(QUOTE) {
            return Err(scanner.err(ErrorKind::ExpectedName));
        }
        let name = grammar::scan_string(scanner, doc)?;

        scanner.skip_trivia(flags)?;
        if scanner.peek()? != Some(COLON) {
            return Err(scanner.err(ErrorKind::ExpectedColon));
        }
        scanner.advance()?;

        scanner.skip_trivia(flags)?;
        let value = parse_value(scanner, doc, flags)?;
        doc.attach_member(object, name, value);

        scanner.skip_trivia(flags)?;
        match scanner.peek()? {
            Some(c) if c == COMMA => {
                scanner.advance()?;
                scanner.skip_trivia(flags)?;
                if flags.has(ParseFlags::TRAILING_COMMAS) && scanner.peek()? == Some(RBRACE) {
                    scanner.advance()?;
                    return Ok(object);
                }
            }
            Some(c) if c == RBRACE => {
                scanner.advance()?;
                return Ok(object);
            }
            _ => return Err(scanner.err(ErrorKind::ExpectedSeparator)),
        }
    }
}

fn parse_array<'buf, W: CodeUnit>(
    scanner: &mut Scanner<'buf>,
    doc: &mut Document<'buf, W>,
    flags: ParseFlags,
) -> Result<ValueId, ParseError> {
    scanner.advance()?; // consume '['
    let array = doc.new_array();

    scanner.skip_trivia(flags)?;
    if scanner.peek()? == Some(RBRACKET) {
        scanner.advance()?;
        return Ok(array);
    }

    loop {
        scanner.skip_trivia(flags)?;
        let value = parse_value(scanner, doc, flags)?;
        doc.array_add(array, value);

        scanner.skip_trivia(flags)?;
        match scanner.peek()? {
            Some(c) if c == COMMA => {
                scanner.advance()?;
                scanner.skip_trivia(flags)?;
                if flags.has(ParseFlags::TRAILING_COMMAS) && scanner.peek()? == Some(RBRACKET) {
                    scanner.advance()?;
                    return Ok(array);
                }
            }
            Some(c) if c == RBRACKET => {
                scanner.advance()?;
                return Ok(array);
            }
            _ => return Err(scanner.err(ErrorKind::ExpectedSeparator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document::ValueKind;

    fn parse_u8(input: &str, flags: ParseFlags) -> Result<Document<'_, u8>, ParseError> {
        parse(input.as_bytes(), flags)
    }

    #[test]
    fn parses_flat_object() {
        let doc = parse_u8(r#"{"a": 1, "b": true, "c": null, "d": "x"}"#, ParseFlags::default()).unwrap();
        let root = doc.root().unwrap();
        assert!(matches!(doc.kind(root), ValueKind::Object));
        let a = doc.object_get(root, "a").unwrap();
        assert!(matches!(doc.kind(a), ValueKind::Number { value, .. } if *value == 1.0));
        let b = doc.object_get(root, "b").unwrap();
        assert_eq!(*doc.kind(b), ValueKind::Bool(true));
        let c = doc.object_get(root, "c").unwrap();
        assert!(doc.kind(c).is_null());
        let d = doc.object_get(root, "d").unwrap();
        match doc.kind(d) {
            ValueKind::String(t) => assert_eq!(doc.text_str(*t), "x"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_array() {
        let doc = parse_u8("[1, [2, 3], {\"k\": 4}]", ParseFlags::default()).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.child_count(root), 3);
        let nested = doc.array_get(root, 1).unwrap();
        assert_eq!(doc.child_count(nested), 2);
    }

    #[test]
    fn rejects_top_level_scalar() {
        let err = parse_u8("42", ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedStart);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse_u8("{}garbage", ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedTrailing);
    }

    #[test]
    fn rejects_trailing_comma_by_default() {
        let err = parse_u8(r#"{"a": 1,}"#, ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedName);
    }

    #[test]
    fn accepts_trailing_comma_with_flag() {
        let flags = ParseFlags::new(ParseFlags::TRAILING_COMMAS);
        let doc = parse_u8(r#"{"a": 1, "b": 2,}"#, flags).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.child_count(root), 2);

        let doc = parse_u8("[1, 2, 3,]", flags).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.child_count(root), 3);
    }

    #[test]
    fn rejects_comments_by_default() {
        let err = parse_u8("{\"a\": 1 /* note */}", ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedSeparator);
    }

    #[test]
    fn accepts_comments_with_flag() {
        let flags = ParseFlags::new(ParseFlags::COMMENTS);
        let doc = parse_u8(
            "{\n  // leading comment\n  \"a\": 1 /* trailing */\n}",
            flags,
        )
        .unwrap();
        let root = doc.root().unwrap();
        let a = doc.object_get(root, "a").unwrap();
        assert!(matches!(doc.kind(a), ValueKind::Number { value, .. } if *value == 1.0));
    }

    #[test]
    fn accepts_hash_comments_with_flag() {
        let flags = ParseFlags::new(ParseFlags::COMMENTS);
        let doc = parse_u8("{\n  # leading comment\n  \"a\": 1 # trailing\n}", flags).unwrap();
        let root = doc.root().unwrap();
        let a = doc.object_get(root, "a").unwrap();
        assert!(matches!(doc.kind(a), ValueKind::Number { value, .. } if *value == 1.0));
    }

    #[test]
    fn rejects_hash_comments_by_default() {
        let err = parse_u8("{\"a\": 1 # note\n}", ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedSeparator);
    }

    #[test]
    fn rejects_leading_bare_dot_with_specific_diagnostic() {
        let err = parse_u8("[.5]", ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedDigit);
    }

    #[test]
    fn parses_negative_and_exponent_numbers() {
        let doc = parse_u8("[-12, 3.5, 2e3, 1.5E-2]", ParseFlags::default()).unwrap();
        let root = doc.root().unwrap();
        let expected = [-12.0, 3.5, 2000.0, 0.015];
        for (i, want) in expected.iter().enumerate() {
            let id = doc.array_get(root, i as isize).unwrap();
            match doc.kind(id) {
                ValueKind::Number { value, .. } => assert!((value - want).abs() < 1e-9),
                other => panic!("expected number, got {other:?}"),
            }
        }
    }

    #[test]
    fn overflowing_exponent_falls_back_to_inf_string() {
        let doc = parse_u8("[1e400, -1e400]", ParseFlags::default()).unwrap();
        let root = doc.root().unwrap();
        let pos = doc.array_get(root, 0).unwrap();
        let neg = doc.array_get(root, 1).unwrap();
        match doc.kind(pos) {
            ValueKind::String(text) => assert_eq!(doc.text_str(*text), "Inf"),
            other => panic!("expected ValueKind::String(\"Inf\"), got {other:?}"),
        }
        match doc.kind(neg) {
            ValueKind::String(text) => assert_eq!(doc.text_str(*text), "-Inf"),
            other => panic!("expected ValueKind::String(\"-Inf\"), got {other:?}"),
        }
    }

    #[test]
    fn decodes_string_escapes_and_surrogate_pairs() {
        let doc = parse_u8(r#"["a\tbc😀"]"#, ParseFlags::default()).unwrap();
        let root = doc.root().unwrap();
        let s = doc.array_get(root, 0).unwrap();
        match doc.kind(s) {
            ValueKind::String(t) => assert_eq!(doc.text_str(*t), "a\tbc\u{1F600}"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = parse_u8(r#"["abc"#, ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
    }

    #[test]
    fn rejects_lone_high_surrogate_escape() {
        let err = parse_u8(r#"["\ud83d"]"#, ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSurrogate);
    }

    #[test]
    fn reports_byte_offset_on_error() {
        let err = parse_u8(r#"{"a": 1 "b": 2}"#, ParseFlags::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedSeparator);
        assert_eq!(err.offset, 8);
    }

    #[test]
    fn parses_utf16_encoded_input() {
        let utf8 = br#"{"k":"v"}"#;
        let utf16 = ::encoding::convert(utf8, common::Encoding::Utf8, common::Encoding::Utf16Be).unwrap();
        let doc = parse::<u16>(&utf16, ParseFlags::default()).unwrap();
        let root = doc.root().unwrap();
        let v = doc.object_get(root, "k").unwrap();
        match doc.kind(v) {
            ValueKind::String(t) => assert_eq!(doc.text_str(*t), "v"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_flags() {
        let flags = ParseFlags::new(ParseFlags::NO_STRING_TERMINATORS | ParseFlags::FORCE_STRING_TERMINATORS);
        let err = parse_u8("{}", flags).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFlags);
    }

    #[test]
    fn duplicate_object_keys_preserve_first_on_lookup() {
        let doc = parse_u8(r#"{"a": 1, "a": 2}"#, ParseFlags::default()).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.child_count(root), 2);
        let a = doc.object_get(root, "a").unwrap();
        assert!(matches!(doc.kind(a), ValueKind::Number { value, .. } if *value == 1.0));
    }
}
