//! # Printer
//!
//! Walks a [`document::Document`] and emits RFC 7159 JSON to a write-only
//! sink, one output code unit at a time (spec §4.F). Output is always
//! strict JSON — no comments, no trailing commas, regardless of what
//! `ParseFlags` the document was parsed with.

#![forbid(unsafe_code)]

use std::fmt;

use common::{CodeUnit, PrintFlags};
use document::{Document, Text, ValueId, ValueKind};

/// A write-only destination for printed code units, the Rust mapping of
/// spec §6's `sink` object exposing `write_one(code_unit)`.
pub trait Sink {
    fn write_one(&mut self, code_unit: u32) -> fmt::Result;

    fn write_ascii_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            self.write_one(b as u32)?;
        }
        Ok(())
    }
}

/// Adapts any [`fmt::Write`] (e.g. a `String`) into a [`Sink`] over Unicode
/// scalars — the common case for printing into an in-memory buffer.
pub struct FmtSink<'a, W: fmt::Write>(pub &'a mut W);

impl<'a, W: fmt::Write> Sink for FmtSink<'a, W> {
    fn write_one(&mut self, code_unit: u32) -> fmt::Result {
        let ch = char::from_u32(code_unit).unwrap_or(char::REPLACEMENT_CHARACTER);
        self.0.write_char(ch)
    }
}

/// Print `document`'s root value (or nothing, if the document has none).
pub fn print<W: CodeUnit, S: Sink>(sink: &mut S, document: &Document<'_, W>, flags: PrintFlags) -> fmt::Result {
    if let Some(root) = document.root() {
        print_value(sink, document, root, flags, 0)?;
    }
    Ok(())
}

/// Print a single value (and, recursively, its subtree) — the `print(sink,
/// container, flags)` overload from spec §6, generalized to any value kind.
pub fn print_value<W: CodeUnit, S: Sink>(
    sink: &mut S,
    document: &Document<'_, W>,
    id: ValueId,
    flags: PrintFlags,
    depth: usize,
) -> fmt::Result {
    match document.kind(id) {
        ValueKind::Null => sink.write_ascii_str("null"),
        ValueKind::Bool(true) => sink.write_ascii_str("true"),
        ValueKind::Bool(false) => sink.write_ascii_str("false"),
        ValueKind::Number { value, original } => print_number(sink, document, *value, *original),
        ValueKind::String(text) => print_string(sink, document, *text),
        ValueKind::Array => print_array(sink, document, id, flags, depth),
        ValueKind::Object => print_object(sink, document, id, flags, depth),
    }
}

fn print_number<W: CodeUnit, S: Sink>(
    sink: &mut S,
    document: &Document<'_, W>,
    value: f64,
    original: Option<Text>,
) -> fmt::Result {
    let canonical = format_canonical(value);
    // A number whose original source span already reads exactly like its
    // canonical form is copied verbatim; everything else (non-canonical
    // source text, or no source span at all because the value came from
    // the mutation API) renders fresh from the canonical string (spec
    // §4.F, last sentence).
    match original {
        Some(text) if document.text_str(text).as_ref() == canonical.as_str() => sink.write_ascii_str(&canonical),
        _ => sink.write_ascii_str(&canonical),
    }
}

/// Canonical decimal rendering of a finite double (spec §4.E).
fn format_canonical(value: f64) -> String {
    let abs = value.abs();
    if abs < 1e-12 {
        return "0".to_string();
    }
    if (1e-9..=1e12).contains(&abs) {
        format_fixed(value)
    } else {
        format_exponential(value)
    }
}

/// Fixed decimal with up to 12 fractional digits, trailing zeros (and a
/// bare trailing `.`) stripped.
fn format_fixed(value: f64) -> String {
    let mut s = format!("{value:.12}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// Exponential form with up to 12 significant digits, trailing mantissa
/// zeros stripped.
fn format_exponential(value: f64) -> String {
    let s = format!("{value:.11e}");
    let (mantissa, exponent) = s.split_once('e').expect("LowerExp output always contains 'e'");
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}e{exponent}")
}

fn print_string<W: CodeUnit, S: Sink>(sink: &mut S, document: &Document<'_, W>, text: Text) -> fmt::Result {
    sink.write_one('"' as u32)?;
    for ch in document.text_str(text).chars() {
        write_escaped(sink, ch)?;
    }
    sink.write_one('"' as u32)
}

fn write_escaped<S: Sink>(sink: &mut S, ch: char) -> fmt::Result {
    match ch {
        '"' => sink.write_ascii_str("\\\""),
        '\\' => sink.write_ascii_str("\\\\"),
        '\u{08}' => sink.write_ascii_str("\\b"),
        '\u{0C}' => sink.write_ascii_str("\\f"),
        '\n' => sink.write_ascii_str("\\n"),
        '\r' => sink.write_ascii_str("\\r"),
        '\t' => sink.write_ascii_str("\\t"),
        c if (c as u32) < 0x20 || (c as u32) > 0x7F => write_unicode_escape(sink, c),
        c => sink.write_one(c as u32),
    }
}

fn write_unicode_escape<S: Sink>(sink: &mut S, ch: char) -> fmt::Result {
    let cp = ch as u32;
    if cp < 0x10000 {
        write_hex4(sink, cp)
    } else {
        let v = cp - 0x10000;
        let hi = 0xD800 + (v >> 10);
        let lo = 0xDC00 + (v & 0x3FF);
        write_hex4(sink, hi)?;
        write_hex4(sink, lo)
    }
}

fn write_hex4<S: Sink>(sink: &mut S, cp: u32) -> fmt::Result {
    sink.write_ascii_str("\\u")?;
    for shift in [12, 8, 4, 0] {
        let nibble = (cp >> shift) & 0xF;
        sink.write_one(common::tables::HEX_CHAR[nibble as usize] as u32)?;
    }
    Ok(())
}

fn print_array<W: CodeUnit, S: Sink>(
    sink: &mut S,
    document: &Document<'_, W>,
    id: ValueId,
    flags: PrintFlags,
    depth: usize,
) -> fmt::Result {
    sink.write_one('[' as u32)?;
    let mut first = true;
    for child in document.children(id) {
        if !first {
            sink.write_one(',' as u32)?;
            if !flags.compact() {
                sink.write_one(' ' as u32)?;
            }
        }
        first = false;
        print_value(sink, document, child, flags, depth)?;
    }
    sink.write_one(']' as u32)
}

fn print_object<W: CodeUnit, S: Sink>(
    sink: &mut S,
    document: &Document<'_, W>,
    id: ValueId,
    flags: PrintFlags,
    depth: usize,
) -> fmt::Result {
    sink.write_one('{' as u32)?;
    let child_depth = depth + 1;
    let mut first = true;
    for child in document.children(id) {
        if !first {
            sink.write_one(',' as u32)?;
        }
        if !flags.compact() {
            write_newline_and_indent(sink, flags, child_depth)?;
        }
        first = false;

        let name = document.name(child).expect("object member has a name");
        print_string(sink, document, name)?;
        sink.write_one(':' as u32)?;
        if !flags.compact() {
            sink.write_one(' ' as u32)?;
        }
        print_value(sink, document, child, flags, child_depth)?;
    }
    if !first && !flags.compact() {
        write_newline_and_indent(sink, flags, depth)?;
    }
    sink.write_one('}' as u32)
}

fn write_newline_and_indent<S: Sink>(sink: &mut S, flags: PrintFlags, depth: usize) -> fmt::Result {
    sink.write_one('\n' as u32)?;
    let width = flags.indent_width() as usize * depth;
    let unit = if flags.use_spaces() { ' ' } else { '\t' };
    for _ in 0..width {
        sink.write_one(unit as u32)?;
    }
    Ok(())
}

/// Convenience wrapper returning a `String`, for callers that don't need a
/// custom [`Sink`].
pub fn print_to_string<W: CodeUnit>(document: &Document<'_, W>, flags: PrintFlags) -> Result<String, fmt::Error> {
    let mut out = String::new();
    print(&mut FmtSink(&mut out), document, flags)?;
    Ok(out)
}
