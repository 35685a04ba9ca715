//! # Common Foundation Crate
//!
//! Shared types for the pooled JSON document library: code-unit abstraction,
//! lookup tables, encoding/byte-order types, parse/print flag bitmasks, and
//! the error taxonomy. **Zero external dependencies.**

#![forbid(unsafe_code)]

use core::fmt;

pub mod tables;

// ─────────────────────────────────────────────────────────────────────────────
// Endian
// ─────────────────────────────────────────────────────────────────────────────

/// Byte order for multi-byte code-unit encoding/decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// The byte order of the machine running this code.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endian = Endian::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endian = Endian::Big;

    pub fn swapped(self) -> bool {
        self != Self::NATIVE
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CodeUnit — the W parameter from spec §3
// ─────────────────────────────────────────────────────────────────────────────

/// A document's code-unit width: 8, 16, or 32 bits.
///
/// Implemented for `u8`, `u16`, `u32`. Monomorphizing `Document<W>` /
/// `Parser<W>` over this trait is the Rust expression of the source's
/// template parameter (spec §9).
pub trait CodeUnit: Copy + Clone + PartialEq + Eq + PartialOrd + Ord + fmt::Debug + 'static {
    const SIZE: usize;
    const ENCODING_NATIVE: Encoding;

    fn from_u32(v: u32) -> Self;
    fn to_u32(self) -> u32;

    fn zero() -> Self {
        Self::from_u32(0)
    }
}

impl CodeUnit for u8 {
    const SIZE: usize = 1;
    const ENCODING_NATIVE: Encoding = Encoding::Utf8;
    #[inline]
    fn from_u32(v: u32) -> Self {
        v as u8
    }
    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }
}

impl CodeUnit for u16 {
    const SIZE: usize = 2;
    const ENCODING_NATIVE: Encoding = Encoding::Utf16Le;
    #[inline]
    fn from_u32(v: u32) -> Self {
        v as u16
    }
    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }
}

impl CodeUnit for u32 {
    const SIZE: usize = 4;
    const ENCODING_NATIVE: Encoding = Encoding::Utf32Le;
    #[inline]
    fn from_u32(v: u32) -> Self {
        v
    }
    #[inline]
    fn to_u32(self) -> u32 {
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Input/output encoding, detected or supplied explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl Encoding {
    /// Code-unit width in bytes for this encoding (§4.A `encoding_code_unit_size`).
    pub fn code_unit_size(self) -> usize {
        tables::ENCODING_CODE_UNIT_SIZE[self as usize]
    }

    pub fn endian(self) -> Endian {
        match self {
            Encoding::Utf8 | Encoding::Utf16Le | Encoding::Utf32Le => Endian::Little,
            Encoding::Utf16Be | Encoding::Utf32Be => Endian::Big,
        }
    }

    pub fn swapped(self) -> bool {
        self.endian() != Endian::NATIVE && self.code_unit_size() > 1
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ParseFlags
// ─────────────────────────────────────────────────────────────────────────────

/// Compile-time-shaped parse behavior flags (spec §4.E).
///
/// Modeled as a plain bitmask newtype rather than a dependency on a
/// bitflags-style crate — the teacher corpus never reaches for one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ParseFlags(pub u32);

impl ParseFlags {
    pub const NONE: u32 = 0;
    pub const NO_STRING_TERMINATORS: u32 = 1 << 0;
    pub const FORCE_STRING_TERMINATORS: u32 = 1 << 1;
    pub const NO_INLINE_TRANSLATION: u32 = 1 << 2;
    pub const TRAILING_COMMAS: u32 = 1 << 3;
    pub const COMMENTS: u32 = 1 << 4;

    /// `NO_STRING_TERMINATORS | NO_INLINE_TRANSLATION`.
    pub const NON_DESTRUCTIVE: u32 = Self::NO_STRING_TERMINATORS | Self::NO_INLINE_TRANSLATION;
    /// `FORCE_STRING_TERMINATORS`.
    pub const NON_DESTRUCTIVE_NUL: u32 = Self::FORCE_STRING_TERMINATORS;

    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn has(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    /// Reject mutually-exclusive combinations at entry (spec §4.E).
    pub fn validate(self) -> Result<(), ErrorKind> {
        if self.has(Self::NO_STRING_TERMINATORS) && self.has(Self::FORCE_STRING_TERMINATORS) {
            return Err(ErrorKind::InvalidFlags);
        }
        Ok(())
    }
}

impl core::ops::BitOr for ParseFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PrintFlags
// ─────────────────────────────────────────────────────────────────────────────

/// Printer behavior flags (spec §4.F).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrintFlags(pub u32);

impl PrintFlags {
    pub const NONE: u32 = 0;
    pub const NO_WHITESPACE: u32 = 1 << 0;
    pub const USE_SPACES: u32 = 1 << 1;
    pub const INDENT_1: u32 = 1 << 2;
    pub const INDENT_2: u32 = 1 << 3;
    pub const INDENT_4: u32 = 1 << 4;
    pub const INDENT_8: u32 = 1 << 5;

    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn has(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn compact(self) -> bool {
        self.has(Self::NO_WHITESPACE)
    }

    pub fn use_spaces(self) -> bool {
        self.has(Self::USE_SPACES)
    }

    /// Indent width in columns; default 4 if no `INDENT_*` bit is set.
    pub fn indent_width(self) -> u8 {
        if self.has(Self::INDENT_1) {
            1
        } else if self.has(Self::INDENT_2) {
            2
        } else if self.has(Self::INDENT_8) {
            8
        } else {
            4
        }
    }
}

impl Default for PrintFlags {
    fn default() -> Self {
        Self(Self::INDENT_4)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error taxonomy (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedStart,
    UnexpectedTrailing,
    UnexpectedToken,
    ExpectedName,
    ExpectedColon,
    ExpectedSeparator,
    UnterminatedString,
    InvalidEscape,
    InvalidHex,
    InvalidSurrogate,
    ExpectedDigit,
    InvalidEncoding,
    OutOfMemory,
    /// Not in spec.md's taxonomy table but needed at the API boundary:
    /// mutually-exclusive `ParseFlags` combination supplied by the caller.
    InvalidFlags,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnexpectedStart => "root value must be an object or array",
            Self::UnexpectedTrailing => "unexpected content after root value",
            Self::UnexpectedToken => "unexpected token",
            Self::ExpectedName => "expected a quoted member name",
            Self::ExpectedColon => "expected ':' after member name",
            Self::ExpectedSeparator => "expected ',', '}' or ']'",
            Self::UnterminatedString => "unterminated string literal",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidHex => "invalid hex digit in \\u escape",
            Self::InvalidSurrogate => "lone or mismatched UTF-16 surrogate",
            Self::ExpectedDigit => "expected a digit",
            Self::InvalidEncoding => "malformed input encoding",
            Self::OutOfMemory => "arena allocation failed",
            Self::InvalidFlags => "mutually exclusive parse flags requested",
        };
        f.write_str(msg)
    }
}

/// A parse-time error: kind plus the byte offset of the offending code unit
/// (spec §6 "Each parse error is paired with a byte offset").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte offset {})", self.kind, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// The arena's own allocation-failure type (no byte offset — the arena
/// does not know about the input buffer's coordinate space).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory;

impl fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("arena allocation failed")
    }
}

impl std::error::Error for OutOfMemory {}

impl From<OutOfMemory> for ErrorKind {
    fn from(_: OutOfMemory) -> Self {
        ErrorKind::OutOfMemory
    }
}
