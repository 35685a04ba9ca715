//! Byte-offset scalar scanner.
//!
//! Wraps an input buffer and its (detected or supplied) source `Encoding`,
//! exposing `peek`/`advance` over decoded Unicode scalars while tracking a
//! plain byte offset — the coordinate space every [`common::ParseError`]
//! reports in (spec §6/§7). Whitespace and comment skipping live here too,
//! the same place `js_lexer::Lexer` keeps its `skip_whitespace_and_comments`.

use common::{Encoding, ErrorKind, ParseError, ParseFlags};

pub(crate) struct Scanner<'buf> {
    bytes: &'buf [u8],
    pub(crate) encoding: Encoding,
    pos: usize,
}

impl<'buf> Scanner<'buf> {
    pub(crate) fn new(bytes: &'buf [u8], encoding: Encoding) -> Self {
        Self { bytes, encoding, pos: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn bytes_range(&self, start: usize, end: usize) -> &'buf [u8] {
        &self.bytes[start..end]
    }

    pub(crate) fn err(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }

    /// Decode the scalar at the current position without consuming it.
    pub(crate) fn peek(&self) -> Result<Option<u32>, ParseError> {
        if self.eof() {
            return Ok(None);
        }
        let (cp, _) = encoding::decode_one(self.bytes, self.pos, self.encoding).map_err(|k| self.err(k))?;
        Ok(Some(cp))
    }

    /// Decode and consume the scalar at the current position.
    pub(crate) fn advance(&mut self) -> Result<Option<u32>, ParseError> {
        if self.eof() {
            return Ok(None);
        }
        let (cp, len) = encoding::decode_one(self.bytes, self.pos, self.encoding).map_err(|k| self.err(k))?;
        self.pos += len;
        Ok(Some(cp))
    }

    /// Skip whitespace, and `//`/`/* */`/`#` comments when
    /// `ParseFlags::COMMENTS` is set (spec §4.E extension grammar).
    pub(crate) fn skip_trivia(&mut self, flags: ParseFlags) -> Result<(), ParseError> {
        loop {
            match self.peek()? {
                Some(cp) if is_whitespace(cp) => {
                    self.advance()?;
                }
                Some(cp) if cp == '#' as u32 && flags.has(ParseFlags::COMMENTS) => {
                    self.advance()?;
                    loop {
                        match self.peek()? {
                            Some(c) if c != '\n' as u32 => {
                                self.advance()?;
                            }
                            _ => break,
                        }
                    }
                }
                Some(cp) if cp == '/' as u32 && flags.has(ParseFlags::COMMENTS) => {
                    let save = self.pos;
                    self.advance()?;
                    match self.peek()? {
                        Some(c) if c == '/' as u32 => {
                            self.advance()?;
                            loop {
                                match self.peek()? {
                                    Some(c) if c != '\n' as u32 => {
                                        self.advance()?;
                                    }
                                    _ => break,
                                }
                            }
                        }
                        Some(c) if c == '*' as u32 => {
                            self.advance()?;
                            loop {
                                match self.advance()? {
                                    Some(c) if c == '*' as u32 && self.peek()? == Some('/' as u32) => {
                                        self.advance()?;
                                        break;
                                    }
                                    None => return Err(self.err(ErrorKind::UnexpectedToken)),
                                    _ => {}
                                }
                            }
                        }
                        _ => {
                            // A lone '/' is not trivia; back off and let the
                            // caller's grammar reject it as an unexpected token.
                            self.pos = save;
                            return Ok(());
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}

fn is_whitespace(cp: u32) -> bool {
    cp < 256 && common::tables::IS_WHITESPACE[cp as usize]
}

pub(crate) fn is_ascii_digit(cp: u32) -> bool {
    cp < 256 && common::tables::IS_DIGIT[cp as usize]
}
