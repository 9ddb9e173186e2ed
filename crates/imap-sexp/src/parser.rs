//! Grammar readers for IMAP server output.
//!
//! Each reader consumes exactly the bytes of one production and leaves the
//! stream positioned at the first byte after it. The caller picks the reader
//! from protocol context; [`Parser::read_sexp`] picks for itself based on one
//! byte of lookahead.
//!
//! ```text
//! atom      = 1*<any byte except ( ) { SP % * ">
//! quoted    = DQUOTE *(char / "\" DQUOTE / "\\") DQUOTE
//! literal   = "{" number "}" CRLF *OCTET
//! list      = "(" [element *(SP element)] ")"
//! element   = atom / quoted / literal / list / "NIL"
//! bracketed = "[" *<any byte except "]"> "]"
//! ```
//!
//! Backslash is deliberately not an atom delimiter so that flags such as
//! `\Seen` read as a single atom.

#![allow(clippy::missing_errors_doc)]

use std::io::{BufRead, BufReader, Read};

use tracing::Span;

use crate::config::{Config, DEFAULT_BUFFER_SIZE};
use crate::sexp::Sexp;
use crate::stream::ByteStream;
use crate::{Error, Result};

/// Blocking reader for IMAP syntax over a buffered stream.
///
/// One parser belongs to one connection. Every read takes `&mut self`, so
/// reads are serialized by construction.
#[derive(Debug)]
pub struct Parser<R> {
    stream: ByteStream<R>,
    config: Config,
    span: Span,
}

impl<R: Read> Parser<BufReader<R>> {
    /// Wraps an unbuffered reader with the default buffer capacity.
    pub fn buffered(inner: R) -> Self {
        Parser::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, inner))
    }
}

impl<R: BufRead> Parser<R> {
    /// Creates a parser with default configuration.
    ///
    /// Events are emitted under the span that is current at construction.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, Config::default())
    }

    /// Creates a parser with the given configuration.
    pub fn with_config(reader: R, config: Config) -> Self {
        Self {
            stream: ByteStream::new(reader),
            config,
            span: Span::current(),
        }
    }

    /// Sets the span that parents every event this parser emits.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the parser configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.stream.position()
    }

    /// Gets a reference to the underlying reader.
    pub const fn get_ref(&self) -> &R {
        self.stream.get_ref()
    }

    /// Consumes the parser and returns the underlying reader.
    ///
    /// Bytes already buffered by the reader stay in it.
    pub fn into_inner(self) -> R {
        self.stream.into_inner()
    }

    /// Reads `text.len()` bytes and checks that they equal `text`.
    ///
    /// The bytes are consumed whether or not they match.
    pub fn expect(&mut self, text: &[u8]) -> Result<()> {
        let position = self.position();
        let actual = self.stream.read_exact(text.len())?;

        if actual == text {
            Ok(())
        } else {
            tracing::debug!(
                parent: &self.span,
                position,
                expected = %text.escape_ascii(),
                actual = %actual.escape_ascii(),
                "expect mismatch"
            );
            Err(Error::MalformedSyntax {
                position,
                expected: text.to_vec(),
                actual,
            })
        }
    }

    /// Consumes CRLF.
    pub fn expect_end_of_line(&mut self) -> Result<()> {
        self.expect(b"\r\n")
    }

    /// Reads the rest of the line and returns it without the terminator.
    pub fn read_to_end_of_line(&mut self) -> Result<String> {
        let limit = self.config.max_line_length;
        let Some(mut line) = self.stream.read_until(b'\n', Some(limit))? else {
            tracing::debug!(parent: &self.span, limit, "line too long");
            return Err(Error::LineTooLong { limit });
        };

        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        let line = self.text(line)?;
        tracing::trace!(parent: &self.span, line = %line, "line");
        Ok(line)
    }

    /// Reads a space-separated token.
    ///
    /// A terminating space is consumed; a terminating CR is left in place so
    /// the caller can still match the end of the line.
    pub fn read_token(&mut self) -> Result<String> {
        let mut token = Vec::with_capacity(16);

        loop {
            match self.stream.peek()? {
                b' ' => {
                    self.stream.next_byte()?;
                    break;
                }
                b'\r' => break,
                byte => {
                    self.stream.next_byte()?;
                    token.push(byte);
                }
            }
        }

        let token = self.text(token)?;
        tracing::trace!(parent: &self.span, token = %token, "token");
        Ok(token)
    }

    /// Reads an atom, leaving the delimiter that ended it unconsumed.
    pub fn read_atom(&mut self) -> Result<String> {
        let atom = self.atom_bytes()?;
        self.text(atom)
    }

    /// Reads a quoted string and returns its decoded contents.
    pub fn read_quoted(&mut self) -> Result<String> {
        let quoted = self.quoted_bytes()?;
        self.text(quoted)
    }

    fn atom_bytes(&mut self) -> Result<Vec<u8>> {
        let mut atom = Vec::with_capacity(16);

        loop {
            let byte = self.stream.peek()?;
            if is_atom_delimiter(byte) {
                break;
            }
            self.stream.next_byte()?;
            atom.push(byte);
        }

        tracing::trace!(parent: &self.span, atom = %atom.escape_ascii(), "atom");
        Ok(atom)
    }

    fn quoted_bytes(&mut self) -> Result<Vec<u8>> {
        self.expect(b"\"")?;

        let mut quoted = Vec::with_capacity(16);

        loop {
            match self.stream.next_byte()? {
                b'"' => break,
                b'\\' => {
                    let position = self.position();
                    match self.stream.next_byte()? {
                        byte @ (b'"' | b'\\') => quoted.push(byte),
                        byte => {
                            tracing::debug!(parent: &self.span, position, byte, "invalid escape");
                            return Err(Error::EscapeSequence { position, byte });
                        }
                    }
                }
                byte => quoted.push(byte),
            }
        }

        tracing::trace!(parent: &self.span, quoted = %quoted.escape_ascii(), "quoted");
        Ok(quoted)
    }

    /// Reads a literal and returns its raw payload.
    ///
    /// The payload is returned byte for byte; it may contain CR, LF or NUL.
    pub fn read_literal(&mut self) -> Result<Vec<u8>> {
        self.expect(b"{")?;

        let position = self.position();
        let limit = self.config.literal_scan_limit;
        let Some(mut field) = self.stream.read_until(b'}', Some(limit))? else {
            return Err(self.literal_length_error(position, "no closing brace"));
        };
        field.pop();

        if field.is_empty() {
            return Err(self.literal_length_error(position, "missing length"));
        }
        if !field.iter().all(u8::is_ascii_digit) {
            return Err(self.literal_length_error(position, "non-numeric length"));
        }
        let size = std::str::from_utf8(&field)
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or_else(|| self.literal_length_error(position, "length out of range"))?;

        if let Some(limit) = self.config.max_literal_size
            && size > limit
        {
            tracing::debug!(parent: &self.span, size, limit, "literal too large");
            return Err(Error::LiteralTooLarge { size, limit });
        }

        self.expect_end_of_line()?;

        let data = self.stream.read_exact(size)?;
        tracing::trace!(parent: &self.span, size, "literal");
        Ok(data)
    }

    /// Reads `[text]` and returns the text between the brackets.
    ///
    /// Brackets do not nest; the first `]` ends the text. A response code
    /// never spans lines, so the scan stops after `max_line_length` bytes.
    pub fn read_bracketed(&mut self) -> Result<String> {
        self.expect(b"[")?;

        let limit = self.config.max_line_length;
        let Some(mut text) = self.stream.read_until(b']', Some(limit))? else {
            tracing::debug!(parent: &self.span, limit, "unterminated bracketed text");
            return Err(Error::LineTooLong { limit });
        };
        text.pop();

        let text = self.text(text)?;
        tracing::trace!(parent: &self.span, text = %text, "bracketed");
        Ok(text)
    }

    /// Reads a parenthesized list and returns its elements.
    ///
    /// Elements are dispatched on their first byte: `(` nests, `"` is a
    /// quoted string, `{` is a literal, and anything else is an atom, with
    /// `NIL` becoming [`Sexp::Null`]. Elements are normally separated by a
    /// single space; any other byte after an element is left in place and
    /// read as the start of the next element.
    pub fn read_sexp(&mut self) -> Result<Vec<Sexp>> {
        self.read_list(1)
    }

    /// Reads a parenthesized list whose elements must all be strings.
    ///
    /// Elements are decoded as UTF-8.
    pub fn read_paren_string_list(&mut self) -> Result<Vec<String>> {
        self.read_sexp()?
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Sexp::String(s) => self.text(s),
                other => {
                    let kind = other.kind();
                    tracing::debug!(parent: &self.span, index, %kind, "non-string list element");
                    Err(Error::ListElementType { index, kind })
                }
            })
            .collect()
    }

    fn read_list(&mut self, depth: usize) -> Result<Vec<Sexp>> {
        if let Some(limit) = self.config.max_depth
            && depth > limit
        {
            tracing::debug!(parent: &self.span, limit, "list nesting too deep");
            return Err(Error::NestingTooDeep { limit });
        }

        self.expect(b"(")?;

        let mut items = Vec::with_capacity(4);

        loop {
            let item = match self.stream.peek()? {
                b')' => {
                    self.stream.next_byte()?;
                    break;
                }
                b'(' => Sexp::List(self.read_list(depth + 1)?),
                b'"' => Sexp::String(self.quoted_bytes()?),
                b'{' => Sexp::String(self.read_literal()?),
                byte @ (b'%' | b'*') => {
                    let position = self.position();
                    tracing::debug!(parent: &self.span, position, byte, "unexpected list element");
                    return Err(Error::UnexpectedByte { position, byte });
                }
                _ => {
                    let atom = self.atom_bytes()?;
                    if atom == b"NIL" {
                        Sexp::Null
                    } else {
                        Sexp::String(atom)
                    }
                }
            };
            items.push(item);

            match self.stream.peek()? {
                b' ' => {
                    self.stream.next_byte()?;
                }
                b')' => {
                    self.stream.next_byte()?;
                    break;
                }
                _ => {}
            }
        }

        tracing::trace!(parent: &self.span, depth, len = items.len(), "list");
        Ok(items)
    }

    fn literal_length_error(&self, position: usize, reason: &'static str) -> Error {
        tracing::debug!(parent: &self.span, position, reason, "bad literal length");
        Error::LiteralLength { position, reason }
    }

    /// Decodes bytes read for a text production.
    fn text(&self, bytes: Vec<u8>) -> Result<String> {
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 {
            position: self.position(),
        })
    }
}

/// Returns true if the byte ends an atom.
///
/// This is the atom-specials set minus CTL, resp-specials and backslash.
#[must_use]
pub const fn is_atom_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'{' | b' ' | b'%' | b'*' | b'"')
}
