//! S-expression tree produced by the list reader.

use std::fmt;

use crate::{Error, Result};

/// A generic IMAP value: a string, a parenthesized list, or `NIL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    /// Atom, quoted string, or literal contents, as received.
    ///
    /// IMAP text is 8-bit; use [`Sexp::as_str`] for the UTF-8 view.
    String(Vec<u8>),
    /// Parenthesized list.
    List(Vec<Sexp>),
    /// The `NIL` atom.
    Null,
}

/// The shape of a [`Sexp`] without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexpKind {
    /// [`Sexp::String`].
    String,
    /// [`Sexp::List`].
    List,
    /// [`Sexp::Null`].
    Null,
}

impl fmt::Display for SexpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::List => "list",
            Self::Null => "NIL",
        })
    }
}

impl Sexp {
    /// Returns the shape of this value.
    #[must_use]
    pub const fn kind(&self) -> SexpKind {
        match self {
            Self::String(_) => SexpKind::String,
            Self::List(_) => SexpKind::List,
            Self::Null => SexpKind::Null,
        }
    }

    /// Returns true for `NIL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text if this is a string holding valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()?).ok()
    }

    /// Returns the raw bytes if this is a string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts into the list elements.
    pub fn into_list(self) -> Result<Vec<Self>> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(Error::UnexpectedKind {
                expected: SexpKind::List,
                actual: other.kind(),
            }),
        }
    }

    /// Converts an nstring (`NIL` or string) into optional raw bytes.
    pub fn into_nstring(self) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Null => Ok(None),
            Self::String(s) => Ok(Some(s)),
            Self::List(_) => Err(Error::UnexpectedKind {
                expected: SexpKind::String,
                actual: SexpKind::List,
            }),
        }
    }
}

impl From<&str> for Sexp {
    fn from(s: &str) -> Self {
        Self::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Sexp {
    fn from(s: String) -> Self {
        Self::String(s.into_bytes())
    }
}

impl From<&[u8]> for Sexp {
    fn from(s: &[u8]) -> Self {
        Self::String(s.to_vec())
    }
}

impl From<Vec<Sexp>> for Sexp {
    fn from(items: Vec<Sexp>) -> Self {
        Self::List(items)
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NIL"),
            Self::String(s) => {
                let text = String::from_utf8_lossy(s);
                if is_bare(&text) {
                    return f.write_str(&text);
                }
                f.write_str("\"")?;
                for c in text.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Returns true if the string reads back as the same atom.
fn is_bare(s: &str) -> bool {
    !s.is_empty()
        && s != "NIL"
        && !s.bytes().any(|b| {
            matches!(
                b,
                b'(' | b')' | b'{' | b' ' | b'%' | b'*' | b'"' | b'\r' | b'\n'
            )
        })
}
