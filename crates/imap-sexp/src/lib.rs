//! # imap-sexp
//!
//! Blocking reader that turns raw IMAP server output into generic
//! S-expression trees for a higher-level client to interpret.
//!
//! ## Features
//!
//! - **Grammar readers**: atoms, quoted strings, binary-safe literals, `NIL`,
//!   parenthesized lists, bracketed response codes, and lines
//! - **One byte of lookahead**: readers never consume past the production
//!   they read, so they compose freely on a single stream
//! - **Closed value type**: [`Sexp`] is `String`, `List` or `Null`, nothing else
//! - **Typed errors**: every failure says what was expected and where
//! - **Injected logging**: `tracing` events go to a caller-supplied span
//!
//! ## Quick Start
//!
//! ```
//! use imap_sexp::{Parser, Sexp};
//!
//! let input: &[u8] = b"* 12 FETCH (FLAGS (\\Seen) BODY {5}\r\nhello)\r\n";
//! let mut parser = Parser::new(input);
//!
//! assert_eq!(parser.read_token()?, "*");
//! assert_eq!(parser.read_token()?, "12");
//! assert_eq!(parser.read_atom()?, "FETCH");
//! parser.expect(b" ")?;
//!
//! let items = parser.read_sexp()?;
//! assert_eq!(items[1], Sexp::List(vec![Sexp::from("\\Seen")]));
//! assert_eq!(items[3], Sexp::from("hello"));
//! parser.expect_end_of_line()?;
//! # Ok::<(), imap_sexp::Error>(())
//! ```
//!
//! ## Errors
//!
//! Nothing is retried or resynchronized. After any [`Error`] the position of
//! the stream relative to response boundaries is unknown, and the owning
//! session should drop the connection.
//!
//! ## Modules
//!
//! - [`config`]: Parser limits
//! - [`parser`]: Grammar readers
//! - [`sexp`]: S-expression tree
//! - [`stream`]: Buffered byte stream with lookahead

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod parser;
pub mod sexp;
pub mod stream;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use parser::Parser;
pub use sexp::{Sexp, SexpKind};
pub use stream::ByteStream;
