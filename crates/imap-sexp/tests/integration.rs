//! Integration tests for the IMAP reader.
//!
//! These tests drive the parser the way a session would, over a mock stream
//! that hands out server bytes in small chunks like a socket.

use std::io::{self, BufReader, Read};
use std::sync::{Arc, Mutex};

use imap_sexp::{Config, Error, Parser, Sexp, SexpKind};
use proptest::prelude::*;

/// Mock stream that returns predefined server output a few bytes at a time.
struct MockStream {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl MockStream {
    fn new(data: &[u8], chunk: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            chunk,
        }
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.pos..];
        let to_read = remaining.len().min(buf.len()).min(self.chunk);
        buf[..to_read].copy_from_slice(&remaining[..to_read]);
        self.pos += to_read;
        Ok(to_read)
    }
}

const TRANSCRIPT: &[u8] = b"* OK [CAPABILITY IMAP4rev1 IDLE] Dovecot ready.\r\n\
* LIST (\\HasNoChildren \\Sent) \"/\" Sent\r\n\
* 1 FETCH (UID 42 FLAGS (\\Seen) RFC822.SIZE 11 BODY[] {11}\r\nHi\r\nthere\r\n)\r\n\
A001 OK [READ-ONLY] EXAMINE completed\r\n";

fn read_transcript<R: io::BufRead>(parser: &mut Parser<R>) {
    // Greeting
    assert_eq!(parser.read_token().unwrap(), "*");
    assert_eq!(parser.read_token().unwrap(), "OK");
    assert_eq!(
        parser.read_bracketed().unwrap(),
        "CAPABILITY IMAP4rev1 IDLE"
    );
    parser.expect(b" ").unwrap();
    assert_eq!(parser.read_to_end_of_line().unwrap(), "Dovecot ready.");

    // LIST
    assert_eq!(parser.read_token().unwrap(), "*");
    assert_eq!(parser.read_token().unwrap(), "LIST");
    assert_eq!(
        parser.read_paren_string_list().unwrap(),
        vec!["\\HasNoChildren", "\\Sent"]
    );
    parser.expect(b" ").unwrap();
    assert_eq!(parser.read_quoted().unwrap(), "/");
    parser.expect(b" ").unwrap();
    assert_eq!(parser.read_token().unwrap(), "Sent");
    parser.expect_end_of_line().unwrap();

    // FETCH with a literal that contains CRLF
    assert_eq!(parser.read_token().unwrap(), "*");
    assert_eq!(parser.read_token().unwrap(), "1");
    assert_eq!(parser.read_token().unwrap(), "FETCH");
    assert_eq!(
        parser.read_sexp().unwrap(),
        vec![
            Sexp::from("UID"),
            Sexp::from("42"),
            Sexp::from("FLAGS"),
            Sexp::List(vec![Sexp::from("\\Seen")]),
            Sexp::from("RFC822.SIZE"),
            Sexp::from("11"),
            Sexp::from("BODY[]"),
            Sexp::from("Hi\r\nthere\r\n"),
        ]
    );
    parser.expect_end_of_line().unwrap();

    // Tagged completion
    assert_eq!(parser.read_token().unwrap(), "A001");
    assert_eq!(parser.read_token().unwrap(), "OK");
    assert_eq!(parser.read_bracketed().unwrap(), "READ-ONLY");
    parser.expect(b" ").unwrap();
    assert_eq!(parser.read_to_end_of_line().unwrap(), "EXAMINE completed");

    assert!(parser.read_token().unwrap_err().is_eof());
    assert_eq!(parser.position(), TRANSCRIPT.len());
}

#[test]
fn test_session_transcript() {
    let mut parser = Parser::new(TRANSCRIPT);
    read_transcript(&mut parser);
}

#[test]
fn test_session_transcript_chunked() {
    let stream = MockStream::new(TRANSCRIPT, 3);
    let mut parser = Parser::new(BufReader::with_capacity(4, stream));
    read_transcript(&mut parser);
}

#[test]
fn test_session_transcript_buffered() {
    let mut parser = Parser::buffered(MockStream::new(TRANSCRIPT, 7));
    read_transcript(&mut parser);
}

#[test]
fn test_envelope_nstrings() {
    let input: &[u8] =
        b"(\"Mon, 7 Feb 1994 21:52:25 -0800\" \"IMAP4rev1 WG mtg summary\" ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) NIL)";
    let mut parser = Parser::new(input);

    let mut envelope = parser.read_sexp().unwrap().into_iter();
    assert_eq!(
        envelope.next().unwrap().into_nstring().unwrap().as_deref(),
        Some(&b"Mon, 7 Feb 1994 21:52:25 -0800"[..])
    );
    assert_eq!(
        envelope.next().unwrap().into_nstring().unwrap().as_deref(),
        Some(&b"IMAP4rev1 WG mtg summary"[..])
    );

    let from = envelope.next().unwrap().into_list().unwrap();
    let address = from[0].as_list().unwrap();
    assert_eq!(address[0].as_str(), Some("Terry Gray"));
    assert!(address[1].is_null());
    assert_eq!(address[3].as_str(), Some("cac.washington.edu"));

    assert_eq!(envelope.next().unwrap().into_nstring().unwrap(), None);
    assert!(envelope.next().is_none());
}

#[test]
fn test_capability_list_rejects_nested() {
    let mut parser = Parser::new(&b"(IMAP4rev1 (IDLE) STARTTLS)"[..]);

    match parser.read_paren_string_list().unwrap_err() {
        Error::ListElementType { index, kind } => {
            assert_eq!(index, 1);
            assert_eq!(kind, SexpKind::List);
        }
        other => panic!("Expected ListElementType, got {other:?}"),
    }
}

#[test]
fn test_literal_size_cap() {
    let config = Config::builder().max_literal_size(1024).build();
    let mut parser = Parser::with_config(&b"(BODY[] {4096}\r\n"[..], config);

    assert!(matches!(
        parser.read_sexp().unwrap_err(),
        Error::LiteralTooLarge {
            size: 4096,
            limit: 1024
        }
    ));
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_events_use_injected_span() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let span = tracing::info_span!("session", conn = 7);
        let mut parser = Parser::new(&b"CAPABILITY IMAP4rev1\r\n"[..]).with_span(span);
        assert_eq!(parser.read_atom().unwrap(), "CAPABILITY");
    });

    let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("session{conn=7}"), "{output}");
    assert!(output.contains("atom=CAPABILITY"), "{output}");
}

proptest! {
    #[test]
    fn prop_expect_always_consumes(
        text in proptest::collection::vec(any::<u8>(), 1..8),
        input in proptest::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut parser = Parser::new(&input[..]);
        let result = parser.expect(&text);

        if input.len() < text.len() {
            prop_assert!(result.unwrap_err().is_eof());
        } else {
            prop_assert_eq!(result.is_ok(), input[..text.len()] == text[..]);
            prop_assert_eq!(parser.into_inner(), &input[text.len()..]);
        }
    }

    #[test]
    fn prop_literal_is_binary_safe(
        data in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut input = format!("{{{}}}\r\n", data.len()).into_bytes();
        input.extend_from_slice(&data);
        input.extend_from_slice(b" tail");

        let mut parser = Parser::new(&input[..]);
        prop_assert_eq!(parser.read_literal().unwrap(), data);
        prop_assert_eq!(parser.into_inner(), &b" tail"[..]);
    }

    #[test]
    fn prop_list_literal_is_binary_safe(
        data in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut input = format!("(BODY[] {{{}}}\r\n", data.len()).into_bytes();
        input.extend_from_slice(&data);
        input.extend_from_slice(b")");

        let mut parser = Parser::new(&input[..]);
        let items = parser.read_sexp().unwrap();
        prop_assert_eq!(items, vec![Sexp::from("BODY[]"), Sexp::String(data)]);
    }

    #[test]
    fn prop_quoted_escapes_decode(text in any::<String>()) {
        let mut input = Vec::from(&b"\""[..]);
        for byte in text.bytes() {
            if byte == b'"' || byte == b'\\' {
                input.push(b'\\');
            }
            input.push(byte);
        }
        input.push(b'"');

        let mut parser = Parser::new(&input[..]);
        prop_assert_eq!(parser.read_quoted().unwrap(), text);
        prop_assert!(parser.into_inner().is_empty());
    }
}
