//! Header block decoder for HTTP/1 requests and responses.
//!
//! The start line and header fields are tokenized by `httparse` and handed to an [`Events`]
//! handler as borrowed strings, without copying them out of the read buffer. While the fields are
//! delivered the decoder also records everything needed to frame the body that follows.
//!
//! # Limits
//!
//! - Maximum number of header fields: [`MAX_HEADER_NUM`]
//! - Maximum header block size: [`MAX_HEADER_BYTES`] unless configured otherwise
//! - Only HTTP/1.0 and HTTP/1.1 are accepted
//!
//! # Body framing
//!
//! Decided after [RFC 9112 Section 6.3](https://www.rfc-editor.org/rfc/rfc9112#section-6.3):
//!
//! 1. 1xx, 204 and 304 responses never have a body.
//! 2. `Transfer-Encoding` with `chunked` as the final coding selects the chunked decoder. Any other
//!    transfer coding is an error for requests and reads until EOF for responses.
//! 3. `Content-Length` gives a fixed length. Duplicates must agree.
//! 4. Requests without either field have no body, responses read until EOF.
//!
//! A message carrying both `Transfer-Encoding` and `Content-Length` is rejected as ambiguous.

use std::borrow::Cow;
use std::marker::PhantomData;

use bytes::{Buf, BytesMut};
use httparse::Status;
use tracing::trace;

use crate::ensure;
use crate::parser::Events;
use crate::protocol::{ParseError, PayloadSize, Role, StartLine};

/// Maximum number of header fields in a message
pub const MAX_HEADER_NUM: usize = 64;

/// Default maximum size in bytes of the start line plus the header fields
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// What the rest of the parse needs to know about a decoded header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    /// Protocol version as `10 * major + minor`
    pub version: u8,
    pub size: PayloadSize,
    pub connection: ConnectionFlags,
}

/// Tokens seen in `Connection` / `Proxy-Connection` and whether an `Upgrade` field is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionFlags {
    pub close: bool,
    pub keep_alive: bool,
    pub upgrade: bool,
    pub upgrade_field: bool,
}

#[derive(Debug, Clone)]
pub struct HeaderDecoder<R> {
    limit: usize,
    _role: PhantomData<R>,
}

impl<R: Role> HeaderDecoder<R> {
    pub fn new() -> Self {
        Self { limit: MAX_HEADER_BYTES, _role: PhantomData }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Tries to decode a complete header block from `src`.
    ///
    /// Returns `Ok(None)` and leaves `src` untouched when more bytes are needed. Otherwise the
    /// start line and fields are delivered to `handler` and the header block is removed from `src`.
    pub fn decode<H: Events + ?Sized>(&mut self, src: &mut BytesMut, handler: &mut H) -> Result<Option<Head>, ParseError> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];

        let parsed = if R::IS_REQUEST { parse_request(src, &mut headers)? } else { parse_response(src, &mut headers)? };

        let Some(parsed) = parsed else {
            ensure!(src.len() <= self.limit, ParseError::too_large_header(src.len(), self.limit));
            return Ok(None);
        };

        trace!(header_size = parsed.len, fields = parsed.fields.len(), "parsed header block");
        ensure!(parsed.len <= self.limit, ParseError::too_large_header(parsed.len, self.limit));

        handler.on_start_line(&parsed.start)?;

        let mut framing = Framing::default();
        for field in parsed.fields {
            let value = field_value(field.value)?;
            trace!(name = field.name, value = %value, "header field");
            framing.record(field.name, &value)?;
            handler.on_field(field.name, &value)?;
        }

        let head = Head {
            version: parsed.start.version(),
            size: framing.payload_size(&parsed.start)?,
            connection: framing.connection,
        };

        let len = parsed.len;
        src.advance(len);
        Ok(Some(head))
    }
}

impl<R: Role> Default for HeaderDecoder<R> {
    fn default() -> Self {
        Self::new()
    }
}

struct Parsed<'h, 'b> {
    start: StartLine<'b>,
    fields: &'h [httparse::Header<'b>],
    len: usize,
}

fn parse_request<'h, 'b>(buf: &'b [u8], headers: &'h mut [httparse::Header<'b>]) -> Result<Option<Parsed<'h, 'b>>, ParseError> {
    let mut req = httparse::Request::new(headers);
    let len = match req.parse(buf).map_err(map_error)? {
        Status::Complete(len) => len,
        Status::Partial => return Ok(None),
    };

    let method = req.method.ok_or_else(|| ParseError::malformed_start_line("missing method"))?;
    let target = req.path.ok_or_else(|| ParseError::malformed_start_line("missing request target"))?;
    let version = version(req.version)?;

    Ok(Some(Parsed { start: StartLine::Request { method, target, version }, fields: req.headers, len }))
}

fn parse_response<'h, 'b>(buf: &'b [u8], headers: &'h mut [httparse::Header<'b>]) -> Result<Option<Parsed<'h, 'b>>, ParseError> {
    let mut res = httparse::Response::new(headers);
    let mut config = httparse::ParserConfig::default();
    config.allow_obsolete_multiline_headers_in_responses(true);

    let len = match config.parse_response(&mut res, buf).map_err(map_error)? {
        Status::Complete(len) => len,
        Status::Partial => return Ok(None),
    };

    let status = res.code.ok_or_else(|| ParseError::malformed_start_line("missing status code"))?;
    let reason = res.reason.unwrap_or("");
    let version = version(res.version)?;

    Ok(Some(Parsed { start: StartLine::Response { status, reason, version }, fields: res.headers, len }))
}

fn map_error(e: httparse::Error) -> ParseError {
    match e {
        httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
        httparse::Error::HeaderName | httparse::Error::HeaderValue | httparse::Error::NewLine => {
            ParseError::malformed_header_field(e)
        }
        e => ParseError::malformed_start_line(e),
    }
}

fn version(minor: Option<u8>) -> Result<u8, ParseError> {
    match minor {
        Some(minor @ (0 | 1)) => Ok(10 + minor),
        Some(minor) => Err(ParseError::malformed_start_line(format!("unsupported http version 1.{minor}"))),
        None => Err(ParseError::malformed_start_line("missing http version")),
    }
}

/// Collapses obsolete line folding into spaces, trims the value and checks it is UTF-8.
fn field_value(raw: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    let value: Cow<'_, [u8]> = if raw.iter().any(|b| matches!(b, b'\r' | b'\n')) {
        Cow::Owned(raw.iter().map(|&b| if matches!(b, b'\r' | b'\n') { b' ' } else { b }).collect())
    } else {
        Cow::Borrowed(raw)
    };

    match value {
        Cow::Borrowed(bytes) => {
            let trimmed = trim_ows(bytes);
            std::str::from_utf8(trimmed).map(Cow::Borrowed).map_err(ParseError::malformed_header_field)
        }
        Cow::Owned(bytes) => {
            let trimmed = trim_ows(&bytes);
            std::str::from_utf8(trimmed).map(|s| Cow::Owned(s.to_owned())).map_err(ParseError::malformed_header_field)
        }
    }
}

fn trim_ows(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !matches!(b, b' ' | b'\t')).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !matches!(b, b' ' | b'\t')).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Body framing and connection state collected from the header fields.
#[derive(Debug, Default)]
struct Framing {
    content_length: Option<u64>,
    transfer_encoding: bool,
    chunked: bool,
    connection: ConnectionFlags,
}

impl Framing {
    fn record(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        if name.eq_ignore_ascii_case("content-length") {
            self.record_content_length(value)
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            self.transfer_encoding = true;
            // refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-transfer-encoding
            if let Some(coding) = value.rsplit(',').map(str::trim).find(|c| !c.is_empty()) {
                self.chunked = coding.eq_ignore_ascii_case("chunked");
            }
            Ok(())
        } else if name.eq_ignore_ascii_case("connection") || name.eq_ignore_ascii_case("proxy-connection") {
            for token in value.split(',').map(str::trim) {
                if token.eq_ignore_ascii_case("close") {
                    self.connection.close = true;
                } else if token.eq_ignore_ascii_case("keep-alive") {
                    self.connection.keep_alive = true;
                } else if token.eq_ignore_ascii_case("upgrade") {
                    self.connection.upgrade = true;
                }
            }
            Ok(())
        } else {
            if name.eq_ignore_ascii_case("upgrade") {
                self.connection.upgrade_field = true;
            }
            Ok(())
        }
    }

    fn record_content_length(&mut self, value: &str) -> Result<(), ParseError> {
        // a list of identical values is tolerated, see RFC 9110 Section 8.6
        for item in value.split(',').map(str::trim) {
            let length = parse_content_length(item)?;
            match self.content_length {
                Some(existing) if existing != length => {
                    return Err(ParseError::ambiguous_body_length(format!(
                        "conflicting content-length values {existing} and {length}"
                    )));
                }
                _ => self.content_length = Some(length),
            }
        }
        Ok(())
    }

    fn payload_size(&self, start: &StartLine<'_>) -> Result<PayloadSize, ParseError> {
        let is_request = start.is_request();
        if let StartLine::Response { status, .. } = *start {
            if (100..200).contains(&status) || status == 204 || status == 304 {
                return Ok(PayloadSize::Empty);
            }
        }

        if self.transfer_encoding {
            ensure!(
                self.content_length.is_none(),
                ParseError::ambiguous_body_length("transfer-encoding and content-length both present")
            );
            if self.chunked {
                return Ok(PayloadSize::Chunked);
            }
            ensure!(!is_request, ParseError::ambiguous_body_length("chunked is not the final transfer coding"));
            return Ok(PayloadSize::UntilEof);
        }

        match self.content_length {
            Some(length) => Ok(PayloadSize::Length(length)),
            None if is_request => Ok(PayloadSize::Empty),
            None => Ok(PayloadSize::UntilEof),
        }
    }
}

fn parse_content_length(value: &str) -> Result<u64, ParseError> {
    ensure!(
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
        ParseError::malformed_header_field(format!("invalid content-length {value:?}"))
    );

    value.bytes().try_fold(0u64, |acc, b| acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))).ok_or_else(|| {
        ParseError::content_length_overflow(u64::MAX)
    })
}
