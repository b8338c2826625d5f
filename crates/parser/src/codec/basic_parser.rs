//! Byte-level HTTP/1 tokenizer driving an [`Events`] handler.
//!
//! [`BasicParser`] consumes bytes from a [`BytesMut`] and turns them into parse events for a
//! single message. It works in two phases:
//!
//! 1. Header parsing: the start line and header block are decoded by [`HeaderDecoder`] once the
//!    whole block is buffered. Partial blocks stay in the buffer until more bytes arrive.
//! 2. Payload parsing: the body is decoded by a [`PayloadDecoder`] chosen from the header fields.
//!
//! Bytes that belong to a following message are never consumed.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_http_parser::codec::BasicParser;
//! use micro_http_parser::parser::Events;
//! use micro_http_parser::protocol::{ParseError, Request, StartLine};
//!
//! #[derive(Default)]
//! struct BodyLen(usize);
//!
//! impl Events for BodyLen {
//!     fn on_start_line(&mut self, _: &StartLine<'_>) -> Result<(), ParseError> { Ok(()) }
//!     fn on_field(&mut self, _: &str, _: &str) -> Result<(), ParseError> { Ok(()) }
//!     fn on_header_complete(&mut self, _: Option<u64>) -> Result<(), ParseError> { Ok(()) }
//!     fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
//!         self.0 += data.len();
//!         Ok(())
//!     }
//!     fn on_complete(&mut self) -> Result<(), ParseError> { Ok(()) }
//! }
//!
//! let mut parser = BasicParser::<Request>::new();
//! let mut handler = BodyLen::default();
//! let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc");
//!
//! parser.feed(&mut buf, &mut handler).unwrap();
//! assert!(parser.is_done());
//! assert_eq!(handler.0, 3);
//! ```

use std::marker::PhantomData;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{Head, HeaderDecoder};
use crate::parser::Events;
use crate::protocol::{ParseError, PayloadItem, PayloadSize, Role};

pub struct BasicParser<R> {
    header_decoder: HeaderDecoder<R>,
    state: State,
    head: Option<Head>,
    header_only: bool,
    skip_body: bool,
    _role: PhantomData<R>,
}

#[derive(Debug)]
enum State {
    Head,
    Body(PayloadDecoder),
    Done,
    Failed,
}

impl<R: Role> BasicParser<R> {
    /// Creates a parser for a full message.
    pub fn new() -> Self {
        Self {
            header_decoder: HeaderDecoder::new(),
            state: State::Head,
            head: None,
            header_only: false,
            skip_body: false,
            _role: PhantomData,
        }
    }

    /// Creates a parser that completes right after the header block.
    pub fn for_header() -> Self {
        Self { header_only: true, ..Self::new() }
    }

    /// When set, the message completes after its header block and the body is left unread.
    ///
    /// Needed for responses to HEAD requests and for the response to a proxy CONNECT. Only takes
    /// effect before the header block is parsed.
    pub fn skip_body(&mut self, skip: bool) {
        if self.head.is_some() {
            warn!("skip_body ignored, header already parsed");
            return;
        }
        self.skip_body = skip;
    }

    pub fn is_skip_body(&self) -> bool {
        self.skip_body
    }

    pub fn is_header_only(&self) -> bool {
        self.header_only
    }

    /// Sets the maximum size of the header block, only before the header block is parsed.
    pub fn header_limit(&mut self, limit: usize) {
        if self.head.is_some() {
            warn!("header_limit ignored, header already parsed");
            return;
        }
        self.header_decoder.set_limit(limit);
    }

    /// Consumes as many bytes from `src` as possible, delivering events to `handler`.
    ///
    /// The first error fails the parser for good, later calls return [`ParseError::Failed`].
    pub fn feed<H: Events + ?Sized>(&mut self, src: &mut BytesMut, handler: &mut H) -> Result<(), ParseError> {
        self.run(src, handler, false)
    }

    /// Signals that no more input follows.
    ///
    /// Completes a body that is delimited by the end of input, fails with
    /// [`ParseError::PrematureEndOfInput`] if the message is otherwise unfinished.
    pub fn feed_eof<H: Events + ?Sized>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        self.run(&mut BytesMut::new(), handler, true)
    }

    /// Like [`feed_eof`](Self::feed_eof), but first decodes whatever is still buffered in `src`.
    pub fn feed_eof_with<H: Events + ?Sized>(&mut self, src: &mut BytesMut, handler: &mut H) -> Result<(), ParseError> {
        self.run(src, handler, true)
    }

    fn run<H: Events + ?Sized>(&mut self, src: &mut BytesMut, handler: &mut H, eof: bool) -> Result<(), ParseError> {
        match self.state {
            State::Done => return Ok(()),
            State::Failed => return Err(ParseError::Failed),
            _ => {}
        }

        match self.advance(src, handler, eof) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = State::Failed;
                warn!(cause = %e, "http message parse failed");
                Err(e)
            }
        }
    }

    fn advance<H: Events + ?Sized>(&mut self, src: &mut BytesMut, handler: &mut H, eof: bool) -> Result<(), ParseError> {
        loop {
            match &mut self.state {
                State::Head => {
                    let Some(head) = self.header_decoder.decode(src, handler)? else {
                        if eof {
                            return Err(ParseError::PrematureEndOfInput);
                        }
                        return Ok(());
                    };

                    debug!(version = head.version, payload = ?head.size, "header complete");
                    self.head = Some(head);
                    handler.on_header_complete(head.size.hint())?;

                    if self.header_only || self.skip_body {
                        self.state = State::Done;
                        handler.on_complete()?;
                        debug!("message complete without reading body");
                        return Ok(());
                    }
                    self.state = State::Body(head.size.into());
                }

                State::Body(payload_decoder) => {
                    let item = if eof { payload_decoder.decode_eof(src)? } else { payload_decoder.decode(src)? };
                    match item {
                        Some(PayloadItem::Chunk(bytes)) => {
                            trace!(len = bytes.len(), "body bytes");
                            handler.on_body(&bytes)?;
                        }
                        Some(PayloadItem::Extension { size, text }) => handler.on_chunk_extension(size, &text)?,
                        Some(PayloadItem::Eof) => {
                            self.state = State::Done;
                            handler.on_complete()?;
                            debug!("message complete");
                            return Ok(());
                        }
                        None => return Ok(()),
                    }
                }

                State::Done => return Ok(()),
                State::Failed => return Err(ParseError::Failed),
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    pub fn is_header_done(&self) -> bool {
        self.head.is_some()
    }

    /// `true` while nothing of the message has been consumed yet.
    pub fn is_fresh(&self) -> bool {
        matches!(self.state, State::Head)
    }

    /// `true` if the body ends only when the input ends.
    pub fn needs_eof(&self) -> bool {
        self.payload_size().is_some_and(|size| size.needs_eof())
    }

    pub fn payload_size(&self) -> Option<PayloadSize> {
        self.head.map(|head| head.size)
    }

    /// The body length announced by `Content-Length`, if any.
    pub fn content_length(&self) -> Option<u64> {
        match self.payload_size()? {
            PayloadSize::Length(length) => Some(length),
            _ => None,
        }
    }

    pub fn is_chunked(&self) -> bool {
        self.payload_size().is_some_and(|size| size.is_chunked())
    }

    /// Whether the connection may be reused after this message.
    ///
    /// HTTP/1.1 defaults to persistent connections unless `close` is given. HTTP/1.0 needs an
    /// explicit `keep-alive` token. A body delimited by the end of input always ends the
    /// connection.
    pub fn keep_alive(&self) -> bool {
        let Some(head) = self.head else {
            return false;
        };
        if head.size.needs_eof() || head.connection.close {
            return false;
        }
        head.version >= 11 || head.connection.keep_alive
    }

    /// `true` if the message asks to switch protocols with `Connection: upgrade` and `Upgrade`.
    pub fn is_upgrade(&self) -> bool {
        self.head.is_some_and(|head| head.version >= 11 && head.connection.upgrade && head.connection.upgrade_field)
    }

    /// Protocol version as `10 * major + minor`, once the start line is parsed.
    pub fn version(&self) -> Option<u8> {
        self.head.map(|head| head.version)
    }
}

impl<R: Role> Default for BasicParser<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for BasicParser<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicParser")
            .field("state", &self.state)
            .field("head", &self.head)
            .field("header_only", &self.header_only)
            .field("skip_body", &self.skip_body)
            .finish()
    }
}
