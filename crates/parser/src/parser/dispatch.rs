use std::fmt;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::codec::BasicParser;
use crate::parser::storage::Storage;
use crate::parser::variants::{HeaderImpl, MessageImpl};
use crate::parser::{Events, StartLine};
use crate::protocol::body::Body;
use crate::protocol::{Fields, Header, Message, ParseError, PayloadSize, Role};

/// Parses one HTTP/1 message into a caller-owned [`Message`] or [`Header`].
///
/// The concrete body and field types are erased at construction: the parser itself is only
/// generic over the role. The typed handler lives inline in the parser when it fits the inline
/// budget (every stock body does), otherwise it is boxed. [`is_inline`](Parser::is_inline)
/// reports which one was chosen.
///
/// The target stays mutably borrowed for the lifetime of the parser, drop the parser to inspect
/// the result.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use micro_http_parser::parser::Parser;
/// use micro_http_parser::protocol::RequestMessage;
/// use micro_http_parser::protocol::body::StringBody;
///
/// let mut message = RequestMessage::<StringBody>::default();
/// let mut parser = Parser::new(&mut message);
///
/// let mut buf = BytesMut::from("POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");
/// parser.feed(&mut buf).unwrap();
/// assert!(parser.is_done());
/// drop(parser);
///
/// assert_eq!(message.target(), "/echo");
/// assert_eq!(message.body, "hello");
/// ```
pub struct Parser<'a, R: Role> {
    basic: BasicParser<R>,
    dispatch: Dispatch<'a>,
    yielded: bool,
}

/// Forwards events to the stored handler, withholding header completion when the body is
/// skipped so that no body reader is created.
struct Dispatch<'a> {
    storage: Storage<'a>,
    skip_body: bool,
}

impl Events for Dispatch<'_> {
    fn on_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError> {
        self.storage.get_mut().on_start_line(start)
    }

    fn on_field(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        self.storage.get_mut().on_field(name, value)
    }

    fn on_header_complete(&mut self, content_length: Option<u64>) -> Result<(), ParseError> {
        if self.skip_body {
            return Ok(());
        }
        self.storage.get_mut().on_header_complete(content_length)
    }

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
        self.storage.get_mut().on_body(data)
    }

    fn on_chunk_extension(&mut self, size: u64, extension: &str) -> Result<(), ParseError> {
        self.storage.get_mut().on_chunk_extension(size, extension)
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        self.storage.get_mut().on_complete()
    }
}

impl<'a, R: Role> Parser<'a, R> {
    /// Creates a parser that fills `message`, header block and body.
    pub fn new<B, F>(message: &'a mut Message<R, B, F>) -> Self
    where
        B: Body + 'a,
        B::Reader: 'a,
        F: Fields + 'a,
    {
        Self::with_handler(BasicParser::new(), MessageImpl::new(message))
    }

    /// Creates a parser that fills `header` and completes right after the header block.
    ///
    /// Body octets are left in the buffer.
    pub fn for_header<F: Fields + 'a>(header: &'a mut Header<R, F>) -> Self {
        Self::with_handler(BasicParser::for_header(), HeaderImpl::new(header))
    }

    fn with_handler<T: Events + 'a>(basic: BasicParser<R>, handler: T) -> Self {
        let storage = Storage::new(handler);
        debug!(inline = storage.is_inline(), handler_size = size_of::<T>(), "created parser");
        Self { basic, dispatch: Dispatch { storage, skip_body: false }, yielded: false }
    }

    /// When set, the message completes after the header block without creating a body reader.
    ///
    /// Only takes effect before the header block is parsed.
    pub fn skip_body(&mut self, skip: bool) {
        self.basic.skip_body(skip);
        self.dispatch.skip_body = self.basic.is_skip_body();
    }

    /// Sets the maximum header block size, only before the header block is parsed.
    pub fn header_limit(&mut self, limit: usize) {
        self.basic.header_limit(limit);
    }

    /// Consumes as many bytes from `src` as possible.
    pub fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        self.basic.feed(src, &mut self.dispatch)
    }

    /// Signals the end of input, completing a body that is delimited by it.
    pub fn feed_eof(&mut self) -> Result<(), ParseError> {
        self.basic.feed_eof(&mut self.dispatch)
    }

    pub fn is_done(&self) -> bool {
        self.basic.is_done()
    }

    pub fn is_header_done(&self) -> bool {
        self.basic.is_header_done()
    }

    pub fn needs_eof(&self) -> bool {
        self.basic.needs_eof()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.basic.content_length()
    }

    pub fn payload_size(&self) -> Option<PayloadSize> {
        self.basic.payload_size()
    }

    pub fn is_chunked(&self) -> bool {
        self.basic.is_chunked()
    }

    pub fn keep_alive(&self) -> bool {
        self.basic.keep_alive()
    }

    pub fn is_upgrade(&self) -> bool {
        self.basic.is_upgrade()
    }

    pub fn version(&self) -> Option<u8> {
        self.basic.version()
    }

    /// `true` if the typed handler is stored inside the parser rather than on the heap.
    pub fn is_inline(&self) -> bool {
        self.dispatch.storage.is_inline()
    }

    fn take_completion(&mut self) -> Option<()> {
        if self.basic.is_done() && !self.yielded {
            self.yielded = true;
            return Some(());
        }
        None
    }
}

impl<'a, R, B, F> From<&'a mut Message<R, B, F>> for Parser<'a, R>
where
    R: Role,
    B: Body + 'a,
    B::Reader: 'a,
    F: Fields + 'a,
{
    fn from(message: &'a mut Message<R, B, F>) -> Self {
        Self::new(message)
    }
}

impl<'a, R: Role, F: Fields + 'a> From<&'a mut Header<R, F>> for Parser<'a, R> {
    fn from(header: &'a mut Header<R, F>) -> Self {
        Self::for_header(header)
    }
}

/// Yields `()` once, when the message is complete.
impl<R: Role> Decoder for Parser<'_, R> {
    type Item = ();
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.yielded {
            return Ok(None);
        }
        self.feed(src)?;
        Ok(self.take_completion())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.yielded {
            return Ok(None);
        }
        // a connection closed before any byte of the message is not an error
        if self.basic.is_fresh() && src.is_empty() {
            return Ok(None);
        }
        self.basic.feed_eof_with(src, &mut self.dispatch)?;
        Ok(self.take_completion())
    }
}

impl<R: Role> fmt::Debug for Parser<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("basic", &self.basic)
            .field("storage", &self.dispatch.storage)
            .field("skip_body", &self.dispatch.skip_body)
            .finish()
    }
}
