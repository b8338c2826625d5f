use std::fmt;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::BasicParser;
use crate::parser::variants::{finish_body, put_body, start_body};
use crate::parser::{Events, StartLine};
use crate::protocol::body::{Body, VecBody};
use crate::protocol::{FieldList, Fields, Message, ParseError, Role};

/// Parses one HTTP/1 message into a message it owns.
///
/// Unlike [`Parser`](super::Parser) nothing is type-erased: the body reader is held directly.
/// Take the result with [`release`](MessageParser::release) once [`is_done`](MessageParser::is_done)
/// reports completion.
///
/// ```
/// use bytes::BytesMut;
/// use micro_http_parser::parser::MessageParser;
/// use micro_http_parser::protocol::Response;
///
/// let mut parser = MessageParser::<Response>::new();
/// let mut buf = BytesMut::from("HTTP/1.1 201 Created\r\nContent-Length: 2\r\n\r\nok");
/// parser.feed(&mut buf).unwrap();
///
/// let message = parser.release();
/// assert_eq!(message.status(), 201);
/// assert_eq!(message.body, b"ok");
/// ```
pub struct MessageParser<R: Role, B: Body = VecBody, F = FieldList> {
    basic: BasicParser<R>,
    sink: Sink<R, B, F>,
    yielded: bool,
}

struct Sink<R: Role, B: Body, F> {
    message: Message<R, B, F>,
    reader: Option<B::Reader>,
    skip_body: bool,
}

impl<R: Role, B: Body, F: Fields> Events for Sink<R, B, F> {
    fn on_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError> {
        self.message.set_start_line(start)
    }

    fn on_field(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        self.message.fields.insert(name, value)
    }

    fn on_header_complete(&mut self, content_length: Option<u64>) -> Result<(), ParseError> {
        if self.skip_body {
            return Ok(());
        }
        start_body(&mut self.message, &mut self.reader, content_length)
    }

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
        put_body(&mut self.message, &mut self.reader, data)
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        finish_body(&mut self.message, &mut self.reader)
    }
}

impl<R: Role, B: Body, F: Fields + Default> MessageParser<R, B, F> {
    /// Creates a parser with a default-constructed message.
    pub fn new() -> Self {
        Self::from(Message::default())
    }
}

impl<R: Role, B: Body, F: Fields> MessageParser<R, B, F> {
    pub fn get(&self) -> &Message<R, B, F> {
        &self.sink.message
    }

    pub fn get_mut(&mut self) -> &mut Message<R, B, F> {
        &mut self.sink.message
    }

    /// Takes the message out of the parser.
    ///
    /// The body is only complete once the parser is done, a released partial message holds
    /// whatever was parsed so far.
    pub fn release(self) -> Message<R, B, F> {
        self.sink.message
    }

    pub fn skip_body(&mut self, skip: bool) {
        self.basic.skip_body(skip);
        self.sink.skip_body = self.basic.is_skip_body();
    }

    pub fn header_limit(&mut self, limit: usize) {
        self.basic.header_limit(limit);
    }

    pub fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        self.basic.feed(src, &mut self.sink)
    }

    pub fn feed_eof(&mut self) -> Result<(), ParseError> {
        self.basic.feed_eof(&mut self.sink)
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

    pub fn is_chunked(&self) -> bool {
        self.basic.is_chunked()
    }

    pub fn keep_alive(&self) -> bool {
        self.basic.keep_alive()
    }

    pub fn is_upgrade(&self) -> bool {
        self.basic.is_upgrade()
    }

    fn take_completion(&mut self) -> Option<()> {
        if self.basic.is_done() && !self.yielded {
            self.yielded = true;
            return Some(());
        }
        None
    }
}

impl<R: Role, B: Body, F: Fields + Default> Default for MessageParser<R, B, F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Starts from an existing message, e.g. one with preallocated body storage.
impl<R: Role, B: Body, F: Fields> From<Message<R, B, F>> for MessageParser<R, B, F> {
    fn from(message: Message<R, B, F>) -> Self {
        Self { basic: BasicParser::new(), sink: Sink { message, reader: None, skip_body: false }, yielded: false }
    }
}

impl<R: Role, B: Body, F: Fields> Decoder for MessageParser<R, B, F> {
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
        if self.basic.is_fresh() && src.is_empty() {
            return Ok(None);
        }
        self.basic.feed_eof_with(src, &mut self.sink)?;
        Ok(self.take_completion())
    }
}

impl<R, B, F> fmt::Debug for MessageParser<R, B, F>
where
    R: Role,
    B: Body,
    B::Value: fmt::Debug,
    F: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageParser")
            .field("basic", &self.basic)
            .field("message", &self.sink.message)
            .field("reader", &self.sink.reader.is_some())
            .finish()
    }
}
