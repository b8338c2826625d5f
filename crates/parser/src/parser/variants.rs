//! The typed event handlers behind [`Parser`](super::Parser).
//!
//! [`HeaderImpl`] fills a caller-owned [`Header`], [`MessageImpl`] fills a caller-owned
//! [`Message`] and streams the body through the body type's reader. Both are generic over the
//! role, which gives the four request/response, header/message combinations as type aliases.

use std::fmt;

use crate::parser::{Events, StartLine};
use crate::protocol::body::{Body, BodyReader, write_body};
use crate::protocol::{Fields, Header, Message, ParseError, Request, Response, Role};

pub struct HeaderImpl<'a, R: Role, F> {
    header: &'a mut Header<R, F>,
}

impl<'a, R: Role, F: Fields> HeaderImpl<'a, R, F> {
    pub fn new(header: &'a mut Header<R, F>) -> Self {
        Self { header }
    }
}

impl<R: Role, F: Fields> Events for HeaderImpl<'_, R, F> {
    fn on_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError> {
        self.header.set_start_line(start)
    }

    fn on_field(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        self.header.fields.insert(name, value)
    }

    fn on_header_complete(&mut self, _content_length: Option<u64>) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
        if data.is_empty() {
            return Ok(());
        }
        Err(ParseError::body_write("body octets delivered to a header-only parser"))
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        Ok(())
    }
}

impl<R: Role, F> fmt::Debug for HeaderImpl<'_, R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderImpl").field("line", &self.header.line).finish_non_exhaustive()
    }
}

pub struct MessageImpl<'a, R: Role, B: Body, F> {
    message: &'a mut Message<R, B, F>,
    reader: Option<B::Reader>,
}

impl<'a, R: Role, B: Body, F: Fields> MessageImpl<'a, R, B, F> {
    pub fn new(message: &'a mut Message<R, B, F>) -> Self {
        Self { message, reader: None }
    }

    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }
}

impl<R: Role, B: Body, F: Fields> Events for MessageImpl<'_, R, B, F> {
    fn on_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError> {
        self.message.set_start_line(start)
    }

    fn on_field(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        self.message.fields.insert(name, value)
    }

    fn on_header_complete(&mut self, content_length: Option<u64>) -> Result<(), ParseError> {
        start_body(self.message, &mut self.reader, content_length)
    }

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
        put_body(self.message, &mut self.reader, data)
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        finish_body(self.message, &mut self.reader)
    }
}

impl<R: Role, B: Body, F> fmt::Debug for MessageImpl<'_, R, B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageImpl")
            .field("line", &self.message.line)
            .field("reader", &self.reader.is_some())
            .finish_non_exhaustive()
    }
}

pub type RequestHeaderImpl<'a, F> = HeaderImpl<'a, Request, F>;
pub type ResponseHeaderImpl<'a, F> = HeaderImpl<'a, Response, F>;
pub type RequestMessageImpl<'a, B, F> = MessageImpl<'a, Request, B, F>;
pub type ResponseMessageImpl<'a, B, F> = MessageImpl<'a, Response, B, F>;

/// Creates and initializes the body reader, once per message.
pub(crate) fn start_body<R: Role, B: Body, F>(
    message: &mut Message<R, B, F>,
    reader: &mut Option<B::Reader>,
    content_length: Option<u64>,
) -> Result<(), ParseError> {
    if reader.is_some() {
        return Err(ParseError::body_write("body reader already created"));
    }
    let mut body_reader = B::reader(message);
    body_reader.init(&mut message.body, content_length)?;
    *reader = Some(body_reader);
    Ok(())
}

pub(crate) fn put_body<R: Role, B: Body, F>(
    message: &mut Message<R, B, F>,
    reader: &mut Option<B::Reader>,
    data: &[u8],
) -> Result<(), ParseError> {
    match reader {
        Some(reader) => write_body(reader, &mut message.body, data),
        None if data.is_empty() => Ok(()),
        None => Err(ParseError::body_write("body octets before the header block completed")),
    }
}

/// Finishes the reader, if one was created. The reader is released afterwards.
pub(crate) fn finish_body<R: Role, B: Body, F>(
    message: &mut Message<R, B, F>,
    reader: &mut Option<B::Reader>,
) -> Result<(), ParseError> {
    match reader.take() {
        Some(mut reader) => reader.finish(&mut message.body),
        None => Ok(()),
    }
}
