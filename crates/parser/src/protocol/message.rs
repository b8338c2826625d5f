//! Caller-owned HTTP/1 message types.
//!
//! A [`Header`] holds everything up to the empty line that terminates the header block: the
//! protocol version, the role-specific start line data and the ordered field container. A
//! [`Message`] adds the body value of a [`Body`] representation.
//!
//! The role (request or response) is a type parameter so that role-specific accessors such as
//! [`Header::method`] or [`Header::status`] only exist where they make sense.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::protocol::ParseError;
use crate::protocol::body::{Body, VecBody};
use crate::protocol::fields::FieldList;

mod sealed {
    pub trait Sealed {}
}

/// Marks a parser or message as handling either requests or responses.
///
/// This trait is sealed, only [`Request`] and [`Response`] implement it.
pub trait Role: sealed::Sealed + fmt::Debug + Default + Copy + PartialEq + Eq + Send + Sync + 'static {
    /// `true` if this role parses requests, `false` for responses.
    const IS_REQUEST: bool;

    /// Owned, role-specific start line data.
    type Line: fmt::Debug + Default + Clone + PartialEq + Eq;

    /// Copies a borrowed start line into the owned representation.
    ///
    /// Fails with [`ParseError::MalformedStartLine`] if the start line belongs to the other role.
    #[doc(hidden)]
    fn assign(line: &mut Self::Line, start: &StartLine<'_>) -> Result<(), ParseError>;
}

/// The request role.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Request;

/// The response role.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Response;

impl sealed::Sealed for Request {}
impl sealed::Sealed for Response {}

/// Method and request target of a request line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
}

/// Status code and reason phrase of a status line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status: u16,
    pub reason: String,
}

impl Role for Request {
    const IS_REQUEST: bool = true;
    type Line = RequestLine;

    fn assign(line: &mut RequestLine, start: &StartLine<'_>) -> Result<(), ParseError> {
        match *start {
            StartLine::Request { method, target, .. } => {
                line.method = method.to_owned();
                line.target = target.to_owned();
                Ok(())
            }
            StartLine::Response { .. } => Err(ParseError::malformed_start_line("status line where a request line was expected")),
        }
    }
}

impl Role for Response {
    const IS_REQUEST: bool = false;
    type Line = StatusLine;

    fn assign(line: &mut StatusLine, start: &StartLine<'_>) -> Result<(), ParseError> {
        match *start {
            StartLine::Response { status, reason, .. } => {
                line.status = status;
                line.reason = reason.to_owned();
                Ok(())
            }
            StartLine::Request { .. } => Err(ParseError::malformed_start_line("request line where a status line was expected")),
        }
    }
}

/// A borrowed view of a parsed start line, valid for the duration of one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartLine<'a> {
    /// `METHOD SP target SP HTTP/version`
    Request { method: &'a str, target: &'a str, version: u8 },
    /// `HTTP/version SP status SP reason`
    Response { status: u16, reason: &'a str, version: u8 },
}

impl StartLine<'_> {
    /// The protocol version as `10 * major + minor`, e.g. `11` for HTTP/1.1.
    pub fn version(&self) -> u8 {
        match *self {
            StartLine::Request { version, .. } | StartLine::Response { version, .. } => version,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, StartLine::Request { .. })
    }
}

/// The header part of a message: version, start line data and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<R: Role, F = FieldList> {
    /// Protocol version as `10 * major + minor`.
    pub version: u8,
    pub line: R::Line,
    pub fields: F,
}

pub type RequestHeader<F = FieldList> = Header<Request, F>;
pub type ResponseHeader<F = FieldList> = Header<Response, F>;

impl<R: Role, F: Default> Default for Header<R, F> {
    fn default() -> Self {
        Self { version: 11, line: R::Line::default(), fields: F::default() }
    }
}

impl<R: Role, F> Header<R, F> {
    /// Stores the version and role-specific data of a parsed start line.
    pub fn set_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError> {
        R::assign(&mut self.line, start)?;
        self.version = start.version();
        Ok(())
    }

    pub fn is_request(&self) -> bool {
        R::IS_REQUEST
    }
}

impl<F> Header<Request, F> {
    pub fn method(&self) -> &str {
        &self.line.method
    }

    pub fn target(&self) -> &str {
        &self.line.target
    }
}

impl<F> Header<Response, F> {
    pub fn status(&self) -> u16 {
        self.line.status
    }

    pub fn reason(&self) -> &str {
        &self.line.reason
    }
}

/// A complete message: a [`Header`] plus the body value of `B`.
///
/// Dereferences to its header, so `message.fields` or `message.method()` work directly.
pub struct Message<R: Role, B: Body = VecBody, F = FieldList> {
    pub head: Header<R, F>,
    pub body: B::Value,
}

pub type RequestMessage<B = VecBody, F = FieldList> = Message<Request, B, F>;
pub type ResponseMessage<B = VecBody, F = FieldList> = Message<Response, B, F>;

impl<R: Role, B: Body, F> Message<R, B, F> {
    pub fn from_parts(head: Header<R, F>, body: B::Value) -> Self {
        Self { head, body }
    }

    pub fn into_parts(self) -> (Header<R, F>, B::Value) {
        (self.head, self.body)
    }

    pub fn header(&self) -> &Header<R, F> {
        &self.head
    }

    pub fn header_mut(&mut self) -> &mut Header<R, F> {
        &mut self.head
    }
}

impl<R: Role, B: Body, F: Default> Default for Message<R, B, F> {
    fn default() -> Self {
        Self { head: Header::default(), body: B::Value::default() }
    }
}

impl<R: Role, B: Body, F> Deref for Message<R, B, F> {
    type Target = Header<R, F>;

    fn deref(&self) -> &Self::Target {
        &self.head
    }
}

impl<R: Role, B: Body, F> DerefMut for Message<R, B, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.head
    }
}

impl<R, B, F> fmt::Debug for Message<R, B, F>
where
    R: Role,
    B: Body,
    B::Value: fmt::Debug,
    F: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").field("head", &self.head).field("body", &self.body).finish()
    }
}

impl<R, B, F> Clone for Message<R, B, F>
where
    R: Role,
    B: Body,
    B::Value: Clone,
    F: Clone,
{
    fn clone(&self) -> Self {
        Self { head: self.head.clone(), body: self.body.clone() }
    }
}

impl<R, B, F> PartialEq for Message<R, B, F>
where
    R: Role,
    B: Body,
    B::Value: PartialEq,
    F: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.body == other.body
    }
}
