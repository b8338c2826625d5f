//! Body representations and the reader contract used to fill them.
//!
//! A message body is stored as the `Value` of some [`Body`] type. The parser never touches that
//! value directly; instead it asks the body type for a [`BodyReader`] once the header block is
//! complete and then streams the decoded body octets through it.
//!
//! # Reader protocol
//!
//! The reader receives the body value on every call instead of holding a borrow of it, which
//! lets the parser keep both the message and the reader alive at the same time.
//!
//! 1. [`BodyReader::init`] is called exactly once with the content length hint, `Some(n)` when
//!    the framing announces the length up front and `None` for chunked or EOF-delimited bodies.
//! 2. For every run of body octets the parser calls [`BodyReader::prepare`] to obtain a writable
//!    region of at least `n` bytes, copies the octets into it, then calls [`BodyReader::commit`]
//!    with the number of bytes written.
//! 3. [`BodyReader::finish`] is called once after the last octet. It trims the value to the
//!    committed length.
//!
//! Any error returned by a reader aborts the parse.
//!
//! # Stock bodies
//!
//! - [`VecBody`]: `Vec<u8>`
//! - [`BytesBody`]: [`bytes::BytesMut`]
//! - [`StringBody`]: `String`, validated as UTF-8 when finished
//! - [`EmptyBody`]: `()`, rejects any body octet

mod bytes_body;
mod empty_body;
mod string_body;
mod vec_body;

pub use bytes_body::{BytesBody, BytesReader};
pub use empty_body::{EmptyBody, EmptyReader};
pub use string_body::{StringBody, StringReader};
pub use vec_body::{VecBody, VecReader};

use crate::ensure;
use crate::protocol::message::{Message, Role};
use crate::protocol::ParseError;

/// Upper bound for the capacity the stock readers reserve from a content length hint, larger
/// bodies grow as their octets arrive.
pub const MAX_RESERVE: usize = 1024 * 1024;

/// A body representation: the stored value plus the reader that fills it.
pub trait Body: Sized {
    type Value: Default;
    type Reader: BodyReader<Value = Self::Value>;

    /// Creates the reader for a message whose header block has just been parsed.
    ///
    /// The reader may inspect the header fields but must not keep a reference to the message.
    fn reader<R: Role, F>(message: &mut Message<R, Self, F>) -> Self::Reader;
}

/// Writes decoded body octets into a body value.
pub trait BodyReader {
    type Value;

    fn init(&mut self, body: &mut Self::Value, content_length: Option<u64>) -> Result<(), ParseError>;

    /// Returns a writable region of at least `n` bytes.
    fn prepare<'b>(&'b mut self, body: &'b mut Self::Value, n: usize) -> Result<&'b mut [u8], ParseError>;

    /// Marks `n` bytes of the last prepared region as written.
    fn commit(&mut self, body: &mut Self::Value, n: usize) -> Result<(), ParseError>;

    fn finish(&mut self, body: &mut Self::Value) -> Result<(), ParseError>;
}

/// Copies `data` into the body through one `prepare`/`commit` round.
pub fn write_body<R>(reader: &mut R, body: &mut R::Value, data: &[u8]) -> Result<(), ParseError>
where
    R: BodyReader + ?Sized,
{
    if data.is_empty() {
        return Ok(());
    }

    let buf = reader.prepare(body, data.len())?;
    ensure!(
        buf.len() >= data.len(),
        ParseError::body_write(format!("prepared {} bytes, {} required", buf.len(), data.len()))
    );
    buf[..data.len()].copy_from_slice(data);
    reader.commit(body, data.len())
}

/// Converts a content length hint into an in-memory size.
pub(crate) fn hint_to_usize(length: u64) -> Result<usize, ParseError> {
    usize::try_from(length)
        .ok()
        .filter(|n| *n <= isize::MAX as usize)
        .ok_or_else(|| ParseError::content_length_overflow(length))
}
