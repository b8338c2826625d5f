use crate::protocol::ParseError;
use crate::protocol::body::{Body, BodyReader, VecReader};
use crate::protocol::message::{Message, Role};

/// A body stored as a `String`.
///
/// Octets are collected as raw bytes and validated as UTF-8 when the body is finished.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringBody;

#[derive(Debug, Default)]
pub struct StringReader {
    bytes: Vec<u8>,
    inner: VecReader,
}

impl Body for StringBody {
    type Value = String;
    type Reader = StringReader;

    fn reader<R: Role, F>(_message: &mut Message<R, Self, F>) -> StringReader {
        StringReader::default()
    }
}

impl BodyReader for StringReader {
    type Value = String;

    fn init(&mut self, body: &mut String, content_length: Option<u64>) -> Result<(), ParseError> {
        self.bytes = std::mem::take(body).into_bytes();
        self.inner.init(&mut self.bytes, content_length)
    }

    fn prepare<'b>(&'b mut self, _body: &'b mut String, n: usize) -> Result<&'b mut [u8], ParseError> {
        self.inner.prepare(&mut self.bytes, n)
    }

    fn commit(&mut self, _body: &mut String, n: usize) -> Result<(), ParseError> {
        self.inner.commit(&mut self.bytes, n)
    }

    fn finish(&mut self, body: &mut String) -> Result<(), ParseError> {
        self.inner.finish(&mut self.bytes)?;
        let bytes = std::mem::take(&mut self.bytes);
        *body = String::from_utf8(bytes).map_err(|e| ParseError::body_write(e.utf8_error()))?;
        Ok(())
    }
}
