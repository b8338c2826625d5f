use bytes::BytesMut;

use crate::ensure;
use crate::protocol::ParseError;
use crate::protocol::body::{Body, BodyReader, MAX_RESERVE, hint_to_usize};
use crate::protocol::message::{Message, Role};

/// A body stored as a [`BytesMut`], convenient for handing the payload on as [`bytes::Bytes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesBody;

#[derive(Debug, Default)]
pub struct BytesReader {
    len: usize,
}

impl Body for BytesBody {
    type Value = BytesMut;
    type Reader = BytesReader;

    fn reader<R: Role, F>(message: &mut Message<R, Self, F>) -> BytesReader {
        BytesReader { len: message.body.len() }
    }
}

impl BodyReader for BytesReader {
    type Value = BytesMut;

    fn init(&mut self, body: &mut BytesMut, content_length: Option<u64>) -> Result<(), ParseError> {
        self.len = body.len();
        if let Some(length) = content_length {
            let additional = hint_to_usize(length)?;
            body.reserve(additional.min(MAX_RESERVE));
        }
        Ok(())
    }

    fn prepare<'b>(&'b mut self, body: &'b mut BytesMut, n: usize) -> Result<&'b mut [u8], ParseError> {
        let end = self.len.checked_add(n).ok_or_else(|| ParseError::body_write("body size overflow"))?;
        body.resize(end, 0);
        Ok(&mut body[self.len..end])
    }

    fn commit(&mut self, body: &mut BytesMut, n: usize) -> Result<(), ParseError> {
        ensure!(
            n <= body.len() - self.len,
            ParseError::body_write(format!("committed {n} bytes beyond the prepared region"))
        );
        self.len += n;
        Ok(())
    }

    fn finish(&mut self, body: &mut BytesMut) -> Result<(), ParseError> {
        body.truncate(self.len);
        Ok(())
    }
}
