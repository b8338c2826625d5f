use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;
use crate::protocol::body::{Body, BodyReader, MAX_RESERVE, hint_to_usize};
use crate::protocol::message::{Message, Role};

/// A body stored as a `Vec<u8>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VecBody;

/// Appends to a `Vec<u8>`, keeping the committed length separate from the vector length.
#[derive(Debug, Default)]
pub struct VecReader {
    len: usize,
}

impl VecReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> usize {
        self.len
    }
}

impl Body for VecBody {
    type Value = Vec<u8>;
    type Reader = VecReader;

    fn reader<R: Role, F>(message: &mut Message<R, Self, F>) -> VecReader {
        VecReader { len: message.body.len() }
    }
}

impl BodyReader for VecReader {
    type Value = Vec<u8>;

    fn init(&mut self, body: &mut Vec<u8>, content_length: Option<u64>) -> Result<(), ParseError> {
        self.len = body.len();
        if let Some(length) = content_length {
            let additional = hint_to_usize(length)?.min(MAX_RESERVE);
            body.try_reserve(additional).map_err(ParseError::body_write)?;
            trace!(additional, "reserved body capacity");
        }
        Ok(())
    }

    fn prepare<'b>(&'b mut self, body: &'b mut Vec<u8>, n: usize) -> Result<&'b mut [u8], ParseError> {
        let end = self.len.checked_add(n).ok_or_else(|| ParseError::body_write("body size overflow"))?;
        body.resize(end, 0);
        Ok(&mut body[self.len..end])
    }

    fn commit(&mut self, body: &mut Vec<u8>, n: usize) -> Result<(), ParseError> {
        ensure!(
            n <= body.len() - self.len,
            ParseError::body_write(format!("committed {n} bytes beyond the prepared region"))
        );
        self.len += n;
        Ok(())
    }

    fn finish(&mut self, body: &mut Vec<u8>) -> Result<(), ParseError> {
        body.truncate(self.len);
        body.shrink_to_fit();
        Ok(())
    }
}
