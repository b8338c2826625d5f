use crate::protocol::ParseError;
use crate::protocol::body::{Body, BodyReader};
use crate::protocol::message::{Message, Role};

/// A message that must not carry a body.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

#[derive(Debug, Default)]
pub struct EmptyReader;

impl Body for EmptyBody {
    type Value = ();
    type Reader = EmptyReader;

    fn reader<R: Role, F>(_message: &mut Message<R, Self, F>) -> EmptyReader {
        EmptyReader
    }
}

impl BodyReader for EmptyReader {
    type Value = ();

    fn init(&mut self, _body: &mut (), _content_length: Option<u64>) -> Result<(), ParseError> {
        Ok(())
    }

    fn prepare<'b>(&'b mut self, _body: &'b mut (), n: usize) -> Result<&'b mut [u8], ParseError> {
        if n > 0 {
            return Err(ParseError::body_write("unexpected body"));
        }
        Ok(&mut [])
    }

    fn commit(&mut self, _body: &mut (), n: usize) -> Result<(), ParseError> {
        if n > 0 {
            return Err(ParseError::body_write("unexpected body"));
        }
        Ok(())
    }

    fn finish(&mut self, _body: &mut ()) -> Result<(), ParseError> {
        Ok(())
    }
}
