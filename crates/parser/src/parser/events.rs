use crate::protocol::ParseError;

pub use crate::protocol::StartLine;

/// Receives the parse events of a single HTTP/1 message, in wire order.
///
/// A tokenizer invokes these callbacks in a fixed sequence:
///
/// 1. [`on_start_line`](Events::on_start_line) exactly once
/// 2. [`on_field`](Events::on_field) once per header field
/// 3. [`on_header_complete`](Events::on_header_complete) exactly once
/// 4. [`on_body`](Events::on_body) and [`on_chunk_extension`](Events::on_chunk_extension) in
///    stream order, zero or more times
/// 5. [`on_complete`](Events::on_complete) exactly once
///
/// Borrowed arguments are only valid for the duration of the call. The first error returned by
/// any callback stops the tokenizer and is handed back to whoever fed it.
pub trait Events {
    fn on_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError>;

    fn on_field(&mut self, name: &str, value: &str) -> Result<(), ParseError>;

    /// `content_length` is `Some(n)` when the body length is known up front (`0` for messages
    /// that cannot carry a body) and `None` for chunked or EOF-delimited bodies.
    fn on_header_complete(&mut self, content_length: Option<u64>) -> Result<(), ParseError>;

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError>;

    /// Called for every chunk-size line of a chunked body, including the last one.
    ///
    /// `extension` is the raw extension text including the leading `;`, or empty.
    fn on_chunk_extension(&mut self, size: u64, extension: &str) -> Result<(), ParseError> {
        let _ = (size, extension);
        Ok(())
    }

    fn on_complete(&mut self) -> Result<(), ParseError>;
}

impl<E: Events + ?Sized> Events for &mut E {
    fn on_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError> {
        (**self).on_start_line(start)
    }

    fn on_field(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        (**self).on_field(name, value)
    }

    fn on_header_complete(&mut self, content_length: Option<u64>) -> Result<(), ParseError> {
        (**self).on_header_complete(content_length)
    }

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
        (**self).on_body(data)
    }

    fn on_chunk_extension(&mut self, size: u64, extension: &str) -> Result<(), ParseError> {
        (**self).on_chunk_extension(size, extension)
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        (**self).on_complete()
    }
}
