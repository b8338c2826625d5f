use std::io;
use thiserror::Error;

/// Every failure a parser can report.
///
/// The first error returned by any stage (tokenizer, event handler or body reader) terminates the
/// parser: it keeps reporting [`ParseError::Failed`] afterwards.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed start line: {reason}")]
    MalformedStartLine { reason: String },

    #[error("malformed header field: {reason}")]
    MalformedHeaderField { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("ambiguous body length: {reason}")]
    AmbiguousBodyLength { reason: String },

    #[error("content-length {length} exceeds what the body can hold")]
    ContentLengthOverflow { length: u64 },

    #[error("invalid chunked framing: {reason}")]
    ChunkFraming { reason: String },

    #[error("body write failure: {reason}")]
    BodyWrite { reason: String },

    #[error("end of input before the message was complete")]
    PrematureEndOfInput,

    #[error("parser already failed, a new parser is required")]
    Failed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_start_line<S: ToString>(str: S) -> Self {
        Self::MalformedStartLine { reason: str.to_string() }
    }

    pub fn malformed_header_field<S: ToString>(str: S) -> Self {
        Self::MalformedHeaderField { reason: str.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn ambiguous_body_length<S: ToString>(str: S) -> Self {
        Self::AmbiguousBodyLength { reason: str.to_string() }
    }

    pub fn content_length_overflow(length: u64) -> Self {
        Self::ContentLengthOverflow { length }
    }

    pub fn chunk_framing<S: ToString>(str: S) -> Self {
        Self::ChunkFraming { reason: str.to_string() }
    }

    pub fn body_write<S: ToString>(str: S) -> Self {
        Self::BodyWrite { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
