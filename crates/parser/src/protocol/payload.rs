use bytes::Bytes;

/// An item produced by the body decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A run of body octets
    Chunk(Bytes),
    /// A chunk-size line of a chunked body, with its raw extension text (`";a;b=1"`) or `""`
    Extension { size: u64, text: String },
    /// Marks the end of the body
    Eof,
}

/// How the length of a message body is determined.
///
/// Decided once the header block is parsed:
/// - Known length: read exactly that many octets
/// - Chunked: decode the chunked transfer coding
/// - Until EOF: the body ends when the connection closes
/// - Empty: the message has no body
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Payload delimited by the end of the input
    UntilEof,
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty | PayloadSize::Length(0))
    }

    #[inline]
    pub fn needs_eof(&self) -> bool {
        matches!(self, PayloadSize::UntilEof)
    }

    /// The content length hint handed to body readers.
    pub fn hint(&self) -> Option<u64> {
        match *self {
            PayloadSize::Length(length) => Some(length),
            PayloadSize::Empty => Some(0),
            PayloadSize::Chunked | PayloadSize::UntilEof => None,
        }
    }
}

impl PayloadItem {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            _ => None,
        }
    }
}
