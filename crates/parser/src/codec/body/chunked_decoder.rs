//! Decoder for the chunked transfer coding.
//!
//! Follows [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1):
//!
//! ```text
//! chunked-body = *chunk last-chunk trailer-section CRLF
//! chunk        = chunk-size [ chunk-ext ] CRLF chunk-data CRLF
//! last-chunk   = 1*("0") [ chunk-ext ] CRLF
//! ```
//!
//! Every chunk-size line, including the last one, is reported as a [`PayloadItem::Extension`]
//! carrying the chunk size and the raw extension text, so callers can observe extensions even
//! when the chunk data follows in a later item. Trailer fields are consumed and ignored.

use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, BytesMut};
use std::task::Poll;
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

/// Upper bound for the extension text of a single chunk-size line.
pub const MAX_CHUNK_EXTENSION_BYTES: usize = 4 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    cursor: Cursor,
}

/// Progress within the current chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Cursor {
    remaining_size: u64,
    digits: usize,
    extension: Vec<u8>,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: Size, cursor: Cursor::default() }
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.state == End
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size in hex
    Size,
    /// Whitespace after the size
    SizeLws,
    /// Collect the chunk extension
    Extension,
    /// LF ending the size line
    SizeLf,
    /// Chunk data
    Body,
    /// CR after chunk data
    BodyCr,
    /// LF after chunk data
    BodyLf,
    /// Skip a trailer field
    Trailer,
    /// LF after a trailer field
    TrailerLf,
    /// CR of the final empty line, or the start of a trailer field
    EndCr,
    /// LF of the final empty line
    EndLf,
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Returns the next data run or size line item, `Eof` once the last chunk and the trailer
    /// section are consumed, or `None` when more input is needed.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == End {
                trace!("finished reading chunked data");
                return Ok(Some(PayloadItem::Eof));
            }

            if src.is_empty() {
                return Ok(None);
            }

            let mut item = None;

            self.state = match self.state.step(src, &mut self.cursor, &mut item) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(e),
            };

            if let Some(item) = item {
                return Ok(Some(item));
            }
        }
    }
}

macro_rules! try_next_byte {
    ($src:ident) => {{
        if $src.len() > 0 {
            $src.get_u8()
        } else {
            return Poll::Pending;
        }
    }};
}

macro_rules! framing_error {
    ($reason:expr) => {
        Poll::Ready(Err(ParseError::chunk_framing($reason)))
    };
}

impl ChunkedState {
    fn step(
        &self,
        src: &mut BytesMut,
        cursor: &mut Cursor,
        item: &mut Option<PayloadItem>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        match self {
            Size => ChunkedState::read_size(src, cursor),
            SizeLws => ChunkedState::read_size_lws(src, cursor),
            Extension => ChunkedState::read_extension(src, cursor),
            SizeLf => ChunkedState::read_size_lf(src, cursor, item),
            Body => ChunkedState::read_body(src, cursor, item),
            BodyCr => ChunkedState::read_body_cr(src),
            BodyLf => ChunkedState::read_body_lf(src),
            Trailer => ChunkedState::read_trailer(src),
            TrailerLf => ChunkedState::read_trailer_lf(src),
            EndCr => ChunkedState::read_end_cr(src),
            EndLf => ChunkedState::read_end_lf(src),
            End => Poll::Ready(Ok(End)),
        }
    }

    fn read_size(src: &mut BytesMut, cursor: &mut Cursor) -> Poll<Result<ChunkedState, ParseError>> {
        let b = try_next_byte!(src);
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b + 10 - b'a',
            b'A'..=b'F' => b + 10 - b'A',
            b'\t' | b' ' | b';' | b'\r' if cursor.digits == 0 => return framing_error!("missing chunk size"),
            b'\t' | b' ' => return Poll::Ready(Ok(SizeLws)),
            b';' => {
                cursor.extension.push(b';');
                return Poll::Ready(Ok(Extension));
            }
            b'\r' => return Poll::Ready(Ok(SizeLf)),
            _ => return framing_error!("invalid chunk size"),
        };

        match cursor.remaining_size.checked_mul(16).and_then(|size| size.checked_add(u64::from(digit))) {
            Some(size) => cursor.remaining_size = size,
            None => return framing_error!("chunk size overflow"),
        }
        cursor.digits += 1;

        Poll::Ready(Ok(Size))
    }

    fn read_size_lws(src: &mut BytesMut, cursor: &mut Cursor) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            // no more digits may follow
            b'\t' | b' ' => Poll::Ready(Ok(SizeLws)),
            b';' => {
                cursor.extension.push(b';');
                Poll::Ready(Ok(Extension))
            }
            b'\r' => Poll::Ready(Ok(SizeLf)),
            _ => framing_error!("invalid chunk size linear white space"),
        }
    }

    fn read_extension(src: &mut BytesMut, cursor: &mut Cursor) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(SizeLf)),
            // a bare LF would let a lenient peer see a different chunk boundary
            b'\n' => framing_error!("invalid chunk extension contains newline"),
            b => {
                if cursor.extension.len() >= MAX_CHUNK_EXTENSION_BYTES {
                    return framing_error!(format!("chunk extension exceeds {MAX_CHUNK_EXTENSION_BYTES} bytes"));
                }
                cursor.extension.push(b);
                Poll::Ready(Ok(Extension))
            }
        }
    }

    fn read_size_lf(
        src: &mut BytesMut,
        cursor: &mut Cursor,
        item: &mut Option<PayloadItem>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => {
                let size = cursor.remaining_size;
                let text = String::from_utf8_lossy(&cursor.extension).into_owned();
                cursor.extension.clear();
                cursor.digits = 0;
                trace!(size, extension = %text, "read chunk size line");
                *item = Some(PayloadItem::Extension { size, text });

                if size == 0 { Poll::Ready(Ok(EndCr)) } else { Poll::Ready(Ok(Body)) }
            }

            _ => framing_error!("invalid chunk size LF"),
        }
    }

    fn read_body(
        src: &mut BytesMut,
        cursor: &mut Cursor,
        item: &mut Option<PayloadItem>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        if src.is_empty() {
            return Poll::Ready(Ok(Body));
        }

        if cursor.remaining_size == 0 {
            return Poll::Ready(Ok(BodyCr));
        }

        let remaining = usize::try_from(cursor.remaining_size).unwrap_or(usize::MAX);
        let read_size = std::cmp::min(remaining, src.len());

        cursor.remaining_size -= read_size as u64;
        *item = Some(PayloadItem::Chunk(src.split_to(read_size).freeze()));
        trace!(len = read_size, "read chunked bytes");

        if cursor.remaining_size > 0 { Poll::Ready(Ok(Body)) } else { Poll::Ready(Ok(BodyCr)) }
    }

    fn read_body_cr(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(BodyLf)),
            _ => framing_error!("invalid chunk body CR"),
        }
    }

    fn read_body_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(Size)),
            _ => framing_error!("invalid chunk body LF"),
        }
    }

    fn read_trailer(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(TrailerLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_trailer_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(EndCr)),
            _ => framing_error!("invalid trailer end LF"),
        }
    }

    fn read_end_cr(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(EndLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_end_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(End)),
            _ => framing_error!("invalid chunk end LF"),
        }
    }
}
