//! Async helpers that feed a parser from a byte stream.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), micro_http_parser::protocol::ParseError> {
//! use bytes::BytesMut;
//! use micro_http_parser::io::read_message;
//! use micro_http_parser::protocol::{FieldList, Request};
//! use micro_http_parser::protocol::body::VecBody;
//!
//! let mut stream: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
//! let mut buf = BytesMut::new();
//!
//! let message = read_message::<Request, VecBody, FieldList, _>(&mut stream, &mut buf).await?;
//! assert_eq!(message.body, b"abc");
//! # Ok(())
//! # }
//! ```

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::parser::MessageParser;
use crate::protocol::body::Body;
use crate::protocol::{Fields, Message, ParseError, Role};

/// Buffer growth per read.
pub const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Reads from `stream` until `parser` completes its message.
///
/// `buf` may already hold bytes of the message and keeps whatever follows it. The end of the
/// stream completes a body delimited by it, otherwise it fails with
/// [`ParseError::PrematureEndOfInput`].
pub async fn read<S, D>(stream: &mut S, buf: &mut BytesMut, parser: &mut D) -> Result<(), ParseError>
where
    S: AsyncRead + Unpin + ?Sized,
    D: Decoder<Item = (), Error = ParseError>,
{
    loop {
        if parser.decode(buf)?.is_some() {
            return Ok(());
        }

        buf.reserve(READ_BUFFER_SIZE);
        let n = stream.read_buf(buf).await?;
        trace!(n, "read bytes");

        if n == 0 {
            return match parser.decode_eof(buf)? {
                Some(()) => Ok(()),
                None => Err(ParseError::PrematureEndOfInput),
            };
        }
    }
}

/// Reads one complete message from `stream`.
pub async fn read_message<R, B, F, S>(stream: &mut S, buf: &mut BytesMut) -> Result<Message<R, B, F>, ParseError>
where
    R: Role,
    B: Body,
    F: Fields + Default,
    S: AsyncRead + Unpin + ?Sized,
{
    let mut parser = MessageParser::<R, B, F>::new();
    read(stream, buf, &mut parser).await?;
    Ok(parser.release())
}
