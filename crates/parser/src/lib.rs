//! HTTP/1 message assembly on top of a streaming tokenizer
//!
//! This crate turns the bytes of a single HTTP/1 request or response into a strongly typed
//! message while staying generic over how the body and the header fields are stored. It never
//! performs I/O on its own: bytes are fed in by the caller, either directly or through a
//! `tokio_util` [`Decoder`](tokio_util::codec::Decoder) or the [`io`] helpers.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 requests and responses
//! - Content-Length, chunked and read-until-EOF body framing
//! - Chunk extensions reported to the handler, trailers skipped
//! - Pluggable body storage through [`Body`](protocol::body::Body) / [`BodyReader`](protocol::body::BodyReader)
//! - Pluggable field containers through [`Fields`](protocol::Fields), including `http::HeaderMap`
//! - Header-only parsing and skipping the body of HEAD or CONNECT responses
//! - No heap allocation for the type-erased handler of the stock bodies
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_http_parser::parser::Parser;
//! use micro_http_parser::protocol::ResponseMessage;
//! use micro_http_parser::protocol::body::StringBody;
//!
//! let mut response = ResponseMessage::<StringBody>::default();
//! let mut parser = Parser::new(&mut response);
//!
//! let mut buf = BytesMut::from(
//!     "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
//! );
//! parser.feed(&mut buf).unwrap();
//! assert!(parser.is_done());
//! drop(parser);
//!
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body, "hello");
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: message types, field containers, body representations and [`ParseError`](protocol::ParseError)
//! - [`codec`]: the byte-level tokenizer ([`BasicParser`](codec::BasicParser)) and its decoders
//! - [`parser`]: the [`Events`](parser::Events) contract, the type-erased
//!   [`Parser`](parser::Parser) and the owning [`MessageParser`](parser::MessageParser)
//! - [`io`]: drive a parser from any `tokio::io::AsyncRead`
//!
//! # Limitations
//!
//! - HTTP/1.x only
//! - Maximum header size: 8KB by default
//! - Maximum number of headers: 64
//! - Header field values must be valid UTF-8
//!
//! # Safety
//!
//! Unsafe code is confined to the inline handler storage of [`Parser`](parser::Parser), which
//! places a handler in a fixed-size buffer after checking its size and alignment.

pub mod codec;
pub mod io;
pub mod parser;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

#[cfg(test)]
mod testing;
