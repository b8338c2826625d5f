//! Wire-level decoding of HTTP/1 messages.
//!
//! This module turns raw bytes into the parse events consumed by the [`parser`](crate::parser)
//! module. A state machine moves each message from its header block through its body to completion.
//!
//! # Architecture
//!
//! - [`BasicParser`]: drives a single message from bytes to events
//!   - Header parsing via [`header`] (`httparse` based)
//!   - Payload decoding via [`body`] (length, chunked and until-EOF framing)
//!
//! # Features
//!
//! - Streaming processing, any split of the input produces the same events
//! - Chunk extensions are reported, trailers are skipped
//! - Header size, field count and chunk extension limits

pub mod body;
pub mod header;

mod basic_parser;

pub use basic_parser::BasicParser;
pub use body::{MAX_CHUNK_EXTENSION_BYTES, PayloadDecoder};
pub use header::{MAX_HEADER_BYTES, MAX_HEADER_NUM};
