//! Header block decoding.
//!
//! - [`HeaderDecoder`]: tokenizes the start line and header fields with `httparse`, delivers them
//!   as parse events and decides how the body is framed
//!   - Enforces the header size and field count limits
//!   - Tracks `Connection` tokens for keep-alive and upgrade queries

mod header_decoder;

pub use header_decoder::{ConnectionFlags, Head, HeaderDecoder, MAX_HEADER_BYTES, MAX_HEADER_NUM};
