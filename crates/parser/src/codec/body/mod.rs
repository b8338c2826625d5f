//! Body decoders.
//!
//! - [`LengthDecoder`](length_decoder::LengthDecoder): fixed-length payloads
//! - [`ChunkedDecoder`](chunked_decoder::ChunkedDecoder): chunked transfer coding, reporting
//!   chunk extensions
//! - [`EofDecoder`](eof_decoder::EofDecoder): payloads delimited by the end of input
//! - [`PayloadDecoder`]: picks one of the above from the parsed framing

mod chunked_decoder;
mod eof_decoder;
mod length_decoder;
mod payload_decoder;

pub use chunked_decoder::MAX_CHUNK_EXTENSION_BYTES;
pub use payload_decoder::PayloadDecoder;
