//! Message model shared by every parser.
//!
//! - **Messages** ([`message`]): [`Header`] and [`Message`], generic over the [`Role`]
//!   ([`Request`] or [`Response`]), the field container and the body representation.
//! - **Fields** ([`fields`]): the [`Fields`] insertion contract, [`FieldList`] and an
//!   implementation for [`http::HeaderMap`].
//! - **Bodies** ([`body`]): the [`Body`](body::Body) / [`BodyReader`](body::BodyReader) contract
//!   and the stock body types.
//! - **Payload** ([`payload`]): items and framing produced by the body decoders.
//! - **Errors** ([`error`]): [`ParseError`], the single error type of the crate.

pub mod body;
pub mod fields;
pub mod message;
pub mod payload;

mod error;
pub use error::ParseError;

pub use fields::{FieldList, Fields};
pub use message::{
    Header, Message, Request, RequestHeader, RequestLine, RequestMessage, Response, ResponseHeader, ResponseMessage,
    Role, StartLine, StatusLine,
};
pub use payload::{PayloadItem, PayloadSize};
