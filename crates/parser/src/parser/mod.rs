//! Message assembly: turning parse events into typed messages.
//!
//! - [`Events`]: the callback contract between a tokenizer and a message builder
//! - [`Parser`]: fills a caller-owned message or header, with the body and field types erased
//!   behind an inline-or-boxed handler
//! - [`MessageParser`]: owns the message it fills, no erasure
//! - [`variants`]: the typed handlers used by [`Parser`]

mod dispatch;
mod events;
mod message_parser;
mod storage;
pub mod variants;

pub use dispatch::Parser;
pub use events::{Events, StartLine};
pub use message_parser::MessageParser;
pub use storage::INLINE_CAPACITY;
