//! Event recording shared by the unit tests.

use crate::parser::Events;
use crate::protocol::{ParseError, StartLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    RequestLine(String, String, u8),
    StatusLine(u16, String, u8),
    Field(String, String),
    HeaderComplete(Option<u64>),
    Body(Vec<u8>),
    ChunkExtension(u64, String),
    Complete,
}

#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) events: Vec<Event>,
}

impl Recorder {
    pub(crate) fn body(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Body(data) => Some(data.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }
}

impl Events for Recorder {
    fn on_start_line(&mut self, start: &StartLine<'_>) -> Result<(), ParseError> {
        let event = match *start {
            StartLine::Request { method, target, version } => Event::RequestLine(method.into(), target.into(), version),
            StartLine::Response { status, reason, version } => Event::StatusLine(status, reason.into(), version),
        };
        self.events.push(event);
        Ok(())
    }

    fn on_field(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        self.events.push(Event::Field(name.into(), value.into()));
        Ok(())
    }

    fn on_header_complete(&mut self, content_length: Option<u64>) -> Result<(), ParseError> {
        self.events.push(Event::HeaderComplete(content_length));
        Ok(())
    }

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
        self.events.push(Event::Body(data.to_vec()));
        Ok(())
    }

    fn on_chunk_extension(&mut self, size: u64, extension: &str) -> Result<(), ParseError> {
        self.events.push(Event::ChunkExtension(size, extension.into()));
        Ok(())
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        self.events.push(Event::Complete);
        Ok(())
    }
}
