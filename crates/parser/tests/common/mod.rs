#![allow(dead_code, reason = "each test target uses a subset of the helpers")]

use std::cell::Cell;

use micro_http_parser::protocol::body::{Body, BodyReader, VecReader};
use micro_http_parser::protocol::{Message, ParseError, Role};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

thread_local! {
    static READERS: Cell<usize> = const { Cell::new(0) };
    static FINISHES: Cell<usize> = const { Cell::new(0) };
    static HINT: Cell<Option<Option<u64>>> = const { Cell::new(None) };
}

/// Counts of what the parser did to [`ProbeBody`] readers on this thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub readers: usize,
    pub finishes: usize,
    pub hint: Option<Option<u64>>,
}

impl Probe {
    pub fn reset() {
        READERS.set(0);
        FINISHES.set(0);
        HINT.set(None);
    }

    pub fn get() -> Self {
        Self { readers: READERS.get(), finishes: FINISHES.get(), hint: HINT.get() }
    }
}

/// A `Vec<u8>` body that records reader creation, the length hint and finish calls.
pub struct ProbeBody;

pub struct ProbeReader {
    inner: VecReader,
}

impl Body for ProbeBody {
    type Value = Vec<u8>;
    type Reader = ProbeReader;

    fn reader<R: Role, F>(_message: &mut Message<R, Self, F>) -> ProbeReader {
        READERS.set(READERS.get() + 1);
        ProbeReader { inner: VecReader::new() }
    }
}

impl BodyReader for ProbeReader {
    type Value = Vec<u8>;

    fn init(&mut self, body: &mut Vec<u8>, content_length: Option<u64>) -> Result<(), ParseError> {
        HINT.set(Some(content_length));
        self.inner.init(body, content_length)
    }

    fn prepare<'b>(&'b mut self, body: &'b mut Vec<u8>, n: usize) -> Result<&'b mut [u8], ParseError> {
        self.inner.prepare(body, n)
    }

    fn commit(&mut self, body: &mut Vec<u8>, n: usize) -> Result<(), ParseError> {
        self.inner.commit(body, n)
    }

    fn finish(&mut self, body: &mut Vec<u8>) -> Result<(), ParseError> {
        FINISHES.set(FINISHES.get() + 1);
        self.inner.finish(body)
    }
}

/// A body whose reader is too large to be stored inline.
pub struct ScratchBody;

pub struct ScratchReader {
    inner: VecReader,
    scratch: [u8; 256],
}

impl Body for ScratchBody {
    type Value = Vec<u8>;
    type Reader = ScratchReader;

    fn reader<R: Role, F>(_message: &mut Message<R, Self, F>) -> ScratchReader {
        ScratchReader { inner: VecReader::new(), scratch: [0; 256] }
    }
}

impl BodyReader for ScratchReader {
    type Value = Vec<u8>;

    fn init(&mut self, body: &mut Vec<u8>, content_length: Option<u64>) -> Result<(), ParseError> {
        self.scratch[0] = 1;
        self.inner.init(body, content_length)
    }

    fn prepare<'b>(&'b mut self, body: &'b mut Vec<u8>, n: usize) -> Result<&'b mut [u8], ParseError> {
        self.inner.prepare(body, n)
    }

    fn commit(&mut self, body: &mut Vec<u8>, n: usize) -> Result<(), ParseError> {
        self.inner.commit(body, n)
    }

    fn finish(&mut self, body: &mut Vec<u8>) -> Result<(), ParseError> {
        self.inner.finish(body)
    }
}

/// Prepares more room than requested and relies on `finish` to cut the slack.
pub struct SlackBody;

#[derive(Default)]
pub struct SlackReader {
    len: usize,
}

pub const SLACK: usize = 16;

impl Body for SlackBody {
    type Value = Vec<u8>;
    type Reader = SlackReader;

    fn reader<R: Role, F>(_message: &mut Message<R, Self, F>) -> SlackReader {
        SlackReader::default()
    }
}

impl BodyReader for SlackReader {
    type Value = Vec<u8>;

    fn init(&mut self, body: &mut Vec<u8>, _content_length: Option<u64>) -> Result<(), ParseError> {
        self.len = body.len();
        Ok(())
    }

    fn prepare<'b>(&'b mut self, body: &'b mut Vec<u8>, n: usize) -> Result<&'b mut [u8], ParseError> {
        body.resize(self.len + n + SLACK, b'?');
        Ok(&mut body[self.len..])
    }

    fn commit(&mut self, _body: &mut Vec<u8>, n: usize) -> Result<(), ParseError> {
        self.len += n;
        Ok(())
    }

    fn finish(&mut self, body: &mut Vec<u8>) -> Result<(), ParseError> {
        body.truncate(self.len);
        Ok(())
    }
}
