mod common;

use bytes::BytesMut;
use common::{Probe, ProbeBody, SLACK, ScratchBody, SlackBody, init_tracing};
use http::HeaderMap;
use indoc::indoc;
use micro_http_parser::codec::BasicParser;
use micro_http_parser::parser::{Events, MessageParser, Parser, StartLine};
use micro_http_parser::protocol::body::{EmptyBody, StringBody, VecBody};
use micro_http_parser::protocol::{
    FieldList, ParseError, PayloadSize, Request, RequestHeader, RequestMessage, Response, ResponseMessage,
};

#[test]
fn eof_delimited_response() {
    init_tracing();
    let mut message = ResponseMessage::<StringBody>::default();
    let mut parser = Parser::new(&mut message);

    parser.feed(&mut BytesMut::from("HTTP/1.1 200 OK\r\nServer: test\r\n\r\n*******")).unwrap();
    assert!(parser.is_header_done());
    assert!(!parser.is_done());
    assert!(parser.needs_eof());
    assert!(!parser.keep_alive());

    parser.feed_eof().unwrap();
    assert!(parser.is_done());
    drop(parser);

    assert_eq!(message.status(), 200);
    assert_eq!(message.reason(), "OK");
    assert_eq!(message.body, "*******");
}

#[test]
fn content_length_request() {
    init_tracing();
    let mut message = RequestMessage::<StringBody>::default();
    let mut parser = Parser::new(&mut message);
    let mut buf = BytesMut::from("POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloGET");

    parser.feed(&mut buf).unwrap();
    assert!(parser.is_done());
    assert_eq!(parser.content_length(), Some(5));
    assert_eq!(parser.payload_size(), Some(PayloadSize::Length(5)));
    drop(parser);

    assert_eq!(message.body, "hello");
    assert_eq!(&buf[..], b"GET");
}

#[test]
fn chunked_response_with_extensions() {
    init_tracing();
    let str = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\n*****\r\n2;a;b=1\r\n--\r\n0\r\n\r\n";
    let mut message = ResponseMessage::<StringBody>::default();
    let mut parser = Parser::new(&mut message);

    parser.feed(&mut BytesMut::from(str)).unwrap();
    assert!(parser.is_done());
    assert!(parser.is_chunked());
    assert_eq!(parser.content_length(), None);
    drop(parser);

    assert_eq!(message.body, "*****--");
}

#[test]
fn field_values_are_trimmed() {
    let mut message = RequestMessage::<VecBody>::default();
    let mut parser = Parser::new(&mut message);

    parser.feed(&mut BytesMut::from("GET / HTTP/1.1\r\nX: \t x \t \r\n\r\n")).unwrap();
    assert!(parser.is_done());
    drop(parser);

    assert_eq!(message.fields.get("x"), Some("x"));
}

#[test]
fn skip_body_for_connect_response() {
    let mut message = ResponseMessage::<EmptyBody>::default();
    let mut parser = Parser::new(&mut message);
    parser.skip_body(true);

    let mut buf = BytesMut::from("HTTP/1.1 200 Connection Established\r\nProxy-Agent: test\r\n\r\n\x16\x03\x01");
    parser.feed(&mut buf).unwrap();
    assert!(parser.is_done());
    drop(parser);

    assert_eq!(message.reason(), "Connection Established");
    assert_eq!(message.fields.get("proxy-agent"), Some("test"));
    // tunnel octets stay with the caller
    assert_eq!(&buf[..], b"\x16\x03\x01");
}

fn serialize(message: &RequestMessage<StringBody>) -> String {
    let mut wire = format!("{} {} HTTP/1.{}\r\n", message.method(), message.target(), message.version - 10);
    for (name, value) in message.fields.iter() {
        wire.push_str(&format!("{name}: {value}\r\n"));
    }
    wire.push_str("\r\n");
    wire.push_str(&message.body);
    wire
}

#[test]
fn reserializes_to_input() {
    let input = "PUT /a?b=c HTTP/1.1\r\nHost: x\r\nX-Dup: 1\r\nContent-Length: 3\r\nx-dup: 2\r\n\r\nabc";
    let mut message = RequestMessage::<StringBody>::default();
    let mut parser = Parser::new(&mut message);
    parser.feed(&mut BytesMut::from(input)).unwrap();
    assert!(parser.is_done());
    drop(parser);

    assert_eq!(serialize(&message), input);
}

#[test]
fn byte_at_a_time_matches_single_feed() {
    let str = indoc! {r##"
    POST /upload HTTP/1.1
    Host: example.com
    Transfer-Encoding: gzip, chunked

    4;name=value
    abcd
    10
    0123456789abcdef
    0
    Trailer: x

    "##}
    .replace('\n', "\r\n");

    let mut whole = RequestMessage::<VecBody>::default();
    let mut parser = Parser::new(&mut whole);
    parser.feed(&mut BytesMut::from(str.as_str())).unwrap();
    assert!(parser.is_done());
    drop(parser);

    let mut split = RequestMessage::<VecBody>::default();
    let mut parser = Parser::new(&mut split);
    let mut buf = BytesMut::new();
    for byte in str.bytes() {
        assert!(!parser.is_done());
        buf.extend_from_slice(&[byte]);
        parser.feed(&mut buf).unwrap();
    }
    assert!(parser.is_done());
    assert!(buf.is_empty());
    drop(parser);

    assert_eq!(whole.body, b"abcd0123456789abcdef");
    assert_eq!(whole, split);
}

#[test]
fn length_hint_reaches_reader() {
    let cases: [(&str, Option<u64>); 3] = [
        ("POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc", Some(3)),
        ("POST / HTTP/1.1\r\n\r\n", Some(0)),
        ("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n", None),
    ];

    for (input, hint) in cases {
        Probe::reset();
        let mut message = RequestMessage::<ProbeBody>::default();
        let mut parser = Parser::new(&mut message);
        parser.feed(&mut BytesMut::from(input)).unwrap();
        assert!(parser.is_done(), "{input:?}");
        drop(parser);

        assert_eq!(Probe::get(), Probe { readers: 1, finishes: 1, hint: Some(hint) }, "{input:?}");
    }
}

#[test]
fn completion_happens_once() {
    Probe::reset();
    let mut message = RequestMessage::<ProbeBody>::default();
    let mut parser = Parser::new(&mut message);
    let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nok");

    parser.feed(&mut buf).unwrap();
    assert!(parser.is_done());

    buf.extend_from_slice(b"more");
    parser.feed(&mut buf).unwrap();
    parser.feed_eof().unwrap();
    assert_eq!(&buf[..], b"more");
    drop(parser);

    assert_eq!(message.body, b"ok");
    assert_eq!(Probe::get(), Probe { readers: 1, finishes: 1, hint: Some(Some(2)) });
}

#[test]
fn header_only_creates_no_reader() {
    Probe::reset();
    let mut header = RequestHeader::<FieldList>::default();
    let mut parser = Parser::for_header(&mut header);
    parser.feed(&mut BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nok")).unwrap();
    assert!(parser.is_done());

    let mut message = RequestMessage::<ProbeBody>::default();
    let mut parser = Parser::new(&mut message);
    parser.skip_body(true);
    parser.feed(&mut BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nok")).unwrap();
    assert!(parser.is_done());

    assert_eq!(Probe::get(), Probe { readers: 0, finishes: 0, hint: None });
}

#[test]
fn boxed_handler_behaves_like_inline() {
    let input = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n2\r\nde\r\n0\r\n\r\n";

    let mut inline = ResponseMessage::<VecBody>::default();
    let mut parser = Parser::new(&mut inline);
    assert!(parser.is_inline());
    parser.feed(&mut BytesMut::from(input)).unwrap();
    assert!(parser.is_done());
    drop(parser);

    let mut boxed = ResponseMessage::<ScratchBody>::default();
    let mut parser = Parser::new(&mut boxed);
    assert!(!parser.is_inline());
    parser.feed(&mut BytesMut::from(input)).unwrap();
    assert!(parser.is_done());
    drop(parser);

    assert_eq!(inline.status(), boxed.status());
    assert_eq!(inline.fields, boxed.fields);
    assert_eq!(inline.body, boxed.body);
}

#[test]
fn finish_cuts_prepared_slack() {
    let mut message = RequestMessage::<SlackBody>::default();
    let mut parser = Parser::new(&mut message);
    let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n");

    parser.feed(&mut buf).unwrap();
    assert!(parser.is_done());
    drop(parser);

    assert_eq!(message.body, b"abc");
    assert!(message.body.capacity() >= 3 + SLACK);
}

#[test]
fn message_parser_into_header_map() {
    let mut parser = MessageParser::<Request, StringBody, HeaderMap>::new();
    let mut buf = BytesMut::from("PUT /doc HTTP/1.0\r\nConnection: keep-alive\r\nContent-Length: 4\r\n\r\ntext");

    parser.feed(&mut buf).unwrap();
    assert!(parser.is_done());
    assert!(parser.keep_alive());

    let message = parser.release();
    assert_eq!(message.version, 10);
    assert_eq!(message.method(), "PUT");
    assert_eq!(message.fields.get(http::header::CONNECTION).unwrap(), "keep-alive");
    assert_eq!(message.body, "text");
}

#[test]
fn upgrade_request() {
    let mut parser = MessageParser::<Request>::new();
    let mut buf = BytesMut::from("GET /ws HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\n");

    parser.feed(&mut buf).unwrap();
    assert!(parser.is_done());
    assert!(parser.is_upgrade());
}

#[derive(Default)]
struct Extensions(Vec<(u64, String)>);

impl Events for Extensions {
    fn on_start_line(&mut self, _start: &StartLine<'_>) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_field(&mut self, _name: &str, _value: &str) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_header_complete(&mut self, _content_length: Option<u64>) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_body(&mut self, _data: &[u8]) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_chunk_extension(&mut self, size: u64, extension: &str) -> Result<(), ParseError> {
        self.0.push((size, extension.to_owned()));
        Ok(())
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        Ok(())
    }
}

#[test]
fn chunk_extensions_are_reported() {
    let mut parser = BasicParser::<Response>::new();
    let mut events = Extensions::default();
    let mut buf = BytesMut::from(
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\n*****\r\n2;a;b=1\r\n--\r\n0\r\n\r\n",
    );

    parser.feed(&mut buf, &mut events).unwrap();
    assert!(parser.is_done());
    assert_eq!(events.0, vec![(5, String::new()), (2, ";a;b=1".to_owned()), (0, String::new())]);
}

#[derive(Default)]
struct Tally {
    declared: u64,
    delivered: u64,
}

impl Events for Tally {
    fn on_start_line(&mut self, _start: &StartLine<'_>) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_field(&mut self, _name: &str, _value: &str) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_header_complete(&mut self, _content_length: Option<u64>) -> Result<(), ParseError> {
        Ok(())
    }

    fn on_body(&mut self, data: &[u8]) -> Result<(), ParseError> {
        self.delivered += data.len() as u64;
        Ok(())
    }

    fn on_chunk_extension(&mut self, size: u64, _extension: &str) -> Result<(), ParseError> {
        self.declared += size;
        Ok(())
    }

    fn on_complete(&mut self) -> Result<(), ParseError> {
        Ok(())
    }
}

fn chunked_input(sizes: &[usize]) -> Vec<u8> {
    let mut input = b"POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    for (i, size) in sizes.iter().enumerate() {
        if i % 2 == 0 {
            input.extend_from_slice(format!("{size:x}\r\n").as_bytes());
        } else {
            input.extend_from_slice(format!("{size:X};n={i}\r\n").as_bytes());
        }
        input.extend(std::iter::repeat_n(b'a' + (i % 26) as u8, *size));
        input.extend_from_slice(b"\r\n");
    }
    input.extend_from_slice(b"0;last\r\nTrailer: t\r\n\r\n");
    input
}

#[test]
fn chunk_lengths_are_conserved_across_splits() {
    let sizes = [1, 7, 0x40, 300, 5, 0x1000];
    let input = chunked_input(&sizes);
    let total: u64 = sizes.iter().map(|n| *n as u64).sum();

    for split in [1, 3, 64, input.len()] {
        let mut parser = BasicParser::<Request>::new();
        let mut tally = Tally::default();
        let mut buf = BytesMut::new();

        for part in input.chunks(split) {
            buf.extend_from_slice(part);
            parser.feed(&mut buf, &mut tally).unwrap();
        }

        assert!(parser.is_done(), "split {split}");
        assert!(buf.is_empty(), "split {split}");
        assert_eq!(tally.declared, total, "split {split}");
        assert_eq!(tally.delivered, total, "split {split}");
    }
}

#[test]
fn inline_parser_moves_between_feeds() {
    let input = chunked_input(&[4, 9, 200]);
    let (head, tail) = input.split_at(input.len() / 2);

    let mut message = RequestMessage::<VecBody>::default();
    let mut parser = Parser::new(&mut message);
    assert!(parser.is_inline());
    let mut buf = BytesMut::from(head);
    parser.feed(&mut buf).unwrap();
    assert!(parser.is_header_done());

    {
        let mut moved = Box::new(parser);
        buf.extend_from_slice(tail);
        moved.feed(&mut buf).unwrap();
        let parser = *moved;
        assert!(parser.is_done());
        drop(parser);
    }

    assert_eq!(message.body.len(), 4 + 9 + 200);
    assert!(message.body.starts_with(b"aaaabbbbbbbbb"));
}

#[test]
fn boxed_parser_moves_between_feeds() {
    let input = chunked_input(&[4, 9, 200]);
    let (head, tail) = input.split_at(input.len() / 2);

    let mut message = RequestMessage::<ScratchBody>::default();
    let parser = Parser::new(&mut message);
    assert!(!parser.is_inline());

    let mut parsers = vec![parser];
    let mut buf = BytesMut::from(head);
    parsers[0].feed(&mut buf).unwrap();

    let mut parser = parsers.pop().unwrap();
    buf.extend_from_slice(tail);
    parser.feed(&mut buf).unwrap();
    assert!(parser.is_done());
    drop(parser);
    drop(parsers);

    assert_eq!(message.body.len(), 4 + 9 + 200);
}

mod errors {
    use super::*;

    fn parse_request(input: &str) -> Result<RequestMessage<StringBody>, ParseError> {
        let mut message = RequestMessage::<StringBody>::default();
        let mut parser = Parser::new(&mut message);
        parser.feed(&mut BytesMut::from(input))?;
        parser.feed_eof()?;
        drop(parser);
        Ok(message)
    }

    #[test]
    fn malformed_start_line() {
        let result = parse_request("GET / FTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedStartLine { .. })));
    }

    #[test]
    fn response_into_request() {
        let result = parse_request("HTTP/1.1 200 OK\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedStartLine { .. })));
    }

    #[test]
    fn conflicting_content_length() {
        let result = parse_request("POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd");
        assert!(matches!(result, Err(ParseError::AmbiguousBodyLength { .. })));
    }

    #[test]
    fn repeated_equal_content_length() {
        let message = parse_request("POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 3\r\n\r\nabc").unwrap();
        assert_eq!(message.body, "abc");
    }

    #[test]
    fn transfer_encoding_with_content_length() {
        let result =
            parse_request("POST / HTTP/1.1\r\nContent-Length: 3\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::AmbiguousBodyLength { .. })));
    }

    #[test]
    fn invalid_chunk_size() {
        let result = parse_request("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n");
        assert!(matches!(result, Err(ParseError::ChunkFraming { .. })));
    }

    #[test]
    fn truncated_body() {
        let result = parse_request("POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc");
        assert!(matches!(result, Err(ParseError::PrematureEndOfInput)));
    }

    #[test]
    fn invalid_utf8_string_body() {
        let mut message = RequestMessage::<StringBody>::default();
        let mut parser = Parser::new(&mut message);
        let mut buf = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\n\xff\xfe"[..]);

        assert!(matches!(parser.feed(&mut buf), Err(ParseError::BodyWrite { .. })));
        assert!(!parser.is_done());
    }

    #[test]
    fn too_many_headers() {
        let mut input = String::from("GET / HTTP/1.1\r\n");
        for i in 0..100 {
            input.push_str(&format!("X-{i}: {i}\r\n"));
        }
        input.push_str("\r\n");

        let result = parse_request(&input);
        assert!(matches!(result, Err(ParseError::TooManyHeaders { .. })));
    }

    #[test]
    fn header_over_limit() {
        let mut message = RequestMessage::<VecBody>::default();
        let mut parser = Parser::new(&mut message);
        parser.header_limit(32);

        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nUser-Agent: a rather long agent string\r\n\r\n");
        let result = parser.feed(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 32, .. })));
    }

    #[test]
    fn failed_parser_stays_failed() {
        let mut message = RequestMessage::<VecBody>::default();
        let mut parser = Parser::new(&mut message);

        assert!(parser.feed(&mut BytesMut::from("BAD\r\n\r\n")).is_err());
        let result = parser.feed(&mut BytesMut::from("GET / HTTP/1.1\r\n\r\n"));
        assert!(matches!(result, Err(ParseError::Failed)));
        assert!(!parser.is_done());
    }
}
