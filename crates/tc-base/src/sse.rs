//! Line-oriented decoder for OpenAI-compatible chat completion streams.
//!
//! The server sends one frame per line: blank keep-alive lines,
//! `data: <json>` chunks, and a final `data: [DONE]`. Each chunk's first
//! choice carries a `delta` that may hold `reasoning_content` and/or
//! `content`.

use std::io::{self, BufRead, Lines};
use std::iter::FusedIterator;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::cancel::CancelToken;
use crate::error::ChatError;

/// Prefix of every payload-carrying line.
pub const DATA_PREFIX: &str = "data:";

/// Clean end of stream.
pub const DONE_SENTINEL: &str = "data: [DONE]";

const DONE_PAYLOAD: &str = "[DONE]";

/// One incremental delta. `None` means the field was absent or null;
/// `Some("")` is a real (empty) delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    pub reasoning: Option<String>,
    pub answer: Option<String>,
}

impl StreamEvent {
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self { reasoning: Some(text.into()), answer: None }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self { reasoning: None, answer: Some(text.into()) }
    }

    /// Neither channel is present.
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_none() && self.answer.is_none()
    }
}

// ───────────────────────────────────────────────────────────────────
// Wire format
// ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    reasoning_content: Option<String>,
    content: Option<String>,
}

/// What a single line contributes to the stream.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// Blank line, comment, non-data field, or a chunk with no choices
    Skip,
    /// Termination sentinel
    Done,
    Event(StreamEvent),
}

/// Classify and decode one line of the response body.
pub fn parse_line(line: &str) -> Result<Frame, ChatError> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return Ok(Frame::Skip);
    }
    if line.starts_with(DONE_SENTINEL) {
        return Ok(Frame::Done);
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        trace!(line, "ignoring non-data line");
        return Ok(Frame::Skip);
    };

    let payload = payload.trim();
    if payload == DONE_PAYLOAD {
        return Ok(Frame::Done);
    }

    let json: Value = serde_json::from_str(payload).map_err(|e| decode_error(e, line))?;
    if let Some(message) = upstream_error_message(&json) {
        warn!(%message, "error frame inside stream");
        return Err(ChatError::Upstream(message));
    }

    let chunk: StreamChunk = serde_json::from_value(json).map_err(|e| decode_error(e, line))?;
    let Some(choice) = chunk.choices.into_iter().next() else {
        debug!("chunk with empty choices, treating as keep-alive");
        return Ok(Frame::Skip);
    };

    Ok(Frame::Event(StreamEvent { reasoning: choice.delta.reasoning_content, answer: choice.delta.content }))
}

fn decode_error(e: serde_json::Error, line: &str) -> ChatError {
    ChatError::Decode { message: e.to_string(), line: line.to_string() }
}

fn upstream_error_message(json: &Value) -> Option<String> {
    let error = json.get("error")?;
    if error.is_null() {
        return None;
    }
    if let Some(message) = error.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    if let Some(message) = error.as_str() {
        return Some(message.to_string());
    }
    Some(error.to_string())
}

// ───────────────────────────────────────────────────────────────────
// Lazy event sequence
// ───────────────────────────────────────────────────────────────────

/// Lazy, fused sequence of deltas read from a live body.
///
/// Reads only as many lines as needed to produce the next item. After the
/// sentinel or the first error it yields `None` forever and never touches
/// the reader again.
pub struct EventStream<R> {
    lines: Lines<R>,
    cancel: Option<CancelToken>,
    finished: bool,
    lines_read: usize,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), cancel: None, finished: false, lines_read: 0 }
    }

    /// Abort with [`ChatError::Cancelled`] once the token fires.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Lines pulled from the reader so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    fn fail(&mut self, error: ChatError) -> Option<Result<StreamEvent, ChatError>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<StreamEvent, ChatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return self.fail(ChatError::Cancelled);
            }

            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                // `lines()` reports bytes that are not UTF-8 as InvalidData
                Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %e, "stream line is not valid UTF-8");
                    let line = "<invalid UTF-8>".to_string();
                    return self.fail(ChatError::Decode { message: e.to_string(), line });
                }
                Some(Err(e)) => return self.fail(e.into()),
                None => return self.fail(ChatError::Transport("stream closed before [DONE]".to_string())),
            };
            self.lines_read += 1;

            match parse_line(&line) {
                Ok(Frame::Skip) => continue,
                Ok(Frame::Done) => {
                    self.finished = true;
                    return None;
                }
                Ok(Frame::Event(event)) => return Some(Ok(event)),
                Err(e) => return self.fail(e),
            }
        }
    }
}

impl<R: BufRead> FusedIterator for EventStream<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(lines: &[&str]) -> EventStream<Cursor<Vec<u8>>> {
        let body = lines.join("\n");
        EventStream::new(Cursor::new(body.into_bytes()))
    }

    #[test]
    fn non_data_lines_emit_nothing() {
        for line in ["", "   ", ": keep-alive", "event: message", "id: 7", "retry: 100", "DATA: {}"] {
            assert_eq!(parse_line(line).unwrap(), Frame::Skip, "line {:?}", line);
        }
    }

    #[test]
    fn done_sentinel_terminates() {
        assert_eq!(parse_line("data: [DONE]").unwrap(), Frame::Done);
        assert_eq!(parse_line("data: [DONE]\r").unwrap(), Frame::Done);
        assert_eq!(parse_line("data:[DONE]").unwrap(), Frame::Done);
    }

    #[test]
    fn done_stops_consumption_of_later_lines() {
        let mut events = stream(&[
            r#"data: {"choices":[{"delta":{"content":"a"}}]}"#,
            "data: [DONE]",
            "data: {not json",
            r#"data: {"choices":[{"delta":{"content":"b"}}]}"#,
        ]);
        assert_eq!(events.next().unwrap().unwrap(), StreamEvent::answer("a"));
        assert!(events.next().is_none());
        assert!(events.next().is_none());
        assert_eq!(events.lines_read(), 2);
    }

    #[test]
    fn null_content_is_absent_but_empty_string_is_forwarded() {
        let null = parse_line(r#"data: {"choices":[{"delta":{"content":null}}]}"#).unwrap();
        assert_eq!(null, Frame::Event(StreamEvent::default()));

        let empty = parse_line(r#"data: {"choices":[{"delta":{"content":""}}]}"#).unwrap();
        assert_eq!(empty, Frame::Event(StreamEvent::answer("")));
    }

    #[test]
    fn both_channels_in_one_chunk() {
        let frame =
            parse_line(r#"data: {"choices":[{"delta":{"reasoning_content":"hm","content":"ok"}}]}"#).unwrap();
        assert_eq!(frame, Frame::Event(StreamEvent { reasoning: Some("hm".into()), answer: Some("ok".into()) }));
    }

    #[test]
    fn prefix_without_space_and_crlf_are_accepted() {
        let frame = parse_line("data:{\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\r").unwrap();
        assert_eq!(frame, Frame::Event(StreamEvent::answer("x")));
    }

    #[test]
    fn empty_choices_is_keep_alive() {
        let frame = parse_line(r#"data: {"choices":[],"usage":{"prompt_tokens":3}}"#).unwrap();
        assert_eq!(frame, Frame::Skip);
    }

    #[test]
    fn only_first_choice_is_read() {
        let frame =
            parse_line(r#"data: {"choices":[{"delta":{"content":"first"}},{"delta":{"content":"second"}}]}"#)
                .unwrap();
        assert_eq!(frame, Frame::Event(StreamEvent::answer("first")));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = parse_line("data: {\"choices\": [").unwrap_err();
        assert!(matches!(err, ChatError::Decode { ref line, .. } if line == "data: {\"choices\": ["));
    }

    #[test]
    fn missing_choices_or_delta_is_a_decode_error() {
        assert!(matches!(parse_line(r#"data: {"id":"x"}"#), Err(ChatError::Decode { .. })));
        assert!(matches!(parse_line(r#"data: {"choices":[{"index":0}]}"#), Err(ChatError::Decode { .. })));
    }

    #[test]
    fn error_frames_surface_as_upstream() {
        let err = parse_line(r#"data: {"error":{"message":"model overloaded"}}"#).unwrap_err();
        assert!(matches!(err, ChatError::Upstream(ref m) if m == "model overloaded"));

        let err = parse_line(r#"data: {"error":"quota"}"#).unwrap_err();
        assert!(matches!(err, ChatError::Upstream(ref m) if m == "quota"));
    }

    #[test]
    fn decode_error_is_fatal_for_the_stream() {
        let mut events = stream(&[
            r#"data: {"choices":[{"delta":{"content":"a"}}]}"#,
            "data: nope",
            r#"data: {"choices":[{"delta":{"content":"b"}}]}"#,
            "data: [DONE]",
        ]);
        assert!(events.next().unwrap().is_ok());
        assert!(matches!(events.next(), Some(Err(ChatError::Decode { .. }))));
        assert!(events.next().is_none());
    }

    #[test]
    fn eof_without_sentinel_is_a_transport_error() {
        let mut events = stream(&[r#"data: {"choices":[{"delta":{"content":"a"}}]}"#]);
        assert!(events.next().unwrap().is_ok());
        assert!(matches!(events.next(), Some(Err(ChatError::Transport(_)))));
        assert!(events.next().is_none());
    }

    #[test]
    fn blank_lines_between_frames_are_skipped() {
        let events: Vec<_> = stream(&[
            "",
            r#"data: {"choices":[{"delta":{"reasoning_content":"r"}}]}"#,
            "",
            "",
            r#"data: {"choices":[{"delta":{"content":"a"}}]}"#,
            "",
            "data: [DONE]",
        ])
        .collect::<Result<_, _>>()
        .unwrap();
        assert_eq!(events, vec![StreamEvent::reasoning("r"), StreamEvent::answer("a")]);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let mut body = b"data: {\"choices\":[{\"delta\":{\"content\":\"".to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(b"\"}}]}\ndata: [DONE]\n");
        let mut events = EventStream::new(Cursor::new(body));

        assert!(matches!(events.next(), Some(Err(ChatError::Decode { .. }))));
        assert!(events.next().is_none());
    }

    #[test]
    fn cancelled_token_stops_before_reading() {
        let token = CancelToken::new();
        token.cancel();
        let mut events = stream(&[r#"data: {"choices":[{"delta":{"content":"a"}}]}"#]).with_cancel(token);
        assert!(matches!(events.next(), Some(Err(ChatError::Cancelled))));
        assert_eq!(events.lines_read(), 0);
    }
}
