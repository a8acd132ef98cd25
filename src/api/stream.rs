use super::logging::{debug_payload_enabled, emit_record_decode_failure};
use crate::types::ToolCallEvent;
use crate::util::truncate_for_log;
use anyhow::Result;
use serde_json::Value;

const DATA_FIELD_PREFIX: &str = "data: ";
const END_OF_STREAM_SENTINEL: &str = "[DONE]";

/// Incremental decoder for the builder event wire protocol.
///
/// Transport chunks split lines at arbitrary byte offsets, so the decoder
/// buffers the unterminated tail between calls and decodes only complete
/// lines. Any chunking of the same byte stream yields the same events in the
/// same order; no record is decoded twice.
#[derive(Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    finished: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the end-of-stream sentinel was seen or the decoder was
    /// drained; later input is ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one transport chunk and decode every line it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ToolCallEvent> {
        if self.finished {
            return Vec::new();
        }
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = String::from_utf8_lossy(&self.pending[start..end]).into_owned();
            start = end + 1;

            self.decode_line(&line, &mut events);
            if self.finished {
                break;
            }
        }

        if self.finished {
            self.pending.clear();
        } else if start > 0 {
            self.pending.drain(..start);
        }

        events
    }

    /// Decode whatever remains buffered once the transport reports end of
    /// data. A final record sent without a trailing newline is recovered
    /// here instead of being dropped.
    pub fn finish(&mut self) -> Vec<ToolCallEvent> {
        let tail = std::mem::take(&mut self.pending);
        let mut events = Vec::new();
        if !self.finished && !tail.is_empty() {
            let line = String::from_utf8_lossy(&tail).into_owned();
            self.decode_line(&line, &mut events);
        }
        self.finished = true;
        events
    }

    fn decode_line(&mut self, line: &str, events: &mut Vec<ToolCallEvent>) {
        // Comment, keep-alive, and other-field lines are valid noise.
        let Some(payload) = line.strip_prefix(DATA_FIELD_PREFIX).map(str::trim) else {
            return;
        };

        if payload.is_empty() || payload == END_OF_STREAM_SENTINEL {
            self.finished = true;
            return;
        }

        match decode_payload(payload) {
            Ok(event) => events.push(event),
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    payload = %truncate_for_log(payload, 160),
                    "skipping malformed stream record"
                );
                if debug_payload_enabled() {
                    emit_record_decode_failure(payload, &error);
                }
            }
        }
    }
}

/// Decode one record payload, strict dialect first, legacy dialect second.
/// On double failure the strict-path error is returned; it describes the
/// payload as received.
fn decode_payload(payload: &str) -> Result<ToolCallEvent> {
    decode_strict(payload).or_else(|strict_error| {
        decode_strict(&legacy_to_strict(payload)).map_err(|_| strict_error)
    })
}

fn decode_strict(payload: &str) -> Result<ToolCallEvent> {
    let value: Value = serde_json::from_str(payload)?;
    ToolCallEvent::from_value(value)
}

/// Rewrite the legacy event dialect into strict JSON. Older backend versions
/// serialized events as dynamically-typed literals: single-quoted strings
/// and `True`/`False`/`None` tokens. The rewrite is a blind global
/// substitution, so an apostrophe inside legacy string content still breaks
/// that record; such records count as malformed rather than being repaired.
fn legacy_to_strict(payload: &str) -> String {
    payload
        .replace('\'', "\"")
        .replace("True", "true")
        .replace("False", "false")
        .replace("None", "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_payload_prefers_strict_dialect() {
        let event = decode_payload(r#"{"type":"text","content":"it's here"}"#)
            .expect("strict payload with apostrophe content");
        assert_eq!(
            event,
            ToolCallEvent::Text {
                content: "it's here".to_string()
            }
        );
    }

    #[test]
    fn test_decode_payload_falls_back_to_legacy_dialect() {
        let event = decode_payload("{'type': 'tool_result', 'tool': 'deploy', 'result': {'ok': True, 'warning': None}}")
            .expect("legacy payload");
        match event {
            ToolCallEvent::ToolResult { tool, result } => {
                assert_eq!(tool, "deploy");
                assert_eq!(result.get("ok"), Some(&json!(true)));
                assert_eq!(result.get("warning"), Some(&json!(null)));
            }
            other => panic!("expected tool_result, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_payload_reports_the_strict_error_on_double_failure() {
        let error = decode_payload("{'type': 'text', 'content': 'isn't closed}")
            .expect_err("apostrophe inside legacy string must fail");
        // serde_json positions refer to the original payload text.
        assert!(error.to_string().contains("line 1"));
    }

    #[test]
    fn test_legacy_rewrite_normalizes_quotes_and_literal_tokens() {
        assert_eq!(
            legacy_to_strict("{'live': True, 'draft': False, 'note': None}"),
            r#"{"live": true, "draft": false, "note": null}"#
        );
    }

    #[test]
    fn test_legacy_rewrite_is_inert_on_typical_strict_payloads() {
        let strict = r#"{"type":"tool_use","tool":"search","input":{"deep":true,"limit":null}}"#;
        assert_eq!(legacy_to_strict(strict), strict);
    }
}
