use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One decoded step of a builder run, in the order the backend emitted it.
///
/// Records arrive tagged with a `type` field; every other field is optional
/// on the wire and defaults to empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolCallEvent {
    /// Assistant-visible response text.
    Text {
        #[serde(default)]
        content: String,
    },
    /// Reasoning trace, rendered collapsed.
    Thinking {
        #[serde(default)]
        content: String,
    },
    /// The agent started a server-side tool invocation.
    ToolUse {
        #[serde(default)]
        tool: String,
        #[serde(default)]
        input: Map<String, Value>,
    },
    /// Output of a finished tool invocation.
    ToolResult {
        #[serde(default)]
        tool: String,
        #[serde(default)]
        result: Map<String, Value>,
    },
    /// A workspace file the agent created, rewrote, or removed.
    Code {
        #[serde(default)]
        path: String,
        #[serde(default)]
        action: CodeAction,
        #[serde(default)]
        content: String,
    },
    /// The run is paused until the user confirms the named action.
    ApprovalRequired {
        #[serde(default)]
        approval_id: String,
        #[serde(default)]
        title: String,
    },
    /// Backend-reported failure, delivered in-stream.
    Error {
        #[serde(default)]
        content: String,
    },
    /// The run finished. The stream sentinel may stand in for this.
    Done,
    /// An event kind this client version does not know, kept verbatim.
    #[serde(skip)]
    Unknown { kind: String, payload: Value },
}

const RECOGNIZED_KINDS: [&str; 8] = [
    "text",
    "thinking",
    "tool_use",
    "tool_result",
    "code",
    "approval_required",
    "error",
    "done",
];

impl ToolCallEvent {
    /// Interpret an already-parsed payload value as an event. A recognized
    /// `type` whose fields do not fit its shape is an error; an unrecognized
    /// `type` is preserved as [`ToolCallEvent::Unknown`] rather than guessed
    /// at or dropped.
    pub fn from_value(value: Value) -> Result<Self> {
        let Some(kind) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
            bail!("payload has no string `type` field");
        };

        if RECOGNIZED_KINDS.contains(&kind.as_str()) {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(ToolCallEvent::Unknown {
                kind,
                payload: value,
            })
        }
    }
}

/// What a `code` event did to the file at `path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeAction {
    Created,
    #[default]
    Updated,
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_recognized_kind_decodes_with_fields_defaulted() {
        for kind in RECOGNIZED_KINDS {
            let event = ToolCallEvent::from_value(json!({ "type": kind }))
                .unwrap_or_else(|e| panic!("kind '{kind}' should decode bare: {e}"));
            assert!(
                !matches!(event, ToolCallEvent::Unknown { .. }),
                "kind '{kind}' fell through to Unknown"
            );
        }
    }

    #[test]
    fn test_tool_use_decodes_tool_and_input() {
        let event = ToolCallEvent::from_value(json!({
            "type": "tool_use",
            "tool": "search",
            "input": { "q": "cats" }
        }))
        .expect("valid tool_use");

        match event {
            ToolCallEvent::ToolUse { tool, input } => {
                assert_eq!(tool, "search");
                assert_eq!(input.get("q"), Some(&json!("cats")));
            }
            other => panic!("expected tool_use, got {other:?}"),
        }
    }

    #[test]
    fn test_code_action_defaults_to_updated_when_absent() {
        let event = ToolCallEvent::from_value(json!({
            "type": "code",
            "path": "index.html",
            "content": "<html></html>"
        }))
        .expect("valid code event");

        match event {
            ToolCallEvent::Code { path, action, .. } => {
                assert_eq!(path, "index.html");
                assert_eq!(action, CodeAction::Updated);
            }
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_code_action_is_an_error() {
        let result = ToolCallEvent::from_value(json!({
            "type": "code",
            "path": "index.html",
            "action": "renamed"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_kind_carries_raw_payload() {
        let raw = json!({ "type": "telemetry", "lag_ms": 12 });
        let event = ToolCallEvent::from_value(raw.clone()).expect("unknown kinds are not errors");
        assert_eq!(
            event,
            ToolCallEvent::Unknown {
                kind: "telemetry".to_string(),
                payload: raw,
            }
        );
    }

    #[test]
    fn test_missing_or_non_string_type_is_an_error() {
        assert!(ToolCallEvent::from_value(json!({ "content": "hi" })).is_err());
        assert!(ToolCallEvent::from_value(json!({ "type": 7 })).is_err());
        assert!(ToolCallEvent::from_value(json!(["type", "text"])).is_err());
    }

    #[test]
    fn test_known_kind_with_wrong_field_shape_is_an_error() {
        let result = ToolCallEvent::from_value(json!({ "type": "text", "content": 42 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        let event = ToolCallEvent::from_value(json!({
            "type": "done",
            "elapsed_ms": 1830
        }))
        .expect("extra fields must not fail the record");
        assert_eq!(event, ToolCallEvent::Done);
    }
}
