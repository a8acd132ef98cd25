use crate::types::CodeAction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptBlock {
    /// Assistant response text, coalesced across stream deltas.
    Text { content: String },
    /// Reasoning trace, rendered collapsed by default.
    Thinking { content: String },
    /// Server-side tool invocation and its lifecycle state.
    ToolCall {
        tool: String,
        input: Map<String, Value>,
        status: ToolStatus,
    },
    /// Output of a finished tool invocation.
    ToolResult {
        tool: String,
        result: Map<String, Value>,
    },
    /// A file the agent created, rewrote, or removed in the workspace.
    CodeChange {
        path: String,
        action: CodeAction,
        content: String,
    },
    /// Confirmation gate awaiting the user's decision.
    ApprovalGate {
        approval_id: String,
        title: String,
        resolved: bool,
    },
    /// Backend-reported failure for this run.
    Error { content: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Running,
    Complete,
}
