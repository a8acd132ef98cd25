use super::block::{ToolStatus, TranscriptBlock};
use crate::types::ToolCallEvent;

/// Render model of one builder run, folded incrementally from the event
/// stream. Blocks appear in event order; adjacent text and thinking content
/// merges into one block so the UI shows a growing paragraph instead of one
/// block per delta.
#[derive(Debug, Default)]
pub struct Transcript {
    blocks: Vec<TranscriptBlock>,
    complete: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[TranscriptBlock] {
        &self.blocks
    }

    /// True once the run reported completion.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Drop the previous run's blocks before a new run starts.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.complete = false;
    }

    pub fn apply(&mut self, event: ToolCallEvent) {
        match event {
            ToolCallEvent::Text { content } => self.append_text(content),
            ToolCallEvent::Thinking { content } => self.append_thinking(content),
            ToolCallEvent::ToolUse { tool, input } => {
                self.blocks.push(TranscriptBlock::ToolCall {
                    tool,
                    input,
                    status: ToolStatus::Running,
                });
            }
            ToolCallEvent::ToolResult { tool, result } => {
                self.complete_latest_call(&tool);
                self.blocks.push(TranscriptBlock::ToolResult { tool, result });
            }
            ToolCallEvent::Code {
                path,
                action,
                content,
            } => {
                self.blocks.push(TranscriptBlock::CodeChange {
                    path,
                    action,
                    content,
                });
            }
            ToolCallEvent::ApprovalRequired { approval_id, title } => {
                self.blocks.push(TranscriptBlock::ApprovalGate {
                    approval_id,
                    title,
                    resolved: false,
                });
            }
            ToolCallEvent::Error { content } => {
                self.blocks.push(TranscriptBlock::Error { content });
            }
            ToolCallEvent::Done => self.complete = true,
            ToolCallEvent::Unknown { kind, .. } => {
                tracing::debug!(kind = %kind, "ignoring unrecognized builder event kind");
            }
        }
    }

    /// Assistant-visible text of the run, in order.
    pub fn final_text(&self) -> String {
        let parts: Vec<&str> = self
            .blocks
            .iter()
            .filter_map(|block| match block {
                TranscriptBlock::Text { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        parts.join("\n")
    }

    /// Approval gates the user has not answered yet, as (id, title) pairs.
    pub fn pending_approvals(&self) -> Vec<(&str, &str)> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                TranscriptBlock::ApprovalGate {
                    approval_id,
                    title,
                    resolved: false,
                } => Some((approval_id.as_str(), title.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Mark an approval gate answered. Returns false when no open gate
    /// matches `approval_id`.
    pub fn resolve_approval(&mut self, approval_id: &str) -> bool {
        for block in self.blocks.iter_mut().rev() {
            if let TranscriptBlock::ApprovalGate { approval_id: id, resolved, .. } = block {
                if id == approval_id && !*resolved {
                    *resolved = true;
                    return true;
                }
            }
        }
        false
    }

    fn append_text(&mut self, content: String) {
        if let Some(TranscriptBlock::Text { content: existing }) = self.blocks.last_mut() {
            existing.push_str(&content);
        } else {
            self.blocks.push(TranscriptBlock::Text { content });
        }
    }

    fn append_thinking(&mut self, content: String) {
        if let Some(TranscriptBlock::Thinking { content: existing }) = self.blocks.last_mut() {
            existing.push_str(&content);
        } else {
            self.blocks.push(TranscriptBlock::Thinking { content });
        }
    }

    fn complete_latest_call(&mut self, tool: &str) {
        for block in self.blocks.iter_mut().rev() {
            if let TranscriptBlock::ToolCall { tool: name, status, .. } = block {
                if name == tool && *status == ToolStatus::Running {
                    *status = ToolStatus::Complete;
                    return;
                }
            }
        }
    }
}
