pub mod api;
pub mod event;

pub use api::{BuildRequest, ChatMessage, Project, ProjectPage, ProjectSummary};
pub use event::{CodeAction, ToolCallEvent};
