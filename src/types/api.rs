use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a builder run request; the response body is the event stream.
#[derive(Debug, Clone, Serialize)]
pub struct BuildRequest {
    pub project_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub pages: Vec<ProjectPage>,
}

/// One page of a site project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPage {
    pub path: String,
    pub title: Option<String>,
}
