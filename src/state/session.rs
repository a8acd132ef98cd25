use super::transcript::Transcript;
use crate::api::ApiClient;
use crate::types::{BuildRequest, ChatMessage};
use anyhow::Result;
use std::sync::Arc;

/// Drives builder runs for one project: holds the chat history the backend
/// needs for context and the transcript of the run in flight.
pub struct BuilderSession {
    client: Arc<ApiClient>,
    project_id: String,
    messages: Vec<ChatMessage>,
    transcript: Transcript,
}

impl BuilderSession {
    pub fn new(client: ApiClient, project_id: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            project_id: project_id.into(),
            messages: Vec::new(),
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn client(&self) -> Arc<ApiClient> {
        Arc::clone(&self.client)
    }

    /// Send one user instruction and fold the resulting event stream into
    /// the transcript. The run's final text joins the chat history so later
    /// requests carry the full exchange.
    pub async fn send_instruction(&mut self, text: impl Into<String>) -> Result<()> {
        self.messages.push(ChatMessage::user(text));
        self.transcript.reset();

        let request = BuildRequest {
            project_id: self.project_id.clone(),
            messages: self.messages.clone(),
        };
        let client = Arc::clone(&self.client);
        let transcript = &mut self.transcript;
        client
            .consume_event_stream(&request, |event| transcript.apply(event))
            .await?;

        let reply = self.transcript.final_text();
        if !reply.is_empty() {
            self.messages.push(ChatMessage::assistant(reply));
        }
        Ok(())
    }

    /// Report the user's decision on an approval gate and mark it answered.
    pub async fn answer_approval(&mut self, approval_id: &str, approved: bool) -> Result<()> {
        self.client.submit_approval(approval_id, approved).await?;
        self.transcript.resolve_approval(approval_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_client::MockApiClient;

    fn scripted_session(chunks: Vec<String>) -> BuilderSession {
        let mock = MockApiClient::new(vec![chunks]);
        BuilderSession::new(ApiClient::new_mock(Arc::new(mock)), "proj-42")
    }

    #[tokio::test]
    async fn test_send_instruction_folds_the_stream_and_files_the_reply() {
        let mut session = scripted_session(vec![
            "data: {\"type\":\"thinking\",\"content\":\"planning\"}\n".to_string(),
            "data: {\"type\":\"code\",\"path\":\"index.html\",\"action\":\"created\",\"content\":\"<html></html>\"}\n"
                .to_string(),
            "data: {\"type\":\"text\",\"content\":\"Created your landing page.\"}\n".to_string(),
            "data: {\"type\":\"done\"}\ndata: [DONE]\n".to_string(),
        ]);

        session
            .send_instruction("build me a landing page")
            .await
            .expect("run should succeed");

        assert!(session.transcript().is_complete());
        assert_eq!(session.transcript().blocks().len(), 3);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].role, "assistant");
        assert_eq!(session.messages()[1].content, "Created your landing page.");
    }

    #[tokio::test]
    async fn test_send_instruction_propagates_transport_failure() {
        let mock = MockApiClient::with_transport_failure(
            vec!["data: {\"type\":\"text\",\"content\":\"partial\"}\n".to_string()],
            "connection reset by peer",
        );
        let mut session = BuilderSession::new(ApiClient::new_mock(Arc::new(mock)), "proj-42");

        let result = session.send_instruction("anything").await;

        assert!(result.is_err());
        // Events dispatched before the failure stay applied.
        assert_eq!(session.transcript().blocks().len(), 1);
        assert_eq!(session.messages().len(), 1);
    }
}
