use crate::api::client::{ByteStream, MockStreamProducer};
use crate::types::BuildRequest;
use anyhow::Result;
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};

/// Scripted stream source for driver tests. Chunks are delivered byte-exact
/// so tests control where line boundaries fall.
#[derive(Clone)]
pub struct MockApiClient {
    responses: Arc<Mutex<Vec<Vec<String>>>>,
    failure_message: Option<String>,
}

impl MockApiClient {
    pub fn new(responses: Vec<Vec<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            failure_message: None,
        }
    }

    /// Deliver `chunks`, then fail the stream with `message`.
    pub fn with_transport_failure(chunks: Vec<String>, message: &str) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![chunks])),
            failure_message: Some(message.to_string()),
        }
    }
}

impl MockStreamProducer for MockApiClient {
    fn create_mock_stream(&self, _request: &BuildRequest) -> Result<ByteStream> {
        let mut responses_guard = self.responses.lock().unwrap();
        if responses_guard.is_empty() {
            return Err(anyhow::anyhow!(
                "MockApiClient: no more responses configured"
            ));
        }
        let chunks = responses_guard.remove(0);

        let mut items: Vec<Result<Bytes>> =
            chunks.into_iter().map(|s| Ok(Bytes::from(s))).collect();
        if let Some(message) = &self.failure_message {
            items.push(Err(anyhow::anyhow!("{message}")));
        }

        Ok(Box::pin(stream::iter(items)))
    }
}
