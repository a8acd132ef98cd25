use super::logging::{debug_payload_enabled, emit_debug_payload};
use super::stream::StreamDecoder;
use crate::config::Config;
use crate::types::{BuildRequest, ToolCallEvent};
use crate::util::is_local_endpoint_url;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
#[cfg(test)]
use std::sync::Arc;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn create_mock_stream(&self, request: &BuildRequest) -> Result<ByteStream>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
            #[cfg(test)]
            mock_stream_producer: None,
        }
    }

    #[cfg(test)]
    pub fn new_mock(mock_producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: "http://localhost:8000/v1".to_string(),
            api_token: None,
            mock_stream_producer: Some(mock_producer),
        }
    }

    /// Open the builder event stream for `request` and dispatch every decoded
    /// event to `on_event`, in wire order, until the backend signals the end
    /// of the stream or the transport runs out of data.
    ///
    /// Malformed records are logged and skipped. A transport failure ends the
    /// call with an error; events dispatched before it stand. Dropping the
    /// returned future closes the transport without completing a partial
    /// record.
    pub async fn consume_event_stream<F>(
        &self,
        request: &BuildRequest,
        mut on_event: F,
    ) -> Result<()>
    where
        F: FnMut(ToolCallEvent),
    {
        let mut stream = self.create_stream(request).await?;
        let mut decoder = StreamDecoder::new();

        while let Some(chunk) = stream.next().await {
            for event in decoder.feed(&chunk?) {
                on_event(event);
            }
            if decoder.is_finished() {
                return Ok(());
            }
        }

        for event in decoder.finish() {
            on_event(event);
        }
        Ok(())
    }

    /// POST the run request and return the raw response byte stream.
    pub async fn create_stream(&self, request: &BuildRequest) -> Result<ByteStream> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.create_mock_stream(request);
            }
        }

        let request_url = self.endpoint_url("builder/events");
        let payload = serde_json::to_value(request)?;
        if debug_payload_enabled() {
            emit_debug_payload(&request_url, &payload);
        }
        tracing::debug!(
            url = %request_url,
            project_id = %request.project_id,
            "opening builder event stream"
        );

        let response = self
            .request(reqwest::Method::POST, &request_url)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, &request_url))?;

        let request_url_for_stream = request_url.clone();
        let stream = response.bytes_stream().map(move |item| {
            item.map_err(|error| map_api_request_error(error, &request_url_for_stream))
        });
        Ok(Box::pin(stream))
    }

    pub(super) fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.api_token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder
    }

    pub(super) fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub(super) fn map_api_request_error(error: reqwest::Error, request_url: &str) -> anyhow::Error {
    if error.is_connect() && is_local_endpoint_url(request_url) {
        return anyhow!(
            "cannot reach local API endpoint '{}': {}. Start your local server or update SITELOOM_API_URL.",
            request_url,
            error
        );
    }
    if error.is_connect() {
        return anyhow!("cannot reach API endpoint '{}': {}", request_url, error);
    }
    if error.is_timeout() {
        return anyhow!("API request to '{}' timed out: {}", request_url, error);
    }
    if let Some(status) = error.status() {
        return anyhow!(
            "API endpoint '{}' returned HTTP {}: {}",
            request_url,
            status,
            error
        );
    }
    anyhow!("API request to '{}' failed: {}", request_url, error)
}
