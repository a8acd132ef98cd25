use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::util::is_local_endpoint_url;

const API_URL_ENV: &str = "SITELOOM_API_URL";
const API_TOKEN_ENV: &str = "SITELOOM_API_TOKEN";
const DEFAULT_API_URL: &str = "https://api.siteloom.app/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        let api_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_token = std::env::var(API_TOKEN_ENV).ok().and_then(|v| {
            if v.trim().is_empty() {
                None
            } else {
                Some(v)
            }
        });

        Self { api_url, api_token }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!(
                "Invalid SITELOOM_API_URL '{}': expected http:// or https:// URL",
                self.api_url
            );
        }

        if !self.is_local_endpoint() && self.api_token.is_none() {
            bail!(
                "SITELOOM_API_TOKEN must be set for non-local endpoints (url: '{}')",
                self.api_url
            );
        }

        Ok(())
    }

    fn is_local_endpoint(&self) -> bool {
        is_local_endpoint_url(&self.api_url)
    }
}
