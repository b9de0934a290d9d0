use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ApiConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoIdError {
    #[error("repository must look like owner/repo, got {0:?}")]
    Format(String),
}

/// A validated `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    pub fn parse(input: &str) -> std::result::Result<Self, RepoIdError> {
        let trimmed = input.trim();
        let invalid = || RepoIdError::Format(input.to_string());
        let (owner, name) = trimmed.split_once('/').ok_or_else(invalid)?;

        let well_formed = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
        if name.contains('/') || !well_formed(owner) || !well_formed(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl FromStr for RepoId {
    type Err = RepoIdError;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to the analytics backend at {0}. Is it running?")]
    Connect(String),

    #[error("request to the analytics backend timed out")]
    Timeout,

    #[error("analytics backend returned {status}: {message}")]
    Backend { status: StatusCode, message: String },

    #[error("analytics response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("analytics request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Returned by [`AnalyticsClient::suggest`] when the backend has nothing to say.
pub const NO_SUGGESTION: &str = "No suggestion available.";

/// Talks to the analytics backend's `/analyze` and `/ai-suggest` endpoints.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalyticsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Requests an analysis and returns the raw JSON body.
    pub async fn analyze(&self, repo: &RepoId) -> Result<Value> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze", %request_id, repo = %repo);
        self.send("analyze", repo).instrument(span).await
    }

    /// Requests improvement advice for a repository as raw Markdown.
    pub async fn suggest(&self, repo: &RepoId) -> Result<String> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("suggest", %request_id, repo = %repo);
        let body = self.send("ai-suggest", repo).instrument(span).await?;

        Ok(match body.get("suggestion") {
            Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
            _ => NO_SUGGESTION.to_string(),
        })
    }

    /// POSTs `{"repo": ...}` to `endpoint` and returns the JSON body, turning
    /// failure statuses and `error` fields into [`ClientError::Backend`].
    async fn send(&self, endpoint: &str, repo: &RepoId) -> Result<Value> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::info!(%url, "sending request");

        let response = self
            .http
            .post(&url)
            .json(&json!({ "repo": repo.to_string() }))
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let text = response.text().await.map_err(|err| self.classify(err))?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ClientError::Backend {
                    status,
                    message: snippet(&text),
                });
            }
            Err(err) => return Err(ClientError::Decode(err)),
        };

        if let Some(message) = error_message(&body) {
            tracing::warn!(%status, %message, "backend reported an error");
            return Err(ClientError::Backend { status, message });
        }
        if !status.is_success() {
            return Err(ClientError::Backend {
                status,
                message: "no error message in response".to_string(),
            });
        }

        tracing::info!(%status, "response received");
        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_connect() {
            ClientError::Connect(self.base_url.clone())
        } else if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Http(err)
        }
    }
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(200).collect()
}

fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(message) => Some(message.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
