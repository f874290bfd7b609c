//! reqwest-backed implementation of the quality gate API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::{
    ConditionHandle, CreateCondition, CreateGate, GateHandle, GateShow, QualityGates,
    UpdateCondition,
};
use crate::error::ApiError;

/// Connection parameters for a SonarQube instance.
#[derive(Debug, Clone)]
pub struct SonarConfig {
    /// Base URL of the SonarQube instance; a trailing slash is optional.
    pub base_url: String,
    /// Personal access token used as HTTP bearer auth.
    pub token: String,
    /// Skip TLS certificate verification (self-signed certificates).
    pub insecure_skip_verify: bool,
    /// Per-request deadline.
    pub request_timeout: Duration,
}

impl SonarConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            insecure_skip_verify: false,
            request_timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Quality gate client speaking the SonarQube Web API
/// (`api/qualitygates/*`).
pub struct HttpQualityGates {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpQualityGates {
    pub fn new(config: &SonarConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout);
        if config.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{}/api/qualitygates/{op}", self.base_url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        op: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(self.endpoint(op))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        let body = check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        op: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let resp = self
            .http
            .post(self.endpoint(op))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        let body = check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post_ok(&self, op: &str, query: &[(&str, &str)]) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.endpoint(op))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl QualityGates for HttpQualityGates {
    async fn show(&self, name: &str) -> Result<GateShow, ApiError> {
        tracing::trace!(gate = name, "show quality gate");
        self.get_json("show", &[("name", name)]).await
    }

    async fn create(&self, req: &CreateGate) -> Result<GateHandle, ApiError> {
        tracing::debug!(gate = %req.name, "create quality gate");
        self.post_json("create", &[("name", req.name.as_str())])
            .await
    }

    async fn rename(&self, current_name: &str, new_name: &str) -> Result<(), ApiError> {
        tracing::debug!(from = current_name, to = new_name, "rename quality gate");
        self.post_ok("rename", &[("currentName", current_name), ("name", new_name)])
            .await
    }

    async fn set_as_default(&self, name: &str) -> Result<(), ApiError> {
        tracing::debug!(gate = name, "set quality gate as default");
        self.post_ok("set_as_default", &[("name", name)]).await
    }

    async fn destroy(&self, name: &str) -> Result<(), ApiError> {
        tracing::debug!(gate = name, "delete quality gate");
        self.post_ok("destroy", &[("name", name)]).await
    }

    async fn create_condition(&self, req: &CreateCondition) -> Result<ConditionHandle, ApiError> {
        tracing::debug!(gate = %req.gate_name, metric = %req.metric, "create condition");
        let mut query = vec![
            ("gateName", req.gate_name.as_str()),
            ("metric", req.metric.as_str()),
            ("error", req.error.as_str()),
        ];
        if let Some(op) = req.op {
            query.push(("op", op.as_str()));
        }
        self.post_json("create_condition", &query).await
    }

    async fn update_condition(&self, req: &UpdateCondition) -> Result<(), ApiError> {
        tracing::debug!(id = %req.id, metric = %req.metric, "update condition");
        let mut query = vec![
            ("id", req.id.as_str()),
            ("metric", req.metric.as_str()),
            ("error", req.error.as_str()),
        ];
        if let Some(op) = req.op {
            query.push(("op", op.as_str()));
        }
        self.post_ok("update_condition", &query).await
    }

    async fn delete_condition(&self, id: &str) -> Result<(), ApiError> {
        tracing::debug!(id, "delete condition");
        self.post_ok("delete_condition", &[("id", id)]).await
    }
}

/// SonarQube error envelope: `{"errors": [{"msg": "..."}]}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    msg: String,
}

/// Maps a non-success response to an [`ApiError`], folding the server's
/// error envelope into the message. 404 is the semantic not-found signal.
async fn check_status(resp: reqwest::Response) -> Result<String, ApiError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if status.is_success() {
        return Ok(body);
    }

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) if !envelope.errors.is_empty() => envelope
            .errors
            .into_iter()
            .map(|e| e.msg)
            .collect::<Vec<_>>()
            .join("; "),
        _ => body,
    };

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::not_found(message));
    }

    Err(ApiError::Http {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_applies_options() {
        let config = SonarConfig::new("https://sonar.example.com/", "tok")
            .with_insecure_skip_verify(true)
            .with_request_timeout(Duration::from_secs(3));
        assert!(config.insecure_skip_verify);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn client_strips_trailing_slash_from_base_url() {
        let config = SonarConfig::new("https://sonar.example.com/", "tok");
        let client = HttpQualityGates::new(&config).unwrap();
        assert_eq!(
            client.endpoint("show"),
            "https://sonar.example.com/api/qualitygates/show"
        );
    }

    #[test]
    fn error_envelope_parses_multiple_messages() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"errors":[{"msg":"No quality gate has been found"},{"msg":"second"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.errors.len(), 2);
        assert_eq!(envelope.errors[0].msg, "No quality gate has been found");
    }
}
