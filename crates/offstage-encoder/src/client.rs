//! Encoding worker HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::EncodeError;
use crate::types::{EncodeJobAck, EncodeJobRequest};
use crate::JobSubmitter;

const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the encoder client.
#[derive(Debug, Clone)]
pub struct EncoderClientConfig {
    /// Base URL of the encoding worker.
    pub base_url: String,
    /// Optional bearer token for the worker's API.
    pub api_key: Option<String>,
    /// Timeout for the submission call only. Transcoding itself can run for
    /// much longer; its outcome arrives via callback.
    pub submit_timeout: Duration,
    /// Shared secret the worker uses to sign its completion callback.
    pub webhook_secret: String,
}

impl EncoderClientConfig {
    pub fn from_app_config(config: &offstage_core::Config) -> Self {
        Self {
            base_url: config.encoder_base_url.clone(),
            api_key: config.encoder_api_key.clone(),
            submit_timeout: Duration::from_secs(config.encoder_submit_timeout_secs),
            webhook_secret: config.webhook_secret.clone(),
        }
    }
}

/// Full wire payload: the job request plus the callback signing secret the
/// worker needs. The secret never appears in `EncodeJobRequest` itself so it
/// stays out of logs and call sites.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPayload<'a> {
    #[serde(flatten)]
    request: &'a EncodeJobRequest,
    webhook_secret: &'a str,
}

/// reqwest-based [`JobSubmitter`] for the external encoding worker.
pub struct EncoderClient {
    http: Client,
    config: EncoderClientConfig,
}

impl EncoderClient {
    pub fn new(config: EncoderClientConfig) -> Result<Self, EncodeError> {
        let http = Client::builder()
            .timeout(config.submit_timeout)
            .build()
            .map_err(EncodeError::Network)?;
        Ok(Self { http, config })
    }

    fn jobs_url(&self) -> String {
        format!("{}/jobs", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl JobSubmitter for EncoderClient {
    #[tracing::instrument(skip(self, request), fields(media_id = %request.media_id, media_type = %request.media_type))]
    async fn submit(&self, request: &EncodeJobRequest) -> Result<String, EncodeError> {
        let url = self.jobs_url();
        tracing::debug!(url = %url, priority = request.priority, "Submitting encode job");

        let payload = SubmitPayload {
            request,
            webhook_secret: &self.config.webhook_secret,
        };

        let mut builder = self.http.post(&url).json(&payload);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(EncodeError::Network)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EncodeError::Submission {
                status: Some(status),
                body,
            });
        }

        let ack: EncodeJobAck = response
            .json()
            .await
            .map_err(|e| EncodeError::InvalidAck(e.to_string()))?;

        if ack.job_id.is_empty() {
            return Err(EncodeError::InvalidAck(
                "acknowledgement is missing a job id".to_string(),
            ));
        }

        tracing::info!(job_id = %ack.job_id, ack_status = %ack.status, "Encode job accepted");
        Ok(ack.job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offstage_core::models::MediaKind;
    use uuid::Uuid;

    fn test_config() -> EncoderClientConfig {
        EncoderClientConfig {
            base_url: "https://encoder.example.com/".to_string(),
            api_key: None,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            webhook_secret: "0123456789abcdef".to_string(),
        }
    }

    #[test]
    fn test_jobs_url_strips_trailing_slash() {
        let client = EncoderClient::new(test_config()).expect("client");
        assert_eq!(client.jobs_url(), "https://encoder.example.com/jobs");
    }

    #[test]
    fn test_default_submit_timeout_is_30s() {
        assert_eq!(DEFAULT_SUBMIT_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_payload_includes_webhook_secret_next_to_request_fields() {
        let request = EncodeJobRequest {
            media_id: Uuid::new_v4(),
            media_type: MediaKind::Audio,
            owner_id: Uuid::new_v4(),
            input_ref: "owner/originals/id/track.wav".to_string(),
            callback_url: "https://api.example.com/api/v0/webhooks/transcoding".to_string(),
            priority: 100,
        };
        let payload = SubmitPayload {
            request: &request,
            webhook_secret: "s3cret-s3cret-s3cret",
        };
        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(
            json.get("webhookSecret").and_then(|v| v.as_str()),
            Some("s3cret-s3cret-s3cret")
        );
        assert!(json.get("mediaId").is_some());
        assert_eq!(
            json.get("mediaType").and_then(|v| v.as_str()),
            Some("audio")
        );
    }
}
