//! Outbound voice-AI call initiation.

use crate::config::VoiceAiConfig;
use crate::error::IntakeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

/// Who the voice agent should call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallInitiation {
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CallTransport {
    #[serde(rename = "callUrl", default)]
    pub call_url: Option<String>,
}

/// The provider's answer to a call initiation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transport: Option<CallTransport>,
    #[serde(rename = "webCallUrl", default)]
    pub web_call_url: Option<String>,
}

impl CallResponse {
    /// The endpoint a browser call frame can join, if the provider gave one.
    pub fn join_url(&self) -> Option<&str> {
        let usable = |url: &&str| !url.trim().is_empty();
        self.transport
            .as_ref()
            .and_then(|t| t.call_url.as_deref())
            .filter(usable)
            .or_else(|| self.web_call_url.as_deref().filter(usable))
    }
}

#[async_trait]
pub trait CallInitiator: Send + Sync {
    async fn initiate(&self, request: &CallInitiation) -> Result<CallResponse, IntakeError>;
}

/// HTTP client for the voice-AI provider's call API.
#[derive(Debug, Clone)]
pub struct VoiceAiClient {
    http: reqwest::Client,
    config: VoiceAiConfig,
}

impl VoiceAiClient {
    /// # Errors
    ///
    /// Returns `IntakeError::Http` if the HTTP client cannot be built.
    pub fn new(config: VoiceAiConfig) -> Result<Self, IntakeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn endpoint(&self) -> String {
        format!("{}/call/web", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CallInitiator for VoiceAiClient {
    async fn initiate(&self, request: &CallInitiation) -> Result<CallResponse, IntakeError> {
        if !self.is_enabled() {
            return Err(IntakeError::VoiceAi(
                "voice-AI API key is not configured".to_string(),
            ));
        }

        let body = json!({
            "assistant": {
                "model": self.config.model,
                "voice": self.config.voice,
            },
            "metadata": request,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "voice-AI provider rejected call initiation");
            return Err(IntakeError::VoiceAi(format!(
                "provider returned {}: {}",
                status, detail
            )));
        }

        let call: CallResponse = response.json().await?;
        info!(
            call_id = %call.id,
            status = call.status.as_deref().unwrap_or("unknown"),
            has_join_url = call.join_url().is_some(),
            "voice-AI call initiated"
        );
        Ok(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_prefers_transport() {
        let call: CallResponse = serde_json::from_str(
            r#"{"id":"c1","transport":{"callUrl":"https://call/abc"},"webCallUrl":"https://call/web"}"#,
        )
        .unwrap();
        assert_eq!(call.join_url(), Some("https://call/abc"));
    }

    #[test]
    fn join_url_falls_back_to_web_call_url() {
        let call: CallResponse =
            serde_json::from_str(r#"{"id":"c1","webCallUrl":"https://call/web"}"#).unwrap();
        assert_eq!(call.join_url(), Some("https://call/web"));
    }

    #[test]
    fn missing_or_blank_join_url_is_none() {
        let call: CallResponse =
            serde_json::from_str(r#"{"id":"c1","status":"queued"}"#).unwrap();
        assert_eq!(call.join_url(), None);

        let call: CallResponse =
            serde_json::from_str(r#"{"id":"c1","transport":{"callUrl":" "}}"#).unwrap();
        assert_eq!(call.join_url(), None);
    }

    #[test]
    fn blank_transport_url_falls_back_to_web_call_url() {
        let call: CallResponse = serde_json::from_str(
            r#"{"id":"c1","transport":{"callUrl":""},"webCallUrl":"https://call/web"}"#,
        )
        .unwrap();
        assert_eq!(call.join_url(), Some("https://call/web"));
    }

    #[tokio::test]
    async fn disabled_client_refuses_to_call() {
        let client = VoiceAiClient::new(VoiceAiConfig::default()).unwrap();
        let err = client
            .initiate(&CallInitiation {
                phone_number: "+15550100".to_string(),
                email: "a@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::VoiceAi(_)));
    }
}
