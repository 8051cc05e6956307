use serde::{Deserialize, Serialize};
use std::fmt;

fn default_base_url() -> String {
    "https://api.vapi.ai".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Language model the voice agent runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4-turbo-preview".to_string(),
        }
    }
}

/// Synthesized voice the agent speaks with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub provider: String,
    #[serde(rename = "voiceId", alias = "voice_id")]
    pub voice_id: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider: "11labs".to_string(),
            voice_id: "alloy".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VoiceAiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    /// Timeout for the call initiation request, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for VoiceAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: ModelConfig::default(),
            voice: VoiceConfig::default(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for VoiceAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl VoiceAiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_api_key() {
        let config = VoiceAiConfig::new("http://localhost:9000", "sk-live-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-live-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn api_key_is_never_serialized() {
        let config = VoiceAiConfig::new("http://localhost:9000", "sk-live-secret");
        let toml = toml::to_string(&config).expect("config should serialize");
        assert!(!toml.contains("sk-live-secret"));
        assert!(!toml.contains("api_key"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: VoiceAiConfig = toml::from_str(
            r#"
            api_key = "k"

            [voice]
            provider = "11labs"
            voice_id = "bella"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.base_url, "https://api.vapi.ai");
        assert_eq!(config.voice.voice_id, "bella");
        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.timeout_seconds, 30);
    }
}
