//! Callback request intake for Ringback.
//!
//! A visitor leaves a phone number and email. The intake flow stores the
//! request, asks the voice-AI provider to start a call, and hands back the
//! join URL when the provider produced one. Without a join URL the request
//! simply stays acknowledged and no live session is started.

pub mod config;
pub mod error;
pub mod flow;
pub mod store;
pub mod voice_ai;

pub use config::{ModelConfig, VoiceAiConfig, VoiceConfig};
pub use error::IntakeError;
pub use flow::{IntakeFlow, IntakeOutcome};
pub use voice_ai::{CallInitiation, CallInitiator, CallResponse, CallTransport, VoiceAiClient};
