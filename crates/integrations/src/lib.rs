//! Clients for the third-party platforms behind the prospecting and calling
//! workflow.
//!
//! - `hunter`: grid search and enrichment ([`LeadHunter`](geoinsight_core::LeadHunter))
//! - `telephony`: Twilio number listing, purchase and voice webhook binding
//! - `voice`: Vapi assistant platform
//! - `chat`: chat-completion client used for connectivity checks
//! - `handshake`: one-shot credential checks for each provider
//!
//! Every client is built explicitly from configuration at process start and
//! handed to its consumers; nothing here is initialised lazily.

pub mod chat;
pub mod handshake;
pub mod hunter;
mod http;
pub mod telephony;
pub mod voice;

pub use chat::{GroqChatClient, LlmClient};
pub use handshake::{HandshakeReport, HandshakeStatus};
pub use hunter::StaticLeadHunter;
pub use telephony::TwilioProvisioner;
pub use voice::VapiClient;
