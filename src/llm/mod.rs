//! Local-LLM integration.
//!
//! Three layers, lowest first:
//! - [`client`]: the model gateway, one chat-completion POST per call
//!   against a locally hosted endpoint.
//! - [`prompts`]: named default templates and the `{{KEY}}` substitution
//!   engine, with per-deployment overrides.
//! - [`generate`]: orchestrators that shape domain data, fill a template,
//!   and call the gateway.

pub mod client;
pub mod generate;
pub mod prompts;

pub use client::{call_model, send_chat_message};
