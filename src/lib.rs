//! Core library for DOINg, a team operations dashboard.
//!
//! The crate owns everything below the view layer: the domain model
//! ([`types`]), whole-blob persistence ([`storage`]), the state container
//! and reducer ([`state`]), credential checks ([`auth`]), report data
//! shaping ([`reports`]), and the local-LLM integration ([`llm`]).

pub mod auth;
pub mod error;
pub mod llm;
pub mod reports;
pub mod state;
pub mod storage;
pub mod types;
