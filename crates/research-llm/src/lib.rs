//! Text-completion layer for the equity research pipeline
//!
//! This crate provides the single capability the analysis nodes need from a
//! language model: `complete(prompt) -> text`. It includes:
//!
//! - Message and completion request/response types
//! - The [`LLMProvider`] trait and an OpenAI-compatible chat provider
//! - Backend selection ([`LlmBackend`]) between OpenAI and a local Ollama server
//! - [`TextCompletion`], the prompt-in/text-out trait nodes depend on, and
//!   [`CompletionClient`], its provider-backed implementation

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;

// Re-export main types
pub use client::{CompletionClient, TextCompletion};
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use config::{LlmBackend, LlmSettings};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
