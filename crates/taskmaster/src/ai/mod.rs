//! AI integration for task prioritization.
//!
//! This module provides:
//! - AI provider abstraction (Anthropic, OpenAI)
//! - Prompt template system with Handlebars
//! - Request/response schemas for the prioritization exchange
//! - Provider registry for selecting a backend

mod http;
pub mod prompts;
pub mod provider;
pub mod registry;
pub mod schemas;

// Provider implementations
pub mod anthropic;
pub mod openai;

// Re-exports
pub use prompts::{PromptManager, PromptTemplate};
pub use provider::{
    extract_json, parse_ai_response, AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions,
    MessageBuilder, TokenUsage,
};
pub use registry::ProviderRegistry;
pub use schemas::*;
