//! services/api/src/adapters/reflection_llm.rs
//!
//! This module contains the adapter for the reflection-generating LLM.
//! It implements the `ReflectionModel` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use lumina_core::{
    ports::{PortError, PortResult, ReflectionModel},
    reflection::REFLECTION_SYSTEM_INSTRUCTION,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ReflectionModel` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiReflectionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiReflectionAdapter {
    /// Creates a new `OpenAiReflectionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ReflectionModel` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReflectionModel for OpenAiReflectionAdapter {
    /// One attempt at generating a reflection for an entry's content.
    ///
    /// Returns the model's raw text. The core interprets it, so a response
    /// whose text is missing degrades to an empty string instead of an error:
    /// the service answered, its payload was just unusable.
    async fn generate_reflection(&self, content: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(REFLECTION_SYSTEM_INSTRUCTION)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Entry: \"{}\"", content))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(text)
    }
}
