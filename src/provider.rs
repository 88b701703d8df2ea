//! Provider-agnostic AI client.
//!
//! Content generation goes through the [`ContentGenerator`] capability
//! trait so backends stay interchangeable. The shipped backends are
//! placeholders that return canned replies; real network integration
//! belongs to an external pipeline, not this layer.
//!
//! The client enforces prompt governance at the call site: a request
//! carrying a prompt id that is not in its [`PromptRegistry`] is
//! refused, and a request without one is logged as an audit gap.
//!
//! | Provider | Default model                |
//! |----------|------------------------------|
//! | claude   | `claude-3-5-sonnet-20241022` |
//! | gemini   | `gemini-1.5-pro`             |
//! | openai   | `gpt-4-turbo`                |

use crate::config::AcademyConfig;
use crate::prompts::{PromptError, PromptRegistry};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// The supported AI backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Claude,
    Gemini,
    OpenAi,
}

impl ProviderKind {
    /// Parse a provider name as it appears in `academy.toml`.
    pub fn from_name(name: &str) -> Option<ProviderKind> {
        match name {
            "claude" => Some(ProviderKind::Claude),
            "gemini" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude",
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    /// The model used when the config does not pin one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Claude => DEFAULT_CLAUDE_MODEL,
            ProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
            ProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a provider conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Message {
        Message { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Message {
        Message { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Message {
        Message { role: Role::Assistant, content: content.into() }
    }
}

/// Request knobs. `prompt_id` ties the call back to the governed
/// registry for the audit trail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub prompt_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub provider: ProviderKind,
    pub timestamp: DateTime<Utc>,
    pub tokens_used: Option<u32>,
}

/// Capability trait every backend implements. Backends own their
/// transport; callers never see past this seam.
pub trait ContentGenerator {
    fn kind(&self) -> ProviderKind;

    fn generate(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<GenerateResponse, GenerateError>;
}

fn canned_response(kind: ProviderKind, model: &Option<String>, content: &str) -> GenerateResponse {
    GenerateResponse {
        content: content.to_string(),
        model: model.clone().unwrap_or_else(|| kind.default_model().to_string()),
        provider: kind,
        timestamp: Utc::now(),
        tokens_used: None,
    }
}

/// Anthropic backend. Canned until the real API call lands.
pub struct ClaudeBackend {
    pub model: Option<String>,
}

impl ContentGenerator for ClaudeBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn generate(
        &self,
        _messages: &[Message],
        _options: &GenerateOptions,
    ) -> Result<GenerateResponse, GenerateError> {
        Ok(canned_response(ProviderKind::Claude, &self.model, "Claude response"))
    }
}

/// Google backend. Canned until the real API call lands.
pub struct GeminiBackend {
    pub model: Option<String>,
}

impl ContentGenerator for GeminiBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn generate(
        &self,
        _messages: &[Message],
        _options: &GenerateOptions,
    ) -> Result<GenerateResponse, GenerateError> {
        Ok(canned_response(ProviderKind::Gemini, &self.model, "Gemini response"))
    }
}

/// OpenAI backend. Canned until the real API call lands.
pub struct OpenAiBackend {
    pub model: Option<String>,
}

impl ContentGenerator for OpenAiBackend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn generate(
        &self,
        _messages: &[Message],
        _options: &GenerateOptions,
    ) -> Result<GenerateResponse, GenerateError> {
        Ok(canned_response(ProviderKind::OpenAi, &self.model, "GPT response"))
    }
}

fn backend_for(kind: ProviderKind, model: Option<String>) -> Box<dyn ContentGenerator> {
    match kind {
        ProviderKind::Claude => Box::new(ClaudeBackend { model }),
        ProviderKind::Gemini => Box::new(GeminiBackend { model }),
        ProviderKind::OpenAi => Box::new(OpenAiBackend { model }),
    }
}

/// Governed entry point for AI generation.
///
/// Holds the prompt registry it answers to; tests swap in alternate
/// registries or backends without touching process state.
pub struct AiClient {
    backend: Box<dyn ContentGenerator>,
    registry: PromptRegistry,
}

impl AiClient {
    pub fn new(kind: ProviderKind, model: Option<String>, registry: PromptRegistry) -> AiClient {
        AiClient { backend: backend_for(kind, model), registry }
    }

    /// Build a client around any [`ContentGenerator`].
    pub fn with_backend(backend: Box<dyn ContentGenerator>, registry: PromptRegistry) -> AiClient {
        AiClient { backend, registry }
    }

    /// Build from the `[ai]` config table. The API key comes from the
    /// `AI_API_KEY` environment variable; a missing key downgrades AI
    /// features rather than failing construction.
    pub fn from_config(
        config: &AcademyConfig,
        registry: PromptRegistry,
    ) -> Result<AiClient, GenerateError> {
        let kind = ProviderKind::from_name(&config.ai.provider)
            .ok_or_else(|| GenerateError::UnsupportedProvider(config.ai.provider.clone()))?;

        let has_key = std::env::var("AI_API_KEY").map(|v| !v.is_empty()).unwrap_or(false);
        if !has_key {
            tracing::warn!("AI_API_KEY not configured, AI features will be disabled");
        }

        Ok(AiClient::new(kind, config.ai.model.clone(), registry))
    }

    pub fn provider(&self) -> ProviderKind {
        self.backend.kind()
    }

    /// Generate content, logging the request for the governance audit
    /// trail first. A prompt id that is not registered fails the call.
    pub fn generate(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<GenerateResponse, GenerateError> {
        match options.prompt_id.as_deref() {
            Some(id) => {
                self.registry.get(id)?;
            }
            None => {
                tracing::warn!(
                    provider = %self.backend.kind(),
                    "AI request without a prompt id, audit trail is incomplete"
                );
            }
        }

        tracing::info!(
            provider = %self.backend.kind(),
            prompt_id = options.prompt_id.as_deref().unwrap_or("<none>"),
            messages = messages.len(),
            "AI request"
        );

        self.backend.generate(messages, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;

    fn options_for(prompt_id: &str) -> GenerateOptions {
        GenerateOptions { prompt_id: Some(prompt_id.to_string()), ..GenerateOptions::default() }
    }

    // =========================================================================
    // Provider names and defaults
    // =========================================================================

    #[test]
    fn provider_names_parse() {
        assert_eq!(ProviderKind::from_name("claude"), Some(ProviderKind::Claude));
        assert_eq!(ProviderKind::from_name("gemini"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::from_name("openai"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::from_name("grok"), None);
        assert_eq!(ProviderKind::from_name("Claude"), None);
    }

    #[test]
    fn each_backend_answers_with_its_default_model() {
        let cases = [
            (ProviderKind::Claude, "Claude response", DEFAULT_CLAUDE_MODEL),
            (ProviderKind::Gemini, "Gemini response", DEFAULT_GEMINI_MODEL),
            (ProviderKind::OpenAi, "GPT response", DEFAULT_OPENAI_MODEL),
        ];
        for (kind, content, model) in cases {
            let client = AiClient::new(kind, None, PromptRegistry::builtin());
            let response = client
                .generate(&[Message::user("draw the loop")], &options_for("module-summary"))
                .unwrap();
            assert_eq!(response.content, content);
            assert_eq!(response.model, model);
            assert_eq!(response.provider, kind);
        }
    }

    #[test]
    fn configured_model_overrides_the_default() {
        let client = AiClient::new(
            ProviderKind::Claude,
            Some("claude-3-opus-20240229".to_string()),
            PromptRegistry::builtin(),
        );
        let response = client.generate(&[], &options_for("module-summary")).unwrap();
        assert_eq!(response.model, "claude-3-opus-20240229");
    }

    // =========================================================================
    // Governance at the call site
    // =========================================================================

    #[test]
    fn unregistered_prompt_id_refuses_the_call() {
        let client = AiClient::new(ProviderKind::Claude, None, PromptRegistry::builtin());
        let err = client
            .generate(&[Message::user("hello")], &options_for("ad-hoc-experiment"))
            .unwrap_err();
        assert!(err.to_string().contains("not found in registry"));
    }

    #[test]
    fn missing_prompt_id_is_tolerated() {
        let client = AiClient::new(ProviderKind::Gemini, None, PromptRegistry::builtin());
        let response = client
            .generate(&[Message::user("hello")], &GenerateOptions::default())
            .unwrap();
        assert_eq!(response.content, "Gemini response");
    }

    #[test]
    fn client_answers_to_its_own_registry() {
        let client = AiClient::new(ProviderKind::Claude, None, PromptRegistry::new());
        let err = client.generate(&[], &options_for("module-summary")).unwrap_err();
        assert!(matches!(err, GenerateError::Prompt(PromptError::NotRegistered(_))));
    }

    // =========================================================================
    // Config wiring
    // =========================================================================

    #[test]
    fn from_config_picks_the_configured_provider() {
        let config = AcademyConfig {
            ai: AiConfig {
                provider: "openai".to_string(),
                model: Some("gpt-4o".to_string()),
            },
            ..AcademyConfig::default()
        };
        let client = AiClient::from_config(&config, PromptRegistry::builtin()).unwrap();
        assert_eq!(client.provider(), ProviderKind::OpenAi);
        let response = client.generate(&[], &GenerateOptions::default()).unwrap();
        assert_eq!(response.model, "gpt-4o");
    }

    #[test]
    fn unknown_provider_name_is_an_error() {
        let config = AcademyConfig {
            ai: AiConfig { provider: "grok".to_string(), model: None },
            ..AcademyConfig::default()
        };
        let err = AiClient::from_config(&config, PromptRegistry::builtin()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported provider: grok");
    }

    // =========================================================================
    // The trait seam
    // =========================================================================

    struct EchoBackend;

    impl ContentGenerator for EchoBackend {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Claude
        }

        fn generate(
            &self,
            messages: &[Message],
            _options: &GenerateOptions,
        ) -> Result<GenerateResponse, GenerateError> {
            let content = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(GenerateResponse {
                content,
                model: "echo".to_string(),
                provider: ProviderKind::Claude,
                timestamp: Utc::now(),
                tokens_used: Some(0),
            })
        }
    }

    #[test]
    fn alternate_backends_slot_in_through_the_trait() {
        let client = AiClient::with_backend(Box::new(EchoBackend), PromptRegistry::builtin());
        let response = client
            .generate(
                &[Message::system("be brief"), Message::user("echo this")],
                &GenerateOptions::default(),
            )
            .unwrap();
        assert_eq!(response.content, "echo this");
        assert_eq!(response.tokens_used, Some(0));
    }
}
