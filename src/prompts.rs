//! Governed prompt registry.
//!
//! Every prompt sent to an AI backend must be registered here first:
//! versioned, documented, and approved. Ad hoc prompt strings are a
//! governance violation, so lookups of unregistered ids fail loudly
//! rather than falling back to anything.
//!
//! The registry is plain data passed to whoever needs it (the
//! [`crate::provider`] client takes one at construction), which keeps
//! tests free to build alternate registries instead of monkeying with
//! process-global state.
//!
//! ## Builtin prompts
//!
//! | Id                        | Purpose                            |
//! |---------------------------|------------------------------------|
//! | `infographic-causal-loop` | SVG causal-loop diagram generation |
//! | `scenario-explanation`    | Post-decision reasoning writeups   |
//! | `module-summary`          | Short video-script summaries       |

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt '{0}' not found in registry. All prompts must be registered for governance.")]
    NotRegistered(String),
    #[error("Missing required variables for prompt '{prompt_id}': {}", .missing.join(", "))]
    MissingVariables {
        prompt_id: String,
        missing: Vec<String>,
    },
}

/// A versioned, approved prompt template.
///
/// Templates hold `{{variable}}` placeholders; `variables` declares
/// which ones a caller must supply.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredPrompt {
    pub id: String,
    pub version: String,
    pub purpose: String,
    pub template: String,
    pub variables: Vec<String>,
    pub approved_by: String,
    pub approved_at: NaiveDate,
    pub examples: Vec<PromptExample>,
}

/// A known-good input/output pair kept alongside a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptExample {
    pub input: BTreeMap<String, String>,
    pub expected_output: String,
}

/// A rendered template plus the registry record it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub content: String,
    pub metadata: RegisteredPrompt,
}

/// Immutable-after-construction mapping from prompt id to record.
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    prompts: BTreeMap<String, RegisteredPrompt>,
}

impl PromptRegistry {
    /// An empty registry. Useful for tests and alternate prompt sets.
    pub fn new() -> PromptRegistry {
        PromptRegistry::default()
    }

    /// The production prompt set.
    pub fn builtin() -> PromptRegistry {
        let approved_at = NaiveDate::from_ymd_opt(2026, 1, 2).expect("valid approval date");
        let approved_by = "curriculum board".to_string();

        let mut registry = PromptRegistry::new();

        registry.register(RegisteredPrompt {
            id: "infographic-causal-loop".to_string(),
            version: "1.0.0".to_string(),
            purpose: "Generate an SVG causal loop diagram for operations systems".to_string(),
            template: "\
Generate an SVG causal loop diagram showing the relationships between operational components.

Components: {{nodes}}
Relationships: {{relationships}}

Requirements:
- Use dark mode colors (#0B0F14 background, #E5E7EB text)
- Show causality with directional arrows
- Include + or - labels for reinforcing/balancing loops
- SVG must be valid and self-contained
- Max dimensions: 800x600px
- Use accent colors: #3B82F6 (primary), #22D3EE (secondary)

Output only valid SVG XML, no explanations."
                .to_string(),
            variables: vec!["nodes".to_string(), "relationships".to_string()],
            approved_by: approved_by.clone(),
            approved_at,
            examples: vec![PromptExample {
                input: BTreeMap::from([
                    (
                        "nodes".to_string(),
                        r#"["Alert Volume", "Triage Load", "Fix Latency"]"#.to_string(),
                    ),
                    (
                        "relationships".to_string(),
                        r#"[{"from": "Alert Volume", "to": "Triage Load", "type": "positive"}]"#
                            .to_string(),
                    ),
                ]),
                expected_output: "<svg>...</svg>".to_string(),
            }],
        });

        registry.register(RegisteredPrompt {
            id: "scenario-explanation".to_string(),
            version: "1.0.0".to_string(),
            purpose: "Explain why a scenario choice was optimal or suboptimal".to_string(),
            template: "\
Analyze the following operations scenario decision and provide educational reasoning.

Scenario: {{scenarioContext}}
Choice Made: {{choiceMade}}
Consequence: {{consequence}}

Provide a concise explanation (150-200 words) that:
1. Explains the trade-offs involved
2. Highlights what the learner should have considered
3. References the relevant stages of the operational loop
4. Avoids jargon and focuses on systems thinking

Do NOT:
- Invent metrics or data not provided
- Oversimplify the decision
- Use patronizing language"
                .to_string(),
            variables: vec![
                "scenarioContext".to_string(),
                "choiceMade".to_string(),
                "consequence".to_string(),
            ],
            approved_by: approved_by.clone(),
            approved_at,
            examples: Vec::new(),
        });

        registry.register(RegisteredPrompt {
            id: "module-summary".to_string(),
            version: "1.0.0".to_string(),
            purpose: "Generate a concise module summary for a video overview".to_string(),
            template: "\
Summarize this operations module for a 2-minute video overview.

Module Title: {{moduleTitle}}
Learning Objectives: {{learningObjectives}}
Key Concepts: {{keyConcepts}}

Generate a script that:
- Opens with a compelling operational scenario
- Explains the \"why\" before the \"what\"
- Walks the operational loop (Sense, Understand, Decide, Act, Verify, Learn)
- Ends with an actionable takeaway
- Total length: 250-300 words
- Conversational tone, technical precision

Target audience: {{audience}} (practitioner/architect/executive)"
                .to_string(),
            variables: vec![
                "moduleTitle".to_string(),
                "learningObjectives".to_string(),
                "keyConcepts".to_string(),
                "audience".to_string(),
            ],
            approved_by,
            approved_at,
            examples: Vec::new(),
        });

        registry
    }

    /// Add or replace a prompt record.
    pub fn register(&mut self, prompt: RegisteredPrompt) {
        self.prompts.insert(prompt.id.clone(), prompt);
    }

    /// Look up a prompt. Unregistered ids are a governance violation,
    /// not a soft miss.
    pub fn get(&self, id: &str) -> Result<&RegisteredPrompt, PromptError> {
        self.prompts
            .get(id)
            .ok_or_else(|| PromptError::NotRegistered(id.to_string()))
    }

    /// Render a template with the supplied variables.
    ///
    /// All declared variables are checked up front; the error names
    /// every missing one, not just the first. Extra variables are
    /// ignored. Substitution is literal text replacement of each
    /// `{{key}}` occurrence.
    pub fn render(
        &self,
        id: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<RenderedPrompt, PromptError> {
        let prompt = self.get(id)?;

        let missing: Vec<String> = prompt
            .variables
            .iter()
            .filter(|v| !variables.contains_key(v.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PromptError::MissingVariables {
                prompt_id: id.to_string(),
                missing,
            });
        }

        let mut content = prompt.template.clone();
        for (key, value) in variables {
            content = content.replace(&format!("{{{{{key}}}}}"), value);
        }

        Ok(RenderedPrompt {
            content,
            metadata: prompt.clone(),
        })
    }

    /// Every registered prompt, ordered by id. For audit surfaces.
    pub fn list(&self) -> Vec<&RegisteredPrompt> {
        self.prompts.values().collect()
    }
}
