//! # Ops Academy
//!
//! Content schema, validation, and prompt governance for operations-training
//! curricula. Your filesystem is the catalog: module YAML files declare
//! lessons, decision scenarios, SVG infographics, and an assessment, and
//! every declared path must resolve to a file that passes its own checks.
//!
//! # Architecture: Validate at the Boundary
//!
//! Content enters the system exactly twice — authored files read from the
//! content root, and generated output handed back by an AI provider. Both
//! boundaries run through a validation layer before anything downstream
//! sees the data:
//!
//! ```text
//! 1. Authored   content/   →  schema parse  →  typed entities  (Module, Scenario, ...)
//! 2. Generated  AI output  →  quality rules →  ValidationReport (errors + warnings)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Total error reporting**: the schema layer walks untyped YAML and
//!   collects every violation in a file, not just the first one a serde
//!   derive would bail on. Authors fix a file once, not field by field.
//! - **Typed downstream**: holding a [`schema::Module`] is proof the
//!   document validated; nothing after the boundary re-checks shape.
//! - **Reports as data**: quality checks return `valid/errors/warnings`
//!   instead of `Err`, so a calling pipeline can decide to retry, escalate,
//!   or ship-with-warnings.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Structural validators and the typed entities they produce (`Module`, `Scenario`, `Assessment`, `Progress`) |
//! | [`loader`] | Content root access — logical identifiers to validated entities |
//! | [`quality`] | Rule sets for generated and authored content: SVG safety, text slop, scenario semantics |
//! | [`check`] | Whole-catalog validation: references, cross-checks, orphans; plus the content inventory |
//! | [`prompts`] | Governed prompt registry — versioned, approved templates with variable rendering |
//! | [`provider`] | AI provider abstraction and the generate call path where governance is enforced |
//! | [`config`] | `academy.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting — information-first display of check and inventory results |
//!
//! # Design Decisions
//!
//! ## One Optimal Choice
//!
//! Decision scenarios teach judgment, and judgment needs a defensible
//! answer. The semantic layer makes a scenario with zero optimal choices a
//! hard error; several optimal choices only warn, because some advanced
//! scenarios legitimately accept more than one good path.
//!
//! ## Prompts Are Registered or Rejected
//!
//! Every AI generation call goes through [`provider::AiClient::generate`],
//! and any call that names a prompt id must find it in the
//! [`prompts::PromptRegistry`] — unregistered prompts are an error, not a
//! fallback to raw text. The registry records version, purpose, approver,
//! and approval date, which is what makes generated content auditable.
//!
//! ## Warnings Never Block
//!
//! A check run distinguishes what is broken (missing files, schema
//! violations, unsafe SVG) from what deserves a look (palette drift,
//! dangling prerequisites, orphaned files). Only errors fail the run; a
//! catalog full of warnings still ships, visibly.
//!
//! ## No Caching in the Loader
//!
//! Content is small and read rarely. Every load re-reads from disk and
//! picks up edits immediately, which keeps `check` honest while an author
//! iterates on a file.

pub mod check;
pub mod config;
pub mod loader;
pub mod output;
pub mod prompts;
pub mod provider;
pub mod quality;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_helpers;
