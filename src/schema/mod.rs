//! Structural schemas for authored and generated content.
//!
//! Every entity that crosses a trust boundary (YAML files written by
//! curriculum authors, JSON produced by an AI provider, progress records
//! from a client) is parsed through one of these validators before the
//! rest of the crate touches it.
//!
//! # Multi-Error Contract
//!
//! Validation is **total**: a validator walks the entire document and
//! records every violated constraint as a [`Violation`] carrying a
//! dotted field path (`lessons.2.duration`, `choices.0.impact.mttr`).
//! A missing `title` does not hide a malformed `duration` three fields
//! later. Authors fix a file in one edit cycle instead of replaying
//! parse-fail-fix loops one field at a time.
//!
//! Each entity exposes `parse(&serde_yaml::Value) -> Result<T, Violations>`:
//! either a fully-typed value, or the complete list of problems. The
//! typed structs are only constructible through `parse`, so holding a
//! [`Module`] or [`Scenario`] is proof the document passed.
//!
//! # Layout
//!
//! | Module       | Entities |
//! |--------------|----------|
//! | [`fields`]   | shared field-checking primitives (internal) |
//! | [`module`]   | [`Module`], [`Lesson`], lesson/AI enums |
//! | [`scenario`] | [`Scenario`], [`Choice`], [`Impact`], pillar enums |
//! | [`assessment`] | [`Assessment`], [`Question`], [`AnswerOption`] |
//! | [`progress`] | [`UserProgress`], [`ScenarioProgress`], status enums |

pub(crate) mod fields;

pub mod assessment;
pub mod module;
pub mod progress;
pub mod scenario;

pub use assessment::{AnswerOption, Assessment, Question};
pub use module::{
    AiFeatures, AiMode, AssessmentRef, InfographicRef, Lesson, LessonKind, Module, ModuleMeta,
    ScenarioRef,
};
pub use progress::{
    Certification, ModuleProgress, ModuleStatus, ScenarioDecision, ScenarioProgress, UserProgress,
};
pub use scenario::{Choice, Impact, Pillar, RiskLevel, Scenario, ScenarioKind, ScenarioMeta};

use std::fmt;

/// A single violated constraint, located by dotted field path.
///
/// Paths are dotted and zero-indexed: `lessons.2.duration` is the
/// `duration` field of the third lesson. An empty path means the
/// document root itself (e.g. the file is not a mapping at all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// The complete list of violations found in one document.
///
/// Never empty when returned from a `parse` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// All violation paths, in document order. Handy for assertions.
    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.path.as_str()).collect()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
            first = false;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
