//! Module schema: the course unit that bundles lessons, scenario and
//! infographic references, and one assessment reference.
//!
//! A module YAML file is the entry point into a slice of the catalog.
//! Everything else (scenario files, lesson markdown, SVG infographics,
//! assessment files) is reached through paths declared here, so this
//! validator is the first gate all authored content passes.

use crate::schema::fields::{
    self, Token, opt_seq, opt_str_seq, opt_string, opt_token, opt_u32, record, req_seq,
    req_str_seq, req_string, req_u32,
};
use crate::schema::{Violation, Violations};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::HashSet;
use std::fmt;

/// A validated course module.
///
/// Only constructible through [`Module::parse`]; holding one is proof
/// the document satisfied every structural constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub title: String,
    pub track: String,
    pub description: String,
    /// Total duration in minutes, when the author declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// The `learning_objectives` key is snake_case in content files,
    /// unlike every other key. Kept that way; renaming it would break
    /// the existing catalog.
    #[serde(rename = "learning_objectives")]
    pub learning_objectives: Vec<String>,
    pub lessons: Vec<Lesson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub infographics: Vec<InfographicRef>,
    pub assessment: AssessmentRef,
    /// Module ids that should be completed first. May be empty, but the
    /// author has to say so explicitly.
    pub prerequisites: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ModuleMeta>,
}

/// One lesson entry. `path` points at markdown under the content root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Minutes, 1 to 360.
    pub duration: u32,
    pub path: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<LessonKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_features: Option<AiFeatures>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Video,
    Lab,
    Scenario,
    Quiz,
    Reading,
    Infographic,
}

impl LessonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonKind::Video => "video",
            LessonKind::Lab => "lab",
            LessonKind::Scenario => "scenario",
            LessonKind::Quiz => "quiz",
            LessonKind::Reading => "reading",
            LessonKind::Infographic => "infographic",
        }
    }
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token for LessonKind {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("video", LessonKind::Video),
        ("lab", LessonKind::Lab),
        ("scenario", LessonKind::Scenario),
        ("quiz", LessonKind::Quiz),
        ("reading", LessonKind::Reading),
        ("infographic", LessonKind::Infographic),
    ];
}

/// Per-lesson AI tutoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiFeatures {
    pub enabled: bool,
    pub modes: Vec<AiMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    Socratic,
    Diagnostic,
    Simulation,
}

impl AiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiMode::Socratic => "socratic",
            AiMode::Diagnostic => "diagnostic",
            AiMode::Simulation => "simulation",
        }
    }
}

impl fmt::Display for AiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token for AiMode {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("socratic", AiMode::Socratic),
        ("diagnostic", AiMode::Diagnostic),
        ("simulation", AiMode::Simulation),
    ];
}

/// Reference to a scenario file declared by the module.
///
/// `kind` and `difficulty` are free-form labels here; the closed
/// vocabulary is enforced when the scenario file itself is parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRef {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub difficulty: String,
    /// Minutes.
    pub estimated_time: u32,
    pub path: String,
}

/// Reference to an SVG infographic declared by the module.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfographicRef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub path: String,
}

/// Reference to the module's assessment file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRef {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_points: Option<u32>,
    /// Percent, 0 to 100.
    pub passing_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
}

/// Authoring provenance. Free-form except for the two quality flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMeta {
    pub created: String,
    pub version: String,
    pub status: String,
    pub content_quality: String,
    /// Claims the content is grounded in real operational data.
    pub real_world_data: bool,
    /// Authoring attestation that the text passed a slop review.
    pub ai_slop: bool,
}

impl Module {
    /// Validate an untyped document into a `Module`, reporting every
    /// violated constraint on failure.
    pub fn parse(value: &Value) -> Result<Module, Violations> {
        fields::parse_entity(value, Module::check)
    }

    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Module> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }

        let id = req_string(value, "id", path, sink, 1, None);
        let title = req_string(value, "title", path, sink, 1, Some(200));
        let track = req_string(value, "track", path, sink, 1, None);
        let description = req_string(value, "description", path, sink, 10, Some(1000));
        let duration = opt_u32(value, "duration", path, sink, 1, None);
        let difficulty = opt_string(value, "difficulty", path, sink, 1, None);
        let learning_objectives =
            req_str_seq(value, "learning_objectives", path, sink, 1, 10, Some(200));

        let lessons_path = fields::join(path, "lessons");
        let lessons = req_seq(value, "lessons", path, sink, 1, None)
            .and_then(|seq| fields::items(seq, &lessons_path, sink, Lesson::check));
        if let Some(lessons) = &lessons {
            let mut seen = HashSet::new();
            for (i, lesson) in lessons.iter().enumerate() {
                if !seen.insert(lesson.id.as_str()) {
                    let item_path = fields::index(&lessons_path, i);
                    record(
                        sink,
                        &fields::join(&item_path, "id"),
                        format!("duplicate lesson id \"{}\"", lesson.id),
                    );
                }
            }
        }

        let scenarios = opt_items(value, "scenarios", path, sink, ScenarioRef::check);
        let infographics = opt_items(value, "infographics", path, sink, InfographicRef::check);

        let assessment_path = fields::join(path, "assessment");
        let assessment = fields::require(value, "assessment", path, sink)
            .and_then(|v| AssessmentRef::check(v, &assessment_path, sink));

        let prerequisites = req_str_seq(value, "prerequisites", path, sink, 0, 0, None);
        let next_module = opt_string(value, "nextModule", path, sink, 1, None);

        let metadata = match fields::optional(value, "metadata") {
            Some(v) => ModuleMeta::check(v, &fields::join(path, "metadata"), sink).map(Some),
            None => Some(None),
        };

        Some(Module {
            id: id?,
            title: title?,
            track: track?,
            description: description?,
            duration: duration?,
            difficulty: difficulty?,
            learning_objectives: learning_objectives?,
            lessons: lessons?,
            scenarios: scenarios?,
            infographics: infographics?,
            assessment: assessment?,
            prerequisites: prerequisites?,
            next_module: next_module?,
            metadata: metadata?,
        })
    }
}

/// Optional list of sub-entities; absent normalizes to empty.
fn opt_items<T>(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    check: impl FnMut(&Value, &str, &mut Vec<Violation>) -> Option<T>,
) -> Option<Vec<T>> {
    let Some(seq) = opt_seq(map, key, parent, sink)? else {
        return Some(Vec::new());
    };
    fields::items(seq, &fields::join(parent, key), sink, check)
}

impl Lesson {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Lesson> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let id = req_string(value, "id", path, sink, 1, None);
        let title = req_string(value, "title", path, sink, 1, None);
        let duration = req_u32(value, "duration", path, sink, 1, Some(360));
        let file = req_string(value, "path", path, sink, 1, None);
        let kind = opt_token::<LessonKind>(value, "type", path, sink);
        let ai_features = match fields::optional(value, "aiFeatures") {
            Some(v) => AiFeatures::check(v, &fields::join(path, "aiFeatures"), sink).map(Some),
            None => Some(None),
        };
        Some(Lesson {
            id: id?,
            title: title?,
            duration: duration?,
            path: file?,
            kind: kind?,
            ai_features: ai_features?,
        })
    }
}

impl AiFeatures {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<AiFeatures> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let enabled = fields::req_bool(value, "enabled", path, sink);
        let modes = fields::req_token_seq::<AiMode>(value, "modes", path, sink, 0);
        Some(AiFeatures {
            enabled: enabled?,
            modes: modes?,
        })
    }
}

impl ScenarioRef {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<ScenarioRef> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let id = req_string(value, "id", path, sink, 1, None);
        let title = req_string(value, "title", path, sink, 1, None);
        let kind = req_string(value, "type", path, sink, 1, None);
        let difficulty = req_string(value, "difficulty", path, sink, 1, None);
        let estimated_time = req_u32(value, "estimatedTime", path, sink, 1, None);
        let file = req_string(value, "path", path, sink, 1, None);
        Some(ScenarioRef {
            id: id?,
            title: title?,
            kind: kind?,
            difficulty: difficulty?,
            estimated_time: estimated_time?,
            path: file?,
        })
    }
}

impl InfographicRef {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<InfographicRef> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let id = req_string(value, "id", path, sink, 1, None);
        let title = req_string(value, "title", path, sink, 1, None);
        let description = req_string(value, "description", path, sink, 1, None);
        let file = req_string(value, "path", path, sink, 1, None);
        // Infographics are inlined into pages, so only SVG is allowed.
        if let Some(file) = &file
            && !file.ends_with(".svg")
        {
            record(sink, &fields::join(path, "path"), "must end with .svg");
        }
        Some(InfographicRef {
            id: id?,
            title: title?,
            description: description?,
            path: file?,
        })
    }
}

impl AssessmentRef {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<AssessmentRef> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let id = req_string(value, "id", path, sink, 1, None);
        let title = req_string(value, "title", path, sink, 1, None);
        let kind = req_string(value, "type", path, sink, 1, None);
        let file = req_string(value, "path", path, sink, 1, None);
        let question_count = opt_u32(value, "questionCount", path, sink, 1, None);
        let total_points = opt_u32(value, "totalPoints", path, sink, 1, None);
        let passing_score = req_u32(value, "passingScore", path, sink, 0, Some(100));
        let estimated_time = opt_u32(value, "estimatedTime", path, sink, 1, None);
        let topics = opt_str_seq(value, "topics", path, sink, 0);
        Some(AssessmentRef {
            id: id?,
            title: title?,
            kind: kind?,
            path: file?,
            question_count: question_count?,
            total_points: total_points?,
            passing_score: passing_score?,
            estimated_time: estimated_time?,
            topics: topics?.unwrap_or_default(),
        })
    }
}

impl ModuleMeta {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<ModuleMeta> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let created = req_string(value, "created", path, sink, 0, None);
        let version = req_string(value, "version", path, sink, 0, None);
        let status = req_string(value, "status", path, sink, 0, None);
        let content_quality = req_string(value, "contentQuality", path, sink, 0, None);
        let real_world_data = fields::req_bool(value, "realWorldData", path, sink);
        let ai_slop = fields::req_bool(value, "aiSlop", path, sink);
        Some(ModuleMeta {
            created: created?,
            version: version?,
            status: status?,
            content_quality: content_quality?,
            real_world_data: real_world_data?,
            ai_slop: ai_slop?,
        })
    }
}
