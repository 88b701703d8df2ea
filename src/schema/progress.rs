//! Progress schema: learner state persisted by an external store.
//!
//! Progress records are the one mutable entity family. They reference
//! content by id only, so nothing here embeds a module or scenario;
//! resolution back to content goes through the loader. Timestamps are
//! RFC 3339 strings on the wire and [`DateTime<Utc>`] in memory.

use crate::schema::fields::{
    self, Token, opt_datetime, opt_string, opt_u32, record, req_bool, req_datetime, req_f64,
    req_seq, req_str_seq, req_string, req_token,
};
use crate::schema::{Violation, Violations};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleStatus::NotStarted => "not_started",
            ModuleStatus::InProgress => "in_progress",
            ModuleStatus::Completed => "completed",
            ModuleStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token for ModuleStatus {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("not_started", ModuleStatus::NotStarted),
        ("in_progress", ModuleStatus::InProgress),
        ("completed", ModuleStatus::Completed),
        ("failed", ModuleStatus::Failed),
    ];
}

/// Per-module learner state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: String,
    pub completed_lessons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_score: Option<u32>,
    pub status: ModuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Defaults to 0 when the store has never recorded time.
    pub time_spent_minutes: u32,
}

/// Course-level certification state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub eligible: bool,
    pub issued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_url: Option<String>,
}

/// A learner's full course record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub course_id: String,
    pub track_id: String,
    pub progress: Vec<ModuleProgress>,
    pub certification: Certification,
    pub enrolled_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub total_time_spent_minutes: u32,
}

/// One recorded decision inside a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDecision {
    pub scenario_id: String,
    pub user_id: String,
    pub choice_id: String,
    pub timestamp: DateTime<Utc>,
    pub time_to_decide_seconds: f64,
    pub was_optimal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Aggregated decision quality for one learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProgress {
    pub user_id: String,
    pub decisions: Vec<ScenarioDecision>,
    /// Fraction of decisions that were optimal, 0 through 1.
    pub optimal_decision_rate: f64,
    pub average_decision_time_seconds: f64,
}

impl ModuleProgress {
    pub fn parse(value: &Value) -> Result<ModuleProgress, Violations> {
        fields::parse_entity(value, ModuleProgress::check)
    }

    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<ModuleProgress> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let module_id = req_string(value, "moduleId", path, sink, 1, None);
        let completed_lessons = req_str_seq(value, "completedLessons", path, sink, 0, 1, None);
        let assessment_score = opt_u32(value, "assessmentScore", path, sink, 0, Some(100));
        let status = req_token::<ModuleStatus>(value, "status", path, sink);
        let started_at = opt_datetime(value, "startedAt", path, sink);
        let completed_at = opt_datetime(value, "completedAt", path, sink);
        let time_spent_minutes =
            opt_u32(value, "timeSpentMinutes", path, sink, 0, None).map(|n| n.unwrap_or(0));
        Some(ModuleProgress {
            module_id: module_id?,
            completed_lessons: completed_lessons?,
            assessment_score: assessment_score?,
            status: status?,
            started_at: started_at?,
            completed_at: completed_at?,
            time_spent_minutes: time_spent_minutes?,
        })
    }
}

impl Certification {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Certification> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let eligible = req_bool(value, "eligible", path, sink);
        let issued = req_bool(value, "issued", path, sink);
        let issued_at = opt_datetime(value, "issuedAt", path, sink);
        let certificate_id = opt_string(value, "certificateId", path, sink, 1, None);
        let verification_url = opt_string(value, "verificationUrl", path, sink, 1, None);
        if let Some(Some(url)) = &verification_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            record(
                sink,
                &fields::join(path, "verificationUrl"),
                "must be an http(s) URL",
            );
        }
        Some(Certification {
            eligible: eligible?,
            issued: issued?,
            issued_at: issued_at?,
            certificate_id: certificate_id?,
            verification_url: verification_url?,
        })
    }
}

impl UserProgress {
    pub fn parse(value: &Value) -> Result<UserProgress, Violations> {
        fields::parse_entity(value, UserProgress::check)
    }

    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<UserProgress> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let user_id = req_string(value, "userId", path, sink, 1, None);
        let course_id = req_string(value, "courseId", path, sink, 1, None);
        let track_id = req_string(value, "trackId", path, sink, 1, None);

        let progress_path = fields::join(path, "progress");
        let progress = req_seq(value, "progress", path, sink, 0, None)
            .and_then(|seq| fields::items(seq, &progress_path, sink, ModuleProgress::check));

        let certification_path = fields::join(path, "certification");
        let certification = fields::require(value, "certification", path, sink)
            .and_then(|v| Certification::check(v, &certification_path, sink));

        let enrolled_at = req_datetime(value, "enrolledAt", path, sink);
        let last_activity_at = req_datetime(value, "lastActivityAt", path, sink);
        let total_time_spent_minutes =
            opt_u32(value, "totalTimeSpentMinutes", path, sink, 0, None).map(|n| n.unwrap_or(0));

        Some(UserProgress {
            user_id: user_id?,
            course_id: course_id?,
            track_id: track_id?,
            progress: progress?,
            certification: certification?,
            enrolled_at: enrolled_at?,
            last_activity_at: last_activity_at?,
            total_time_spent_minutes: total_time_spent_minutes?,
        })
    }
}

impl ScenarioDecision {
    pub fn parse(value: &Value) -> Result<ScenarioDecision, Violations> {
        fields::parse_entity(value, ScenarioDecision::check)
    }

    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<ScenarioDecision> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let scenario_id = req_string(value, "scenarioId", path, sink, 1, None);
        let user_id = req_string(value, "userId", path, sink, 1, None);
        let choice_id = req_string(value, "choiceId", path, sink, 1, None);
        let timestamp = req_datetime(value, "timestamp", path, sink);
        let time_to_decide_seconds = req_f64(value, "timeToDecideSeconds", path, sink, 0.0, None);
        let was_optimal = req_bool(value, "wasOptimal", path, sink);
        let reasoning = opt_string(value, "reasoning", path, sink, 1, None);
        Some(ScenarioDecision {
            scenario_id: scenario_id?,
            user_id: user_id?,
            choice_id: choice_id?,
            timestamp: timestamp?,
            time_to_decide_seconds: time_to_decide_seconds?,
            was_optimal: was_optimal?,
            reasoning: reasoning?,
        })
    }
}

impl ScenarioProgress {
    pub fn parse(value: &Value) -> Result<ScenarioProgress, Violations> {
        fields::parse_entity(value, ScenarioProgress::check)
    }

    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<ScenarioProgress> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let user_id = req_string(value, "userId", path, sink, 1, None);

        let decisions_path = fields::join(path, "decisions");
        let decisions = req_seq(value, "decisions", path, sink, 0, None)
            .and_then(|seq| fields::items(seq, &decisions_path, sink, ScenarioDecision::check));

        let optimal_decision_rate =
            req_f64(value, "optimalDecisionRate", path, sink, 0.0, Some(1.0));
        let average_decision_time_seconds =
            req_f64(value, "averageDecisionTimeSeconds", path, sink, 0.0, None);

        Some(ScenarioProgress {
            user_id: user_id?,
            decisions: decisions?,
            optimal_decision_rate: optimal_decision_rate?,
            average_decision_time_seconds: average_decision_time_seconds?,
        })
    }
}
