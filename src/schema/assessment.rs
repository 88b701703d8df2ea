//! Assessment schema: scored question sets attached to a module.

use crate::schema::fields::{
    self, opt_str_seq, opt_string, opt_u32, record, req_bool, req_seq, req_string, req_u32,
};
use crate::schema::{Violation, Violations};
use serde::Serialize;
use serde_yaml::Value;

/// Fallback passing score when the document does not set one.
pub const DEFAULT_PASSING_SCORE: u32 = 80;

/// A validated assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub module_id: String,
    pub title: String,
    /// Percentage needed to pass, 0 through 100. Defaults to 80.
    pub passing_score: u32,
    /// Minutes allowed for the whole assessment.
    pub time_limit: u32,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AssessmentMeta>,
}

/// One question. `kind` is a free label ("multiple-choice",
/// "scenario-based", ...) rather than a closed vocabulary; question
/// styles are added by content authors without a schema change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Scenario id this question refers back to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub question: String,
    pub points: u32,
    pub options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    /// Shown to the learner after answering, right or wrong.
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing_criteria: Option<PassingCriteria>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub learning_outcomes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassingCriteria {
    pub minimum_score: u32,
    /// Question ids that must be answered correctly regardless of the
    /// overall score.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_questions: Vec<String>,
}

impl Assessment {
    /// Validate an untyped document into an `Assessment`, reporting
    /// every violated constraint on failure.
    pub fn parse(value: &Value) -> Result<Assessment, Violations> {
        fields::parse_entity(value, Assessment::check)
    }

    /// Sum of the point values of all questions.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Assessment> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }

        let id = req_string(value, "id", path, sink, 1, None);
        let module_id = req_string(value, "moduleId", path, sink, 1, None);
        let title = req_string(value, "title", path, sink, 1, None);
        let passing_score = opt_u32(value, "passingScore", path, sink, 0, Some(100))
            .map(|score| score.unwrap_or(DEFAULT_PASSING_SCORE));
        let time_limit = req_u32(value, "timeLimit", path, sink, 1, None);

        let questions_path = fields::join(path, "questions");
        let questions = req_seq(value, "questions", path, sink, 1, None)
            .and_then(|seq| fields::items(seq, &questions_path, sink, Question::check));

        let metadata = match fields::optional(value, "metadata") {
            Some(v) => AssessmentMeta::check(v, &fields::join(path, "metadata"), sink).map(Some),
            None => Some(None),
        };

        Some(Assessment {
            id: id?,
            module_id: module_id?,
            title: title?,
            passing_score: passing_score?,
            time_limit: time_limit?,
            questions: questions?,
            metadata: metadata?,
        })
    }
}

impl Question {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Question> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let id = req_string(value, "id", path, sink, 1, None);
        let kind = req_string(value, "type", path, sink, 1, None);
        let scenario = opt_string(value, "scenario", path, sink, 1, None);
        let question = req_string(value, "question", path, sink, 1, None);
        let points = req_u32(value, "points", path, sink, 1, None);

        let options_path = fields::join(path, "options");
        let options = req_seq(value, "options", path, sink, 1, None)
            .and_then(|seq| fields::items(seq, &options_path, sink, AnswerOption::check));

        Some(Question {
            id: id?,
            kind: kind?,
            scenario: scenario?,
            question: question?,
            points: points?,
            options: options?,
        })
    }
}

impl AnswerOption {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<AnswerOption> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let id = req_string(value, "id", path, sink, 1, None);
        let text = req_string(value, "text", path, sink, 1, None);
        let is_correct = req_bool(value, "isCorrect", path, sink);
        let explanation = req_string(value, "explanation", path, sink, 1, None);
        Some(AnswerOption {
            id: id?,
            text: text?,
            is_correct: is_correct?,
            explanation: explanation?,
        })
    }
}

impl AssessmentMeta {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<AssessmentMeta> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let difficulty = opt_string(value, "difficulty", path, sink, 1, None);
        let estimated_time = opt_u32(value, "estimatedTime", path, sink, 1, None);
        let topics = opt_str_seq(value, "topics", path, sink, 1);
        let passing_criteria = match fields::optional(value, "passingCriteria") {
            Some(v) => {
                PassingCriteria::check(v, &fields::join(path, "passingCriteria"), sink).map(Some)
            }
            None => Some(None),
        };
        let learning_outcomes = opt_str_seq(value, "learningOutcomes", path, sink, 1);
        Some(AssessmentMeta {
            difficulty: difficulty?,
            estimated_time: estimated_time?,
            topics: topics?.unwrap_or_default(),
            passing_criteria: passing_criteria?,
            learning_outcomes: learning_outcomes?.unwrap_or_default(),
        })
    }
}

impl PassingCriteria {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<PassingCriteria> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let minimum_score = req_u32(value, "minimumScore", path, sink, 0, Some(100));
        let required_questions = opt_str_seq(value, "requiredQuestions", path, sink, 1);
        Some(PassingCriteria {
            minimum_score: minimum_score?,
            required_questions: required_questions?.unwrap_or_default(),
        })
    }
}
