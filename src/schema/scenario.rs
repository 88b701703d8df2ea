//! Scenario schema: branching decision exercises.
//!
//! A scenario drops the learner into a narrative situation, offers two
//! to five choices, and scores the decision against a single intended
//! optimal path. Structure is enforced here; the semantic rules that
//! sit on top (exactly one optimal choice, plausible MTTR deltas, no
//! placeholder data) live in [`crate::quality`] because they produce
//! warnings as well as errors.

use crate::schema::fields::{
    self, Token, bool_or, opt_string, opt_token, record, req_seq, req_string, req_token,
    req_token_seq,
};
use crate::schema::{Violation, Violations};
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

/// A validated branching scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ScenarioKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Narrative setup. Long enough to actually set a scene.
    pub context: String,
    pub challenge: String,
    /// Two to five choices; exactly one should be optimal.
    pub choices: Vec<Choice>,
    /// Shown after the decision, regardless of the choice made.
    pub corrective_insight: String,
    /// Operational-loop stages this scenario exercises.
    pub pillars: Vec<Pillar>,
    /// Reflection prompt shown after the corrective insight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_world_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ScenarioMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    IncidentResponse,
    CapacityPlanning,
    ChangeManagement,
    SecurityEvent,
    PerformanceDegradation,
    StrategicPlanning,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::IncidentResponse => "incident-response",
            ScenarioKind::CapacityPlanning => "capacity-planning",
            ScenarioKind::ChangeManagement => "change-management",
            ScenarioKind::SecurityEvent => "security-event",
            ScenarioKind::PerformanceDegradation => "performance-degradation",
            ScenarioKind::StrategicPlanning => "strategic-planning",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token for ScenarioKind {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("incident-response", ScenarioKind::IncidentResponse),
        ("capacity-planning", ScenarioKind::CapacityPlanning),
        ("change-management", ScenarioKind::ChangeManagement),
        ("security-event", ScenarioKind::SecurityEvent),
        ("performance-degradation", ScenarioKind::PerformanceDegradation),
        ("strategic-planning", ScenarioKind::StrategicPlanning),
    ];
}

/// The six stages of the operational loop a scenario can exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Sense,
    Understand,
    Decide,
    Act,
    Verify,
    Learn,
}

impl Pillar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::Sense => "sense",
            Pillar::Understand => "understand",
            Pillar::Decide => "decide",
            Pillar::Act => "act",
            Pillar::Verify => "verify",
            Pillar::Learn => "learn",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token for Pillar {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("sense", Pillar::Sense),
        ("understand", Pillar::Understand),
        ("decide", Pillar::Decide),
        ("act", Pillar::Act),
        ("verify", Pillar::Verify),
        ("learn", Pillar::Learn),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token for RiskLevel {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("high", RiskLevel::High),
        ("medium", RiskLevel::Medium),
        ("low", RiskLevel::Low),
    ];
}

/// One decision branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub action: String,
    pub description: String,
    /// What actually happens if this branch is taken.
    pub consequence: String,
    pub impact: Impact,
    /// Defaults to false; the scenario-level optimal-count rule is
    /// checked in `quality`, not here.
    pub is_optimal: bool,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Operational impact of a choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    /// MTTR delta as a signed percentage string, `+30%` or `-15%`.
    pub mttr: String,
    pub risk: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blast_radius: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_morale: Option<String>,
}

/// Free-form provenance for a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on_incident: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_at_risk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
}

/// True for strings matching `[+-]<digits>%`, the MTTR delta shape.
pub(crate) fn is_signed_percent(s: &str) -> bool {
    let Some(rest) = s.strip_prefix(['+', '-']) else {
        return false;
    };
    let Some(digits) = rest.strip_suffix('%') else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Magnitude of a well-formed signed percentage. `"-240%"` gives 240.
pub(crate) fn signed_percent_magnitude(s: &str) -> Option<u64> {
    let rest = s.strip_prefix(['+', '-'])?;
    rest.strip_suffix('%')?.parse().ok()
}

impl Scenario {
    /// Validate an untyped document into a `Scenario`, reporting every
    /// violated constraint on failure.
    pub fn parse(value: &Value) -> Result<Scenario, Violations> {
        fields::parse_entity(value, Scenario::check)
    }

    /// How many choices are flagged optimal.
    pub fn optimal_count(&self) -> usize {
        self.choices.iter().filter(|c| c.is_optimal).count()
    }

    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Scenario> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }

        let id = req_string(value, "id", path, sink, 1, None);
        let kind = req_token::<ScenarioKind>(value, "type", path, sink);
        let title = opt_string(value, "title", path, sink, 1, None);
        let context = req_string(value, "context", path, sink, 50, None);
        let challenge = req_string(value, "challenge", path, sink, 50, None);

        let choices_path = fields::join(path, "choices");
        let choices = req_seq(value, "choices", path, sink, 2, Some(5))
            .and_then(|seq| fields::items(seq, &choices_path, sink, Choice::check));

        let corrective_insight = req_string(value, "correctiveInsight", path, sink, 50, None);
        let pillars = req_token_seq::<Pillar>(value, "pillars", path, sink, 1);
        let contemplate = opt_string(value, "contemplate", path, sink, 1, None);
        let real_world_reference = opt_string(value, "realWorldReference", path, sink, 1, None);

        let metadata = match fields::optional(value, "metadata") {
            Some(v) => ScenarioMeta::check(v, &fields::join(path, "metadata"), sink).map(Some),
            None => Some(None),
        };

        Some(Scenario {
            id: id?,
            kind: kind?,
            title: title?,
            context: context?,
            challenge: challenge?,
            choices: choices?,
            corrective_insight: corrective_insight?,
            pillars: pillars?,
            contemplate: contemplate?,
            real_world_reference: real_world_reference?,
            metadata: metadata?,
        })
    }
}

impl Choice {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Choice> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let id = req_string(value, "id", path, sink, 1, None);
        let action = req_string(value, "action", path, sink, 10, None);
        let description = req_string(value, "description", path, sink, 10, None);
        let consequence = req_string(value, "consequence", path, sink, 10, None);
        let impact_path = fields::join(path, "impact");
        let impact = fields::require(value, "impact", path, sink)
            .and_then(|v| Impact::check(v, &impact_path, sink));
        let is_optimal = bool_or(value, "isOptimal", path, sink, false);
        let reasoning = req_string(value, "reasoning", path, sink, 10, None);
        let label = opt_string(value, "label", path, sink, 1, None);
        Some(Choice {
            id: id?,
            action: action?,
            description: description?,
            consequence: consequence?,
            impact: impact?,
            is_optimal: is_optimal?,
            reasoning: reasoning?,
            label: label?,
        })
    }
}

impl Impact {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<Impact> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let mttr = req_string(value, "mttr", path, sink, 1, None);
        if let Some(mttr) = &mttr
            && !is_signed_percent(mttr)
        {
            record(
                sink,
                &fields::join(path, "mttr"),
                "must be a signed percentage such as \"+30%\"",
            );
        }
        let risk = req_token::<RiskLevel>(value, "risk", path, sink);
        let blast_radius = opt_token::<RiskLevel>(value, "blastRadius", path, sink);
        let sla_impact = opt_string(value, "slaImpact", path, sink, 1, None);
        let revenue_impact = opt_string(value, "revenueImpact", path, sink, 1, None);
        let team_morale = opt_string(value, "teamMorale", path, sink, 1, None);
        Some(Impact {
            mttr: mttr?,
            risk: risk?,
            blast_radius: blast_radius?,
            sla_impact: sla_impact?,
            revenue_impact: revenue_impact?,
            team_morale: team_morale?,
        })
    }
}

impl ScenarioMeta {
    fn check(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<ScenarioMeta> {
        if !value.is_mapping() {
            record(sink, path, "must be a mapping");
            return None;
        }
        let based_on_incident = opt_string(value, "basedOnIncident", path, sink, 1, None);
        let revenue_at_risk = opt_string(value, "revenueAtRisk", path, sink, 1, None);
        let complexity = opt_string(value, "complexity", path, sink, 1, None);
        Some(ScenarioMeta {
            based_on_incident: based_on_incident?,
            revenue_at_risk: revenue_at_risk?,
            complexity: complexity?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    const FULL: &str = r#"
id: db-failover
type: incident-response
title: Primary database failover
context: >-
  The primary database in the payments cluster stopped accepting writes
  four minutes ago. Replication lag on the standby was eleven seconds at
  the time of the fault, and the on-call engineer has the failover
  runbook open.
challenge: >-
  Decide whether to fail over to the standby immediately or hold while
  the database team investigates the write stall on the primary.
choices:
  - id: failover-now
    action: Promote the standby immediately
    description: Execute the failover runbook without waiting for a root cause.
    consequence: Writes resume within two minutes; the eleven seconds of lag become lost transactions that need replay.
    impact:
      mttr: "-40%"
      risk: medium
      blastRadius: medium
      slaImpact: Credits avoided for the payments SLA
      revenueImpact: Checkout restored quickly
    isOptimal: true
    reasoning: With a write outage confirmed and a tested runbook, waiting adds outage minutes without adding information.
  - id: wait-for-diagnosis
    action: Hold and diagnose the primary
    description: Keep the primary in place while the database team inspects the write stall.
    consequence: The stall turns out to be a full disk; resolution takes forty more minutes of checkout downtime.
    impact:
      mttr: "+120%"
      risk: high
      teamMorale: On-call fatigue from the extended incident
    reasoning: Diagnosis first feels safer but trades certain downtime against an already-rehearsed recovery path.
correctiveInsight: >-
  When a tested failover path exists and the failure mode is confirmed,
  promoting the standby first and diagnosing offline is almost always
  the faster way back to a healthy service.
pillars: [decide, act, verify]
contemplate: What signal would have justified holding the failover?
realWorldReference: Postmortem write-ups from large payment-platform outages
metadata:
  basedOnIncident: payments-2025-11
  revenueAtRisk: $18k per minute
  complexity: moderate
"#;

    // =========================================================================
    // Acceptance
    // =========================================================================

    #[test]
    fn full_scenario_parses() {
        let scenario = Scenario::parse(&parse(FULL)).unwrap();
        assert_eq!(scenario.id, "db-failover");
        assert_eq!(scenario.kind, ScenarioKind::IncidentResponse);
        assert_eq!(scenario.choices.len(), 2);
        assert!(scenario.choices[0].is_optimal);
        assert!(!scenario.choices[1].is_optimal);
        assert_eq!(scenario.choices[0].impact.mttr, "-40%");
        assert_eq!(scenario.choices[0].impact.blast_radius, Some(RiskLevel::Medium));
        assert_eq!(scenario.choices[1].impact.risk, RiskLevel::High);
        assert!(scenario.choices[1].impact.blast_radius.is_none());
        assert_eq!(
            scenario.pillars,
            vec![Pillar::Decide, Pillar::Act, Pillar::Verify]
        );
        assert_eq!(scenario.optimal_count(), 1);
        let meta = scenario.metadata.unwrap();
        assert_eq!(meta.complexity.as_deref(), Some("moderate"));
    }

    #[test]
    fn is_optimal_defaults_to_false() {
        let scenario = Scenario::parse(&parse(FULL)).unwrap();
        // Second choice omits isOptimal entirely.
        assert!(!scenario.choices[1].is_optimal);
    }

    // =========================================================================
    // Structural violations
    // =========================================================================

    #[test]
    fn single_choice_is_too_few() {
        let yaml = FULL.replace(
            r#"  - id: wait-for-diagnosis
    action: Hold and diagnose the primary
    description: Keep the primary in place while the database team inspects the write stall.
    consequence: The stall turns out to be a full disk; resolution takes forty more minutes of checkout downtime.
    impact:
      mttr: "+120%"
      risk: high
      teamMorale: On-call fatigue from the extended incident
    reasoning: Diagnosis first feels safer but trades certain downtime against an already-rehearsed recovery path.
"#,
            "",
        );
        let violations = Scenario::parse(&parse(&yaml)).unwrap_err();
        assert_eq!(violations.paths(), vec!["choices"]);
        assert_eq!(violations.0[0].message, "must have at least 2 items");
    }

    #[test]
    fn choice_violations_carry_indexed_paths() {
        let yaml = FULL
            .replace("mttr: \"+120%\"", "mttr: \"120%\"")
            .replace("risk: high", "risk: extreme");
        let violations = Scenario::parse(&parse(&yaml)).unwrap_err();
        assert_eq!(
            violations.paths(),
            vec!["choices.1.impact.mttr", "choices.1.impact.risk"]
        );
        assert_eq!(
            violations.0[0].message,
            "must be a signed percentage such as \"+30%\""
        );
        assert_eq!(violations.0[1].message, "must be one of: high, medium, low");
    }

    #[test]
    fn scenario_kind_vocabulary_enforced() {
        let yaml = FULL.replace("type: incident-response", "type: trivia-night");
        let violations = Scenario::parse(&parse(&yaml)).unwrap_err();
        assert_eq!(violations.paths(), vec!["type"]);
        assert!(violations.0[0].message.contains("incident-response"));
        assert!(violations.0[0].message.contains("strategic-planning"));
    }

    #[test]
    fn pillar_vocabulary_enforced() {
        let yaml = FULL.replace("pillars: [decide, act, verify]", "pillars: [decide, panic]");
        let violations = Scenario::parse(&parse(&yaml)).unwrap_err();
        assert_eq!(violations.paths(), vec!["pillars.1"]);
    }

    #[test]
    fn pillars_must_not_be_empty() {
        let yaml = FULL.replace("pillars: [decide, act, verify]", "pillars: []");
        let violations = Scenario::parse(&parse(&yaml)).unwrap_err();
        assert_eq!(violations.paths(), vec!["pillars"]);
        assert_eq!(violations.0[0].message, "must not be empty");
    }

    #[test]
    fn short_choice_texts_rejected() {
        let yaml = FULL.replace(
            "action: Hold and diagnose the primary",
            "action: Wait",
        );
        let violations = Scenario::parse(&parse(&yaml)).unwrap_err();
        assert_eq!(violations.paths(), vec!["choices.1.action"]);
        assert_eq!(violations.0[0].message, "must be at least 10 characters");
    }

    #[test]
    fn missing_impact_reported_once() {
        let yaml = r#"
id: s1
type: incident-response
context: A context string that is definitely long enough to pass validation.
challenge: A challenge string that is definitely long enough to pass validation.
choices:
  - id: a
    action: Do the first thing carefully
    description: A description of the first thing
    consequence: The consequence of the first thing
    reasoning: The reasoning behind the first thing
  - id: b
    action: Do the second thing carefully
    description: A description of the second thing
    consequence: The consequence of the second thing
    impact:
      mttr: "+10%"
      risk: low
    reasoning: The reasoning behind the second thing
correctiveInsight: An insight string that is definitely long enough to pass validation.
pillars: [sense]
"#;
        let violations = Scenario::parse(&parse(yaml)).unwrap_err();
        assert_eq!(violations.paths(), vec!["choices.0.impact"]);
        assert_eq!(violations.0[0].message, "is required");
    }

    // =========================================================================
    // Signed percentages
    // =========================================================================

    #[test]
    fn signed_percent_shapes() {
        assert!(is_signed_percent("+30%"));
        assert!(is_signed_percent("-15%"));
        assert!(is_signed_percent("+240%"));
        assert!(!is_signed_percent("30%"));
        assert!(!is_signed_percent("+30"));
        assert!(!is_signed_percent("+%"));
        assert!(!is_signed_percent("+3a%"));
        assert!(!is_signed_percent("fast"));
        assert!(!is_signed_percent(""));
    }

    #[test]
    fn signed_percent_magnitude_strips_sign() {
        assert_eq!(signed_percent_magnitude("-240%"), Some(240));
        assert_eq!(signed_percent_magnitude("+5%"), Some(5));
        assert_eq!(signed_percent_magnitude("oops"), None);
    }

    // =========================================================================
    // Serialization fidelity
    // =========================================================================

    #[test]
    fn serialized_keys_match_content_format() {
        let scenario = Scenario::parse(&parse(FULL)).unwrap();
        let yaml = serde_yaml::to_string(&scenario).unwrap();
        assert!(yaml.contains("type: incident-response"));
        assert!(yaml.contains("correctiveInsight:"));
        assert!(yaml.contains("isOptimal:"));
        assert!(yaml.contains("blastRadius: medium"));
        assert!(yaml.contains("realWorldReference:"));
        assert!(!yaml.contains("corrective_insight"));
    }
}
