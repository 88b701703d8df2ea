//! Quality gates for generated and authored content.
//!
//! Three independent rule sets, one per content kind, each producing a
//! [`ValidationReport`]:
//!
//! | Kind       | Hard errors (block acceptance)           | Warnings (advisory) |
//! |------------|------------------------------------------|---------------------|
//! | `svg`      | open/close tags, script tags, external URLs | palette, oversized viewBox |
//! | `text`     | word-count bounds, slop phrases          | missing sources, no concrete data |
//! | `scenario` | schema violations, no optimal choice, placeholder data | several optimal choices, implausible MTTR |
//!
//! Reports are data, never errors: a failed check returns
//! `valid: false` with the reasons listed, and the calling pipeline
//! decides whether to retry generation, escalate, or reject. Only
//! `errors` block acceptance; `warnings` ship but should be looked at.
//!
//! [`validate_output`] is the single dispatch point for callers holding
//! an untyped output and a content-type tag. An unknown tag is itself a
//! failed validation, not a panic.

use crate::schema::Scenario;
use crate::schema::scenario::signed_percent_magnitude;
use serde_yaml::Value;

/// Phrases that mark text as generated filler. Case-insensitive
/// substring match. Callers can override the list per call.
pub const SLOP_PHRASES: &[&str] = &[
    "as an AI",
    "I cannot",
    "I apologize",
    "delve into",
    "it's important to note",
    "in summary",
    "in conclusion",
    "hope this helps",
];

/// Tokens that betray placeholder data in a scenario. Matched against
/// the lowercased JSON serialization of the whole document.
pub const PLACEHOLDER_TOKENS: &[&str] = &["lorem", "ipsum", "example.com", "test@test", "123-456"];

/// MTTR deltas with a magnitude above this percentage draw a warning.
pub const MTTR_SANITY_PERCENT: u64 = 1000;

/// Minimum words for prompt outputs of the explanation/summary families.
const PROMPT_MIN_WORDS: usize = 50;

const MAX_VIEWBOX_WIDTH: f64 = 800.0;
const MAX_VIEWBOX_HEIGHT: f64 = 600.0;

const DARK_BACKGROUNDS: &[&str] = &["#0B0F14", "#111827"];
const ACCENT_COLORS: &[&str] = &["#3B82F6", "#22D3EE"];

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True when `errors` is empty. Warnings never flip this.
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> ValidationReport {
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn failure(message: impl Into<String>) -> ValidationReport {
        ValidationReport::from_parts(vec![message.into()], Vec::new())
    }
}

// =============================================================================
// SVG rules
// =============================================================================

/// Check a generated SVG for structural safety and palette fit.
///
/// Script tags and external references are hard errors; everything
/// visual (palette, dimensions) only warns, since a stylistically-off
/// diagram is still usable.
pub fn validate_svg(svg: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !svg.trim_start().starts_with("<svg") {
        errors.push("Output must start with <svg> tag".to_string());
    }
    if !svg.contains("</svg>") {
        errors.push("SVG must be properly closed with </svg>".to_string());
    }
    if svg.contains("<script") {
        errors.push("SVG must not contain script tags (security violation)".to_string());
    }
    if svg.contains("xlink:href") && svg.contains("http") {
        errors.push("SVG must not reference external URLs (security violation)".to_string());
    }

    if !DARK_BACKGROUNDS.iter().any(|color| svg.contains(color)) {
        warnings.push("SVG should use dark mode background colors (#0B0F14 or #111827)".to_string());
    }
    if !ACCENT_COLORS.iter().any(|color| svg.contains(color)) {
        warnings.push("SVG should use accent colors (#3B82F6 or #22D3EE)".to_string());
    }

    if let Some((width, height)) = view_box_dimensions(svg)
        && (width > MAX_VIEWBOX_WIDTH || height > MAX_VIEWBOX_HEIGHT)
    {
        warnings.push(format!(
            "SVG dimensions ({width}x{height}) exceed recommended max ({MAX_VIEWBOX_WIDTH}x{MAX_VIEWBOX_HEIGHT})"
        ));
    }

    ValidationReport::from_parts(errors, warnings)
}

/// Width and height from the first `viewBox` attribute, if it holds
/// exactly four numbers. Accepts single or double quotes.
fn view_box_dimensions(svg: &str) -> Option<(f64, f64)> {
    let start = svg.find("viewBox=")? + "viewBox=".len();
    let rest = &svg[start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = &rest[1..];
    let end = inner.find(quote)?;
    let parts: Vec<f64> = inner[..end]
        .split_whitespace()
        .map(|p| p.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 4 {
        return None;
    }
    Some((parts[2], parts[3]))
}

// =============================================================================
// Text rules
// =============================================================================

/// Caller-supplied knobs for [`validate_text`].
#[derive(Debug, Clone, Default)]
pub struct TextRules {
    /// Error when the word count falls below this.
    pub min_words: Option<usize>,
    /// Error when the word count exceeds this.
    pub max_words: Option<usize>,
    /// Warn when no source or numbered reference is present.
    pub require_sources: bool,
    /// Replacement for [`SLOP_PHRASES`]. `None` uses the builtin list.
    pub forbidden_phrases: Option<Vec<String>>,
}

/// Check educational prose for length, slop phrases, and substance.
pub fn validate_text(content: &str, rules: &TextRules) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let words = content.split_whitespace().count();
    if let Some(min) = rules.min_words
        && words < min
    {
        errors.push(format!("Content too short ({words} words, minimum {min})"));
    }
    if let Some(max) = rules.max_words
        && words > max
    {
        errors.push(format!("Content too long ({words} words, maximum {max})"));
    }

    let lowered = content.to_lowercase();
    let phrases: Vec<&str> = match &rules.forbidden_phrases {
        Some(list) => list.iter().map(String::as_str).collect(),
        None => SLOP_PHRASES.to_vec(),
    };
    for phrase in phrases {
        if lowered.contains(&phrase.to_lowercase()) {
            errors.push(format!(
                "Content contains forbidden phrase: \"{phrase}\" (AI slop detected)"
            ));
        }
    }

    if rules.require_sources {
        let has_sources = content.contains("Source:")
            || content.contains("Reference:")
            || has_numbered_reference(content);
        if !has_sources {
            warnings.push("Content should include sources or references".to_string());
        }
    }

    let has_numbers = content.chars().any(|c| c.is_ascii_digit());
    let has_examples = content.contains("example") || content.contains("e.g.");
    if !has_numbers && !has_examples {
        warnings.push("Content should include specific examples or data points".to_string());
    }

    ValidationReport::from_parts(errors, warnings)
}

/// True when the text contains a `[n]`-style citation marker.
fn has_numbered_reference(content: &str) -> bool {
    let mut in_brackets = false;
    let mut digits = 0;
    for c in content.chars() {
        if c == '[' {
            in_brackets = true;
            digits = 0;
        } else if in_brackets {
            if c.is_ascii_digit() {
                digits += 1;
            } else {
                if c == ']' && digits > 0 {
                    return true;
                }
                in_brackets = false;
            }
        }
    }
    false
}

// =============================================================================
// Scenario rules
// =============================================================================

/// Semantic checks on an already-validated scenario.
///
/// The structural layer guarantees the shape; this layer judges the
/// content: decision design (one optimal path), plausible impact
/// numbers, and no placeholder data anywhere in the document.
pub fn check_scenario(scenario: &Scenario) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let optimal = scenario.optimal_count();
    if optimal == 0 {
        errors.push("Scenario must have at least one optimal choice".to_string());
    }
    if optimal > 1 {
        warnings.push(
            "Scenario has multiple optimal choices - ensure this is intentional".to_string(),
        );
    }

    for choice in &scenario.choices {
        if let Some(magnitude) = signed_percent_magnitude(&choice.impact.mttr)
            && magnitude > MTTR_SANITY_PERCENT
        {
            warnings.push(format!(
                "Unrealistic MTTR impact for choice {}: {}",
                choice.id, choice.impact.mttr
            ));
        }
    }

    let serialized = serde_json::to_string(scenario)
        .expect("scenario must serialize")
        .to_lowercase();
    for token in PLACEHOLDER_TOKENS {
        if serialized.contains(token) {
            errors.push(format!("Scenario contains placeholder data: \"{token}\""));
        }
    }

    ValidationReport::from_parts(errors, warnings)
}

/// Structural check first, semantic checks second.
///
/// A document that fails the schema reports its violations as errors
/// and skips the semantic pass; there is no scenario to judge.
pub fn validate_scenario(value: &Value) -> ValidationReport {
    match Scenario::parse(value) {
        Ok(scenario) => check_scenario(&scenario),
        Err(violations) => ValidationReport::from_parts(
            violations.iter().map(ToString::to_string).collect(),
            Vec::new(),
        ),
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Route an untyped output to the rule set named by `kind`.
///
/// `rules` only applies to `text`. An unrecognized kind returns a
/// failed report naming the kind.
pub fn validate_output(kind: &str, output: &Value, rules: &TextRules) -> ValidationReport {
    match kind {
        "svg" => match output.as_str() {
            Some(svg) => validate_svg(svg),
            None => ValidationReport::failure("Output must be a string"),
        },
        "text" => match output.as_str() {
            Some(text) => validate_text(text, rules),
            None => ValidationReport::failure("Output must be a string"),
        },
        "scenario" => validate_scenario(output),
        other => ValidationReport::failure(format!("Unknown validation type: {other}")),
    }
}

/// Family-specific checks for rendered prompt outputs.
///
/// Keyed off the prompt id: infographic prompts must return SVG,
/// explanation and summary prompts must reach a minimum length. Other
/// prompt families currently pass unchecked.
pub fn validate_prompt_output(prompt_id: &str, output: &str) -> ValidationReport {
    let mut errors = Vec::new();

    if prompt_id.starts_with("infographic-") {
        if !output.trim_start().starts_with("<svg") {
            errors.push("Output must be valid SVG XML".to_string());
        }
        if !output.contains("</svg>") {
            errors.push("SVG must be properly closed".to_string());
        }
    }

    if prompt_id.contains("explanation") || prompt_id.contains("summary") {
        let words = output.split_whitespace().count();
        if words < PROMPT_MIN_WORDS {
            errors.push(format!(
                "Output too short ({words} words, minimum {PROMPT_MIN_WORDS})"
            ));
        }
    }

    ValidationReport::from_parts(errors, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    const GOOD_SCENARIO: &str = r#"
id: cache-stampede
type: performance-degradation
context: A cache node restart has sent a thundering herd of requests straight at the primary datastore.
challenge: Decide how to shed the surge before the datastore saturates and takes checkout down with it.
choices:
  - id: enable-request-coalescing
    action: Turn on request coalescing
    description: Collapse identical in-flight lookups into a single upstream request.
    consequence: Load on the datastore drops sharply within a minute.
    impact:
      mttr: "-30%"
      risk: low
    isOptimal: true
    reasoning: Coalescing removes the duplicated work without rejecting real traffic.
  - id: throttle-everything
    action: Throttle all incoming traffic
    description: Apply a blanket rate limit at the edge until the cache warms.
    consequence: The datastore survives but real users are turned away for minutes.
    impact:
      mttr: "+60%"
      risk: medium
    reasoning: A blanket throttle protects the backend at a real revenue cost.
correctiveInsight: Shed duplicated load before shedding real load; coalescing buys headroom without turning users away.
pillars: [understand, act]
"#;

    // =========================================================================
    // SVG rules
    // =========================================================================

    #[test]
    fn clean_svg_passes_without_warnings() {
        let svg = r##"<svg viewBox="0 0 800 600"><rect fill="#0B0F14"/><path stroke="#3B82F6"/></svg>"##;
        let report = validate_svg(svg);
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn missing_open_tag_is_an_error() {
        let report = validate_svg("<div>not svg</div>");
        assert!(!report.valid);
        assert!(report.errors.contains(&"Output must start with <svg> tag".to_string()));
    }

    #[test]
    fn unclosed_svg_is_an_error() {
        let report = validate_svg("<svg><rect/>");
        assert!(!report.valid);
        assert!(
            report
                .errors
                .contains(&"SVG must be properly closed with </svg>".to_string())
        );
    }

    #[test]
    fn script_tag_always_fails() {
        let svg = r##"<svg fill="#0B0F14" stroke="#3B82F6"><script>alert(1)</script></svg>"##;
        let report = validate_svg(svg);
        assert!(!report.valid);
        assert!(
            report
                .errors
                .contains(&"SVG must not contain script tags (security violation)".to_string())
        );
    }

    #[test]
    fn external_reference_is_an_error() {
        let svg = r#"<svg><use xlink:href="https://evil.example/sprite.svg#x"/></svg>"#;
        let report = validate_svg(svg);
        assert!(
            report
                .errors
                .contains(&"SVG must not reference external URLs (security violation)".to_string())
        );
    }

    #[test]
    fn local_xlink_reference_is_fine() {
        let svg = r##"<svg fill="#111827" stroke="#22D3EE"><use xlink:href="#arrow"/></svg>"##;
        let report = validate_svg(svg);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn oversized_view_box_warns_but_passes() {
        let report = validate_svg("<svg viewBox='0 0 1000 900'><rect/></svg>");
        assert!(report.valid);
        assert!(report.warnings.len() >= 2);
        assert!(report.warnings.iter().any(|w| w.contains("1000x900")));
        assert!(report.warnings.iter().any(|w| w.contains("dark mode background")));
    }

    #[test]
    fn double_quoted_view_box_also_parsed() {
        let svg = r##"<svg viewBox="0 0 900 700" fill="#0B0F14" stroke="#3B82F6"></svg>"##;
        let report = validate_svg(svg);
        assert_eq!(
            report.warnings,
            vec!["SVG dimensions (900x700) exceed recommended max (800x600)"]
        );
    }

    #[test]
    fn malformed_view_box_is_ignored() {
        let svg = r##"<svg viewBox="0 0" fill="#0B0F14" stroke="#3B82F6"></svg>"##;
        let report = validate_svg(svg);
        assert!(report.warnings.is_empty());
    }

    // =========================================================================
    // Text rules
    // =========================================================================

    #[test]
    fn short_content_fails_with_count() {
        let rules = TextRules {
            min_words: Some(10),
            ..TextRules::default()
        };
        let report = validate_text("Too short.", &rules);
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Content too short (2 words, minimum 10)"]);
    }

    #[test]
    fn long_content_fails_with_count() {
        let rules = TextRules {
            max_words: Some(3),
            ..TextRules::default()
        };
        let report = validate_text("one two three four five", &rules);
        assert_eq!(report.errors, vec!["Content too long (5 words, maximum 3)"]);
    }

    #[test]
    fn forbidden_phrase_matched_case_insensitively() {
        let report = validate_text("AS AN AI assistant, 3 things matter.", &TextRules::default());
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["Content contains forbidden phrase: \"as an AI\" (AI slop detected)"]
        );
    }

    #[test]
    fn every_slop_phrase_is_reported() {
        let text = "In summary, let us delve into the 4 causes.";
        let report = validate_text(text, &TextRules::default());
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn custom_phrase_list_replaces_builtin() {
        let rules = TextRules {
            forbidden_phrases: Some(vec!["synergy".to_string()]),
            ..TextRules::default()
        };
        let report = validate_text("Let us delve into the 5 failure modes.", &rules);
        assert!(report.valid);
        let report = validate_text("Pure synergy, 10 times over.", &rules);
        assert!(!report.valid);
    }

    #[test]
    fn missing_sources_warns_when_required() {
        let rules = TextRules {
            require_sources: true,
            ..TextRules::default()
        };
        let report = validate_text("Measured MTTR fell by 40 percent.", &rules);
        assert_eq!(report.warnings, vec!["Content should include sources or references"]);
    }

    #[test]
    fn numbered_reference_counts_as_a_source() {
        let rules = TextRules {
            require_sources: true,
            ..TextRules::default()
        };
        let report = validate_text("Measured MTTR fell by 40 percent [1].", &rules);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn source_line_counts_as_a_source() {
        let rules = TextRules {
            require_sources: true,
            ..TextRules::default()
        };
        let report = validate_text("MTTR fell by 40 percent. Source: incident review.", &rules);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn vague_content_draws_a_substance_warning() {
        let report = validate_text("Things generally improved somewhat.", &TextRules::default());
        assert_eq!(
            report.warnings,
            vec!["Content should include specific examples or data points"]
        );
    }

    #[test]
    fn concrete_number_satisfies_substance_check() {
        let report = validate_text("Latency dropped 40 percent.", &TextRules::default());
        assert!(report.warnings.is_empty());
    }

    // =========================================================================
    // Scenario rules
    // =========================================================================

    #[test]
    fn well_formed_scenario_is_clean() {
        let report = validate_scenario(&parse(GOOD_SCENARIO));
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn zero_optimal_choices_is_exactly_one_error() {
        let yaml = GOOD_SCENARIO.replace("    isOptimal: true\n", "");
        let report = validate_scenario(&parse(&yaml));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Scenario must have at least one optimal choice"]);
    }

    #[test]
    fn multiple_optimal_choices_warn_but_pass() {
        let yaml = GOOD_SCENARIO.replace(
            "      risk: medium\n    reasoning: A blanket throttle",
            "      risk: medium\n    isOptimal: true\n    reasoning: A blanket throttle",
        );
        let report = validate_scenario(&parse(&yaml));
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec!["Scenario has multiple optimal choices - ensure this is intentional"]
        );
    }

    #[test]
    fn implausible_mttr_draws_a_warning() {
        let yaml = GOOD_SCENARIO.replace("mttr: \"+60%\"", "mttr: \"+2000%\"");
        let report = validate_scenario(&parse(&yaml));
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec!["Unrealistic MTTR impact for choice throttle-everything: +2000%"]
        );
    }

    #[test]
    fn placeholder_text_is_an_error() {
        let yaml = GOOD_SCENARIO.replace(
            "A cache node restart has sent a thundering herd of requests straight at the primary datastore.",
            "Lorem ipsum dolor sit amet, a cache node restart has flooded the primary datastore.",
        );
        let report = validate_scenario(&parse(&yaml));
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("\"lorem\"")));
        assert!(report.errors.iter().any(|e| e.contains("\"ipsum\"")));
    }

    #[test]
    fn structural_failure_reports_paths_and_skips_semantics() {
        let yaml = GOOD_SCENARIO.replace(
            "context: A cache node restart has sent a thundering herd of requests straight at the primary datastore.\n",
            "",
        );
        let report = validate_scenario(&parse(&yaml));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["context: is required"]);
        assert!(report.warnings.is_empty());
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    #[test]
    fn unknown_kind_is_a_failed_report() {
        let report = validate_output("video", &Value::Null, &TextRules::default());
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Unknown validation type: video"]);
    }

    #[test]
    fn dispatch_routes_each_kind() {
        let svg = Value::String("<svg fill=\"#0B0F14\" stroke=\"#22D3EE\"></svg>".to_string());
        assert!(validate_output("svg", &svg, &TextRules::default()).valid);

        let text = Value::String("Latency dropped 40 percent.".to_string());
        assert!(validate_output("text", &text, &TextRules::default()).valid);

        let scenario = parse(GOOD_SCENARIO);
        assert!(validate_output("scenario", &scenario, &TextRules::default()).valid);
    }

    #[test]
    fn non_string_output_for_svg_fails() {
        let report = validate_output("svg", &Value::Number(7.into()), &TextRules::default());
        assert_eq!(report.errors, vec!["Output must be a string"]);
    }

    // =========================================================================
    // Prompt output rules
    // =========================================================================

    #[test]
    fn infographic_output_must_be_svg() {
        let report = validate_prompt_output("infographic-causal-loop", "here is your diagram");
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["Output must be valid SVG XML", "SVG must be properly closed"]
        );
    }

    #[test]
    fn explanation_output_has_a_length_floor() {
        let report = validate_prompt_output("scenario-explanation", "too short");
        assert_eq!(report.errors, vec!["Output too short (2 words, minimum 50)"]);
    }

    #[test]
    fn unrecognized_prompt_family_passes_unchecked() {
        let report = validate_prompt_output("quiz-hinting", "anything at all");
        assert!(report.valid);
    }
}
