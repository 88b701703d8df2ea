//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary
//! display for every entity (module, lesson, scenario, prompt) is its
//! semantic identity, title and positional index, with filesystem
//! paths shown as secondary context via indented `Source:` lines.
//! That keeps the output readable as a curriculum inventory while
//! still letting authors trace results back to specific files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! 001 Incident Basics
//!     Source: modules/incident-basics.yaml
//!     warning: unknown prerequisite "observability-basics"
//!     lesson declare: ok
//!     scenario paging-storm: 1 error
//!         error: Scenario must have at least one optimal choice
//!     assessment incident-basics-final: ok
//!
//! ==================================================
//! Total: 1 files
//! Valid: 0
//! Invalid: 1
//! Warnings: 1
//! ==================================================
//! ```
//!
//! ## Show
//!
//! ```text
//! 001 Incident Basics (2 lessons)
//!     Source: modules/incident-basics.yaml
//!     Track: practitioner
//!     Running the first hour of a production incident without...
//!     Lessons
//!         001 Declaring the incident (25 min)
//!             Source: lessons/declare.md
//!     Assessment
//!         Incident basics assessment (passing 80%)
//!             Source: assessments/incident-basics.yaml
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::check::{CheckReport, Inventory};
use crate::prompts::PromptRegistry;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        format!("{}...", &text[..max])
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// One-word health label, or a problem count like `1 error, 2 warnings`.
fn status_label(errors: usize, warnings: usize) -> String {
    if errors == 0 && warnings == 0 {
        return "ok".to_string();
    }
    let mut parts = Vec::new();
    if errors > 0 {
        parts.push(plural(errors, "error"));
    }
    if warnings > 0 {
        parts.push(plural(warnings, "warning"));
    }
    parts.join(", ")
}

// ============================================================================
// Check output
// ============================================================================

/// Format a content check report: one block per module file, followed
/// by orphans and a summary.
pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();

    if report.modules.is_empty() {
        lines.push("No module files found".to_string());
    }

    for (i, module) in report.modules.iter().enumerate() {
        match &module.title {
            Some(title) => {
                lines.push(format!("{} {}", format_index(i + 1), title));
                lines.push(format!("    Source: {}", module.file));
            }
            None => lines.push(format!("{} ({})", format_index(i + 1), module.file)),
        }
        for error in &module.errors {
            lines.push(format!("    error: {error}"));
        }
        for warning in &module.warnings {
            lines.push(format!("    warning: {warning}"));
        }
        for item in &module.items {
            lines.push(format!(
                "    {} {}: {}",
                item.kind,
                item.id,
                status_label(item.errors.len(), item.warnings.len())
            ));
            for error in &item.errors {
                lines.push(format!("        error: {error}"));
            }
            for warning in &item.warnings {
                lines.push(format!("        warning: {warning}"));
            }
        }
    }

    if !report.orphans.is_empty() {
        lines.push(String::new());
        lines.push("Orphans".to_string());
        for orphan in &report.orphans {
            lines.push(format!("    {orphan}"));
        }
    }

    lines.push(String::new());
    lines.push("=".repeat(50));
    lines.push(format!("Total: {} files", report.files_checked()));
    lines.push(format!("Valid: {}", report.valid_count()));
    lines.push(format!("Invalid: {}", report.files_checked() - report.valid_count()));
    lines.push(format!("Warnings: {}", report.warning_count()));
    lines.push("=".repeat(50));

    lines
}

/// Print check output to stdout.
pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Show output
// ============================================================================

/// Format the content inventory.
///
/// Lesson display names prefer the first markdown heading of the
/// lesson file; the module-declared title is the fallback.
pub fn format_inventory(inventory: &Inventory) -> Vec<String> {
    let mut lines = Vec::new();

    if inventory.modules.is_empty() && inventory.skipped.is_empty() {
        lines.push("No module files found".to_string());
        return lines;
    }

    for (i, entry) in inventory.modules.iter().enumerate() {
        let module = &entry.module;
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            module.title,
            plural(module.lessons.len(), "lesson")
        ));
        lines.push(format!("    Source: {}", entry.file));
        lines.push(format!("    Track: {}", module.track));
        let description = truncate_desc(module.description.trim(), 60);
        if !description.is_empty() {
            lines.push(format!("    {description}"));
        }

        lines.push("    Lessons".to_string());
        for (j, lesson) in module.lessons.iter().enumerate() {
            let heading = entry.lesson_headings.get(j).and_then(|h| h.as_deref());
            let display = heading.unwrap_or(&lesson.title);
            lines.push(format!(
                "        {} {} ({} min)",
                format_index(j + 1),
                display,
                lesson.duration
            ));
            lines.push(format!("            Source: {}", lesson.path));
        }

        if !module.scenarios.is_empty() {
            lines.push("    Scenarios".to_string());
            for (j, scenario) in module.scenarios.iter().enumerate() {
                lines.push(format!(
                    "        {} {} ({}, {} min)",
                    format_index(j + 1),
                    scenario.title,
                    scenario.kind,
                    scenario.estimated_time
                ));
                lines.push(format!("            Source: {}", scenario.path));
            }
        }

        if !module.infographics.is_empty() {
            lines.push("    Infographics".to_string());
            for (j, infographic) in module.infographics.iter().enumerate() {
                lines.push(format!(
                    "        {} {}",
                    format_index(j + 1),
                    infographic.title
                ));
                lines.push(format!("            Source: {}", infographic.path));
            }
        }

        lines.push("    Assessment".to_string());
        lines.push(format!(
            "        {} (passing {}%)",
            module.assessment.title, module.assessment.passing_score
        ));
        lines.push(format!("            Source: {}", module.assessment.path));
    }

    if !inventory.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for file in &inventory.skipped {
            lines.push(format!("    {file} (failed validation)"));
        }
    }

    lines
}

/// Print show output to stdout.
pub fn print_inventory(inventory: &Inventory) {
    for line in format_inventory(inventory) {
        println!("{}", line);
    }
}

// ============================================================================
// Prompts output
// ============================================================================

/// Format the prompt registry audit listing.
pub fn format_prompts(registry: &PromptRegistry) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, prompt) in registry.list().iter().enumerate() {
        lines.push(format!("{} {} v{}", format_index(i + 1), prompt.id, prompt.version));
        lines.push(format!("    Purpose: {}", prompt.purpose));
        lines.push(format!("    Variables: {}", prompt.variables.join(", ")));
        lines.push(format!("    Approved: {} ({})", prompt.approved_by, prompt.approved_at));
    }
    if lines.is_empty() {
        lines.push("No prompts registered".to_string());
    }
    lines
}

/// Print the prompt registry to stdout.
pub fn print_prompts(registry: &PromptRegistry) {
    for line in format_prompts(registry) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
