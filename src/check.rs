//! Deep curriculum validation.
//!
//! The engine behind the `check` command. Module files are the entry
//! points: every file under `modules/` is schema-validated, and each
//! valid module's declared references are followed and checked in
//! turn.
//!
//! ```text
//! modules/*.yaml               schema
//! ├── lessons/*.md             exists + word bounds + slop scan
//! ├── scenarios/*.yaml         schema + decision semantics
//! ├── infographics/*.svg       exists + SVG safety gate
//! └── assessments/*.yaml       schema + declaration cross-checks
//! ```
//!
//! ## Severity contract
//!
//! Errors fail the check: missing files, schema violations, scenario
//! semantic errors, SVG safety violations, lesson word bounds.
//! Warnings are advisory: SVG style, multiple-optimal scenarios,
//! cross-reference mismatches, dangling prerequisites, and orphaned
//! content files. The orphan sweep only runs when every module file
//! parsed, since an unparsed module hides what it references.

use crate::config::AcademyConfig;
use crate::loader::{ContentStore, LoadError};
use crate::quality::{self, TextRules};
use crate::schema::Module;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Content directories swept for orphaned files.
const CONTENT_DIRS: [&str; 4] = ["assessments", "infographics", "lessons", "scenarios"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Lesson,
    Scenario,
    Infographic,
    Assessment,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Lesson => "lesson",
            ItemKind::Scenario => "scenario",
            ItemKind::Infographic => "infographic",
            ItemKind::Assessment => "assessment",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check result for one referenced content file.
#[derive(Debug, Clone)]
pub struct ItemCheck {
    pub kind: ItemKind,
    pub id: String,
    pub path: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ItemCheck {
    fn new(kind: ItemKind, id: &str, path: &str) -> ItemCheck {
        ItemCheck {
            kind,
            id: id.to_string(),
            path: path.to_string(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check result for one module file, including everything it
/// references. Items appear in declaration order: lessons, scenarios,
/// infographics, then the assessment.
#[derive(Debug, Clone)]
pub struct ModuleCheck {
    /// Content-root-relative file name, e.g. `modules/incident-basics.yaml`.
    pub file: String,
    /// Present when the module itself passed schema validation.
    pub title: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub items: Vec<ItemCheck>,
}

impl ModuleCheck {
    fn failed(file: String, errors: Vec<String>) -> ModuleCheck {
        ModuleCheck {
            file,
            title: None,
            errors,
            warnings: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.items.iter().all(ItemCheck::is_valid)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len() + self.items.iter().map(|i| i.errors.len()).sum::<usize>()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len() + self.items.iter().map(|i| i.warnings.len()).sum::<usize>()
    }
}

/// Full result of a content check run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub modules: Vec<ModuleCheck>,
    /// Content files no valid module references.
    pub orphans: Vec<String>,
}

impl CheckReport {
    pub fn files_checked(&self) -> usize {
        self.modules.len()
    }

    pub fn valid_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_valid()).count()
    }

    pub fn error_count(&self) -> usize {
        self.modules.iter().map(ModuleCheck::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.modules.iter().map(ModuleCheck::warning_count).sum::<usize>() + self.orphans.len()
    }

    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }
}

/// Validate the whole content root.
///
/// Per-file problems land in the report; only environment failures
/// (an unreadable directory) surface as `Err`.
pub fn check_content(
    store: &ContentStore,
    config: &AcademyConfig,
) -> Result<CheckReport, LoadError> {
    let ids = store.list_modules()?;
    tracing::debug!(modules = ids.len(), root = %store.root().display(), "checking content root");

    let mut modules: Vec<ModuleCheck> = Vec::new();
    let mut loaded: Vec<(usize, Module)> = Vec::new();

    for id in &ids {
        let file = format!("modules/{id}.yaml");
        match store.load_module(id) {
            Ok(module) => {
                let mut check = ModuleCheck {
                    file,
                    title: Some(module.title.clone()),
                    errors: Vec::new(),
                    warnings: Vec::new(),
                    items: Vec::new(),
                };
                if module.id != *id {
                    check
                        .warnings
                        .push(format!("module id \"{}\" does not match file name \"{id}\"", module.id));
                }
                check_references(store, config, &module, &mut check);
                loaded.push((modules.len(), module));
                modules.push(check);
            }
            Err(LoadError::Schema { violations, .. }) => {
                modules.push(ModuleCheck::failed(
                    file,
                    violations.iter().map(ToString::to_string).collect(),
                ));
            }
            Err(LoadError::Yaml { source, .. }) => {
                modules.push(ModuleCheck::failed(file, vec![format!("malformed YAML: {source}")]));
            }
            Err(err) => return Err(err),
        }
    }

    // Prerequisite and next-module links resolve against file names,
    // which is how modules are loaded.
    let known: HashSet<&str> = ids.iter().map(String::as_str).collect();
    for (index, module) in &loaded {
        for prerequisite in &module.prerequisites {
            if !known.contains(prerequisite.as_str()) {
                modules[*index]
                    .warnings
                    .push(format!("unknown prerequisite \"{prerequisite}\""));
            }
        }
        if let Some(next) = &module.next_module
            && !known.contains(next.as_str())
        {
            modules[*index].warnings.push(format!("unknown next module \"{next}\""));
        }
    }

    let orphans = if loaded.len() == ids.len() {
        find_orphans(store.root(), loaded.iter().map(|(_, m)| m))?
    } else {
        Vec::new()
    };

    Ok(CheckReport { modules, orphans })
}

fn check_references(
    store: &ContentStore,
    config: &AcademyConfig,
    module: &Module,
    check: &mut ModuleCheck,
) {
    let lesson_rules = TextRules {
        min_words: Some(config.validation.lesson_min_words),
        max_words: Some(config.validation.lesson_max_words),
        ..TextRules::default()
    };

    for lesson in &module.lessons {
        let mut item = ItemCheck::new(ItemKind::Lesson, &lesson.id, &lesson.path);
        match store.load_lesson(&lesson.path) {
            Ok(markdown) => {
                let report = quality::validate_text(&markdown_plain_text(&markdown), &lesson_rules);
                item.errors.extend(report.errors);
                item.warnings.extend(report.warnings);
            }
            Err(LoadError::NotFound(_)) => item.errors.push("file not found".to_string()),
            Err(err) => item.errors.push(err.to_string()),
        }
        check.items.push(item);
    }

    for reference in &module.scenarios {
        let mut item = ItemCheck::new(ItemKind::Scenario, &reference.id, &reference.path);
        match store.load_scenario(&reference.path) {
            Ok(scenario) => {
                if scenario.id != reference.id {
                    item.warnings.push(format!(
                        "file declares id \"{}\", module references \"{}\"",
                        scenario.id, reference.id
                    ));
                }
                let report = quality::check_scenario(&scenario);
                item.errors.extend(report.errors);
                item.warnings.extend(report.warnings);
            }
            Err(LoadError::NotFound(_)) => item.errors.push("file not found".to_string()),
            Err(LoadError::Schema { violations, .. }) => {
                item.errors.extend(violations.iter().map(ToString::to_string));
            }
            Err(LoadError::Yaml { source, .. }) => {
                item.errors.push(format!("malformed YAML: {source}"));
            }
            Err(err) => item.errors.push(err.to_string()),
        }
        check.items.push(item);
    }

    for reference in &module.infographics {
        let mut item = ItemCheck::new(ItemKind::Infographic, &reference.id, &reference.path);
        match store.load_infographic(&reference.path) {
            Ok(svg) => {
                let report = quality::validate_svg(&svg);
                item.errors.extend(report.errors);
                item.warnings.extend(report.warnings);
            }
            Err(LoadError::NotFound(_)) => item.errors.push("file not found".to_string()),
            Err(err) => item.errors.push(err.to_string()),
        }
        check.items.push(item);
    }

    let reference = &module.assessment;
    let mut item = ItemCheck::new(ItemKind::Assessment, &reference.id, &reference.path);
    match store.load_assessment(&reference.path) {
        Ok(assessment) => {
            if assessment.id != reference.id {
                item.warnings.push(format!(
                    "file declares id \"{}\", module references \"{}\"",
                    assessment.id, reference.id
                ));
            }
            if assessment.module_id != module.id {
                item.warnings.push(format!(
                    "file belongs to module \"{}\", not \"{}\"",
                    assessment.module_id, module.id
                ));
            }
            if let Some(count) = reference.question_count
                && assessment.questions.len() != count as usize
            {
                item.warnings.push(format!(
                    "module declares {count} questions, file has {}",
                    assessment.questions.len()
                ));
            }
            if let Some(points) = reference.total_points
                && assessment.total_points() != points
            {
                item.warnings.push(format!(
                    "module declares {points} total points, file has {}",
                    assessment.total_points()
                ));
            }
        }
        Err(LoadError::NotFound(_)) => item.errors.push("file not found".to_string()),
        Err(LoadError::Schema { violations, .. }) => {
            item.errors.extend(violations.iter().map(ToString::to_string));
        }
        Err(LoadError::Yaml { source, .. }) => {
            item.errors.push(format!("malformed YAML: {source}"));
        }
        Err(err) => item.errors.push(err.to_string()),
    }
    check.items.push(item);
}

fn find_orphans<'a>(
    root: &Path,
    modules: impl Iterator<Item = &'a Module>,
) -> Result<Vec<String>, LoadError> {
    let mut referenced: HashSet<String> = HashSet::new();
    for module in modules {
        referenced.extend(module.lessons.iter().map(|l| l.path.clone()));
        referenced.extend(module.scenarios.iter().map(|s| s.path.clone()));
        referenced.extend(module.infographics.iter().map(|i| i.path.clone()));
        referenced.insert(module.assessment.path.clone());
    }

    let mut orphans = Vec::new();
    for dir in CONTENT_DIRS {
        let base = root.join(dir);
        if !base.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            if !referenced.contains(&relative) {
                orphans.push(relative);
            }
        }
    }
    Ok(orphans)
}

// ============================================================================
// Content inventory (for `show`)
// ============================================================================

/// Everything `show` displays about one module.
#[derive(Debug, Clone)]
pub struct InventoryModule {
    /// Content-root-relative file name.
    pub file: String,
    pub module: Module,
    /// First markdown heading of each lesson file, parallel to
    /// `module.lessons`. `None` when the file is missing or has no
    /// top-level heading.
    pub lesson_headings: Vec<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct Inventory {
    pub modules: Vec<InventoryModule>,
    /// Module files skipped because they failed to parse.
    pub skipped: Vec<String>,
}

/// Gather the content inventory without judging it. Invalid module
/// files are listed as skipped rather than failing the whole listing.
pub fn inventory(store: &ContentStore) -> Result<Inventory, LoadError> {
    let mut modules = Vec::new();
    let mut skipped = Vec::new();

    for id in store.list_modules()? {
        match store.load_module(&id) {
            Ok(module) => {
                let lesson_headings = module
                    .lessons
                    .iter()
                    .map(|lesson| {
                        store.load_lesson(&lesson.path).ok().and_then(|text| markdown_title(&text))
                    })
                    .collect();
                modules.push(InventoryModule {
                    file: format!("modules/{id}.yaml"),
                    module,
                    lesson_headings,
                });
            }
            Err(err @ LoadError::Io(_)) => return Err(err),
            Err(_) => skipped.push(format!("modules/{id}.yaml")),
        }
    }

    Ok(Inventory { modules, skipped })
}

// ============================================================================
// Markdown extraction
// ============================================================================

/// Visible text of a markdown document, for word counting.
fn markdown_plain_text(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(chunk) | Event::Code(chunk) => {
                text.push_str(&chunk);
                text.push(' ');
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Text of the first top-level heading, if the document has one.
fn markdown_title(markdown: &str) -> Option<String> {
    let mut in_title = false;
    let mut title = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level: HeadingLevel::H1, .. }) => in_title = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let trimmed = title.trim();
                return (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            Event::Text(chunk) | Event::Code(chunk) if in_title => title.push_str(&chunk),
            _ => {}
        }
    }
    None
}
