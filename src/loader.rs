//! Content loading: logical identifiers to validated entities.
//!
//! All curriculum content lives under one content root:
//!
//! ```text
//! content/                         # Content root
//! ├── academy.toml                 # Site configuration (optional)
//! ├── modules/
//! │   ├── incident-basics.yaml     # One module definition per file
//! │   └── capacity-planning.yaml
//! ├── lessons/
//! │   └── incident-basics/
//! │       └── intro.md             # Raw markdown, rendered elsewhere
//! ├── scenarios/
//! │   └── db-failover.yaml
//! ├── assessments/
//! │   └── incident-basics.yaml
//! └── infographics/
//!     └── triage-flow.svg          # Raw SVG, embedded as-is
//! ```
//!
//! Modules are addressed by id (`modules/<id>.yaml`). Everything else is
//! addressed by the relative path a module declares for it, so the module
//! file is the single place that wires a unit together.
//!
//! Structured files (modules, scenarios, assessments) are parsed and run
//! through their schema validator before being returned; a file that does
//! not validate is unusable and the error carries the full violation
//! list. Lessons and infographics are returned as raw text.
//!
//! There is no caching. Content is small and read rarely, so every call
//! re-reads from disk and picks up edits immediately.

use crate::config::AcademyConfig;
use crate::schema::{Assessment, Module, Scenario, Violations};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Content not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Schema violations in {path}: {violations}")]
    Schema {
        path: PathBuf,
        violations: Violations,
    },
}

/// Read access to one content root.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> ContentStore {
        ContentStore { root: root.into() }
    }

    pub fn from_config(config: &AcademyConfig) -> ContentStore {
        ContentStore::new(&config.content_root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load and validate the module definition for `id`.
    pub fn load_module(&self, id: &str) -> Result<Module, LoadError> {
        let path = self.root.join("modules").join(format!("{id}.yaml"));
        self.load_entity(path, Module::parse)
    }

    /// Load and validate a scenario at a module-declared relative path.
    pub fn load_scenario(&self, path: &str) -> Result<Scenario, LoadError> {
        self.load_entity(self.root.join(path), Scenario::parse)
    }

    /// Load and validate an assessment at a module-declared relative path.
    pub fn load_assessment(&self, path: &str) -> Result<Assessment, LoadError> {
        self.load_entity(self.root.join(path), Assessment::parse)
    }

    /// Raw markdown for a lesson. No parsing; rendering happens upstream.
    pub fn load_lesson(&self, path: &str) -> Result<String, LoadError> {
        self.read_file(&self.root.join(path))
    }

    /// Raw SVG text for an infographic.
    pub fn load_infographic(&self, path: &str) -> Result<String, LoadError> {
        self.read_file(&self.root.join(path))
    }

    /// Ids of every module definition under `modules/`, sorted.
    ///
    /// A missing `modules/` directory is an empty curriculum, not an
    /// error.
    pub fn list_modules(&self) -> Result<Vec<String>, LoadError> {
        let dir = self.root.join("modules");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .map(|e| e.eq_ignore_ascii_case("yaml"))
                        .unwrap_or(false)
            })
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();

        ids.sort();
        Ok(ids)
    }

    fn read_file(&self, path: &Path) -> Result<String, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn load_entity<T>(
        &self,
        path: PathBuf,
        parse: impl FnOnce(&Value) -> Result<T, Violations>,
    ) -> Result<T, LoadError> {
        tracing::debug!(path = %path.display(), "loading content file");
        let text = self.read_file(&path)?;
        let value: Value = serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
            path: path.clone(),
            source,
        })?;
        parse(&value).map_err(|violations| LoadError::Schema { path, violations })
    }
}
