//! Shared test utilities for the ops-academy test suite.
//!
//! Provides fixture setup, lookup helpers, and catalog shape assertions
//! that work with check-phase data structures (`CheckReport`,
//! `Inventory`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let store = ContentStore::new(tmp.path());
//! let inventory = inventory(&store).unwrap();
//!
//! let module = find_module(&inventory, "Incident Basics");
//! assert_eq!(module.module.lessons.len(), 2);
//!
//! assert_catalog_shape(&inventory, &[
//!     ("Capacity Planning", &["forecasting", "headroom"]),
//!     ("Incident Basics", &["declare", "handoff"]),
//! ]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::check::{Inventory, InventoryModule, ModuleCheck};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Inventory lookups — panics with a clear message on miss
// =========================================================================

/// Find an inventory module by title. Panics if not found.
pub fn find_module<'a>(inventory: &'a Inventory, title: &str) -> &'a InventoryModule {
    inventory
        .modules
        .iter()
        .find(|m| m.module.title == title)
        .unwrap_or_else(|| {
            let titles = module_titles(inventory);
            panic!("module '{title}' not found. Available: {titles:?}")
        })
}

/// Find a check result by module file name. Panics if not found.
pub fn find_check<'a>(modules: &'a [ModuleCheck], file: &str) -> &'a ModuleCheck {
    modules.iter().find(|m| m.file == file).unwrap_or_else(|| {
        let files: Vec<&str> = modules.iter().map(|m| m.file.as_str()).collect();
        panic!("check for '{file}' not found. Available: {files:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All module titles in inventory order.
pub fn module_titles(inventory: &Inventory) -> Vec<&str> {
    inventory
        .modules
        .iter()
        .map(|m| m.module.title.as_str())
        .collect()
}

/// All lesson ids of one inventory module, in declaration order.
pub fn lesson_ids(module: &InventoryModule) -> Vec<&str> {
    module
        .module
        .lessons
        .iter()
        .map(|l| l.id.as_str())
        .collect()
}

// =========================================================================
// Catalog shape assertion
// =========================================================================

/// Assert that the inventory matches an expected shape.
///
/// Each entry is `(module title, lesson ids)`. Modules are listed in
/// inventory order (sorted by file name).
///
/// ```rust
/// assert_catalog_shape(&inventory, &[
///     ("Capacity Planning", &["forecasting", "headroom"]),
///     ("Incident Basics", &["declare", "handoff"]),
/// ]);
/// ```
pub fn assert_catalog_shape(inventory: &Inventory, expected: &[(&str, &[&str])]) {
    let actual = module_titles(inventory);
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(actual, expected_titles, "module titles mismatch");

    for (title, lessons) in expected {
        let module = find_module(inventory, title);
        assert_eq!(
            lesson_ids(module),
            lessons.to_vec(),
            "lesson ids of '{title}' mismatch"
        );
    }
}
