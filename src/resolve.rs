use indexmap::IndexSet;
use log::debug;
use std::path::{Path, PathBuf};

use crate::imports::extract_imports;
use crate::schema::{ImportDeclaration, ModuleMap};
use crate::walk::module_name;

/// Absolute module named by a from-import inside `current_module`.
///
/// A `level` of N drops the last N components of `current_module` before
/// appending `base_module`. Climbing past the top leaves only `base_module`.
pub fn resolve_relative_import(current_module: &str, level: u32, base_module: &str) -> String {
    if level == 0 {
        return base_module.to_string();
    }

    let current_parts: Vec<&str> = current_module.split('.').collect();
    let keep = current_parts.len().saturating_sub(level as usize);
    let mut parts = current_parts[..keep].to_vec();
    if !base_module.is_empty() {
        parts.extend(base_module.split('.'));
    }
    parts.join(".")
}

/// The module an import declaration points at.
pub fn target_module(declaration: &ImportDeclaration, current_module: &str) -> String {
    match declaration {
        ImportDeclaration::Import { name, .. } => name.clone(),
        ImportDeclaration::FromImport {
            base_module, level, ..
        } => resolve_relative_import(current_module, *level, base_module),
    }
}

/// Internal files imported by `file_path`, deduplicated in first-seen order.
///
/// Imports that do not name a module of the project are dropped.
pub fn resolve_module_deps(file_path: &Path, modules: &ModuleMap, root: &Path) -> Vec<PathBuf> {
    let extraction = extract_imports(file_path);
    let current_module = module_name(file_path, root);

    let mut internal_files = IndexSet::new();
    for declaration in &extraction.dependencies {
        let target = target_module(declaration, &current_module);
        if let Some(path) = modules.get(&target) {
            internal_files.insert(path.to_path_buf());
        }
    }

    debug!(
        "{}: {} internal module(s) resolved",
        file_path.display(),
        internal_files.len()
    );
    for path in &internal_files {
        debug!("    - {}", path.display());
    }

    internal_files.into_iter().collect()
}
