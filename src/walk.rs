use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Config;
use crate::schema::ModuleMap;

/// Walk `root` and map every eligible source file to its dotted module name.
///
/// Ignored directories are pruned before descent, so nothing below them is visited.
/// Entries are visited in file-name order, which makes conflict resolution
/// (later file wins) deterministic.
pub fn discover_modules(root: &Path, config: &Config) -> Result<ModuleMap> {
    let ignored_dirs = config.ignore.ignored_dirs();
    let ignored_files = config.ignore.ignored_files();
    let mut modules = ModuleMap::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || entry
                    .file_name()
                    .to_str()
                    .map_or(true, |name| !ignored_dirs.contains(name))
        });

    for entry in walker {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in {}", root.display()))?;
        let path = entry.path();
        // Follows symlinks, so linked modules are mapped under the link's name.
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_str().unwrap_or("");
        if ignored_files.contains(file_name) || !has_extension(path, &config.extension) {
            continue;
        }

        let module_name = module_name(path, root);
        debug!("Discovered module {} at {}", module_name, path.display());
        if let Some(shadowed) = modules.insert(module_name.clone(), path.to_path_buf()) {
            warn!(
                "Module name {} is claimed by both {} and {}; keeping the latter",
                module_name,
                shadowed.display(),
                path.display()
            );
        }
    }

    Ok(modules)
}

/// Dotted module name of `file_path`: relative to `root`, extension stripped,
/// separators replaced by dots. Files outside `root` fall back to their stem.
pub fn module_name(file_path: &Path, root: &Path) -> String {
    match file_path.strip_prefix(root) {
        Ok(relative) => relative
            .with_extension("")
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("."),
        Err(_) => file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().map_or(false, |ext| ext == extension)
}
