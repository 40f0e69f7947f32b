use anyhow::Context;
use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::builder::{build_function_graph, build_module_graph};
use crate::config::Config;
use crate::document::GraphDocument;
use crate::functions::module_functions;
use crate::schema::{FileDependencyGraph, FunctionCallGraph, ModuleFunctions, ModuleMap};
use crate::walk::discover_modules;

/// One scan of a project: its module map and function table, computed once and
/// read-only afterwards. Graph builds borrow from it.
#[derive(Debug)]
pub struct Scan {
    root: PathBuf,
    modules: ModuleMap,
    functions: ModuleFunctions,
}

impl Scan {
    pub fn new(root: &Path, config: &Config) -> anyhow::Result<Self> {
        if !root.exists() {
            anyhow::bail!("Directory not found: {}", root.display());
        }
        if !root.is_dir() {
            anyhow::bail!("Not a directory: {}", root.display());
        }
        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", root.display()))?;

        let modules = discover_modules(&root, config)
            .with_context(|| format!("Failed to discover modules in {}", root.display()))?;
        if modules.is_empty() {
            debug!("No .{} files found in {}", config.extension, root.display());
        }
        let functions = module_functions(&modules);
        info!("Scanned {} module(s) in {}", modules.len(), root.display());

        Ok(Self {
            root,
            modules,
            functions,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    pub fn functions(&self) -> &ModuleFunctions {
        &self.functions
    }

    /// File for an entry point given as a module name or as a path (relative
    /// paths are taken from the root).
    pub fn entry_path(&self, entry: &str) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.modules.get(entry) {
            return Ok(path.to_path_buf());
        }
        let candidate = self.root.join(entry);
        if candidate.is_file() {
            return candidate
                .canonicalize()
                .with_context(|| format!("Failed to canonicalize path: {}", candidate.display()));
        }
        anyhow::bail!("Unknown entry point: {}", entry)
    }

    pub fn module_graph(&self, entry_file: &Path) -> FileDependencyGraph {
        build_module_graph(entry_file, &self.modules, &self.root)
    }

    pub fn function_graph(&self, entry_file: &Path) -> FunctionCallGraph {
        build_function_graph(entry_file, &self.modules, &self.root, &self.functions)
    }

    /// Module and function graphs for each entry point.
    pub fn report(&self, entries: &[String]) -> anyhow::Result<DependencyReport<'_>> {
        let mut graphs = IndexMap::new();
        for entry in entries {
            let path = self.entry_path(entry)?;
            let entry_graphs = EntryGraphs {
                module_graph: self.module_graph(&path),
                function_graph: self.function_graph(&path),
                path,
            };
            graphs.insert(entry.clone(), entry_graphs);
        }
        Ok(DependencyReport {
            root: &self.root,
            modules: Cow::Borrowed(&self.modules),
            functions: &self.functions,
            entries: graphs,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DependencyReport<'a> {
    pub root: &'a Path,
    pub modules: Cow<'a, ModuleMap>,
    pub functions: &'a ModuleFunctions,
    pub entries: IndexMap<String, EntryGraphs>,
}

impl DependencyReport<'_> {
    /// Rewrite every path in the report, module map included, relative to the scan root.
    pub fn relative_paths(mut self) -> Self {
        let root = self.root;
        self.modules = Cow::Owned(self.modules.relative_to(root));
        for graphs in self.entries.values_mut() {
            graphs.path = relative(&graphs.path, root);
            graphs.module_graph = graphs
                .module_graph
                .iter()
                .map(|(file, deps)| {
                    let deps = deps.iter().map(|dep| relative(dep, root)).collect();
                    (relative(file, root), deps)
                })
                .collect();
            graphs.function_graph = graphs
                .function_graph
                .iter()
                .map(|(file, usages)| {
                    let mut usages = usages.clone();
                    for usage in &mut usages {
                        usage.path = relative(&usage.path, root);
                    }
                    (relative(file, root), usages)
                })
                .collect();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryGraphs {
    pub path: PathBuf,
    pub module_graph: FileDependencyGraph,
    pub function_graph: FunctionCallGraph,
}

fn relative(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// What to produce from a scan.
#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    pub entries: Vec<String>,
    pub document: bool,
    pub hidden: Vec<String>,
    /// Print paths relative to the root, in the report and in the document alike
    pub relative: bool,
    pub select: Option<String>,
}

/// Scan `root` and render the requested view as JSON.
pub fn build_graph(
    root: &Path,
    config: &Config,
    options: &GraphOptions,
) -> anyhow::Result<serde_json::Value> {
    let scan = Scan::new(root, config)?;
    let report = scan.report(&options.entries)?;

    let json_value = if options.document {
        let hidden: HashSet<String> = options.hidden.iter().cloned().collect();
        let document = GraphDocument::assemble(
            &scan,
            report.entries.values().map(|graphs| &graphs.function_graph),
            &hidden,
        );
        let document = if options.relative {
            document.relative_paths(scan.root())
        } else {
            document
        };
        serde_json::to_value(&document).context("Failed to serialize graph document to JSON value")?
    } else {
        let report = if options.relative {
            report.relative_paths()
        } else {
            report
        };
        serde_json::to_value(&report).context("Failed to serialize report to JSON value")?
    };

    let output_value = if let Some(select_path) = &options.select {
        extract_json_path(&json_value, select_path).unwrap_or_else(|| {
            debug!("Path '{}' not found in output", select_path);
            serde_json::Value::Null
        })
    } else {
        json_value
    };

    Ok(output_value)
}

/// Extract a value from a JSON object using colon-separated path notation
/// Examples: "functions", "entries:app:module_graph", "nodes:0:id"
fn extract_json_path(json: &serde_json::Value, path: &str) -> Option<serde_json::Value> {
    let mut current = json;

    for part in path.split(':') {
        match current {
            serde_json::Value::Object(map) => {
                current = map.get(part)?;
            }
            serde_json::Value::Array(arr) => {
                let index = part.parse::<usize>().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_path_walks_objects_and_arrays() {
        let value = json!({"a": {"b": [10, {"c": "x"}]}});
        assert_eq!(extract_json_path(&value, "a:b:0"), Some(json!(10)));
        assert_eq!(extract_json_path(&value, "a:b:1:c"), Some(json!("x")));
        assert_eq!(extract_json_path(&value, "a:missing"), None);
        assert_eq!(extract_json_path(&value, "a:b:two"), None);
    }

    #[test]
    fn scan_rejects_missing_or_file_roots() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("f.py");
        std::fs::write(&file, "").unwrap();

        assert!(Scan::new(&dir.path().join("absent"), &Config::default()).is_err());
        assert!(Scan::new(&file, &Config::default()).is_err());
    }

    #[test]
    fn entry_points_accept_module_names_and_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("app")).unwrap();
        std::fs::write(dir.path().join("app/main.py"), "").unwrap();

        let scan = Scan::new(dir.path(), &Config::default()).unwrap();
        let by_name = scan.entry_path("app.main").unwrap();
        let by_path = scan.entry_path("app/main.py").unwrap();
        assert_eq!(by_name, by_path);
        assert!(scan.entry_path("app.nothing").is_err());
    }
}
