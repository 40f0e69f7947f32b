use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::calls::resolve_calls;
use crate::resolve::resolve_module_deps;
use crate::schema::{FileDependencyGraph, FunctionCallGraph, ModuleFunctions, ModuleMap};

/// Depth-first walk from `entry`, visiting each file once.
///
/// `expand` returns a file's graph entry together with the files to descend into.
/// Keys come out in pre-order, matching a recursive walk. The worklist and visited
/// set are local, so concurrent builds share nothing mutable.
fn depth_first<T, F>(entry: &Path, mut expand: F) -> IndexMap<PathBuf, T>
where
    F: FnMut(&Path) -> (T, Vec<PathBuf>),
{
    let mut graph = IndexMap::new();
    let mut visited = HashSet::new();
    let mut stack = vec![entry.to_path_buf()];

    while let Some(file_path) = stack.pop() {
        if !visited.insert(file_path.clone()) {
            continue;
        }
        let (value, next) = expand(&file_path);
        graph.insert(file_path, value);
        stack.extend(next.into_iter().rev());
    }

    graph
}

/// Module-level import graph of every internal file reachable from `entry_file`.
pub fn build_module_graph(
    entry_file: &Path,
    modules: &ModuleMap,
    root: &Path,
) -> FileDependencyGraph {
    depth_first(entry_file, |file_path| {
        let deps = resolve_module_deps(file_path, modules, root);
        (deps.clone(), deps)
    })
}

/// Function-level call graph reachable from `entry_file`.
///
/// Descends into the files that define the called functions, not into the
/// importing file's raw imports.
pub fn build_function_graph(
    entry_file: &Path,
    modules: &ModuleMap,
    root: &Path,
    module_functions: &ModuleFunctions,
) -> FunctionCallGraph {
    depth_first(entry_file, |file_path| {
        let usages = resolve_calls(file_path, modules, root, module_functions);
        let next = usages.iter().map(|usage| usage.path.clone()).collect();
        (usages, next)
    })
}
