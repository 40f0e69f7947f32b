use indexmap::IndexSet;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::py::parse_python_file;
use crate::resolve::resolve_relative_import;
use crate::schema::{FunctionUsage, ModuleFunctions, ModuleMap};
use crate::syntax::{Callee, Node, SyntaxTree};
use crate::walk::module_name;

/// Local names bound by the import statements of one file.
#[derive(Debug, Default)]
pub struct ImportAliases {
    /// `import a.b as m` binds `m -> a.b`; without `as` it binds `a -> a.b`.
    pub modules: HashMap<String, String>,
    /// `from a import f as g` binds `g -> (a, f)`.
    pub names: HashMap<String, (String, String)>,
}

impl ImportAliases {
    pub fn collect(tree: &SyntaxTree, current_module: &str) -> Self {
        let mut aliases = Self::default();
        for node in tree.nodes() {
            match node {
                Node::Import { names } => {
                    for imported in names {
                        let bound = match &imported.alias {
                            Some(alias) => alias.clone(),
                            None => imported.name.split('.').next().unwrap_or("").to_string(),
                        };
                        aliases.modules.insert(bound, imported.name.clone());
                    }
                }
                Node::FromImport {
                    module,
                    level,
                    names,
                } => {
                    let base = resolve_relative_import(
                        current_module,
                        *level,
                        module.as_deref().unwrap_or(""),
                    );
                    for imported in names {
                        aliases.names.insert(
                            imported.bound_name().to_string(),
                            (base.clone(), imported.name.clone()),
                        );
                    }
                }
                Node::FunctionDef { .. } | Node::Call { .. } => {}
            }
        }
        aliases
    }

    /// The (module, function) a call would reach, if its callee is an imported name.
    fn candidate(&self, callee: &Callee) -> Option<(String, String)> {
        match callee {
            Callee::Name(name) => self.names.get(name).cloned(),
            Callee::Attribute {
                value: Some(value),
                attr,
            } => self
                .modules
                .get(value)
                .map(|module| (module.clone(), attr.clone())),
            Callee::Attribute { value: None, .. } | Callee::Other => None,
        }
    }
}

/// Calls in `file_path` that reach a function defined in another project module.
///
/// Only calls through an imported name (`f()` after `from m import f`) or through an
/// imported module (`m.f()` after `import m`) are considered, and a candidate is kept
/// only when `module_functions` confirms the function exists in that module.
/// A file that cannot be read or parsed has no usages.
pub fn resolve_calls(
    file_path: &Path,
    modules: &ModuleMap,
    root: &Path,
    module_functions: &ModuleFunctions,
) -> Vec<FunctionUsage> {
    let tree = match parse_python_file(file_path) {
        Ok(tree) => tree,
        Err(e) => {
            warn!("Error parsing {}: {:#}", file_path.display(), e);
            return Vec::new();
        }
    };

    let aliases = ImportAliases::collect(&tree, &module_name(file_path, root));

    let mut candidates = IndexSet::new();
    for node in tree.nodes() {
        if let Node::Call { callee } = node {
            if let Some(candidate) = aliases.candidate(callee) {
                candidates.insert(candidate);
            }
        }
    }

    let usages: Vec<FunctionUsage> = candidates
        .into_iter()
        .filter_map(|(module, function)| {
            let path = modules.get(&module)?;
            let defined = module_functions.get(&module)?;
            defined.contains(&function).then(|| FunctionUsage {
                path: path.to_path_buf(),
                module,
                function,
            })
        })
        .collect();

    debug!("{}: functions called:", file_path.display());
    for usage in &usages {
        debug!(
            "    - {}.{} ({})",
            usage.module,
            usage.function,
            usage.path.display()
        );
    }

    usages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::functions::module_functions;
    use crate::walk::discover_modules;
    use std::fs;
    use std::path::PathBuf;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn usages(dir: &tempfile::TempDir, file: &str) -> Vec<(String, String, PathBuf)> {
        let root = dir.path();
        let modules = discover_modules(root, &Config::default()).unwrap();
        let functions = module_functions(&modules);
        resolve_calls(&root.join(file), &modules, root, &functions)
            .into_iter()
            .map(|u| (u.module, u.function, u.path))
            .collect()
    }

    #[test]
    fn resolves_direct_and_module_attribute_calls() {
        let dir = project(&[
            (
                "app/main.py",
                "import app.tools as tools\nfrom app.helpers import greet as hello\n\ndef run():\n    hello()\n    tools.build()\n    hello()\n",
            ),
            ("app/helpers.py", "def greet(): pass\n"),
            ("app/tools.py", "def build(): pass\n"),
        ]);
        let root = dir.path();

        assert_eq!(
            usages(&dir, "app/main.py"),
            vec![
                ("app.helpers".into(), "greet".into(), root.join("app/helpers.py")),
                ("app.tools".into(), "build".into(), root.join("app/tools.py")),
            ]
        );
    }

    #[test]
    fn relative_from_imports_resolve_against_current_module() {
        let dir = project(&[
            ("pkg/sub/main.py", "from ..util import helper\nfrom .peer import work\nhelper()\nwork()\n"),
            ("pkg/util.py", "def helper(): pass\n"),
            ("pkg/sub/peer.py", "def work(): pass\n"),
        ]);
        let names: Vec<_> = usages(&dir, "pkg/sub/main.py")
            .into_iter()
            .map(|(module, function, _)| format!("{module}.{function}"))
            .collect();
        assert_eq!(names, vec!["pkg.util.helper", "pkg.sub.peer.work"]);
    }

    #[test]
    fn unconfirmed_targets_are_dropped() {
        let dir = project(&[
            (
                "main.py",
                "import os\nimport lib\nfrom lib import absent, present\nos.getcwd()\nlib.nothing()\nabsent()\npresent\nlocal()\nobj.attr.present()\n",
            ),
            ("lib.py", "def present(): pass\n"),
        ]);
        assert!(usages(&dir, "main.py").is_empty());
    }

    #[test]
    fn plain_dotted_import_binds_first_segment() {
        let dir = project(&[
            ("main.py", "import pkg.mod\npkg.mod.f()\npkg.g()\n"),
            ("pkg.py", "def g(): pass\n"),
            ("pkg/mod.py", "def f(): pass\n"),
        ]);
        // `pkg` is bound to `pkg.mod`, so neither call is confirmed.
        assert!(usages(&dir, "main.py").is_empty());
    }

    #[test]
    fn indented_file_is_dedented_before_resolution() {
        let dir = project(&[
            (
                "main.py",
                "    from lib import work\n    import lib\n\n    work()\n    lib.rest()\n",
            ),
            ("lib.py", "def work(): pass\ndef rest(): pass\n"),
        ]);
        let functions: Vec<_> = usages(&dir, "main.py")
            .into_iter()
            .map(|(_, function, _)| function)
            .collect();
        assert_eq!(functions, vec!["work", "rest"]);
    }

    #[test]
    fn async_definitions_are_not_call_targets() {
        let dir = project(&[
            ("main.py", "from lib import fetch, sync\nfetch()\nsync()\n"),
            ("lib.py", "async def fetch(): pass\ndef sync(): pass\n"),
        ]);
        let functions: Vec<_> = usages(&dir, "main.py")
            .into_iter()
            .map(|(_, function, _)| function)
            .collect();
        assert_eq!(functions, vec!["sync"]);
    }

    #[test]
    fn unparsable_file_has_no_usages() {
        let dir = project(&[("main.py", "from lib import f\nf(\n"), ("lib.py", "def f(): pass\n")]);
        assert!(usages(&dir, "main.py").is_empty());
    }
}
