use log::warn;
use std::path::Path;

use crate::py::parse_python_file;
use crate::schema::{ModuleFunctions, ModuleMap};
use crate::syntax::{Node, SyntaxTree};

/// Names of every function defined in a file, nested ones included, in
/// declaration order. Redefinitions appear once per definition.
///
/// Returns an empty list when the file cannot be read or parsed.
pub fn extract_functions(file_path: &Path) -> Vec<String> {
    match parse_python_file(file_path) {
        Ok(tree) => function_names(&tree),
        Err(e) => {
            warn!("{:#}", e);
            Vec::new()
        }
    }
}

pub fn function_names(tree: &SyntaxTree) -> Vec<String> {
    tree.nodes()
        .filter_map(|node| match node {
            Node::FunctionDef { name } => Some(name.clone()),
            Node::Import { .. } | Node::FromImport { .. } | Node::Call { .. } => None,
        })
        .collect()
}

/// Function table for every module of a scan.
pub fn module_functions(modules: &ModuleMap) -> ModuleFunctions {
    modules
        .iter()
        .map(|(name, path)| (name.to_string(), extract_functions(path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_definitions_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(
            &file,
            "\n        def foo(): pass\n        def bar(x, y): return x + y\n        ",
        )
        .unwrap();

        assert_eq!(extract_functions(&file), vec!["foo", "bar"]);
    }

    #[test]
    fn includes_nested_and_duplicate_definitions_but_not_async() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(
            &file,
            "def outer():\n    def inner(): pass\n\nclass K:\n    def method(self): pass\n\nasync def fetch(): pass\n\ndef outer(): pass\n",
        )
        .unwrap();

        assert_eq!(
            extract_functions(&file),
            vec!["outer", "inner", "method", "outer"]
        );
    }

    #[test]
    fn unparsable_file_has_no_functions() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("bad.py");
        fs::write(&file, "def ok(): pass\ndef (broken\n").unwrap();

        assert!(extract_functions(&file).is_empty());
        assert!(extract_functions(&dir.path().join("missing.py")).is_empty());
    }
}
