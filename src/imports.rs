use log::warn;
use std::path::Path;

use crate::py::parse_python_file;
use crate::schema::{ImportDeclaration, ImportExtraction};
use crate::syntax::{Node, SyntaxTree};

/// Collect every import statement of a file, at any depth, in source order.
///
/// Unreadable or unparsable files yield an empty dependency list and an error message
/// instead of failing the scan.
pub fn extract_imports(file_path: &Path) -> ImportExtraction {
    match parse_python_file(file_path) {
        Ok(tree) => ImportExtraction {
            file: file_path.to_path_buf(),
            error: None,
            dependencies: import_declarations(&tree),
        },
        Err(e) => {
            warn!("{:#}", e);
            ImportExtraction {
                file: file_path.to_path_buf(),
                error: Some(format!("{:#}", e)),
                dependencies: Vec::new(),
            }
        }
    }
}

pub fn import_declarations(tree: &SyntaxTree) -> Vec<ImportDeclaration> {
    let mut dependencies = Vec::new();
    for node in tree.nodes() {
        match node {
            Node::Import { names } => {
                dependencies.extend(names.iter().map(|imported| ImportDeclaration::Import {
                    name: imported.name.clone(),
                    alias: imported.alias.clone(),
                }));
            }
            Node::FromImport {
                module,
                level,
                names,
            } => dependencies.push(ImportDeclaration::FromImport {
                base_module: module.clone().unwrap_or_default(),
                level: *level,
                imports: names.clone(),
            }),
            Node::FunctionDef { .. } | Node::Call { .. } => {}
        }
    }
    dependencies
}
