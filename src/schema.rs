use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Module name -> defined function names, in declaration order.
pub type ModuleFunctions = IndexMap<String, Vec<String>>;

/// File -> internal files it imports.
pub type FileDependencyGraph = IndexMap<PathBuf, Vec<PathBuf>>;

/// File -> project functions it calls.
pub type FunctionCallGraph = IndexMap<PathBuf, Vec<FunctionUsage>>;

/// Canonical dotted module names mapped to their source files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleMap {
    modules: IndexMap<String, PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conflicts: Vec<ModuleConflict>,
}

/// Two files that derived the same module name. `kept` is the mapping in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConflict {
    pub module: String,
    pub kept: PathBuf,
    pub shadowed: PathBuf,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `module` to `path`. A previous mapping is replaced and returned.
    pub fn insert(&mut self, module: String, path: PathBuf) -> Option<PathBuf> {
        let previous = self.modules.insert(module.clone(), path.clone());
        if let Some(shadowed) = &previous {
            self.conflicts.push(ModuleConflict {
                module,
                kept: path,
                shadowed: shadowed.clone(),
            });
        }
        previous
    }

    pub fn get(&self, module: &str) -> Option<&Path> {
        self.modules.get(module).map(PathBuf::as_path)
    }

    /// Reverse lookup of a file's module name.
    pub fn module_for_path(&self, path: &Path) -> Option<&str> {
        self.modules
            .iter()
            .find(|(_, candidate)| candidate.as_path() == path)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.modules
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn conflicts(&self) -> &[ModuleConflict] {
        &self.conflicts
    }

    /// Copy of the map with every path made relative to `root`.
    pub fn relative_to(&self, root: &Path) -> ModuleMap {
        let relative = |path: &Path| {
            path.strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf())
        };
        ModuleMap {
            modules: self
                .modules
                .iter()
                .map(|(name, path)| (name.clone(), relative(path.as_path())))
                .collect(),
            conflicts: self
                .conflicts
                .iter()
                .map(|conflict| ModuleConflict {
                    module: conflict.module.clone(),
                    kept: relative(conflict.kept.as_path()),
                    shadowed: relative(conflict.shadowed.as_path()),
                })
                .collect(),
        }
    }
}

/// One imported name of a from-import, with its optional local alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// The name this import binds in the importing module.
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportDeclaration {
    /// `import a.b as c`
    Import { name: String, alias: Option<String> },
    /// `from ..a import b as c`; `level` counts the leading dots.
    FromImport {
        base_module: String,
        level: u32,
        imports: Vec<ImportedName>,
    },
}

impl ImportDeclaration {
    /// The module text as written, without leading dots.
    pub fn name(&self) -> &str {
        match self {
            ImportDeclaration::Import { name, .. } => name,
            ImportDeclaration::FromImport { base_module, .. } => base_module,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            ImportDeclaration::Import { .. } => 0,
            ImportDeclaration::FromImport { level, .. } => *level,
        }
    }
}

/// Outcome of reading one file's imports. Failures leave `dependencies` empty.
#[derive(Debug, Clone, Serialize)]
pub struct ImportExtraction {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dependencies: Vec<ImportDeclaration>,
}

/// A confirmed call into a function defined in the project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionUsage {
    pub module: String,
    pub function: String,
    pub path: PathBuf,
}
