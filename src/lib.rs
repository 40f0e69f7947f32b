pub mod builder;
pub mod calls;
pub mod config;
pub mod document;
pub mod functions;
pub mod graph;
pub mod imports;
pub mod py;
pub mod resolve;
pub mod schema;
pub mod syntax;
pub mod walk;

#[cfg(feature = "python")]
mod pylib;

pub use builder::{build_function_graph, build_module_graph};
pub use calls::resolve_calls;
pub use config::{Config, IgnoreConfig};
pub use document::GraphDocument;
pub use functions::{extract_functions, module_functions};
pub use graph::Scan;
pub use imports::extract_imports;
pub use resolve::resolve_module_deps;
pub use schema::{
    FileDependencyGraph, FunctionCallGraph, FunctionUsage, ImportDeclaration, ModuleMap,
};
pub use walk::discover_modules;
