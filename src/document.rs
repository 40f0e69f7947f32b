use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::graph::Scan;
use crate::schema::FunctionCallGraph;
use crate::walk::module_name;

/// Node/edge export of a scan: modules, the functions they define and the
/// cross-module calls found from the chosen entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Module,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Defines,
    Calls,
}

impl GraphDocument {
    /// Build the document for `scan` from the call graphs of its entry points.
    ///
    /// Modules listed in `hidden` get no nodes, and no edge touches them.
    /// Nodes are unique by id and edges unique by value, in first-seen order.
    pub fn assemble<'a, I>(scan: &Scan, call_graphs: I, hidden: &HashSet<String>) -> Self
    where
        I: IntoIterator<Item = &'a FunctionCallGraph>,
    {
        let mut node_ids = HashSet::new();
        let mut nodes = Vec::new();
        let mut edges = IndexSet::new();

        for (module, functions) in scan.functions() {
            if hidden.contains(module) {
                continue;
            }
            let path = scan
                .modules()
                .get(module)
                .map(|p| p.display().to_string())
                .unwrap_or_default();

            if node_ids.insert(module.clone()) {
                nodes.push(GraphNode {
                    id: module.clone(),
                    label: module.clone(),
                    kind: NodeKind::Module,
                    path: path.clone(),
                    module: None,
                });
            }
            for function in functions {
                let function_id = format!("{module}.{function}");
                if node_ids.insert(function_id.clone()) {
                    nodes.push(GraphNode {
                        id: function_id.clone(),
                        label: function.clone(),
                        kind: NodeKind::Function,
                        path: path.clone(),
                        module: Some(module.clone()),
                    });
                }
                edges.insert(GraphEdge {
                    source: module.clone(),
                    target: function_id,
                    relationship: Relationship::Defines,
                });
            }
        }

        for graph in call_graphs {
            for (caller_path, usages) in graph {
                let caller = scan
                    .modules()
                    .module_for_path(caller_path)
                    .map(str::to_string)
                    .unwrap_or_else(|| module_name(caller_path, scan.root()));
                if hidden.contains(&caller) {
                    continue;
                }
                for usage in usages.iter().filter(|u| !hidden.contains(&u.module)) {
                    edges.insert(GraphEdge {
                        source: caller.clone(),
                        target: format!("{}.{}", usage.module, usage.function),
                        relationship: Relationship::Calls,
                    });
                }
            }
        }

        Self {
            nodes,
            edges: edges.into_iter().collect(),
        }
    }

    /// Rewrite node paths relative to `root`.
    pub fn relative_paths(mut self, root: &Path) -> Self {
        for node in &mut self.nodes {
            if let Ok(relative) = Path::new(&node.path).strip_prefix(root) {
                node.path = relative.display().to_string();
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_export_field_names() {
        let document = GraphDocument {
            nodes: vec![
                GraphNode {
                    id: "pkg.a".into(),
                    label: "pkg.a".into(),
                    kind: NodeKind::Module,
                    path: "/p/pkg/a.py".into(),
                    module: None,
                },
                GraphNode {
                    id: "pkg.a.run".into(),
                    label: "run".into(),
                    kind: NodeKind::Function,
                    path: "/p/pkg/a.py".into(),
                    module: Some("pkg.a".into()),
                },
            ],
            edges: vec![GraphEdge {
                source: "pkg.a".into(),
                target: "pkg.a.run".into(),
                relationship: Relationship::Defines,
            }],
        };

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "nodes": [
                    {"id": "pkg.a", "label": "pkg.a", "type": "module", "path": "/p/pkg/a.py"},
                    {"id": "pkg.a.run", "label": "run", "type": "function", "path": "/p/pkg/a.py", "module": "pkg.a"}
                ],
                "edges": [
                    {"source": "pkg.a", "target": "pkg.a.run", "relationship": "defines"}
                ]
            })
        );

        let back: GraphDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, document);

        let relative = document.relative_paths(Path::new("/p"));
        assert!(relative.nodes.iter().all(|n| n.path == "pkg/a.py"));
    }
}
