use ruff_python_ast::visitor::{self, Visitor};
use ruff_python_ast::{Expr, ModModule, Stmt};

use crate::schema::ImportedName;

/// The syntax kinds the extractors care about, flattened out of a parsed module.
///
/// `async def` is not a [`Node::FunctionDef`]; only plain definitions are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Import { names: Vec<ImportedName> },
    FromImport {
        module: Option<String>,
        level: u32,
        names: Vec<ImportedName>,
    },
    FunctionDef { name: String },
    Call { callee: Callee },
}

/// What a call expression invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// `name(...)`
    Name(String),
    /// `value.attr(...)`; `value` is set only when the receiver is a bare name.
    Attribute { value: Option<String>, attr: String },
    Other,
}

/// A parsed module as a flat, source-ordered list of [`Node`]s.
///
/// Statements and expressions are visited at every depth, so imports inside
/// functions and nested function definitions are included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn from_module(module: &ModModule) -> Self {
        let mut collector = NodeCollector::default();
        for stmt in &module.body {
            collector.visit_stmt(stmt);
        }
        Self {
            nodes: collector.nodes,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

#[derive(Default)]
struct NodeCollector {
    nodes: Vec<Node>,
}

impl<'a> Visitor<'a> for NodeCollector {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Import(import_stmt) => {
                let names = import_stmt
                    .names
                    .iter()
                    .map(|alias| ImportedName {
                        name: alias.name.to_string(),
                        alias: alias.asname.as_ref().map(|name| name.to_string()),
                    })
                    .collect();
                self.nodes.push(Node::Import { names });
            }
            Stmt::ImportFrom(import_from_stmt) => {
                let names = import_from_stmt
                    .names
                    .iter()
                    .map(|alias| ImportedName {
                        name: alias.name.to_string(),
                        alias: alias.asname.as_ref().map(|name| name.to_string()),
                    })
                    .collect();
                self.nodes.push(Node::FromImport {
                    module: import_from_stmt.module.as_ref().map(|m| m.to_string()),
                    level: import_from_stmt.level,
                    names,
                });
            }
            Stmt::FunctionDef(func_def) if !func_def.is_async => {
                self.nodes.push(Node::FunctionDef {
                    name: func_def.name.to_string(),
                });
            }
            _ => {}
        }
        visitor::walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        if let Expr::Call(call_expr) = expr {
            self.nodes.push(Node::Call {
                callee: callee_of(&call_expr.func),
            });
        }
        visitor::walk_expr(self, expr);
    }
}

fn callee_of(func: &Expr) -> Callee {
    match func {
        Expr::Name(name_expr) => Callee::Name(name_expr.id.to_string()),
        Expr::Attribute(attr_expr) => {
            let value = match attr_expr.value.as_ref() {
                Expr::Name(name_expr) => Some(name_expr.id.to_string()),
                _ => None,
            };
            Callee::Attribute {
                value,
                attr: attr_expr.attr.to_string(),
            }
        }
        _ => Callee::Other,
    }
}
