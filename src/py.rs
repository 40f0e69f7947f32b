use anyhow::Context;
use log::debug;
use ruff_python_parser::parse_module;
use std::fs;
use std::path::Path;

use crate::syntax::SyntaxTree;

/// Read and parse a Python file into a [`SyntaxTree`].
pub fn parse_python_file(file_path: &Path) -> anyhow::Result<SyntaxTree> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Error reading file {}", file_path.display()))?;
    debug!("Parsing {}", file_path.display());
    parse_source(&content).with_context(|| format!("Syntax error in {}", file_path.display()))
}

/// Parse Python source after stripping its common leading indentation.
pub fn parse_source(content: &str) -> anyhow::Result<SyntaxTree> {
    let source = dedent(content);
    let parsed = parse_module(&source).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let module = parsed.into_syntax();
    Ok(SyntaxTree::from_module(&module))
}

/// Remove whitespace that prefixes every non-blank line.
///
/// Whitespace-only lines do not count towards the margin and come out empty.
pub fn dedent(content: &str) -> String {
    let margin = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(|margin, indent| common_prefix(margin, indent))
        .unwrap_or("");

    if margin.is_empty() {
        return content.to_string();
    }

    let mut dedented = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        let (body, ending) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        if body.trim().is_empty() {
            dedented.push_str(ending);
        } else {
            dedented.push_str(body.strip_prefix(margin).unwrap_or(body));
            dedented.push_str(ending);
        }
    }
    dedented
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map_or(0, |((i, x), _)| i + x.len_utf8());
    &a[..len]
}
