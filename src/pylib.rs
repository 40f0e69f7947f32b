use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::path::PathBuf;

use crate::config::Config;
use crate::graph::{GraphOptions, build_graph};

/// Map the imports and cross-module calls of a Python project
///
/// Args:
///     root: Project directory to scan
///     entry_points: Module names (or root-relative paths) to trace from
///     document: Return the node/edge graph document instead of the full report
///     hidden: Modules left out of the graph document
///
/// Returns:
///     Dictionary containing the dependency data
#[pyfunction]
#[pyo3(signature = (root, entry_points=Vec::new(), document=false, hidden=Vec::new()))]
fn map_dependencies(
    py: Python,
    root: String,
    entry_points: Vec<String>,
    document: bool,
    hidden: Vec<String>,
) -> PyResult<PyObject> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let options = GraphOptions {
        entries: entry_points,
        document,
        hidden,
        ..GraphOptions::default()
    };
    let json_value = build_graph(&PathBuf::from(root), &Config::default(), &options)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{:#}", e)))?;

    json_value_to_python(py, &json_value)
}

/// Convert serde_json::Value to Python object
fn json_value_to_python(py: Python, value: &serde_json::Value) -> PyResult<PyObject> {
    match value {
        serde_json::Value::Null => Ok(py.None()),
        serde_json::Value::Bool(b) => Ok(b.to_object(py)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_object(py))
            } else if let Some(f) = n.as_f64() {
                Ok(f.to_object(py))
            } else {
                Ok(n.to_string().to_object(py))
            }
        }
        serde_json::Value::String(s) => Ok(s.to_object(py)),
        serde_json::Value::Array(arr) => {
            let py_list = PyList::empty_bound(py);
            for item in arr {
                py_list.append(json_value_to_python(py, item)?)?;
            }
            Ok(py_list.to_object(py))
        }
        serde_json::Value::Object(obj) => {
            let py_dict = PyDict::new_bound(py);
            for (key, val) in obj {
                py_dict.set_item(key, json_value_to_python(py, val)?)?;
            }
            Ok(py_dict.to_object(py))
        }
    }
}

#[pymodule]
fn pymesh(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(map_dependencies, m)?)?;
    Ok(())
}
