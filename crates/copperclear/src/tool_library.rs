use crate::config::ToolOrder;
use crate::error::{ParameterError, ParameterResult};
use crate::geometry::ToolId;
use crate::types::{Tool, ToolOperation};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The tool pool a clearing run draws from.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolLibrary {
    pub tools: Vec<Tool>,
}

impl ToolLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Build a library of clearing tools from plain diameters, in the given order.
    pub fn from_diameters(diameters: &[f64]) -> Self {
        Self {
            tools: diameters.iter().map(|&d| Tool::clearing(d)).collect(),
        }
    }

    /// Load a library from the provided path. Missing files yield an empty library.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::new());
        }

        let data =
            fs::read(path).with_context(|| format!("read tool library {}", path.display()))?;
        let library: ToolLibrary =
            serde_json::from_slice(&data).context("deserialize tool library")?;
        Ok(library)
    }

    /// Persist the library to the provided path, ensuring the directory exists.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create tool library directory {}", parent.display()))?;
        }

        let data =
            serde_json::to_vec_pretty(self).context("serialize tool library to JSON bytes")?;
        fs::write(path, data).with_context(|| format!("write tool library {}", path.display()))
    }

    /// Append a new tool to the library, returning its id.
    pub fn add_tool(&mut self, tool: Tool) -> ToolId {
        let id = tool.id;
        self.tools.push(tool);
        id
    }

    /// Remove a tool by id.
    pub fn remove_tool(&mut self, id: ToolId) -> Option<Tool> {
        let index = self.tools.iter().position(|t| t.id == id)?;
        Some(self.tools.remove(index))
    }

    pub fn get(&self, id: ToolId) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn clearing_tools(&self) -> Vec<&Tool> {
        self.with_operation(ToolOperation::Clear)
    }

    pub fn isolation_tools(&self) -> Vec<&Tool> {
        self.with_operation(ToolOperation::Isolate)
    }

    fn with_operation(&self, operation: ToolOperation) -> Vec<&Tool> {
        self.tools
            .iter()
            .filter(|t| t.operation == operation)
            .collect()
    }

    /// Check diameters are positive and unique per operation at `decimals` precision.
    pub fn validate(&self, decimals: u32) -> ParameterResult<()> {
        if self.tools.is_empty() {
            return Err(ParameterError::NoTools);
        }

        let scale = 10f64.powi(decimals as i32);
        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !tool.diameter.is_finite() || tool.diameter <= 0.0 {
                return Err(ParameterError::InvalidValue {
                    name: "diameter".to_string(),
                    reason: format!("tool {} has non-positive diameter {}", tool.id, tool.diameter),
                });
            }
            let key = (tool.operation == ToolOperation::Clear, (tool.diameter * scale).round() as i64);
            if !seen.insert(key) {
                return Err(ParameterError::DuplicateTool {
                    diameter: tool.diameter,
                });
            }
        }
        Ok(())
    }
}

/// Order clearing tools for a run. Rest machining always goes largest first.
pub fn sequence_tools<'a>(tools: &[&'a Tool], order: ToolOrder, rest_machining: bool) -> Vec<&'a Tool> {
    let order = if rest_machining {
        ToolOrder::Descending
    } else {
        order
    };

    let mut sequenced = tools.to_vec();
    match order {
        ToolOrder::AsGiven => {}
        ToolOrder::Ascending => sequenced.sort_by(|a, b| compare_diameters(a, b)),
        ToolOrder::Descending => sequenced.sort_by(|a, b| compare_diameters(b, a)),
    }
    sequenced
}

fn compare_diameters(a: &Tool, b: &Tool) -> Ordering {
    a.diameter.total_cmp(&b.diameter)
}
