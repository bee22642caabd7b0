use crate::clearing::PassOutcome;
use crate::error::{ClearError, ClearResult};
use crate::geometry::ToolId;
use crate::isolation::IsolationOutcome;
use crate::tool_library::ToolLibrary;
use crate::types::{CutParameters, ToolOperation, ToolShape};
use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A tool that contributed geometry to the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedTool {
    pub id: ToolId,
    pub diameter: f64,
    pub shape: ToolShape,
    pub operation: ToolOperation,
    /// Passed through from the tool pool untouched.
    pub cut_parameters: CutParameters,
    pub cleared_geometry: Vec<LineString<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingSummary {
    /// Isolation tools whose envelope was cut open by the boundary.
    pub isolation_broken_count: usize,
    /// Polygons a fill could not convert.
    pub failed_polygon_count: usize,
    pub had_uncleared_rest_area: bool,
    pub succeeded: bool,
}

/// The multi-tool object a successful run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingResult {
    pub output_name: String,
    pub tools: BTreeMap<ToolId, ClearedTool>,
    pub summary: ClearingSummary,
    /// Area rest machining could not clear with any tool.
    pub leftover: Vec<Polygon<f64>>,
    /// Human-readable outcome, first line is the headline.
    pub messages: Vec<String>,
}

impl ClearingResult {
    pub fn tool(&self, id: ToolId) -> Option<&ClearedTool> {
        self.tools.get(&id)
    }

    /// Total number of paths across all tools.
    pub fn path_count(&self) -> usize {
        self.tools.values().map(|t| t.cleared_geometry.len()).sum()
    }
}

/// Collect per-tool geometry into the result, dropping tools that produced nothing.
pub fn assemble_result(
    output_name: &str,
    pool: &ToolLibrary,
    isolation: IsolationOutcome,
    pass: PassOutcome,
) -> ClearResult<ClearingResult> {
    let mut tools = BTreeMap::new();
    let produced = isolation.toolpaths.into_iter().chain(pass.toolpaths);

    for (id, toolpath) in produced {
        if toolpath.is_empty() {
            debug!(tool = %id, "dropping tool without geometry");
            continue;
        }
        let Some(tool) = pool.get(id) else {
            warn!(tool = %id, "geometry for a tool missing from the pool");
            continue;
        };
        tools
            .entry(id)
            .or_insert_with(|| ClearedTool {
                id,
                diameter: tool.diameter,
                shape: tool.shape.clone(),
                operation: tool.operation,
                cut_parameters: tool.cut_parameters.clone(),
                cleared_geometry: Vec::new(),
            })
            .cleared_geometry
            .extend(toolpath.paths);
    }

    if tools.is_empty() {
        return Err(ClearError::NoClearingGeometry);
    }

    let summary = ClearingSummary {
        isolation_broken_count: isolation.broken_count,
        failed_polygon_count: pass.failed_polygons,
        had_uncleared_rest_area: !pass.leftover.is_empty(),
        succeeded: true,
    };
    let messages = summary_messages(&summary);
    info!(output = output_name, tools = tools.len(), "{}", messages.join("; "));

    Ok(ClearingResult {
        output_name: output_name.to_string(),
        tools,
        summary,
        leftover: pass.leftover,
        messages,
    })
}

fn summary_messages(summary: &ClearingSummary) -> Vec<String> {
    let mut messages = Vec::new();
    if summary.isolation_broken_count > 0 {
        messages.push(format!(
            "Non-copper clearing done, but the copper isolation is broken for {} tool(s)",
            summary.isolation_broken_count
        ));
    } else {
        messages.push("Non-copper clearing done".to_string());
    }
    if summary.failed_polygon_count > 0 {
        messages.push(format!(
            "{} polygon(s) could not be cleared",
            summary.failed_polygon_count
        ));
    }
    if summary.had_uncleared_rest_area {
        messages.push(
            "Rest machining left area uncleared; add a smaller tool to clear it".to_string(),
        );
    }
    messages
}
