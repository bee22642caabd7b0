use crate::config::ClearingConfig;
use crate::geometry::{flatten_polygons, merge_polygons, ToolId};
use crate::tool_library::ToolLibrary;
use geo::{Geometry, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-tool cut metadata (feeds, depths, spindle speed...). Opaque to the engine.
pub type CutParameters = BTreeMap<String, serde_json::Value>;

/// Represents a single tool in the tool pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: ToolId,
    pub diameter: f64,
    /// The specific geometry of the tool.
    pub shape: ToolShape,
    /// Whether the tool isolates features or clears copper.
    pub operation: ToolOperation,
    #[serde(default)]
    pub cut_parameters: CutParameters,
}

impl Tool {
    /// A two-flute clearing end mill.
    pub fn clearing(diameter: f64) -> Self {
        Self {
            id: ToolId::new(),
            diameter,
            shape: ToolShape::CircularFlutes { flutes: 2 },
            operation: ToolOperation::Clear,
            cut_parameters: CutParameters::new(),
        }
    }

    /// A V-bit used for the isolation pre-pass.
    pub fn isolation(diameter: f64) -> Self {
        Self {
            id: ToolId::new(),
            diameter,
            shape: ToolShape::VBit {
                angle_degrees: 30.0,
            },
            operation: ToolOperation::Isolate,
            cut_parameters: CutParameters::new(),
        }
    }

    pub fn with_cut_parameter(mut self, key: &str, value: serde_json::Value) -> Self {
        self.cut_parameters.insert(key.to_string(), value);
        self
    }
}

/// Defines the geometric type of the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolShape {
    /// A flat-bottomed cutter with the given number of flutes.
    CircularFlutes { flutes: u8 },
    /// A cylindrical cutter with a hemispherical tip.
    Ball,
    /// A V-shaped cutter defined by its included angle.
    VBit { angle_degrees: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolOperation {
    Isolate,
    Clear,
}

/// Flat 2D tool-centre paths produced for one tool. Depth is left to post-processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toolpath {
    pub paths: Vec<LineString<f64>>,
}

impl Toolpath {
    pub fn new(paths: Vec<LineString<f64>>) -> Self {
        Self { paths }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.0.len() < 2)
    }

    pub fn extend(&mut self, other: Toolpath) {
        self.paths
            .extend(other.paths.into_iter().filter(|p| p.0.len() >= 2));
    }
}

/// What a target or reference object represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Copper features of a layer.
    Copper,
    /// Plain drawn geometry.
    Geometry,
}

/// A named object whose solid geometry is cleared around or used as a reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetObject {
    pub name: String,
    pub solid_geometry: Vec<Geometry<f64>>,
    pub kind: ObjectKind,
}

impl TargetObject {
    pub fn new(name: impl Into<String>, solid_geometry: Vec<Geometry<f64>>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            solid_geometry,
            kind,
        }
    }

    /// A copper object built from plain polygons.
    pub fn copper(name: impl Into<String>, polygons: Vec<Polygon<f64>>) -> Self {
        Self::new(
            name,
            polygons.into_iter().map(Geometry::Polygon).collect(),
            ObjectKind::Copper,
        )
    }

    /// Every polygon in the solid geometry, flattened but not merged.
    pub fn polygons(&self) -> Vec<Polygon<f64>> {
        flatten_polygons(&self.solid_geometry)
    }

    /// The solid geometry as one merged multi-polygon.
    pub fn merged(&self) -> MultiPolygon<f64> {
        merge_polygons(&self.polygons())
    }
}

/// Where the clearing boundary comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BoundaryReference {
    /// Convex hull of the target itself.
    Itself,
    /// User-drawn rectangles.
    AreaSelection(Vec<Rect<f64>>),
    /// Another object.
    ReferenceObject(TargetObject),
}

/// Everything a clearing run needs, passed once into the engine.
#[derive(Debug, Clone)]
pub struct ClearingJob {
    /// Name of the object the result is stored under.
    pub output_name: String,
    pub target: TargetObject,
    pub tools: ToolLibrary,
    pub reference: BoundaryReference,
    pub config: ClearingConfig,
}

impl ClearingJob {
    pub fn new(output_name: impl Into<String>, target: TargetObject, tools: ToolLibrary) -> Self {
        Self {
            output_name: output_name.into(),
            target,
            tools,
            reference: BoundaryReference::Itself,
            config: ClearingConfig::default(),
        }
    }

    pub fn with_reference(mut self, reference: BoundaryReference) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_config(mut self, config: ClearingConfig) -> Self {
        self.config = config;
        self
    }
}
