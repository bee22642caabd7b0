//! Polygon fill strategies: turn one polygon and a tool into tool-centre paths.
//!
//! The clearing passes only see the [`PolygonFill`] trait. [`FillMethod`]
//! selects one of the built-in strategies and applies path connection on top.

use crate::error::FillError;
use crate::types::Toolpath;
use geo::Polygon;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

mod connect;
mod lines;
mod seed;
mod standard;

pub use connect::connect_paths;
pub use lines::fill_lines;
pub use seed::fill_seed;
pub use standard::fill_standard;

/// Inputs shared by every fill strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillParams {
    pub tool_diameter: f64,
    pub steps_per_circle: u32,
    /// Fraction of the diameter consecutive passes overlap by.
    pub overlap: f64,
    /// Add the outline of the reachable region as a final pass.
    pub contour: bool,
    /// Join paths with straight moves where the move stays inside the region.
    pub connect: bool,
}

impl FillParams {
    pub fn radius(&self) -> f64 {
        self.tool_diameter / 2.0
    }

    /// Distance between neighbouring passes.
    pub fn stepover(&self) -> f64 {
        self.tool_diameter * (1.0 - self.overlap)
    }

    fn check(&self) -> Result<(), FillError> {
        if !(self.tool_diameter > 0.0) || !(self.stepover() > 0.0) {
            return Err(FillError::Degenerate(format!(
                "invalid fill parameters: diameter {}, overlap {}",
                self.tool_diameter, self.overlap
            )));
        }
        Ok(())
    }
}

/// Converts one polygon into toolpath geometry for one tool.
pub trait PolygonFill {
    fn fill(&self, polygon: &Polygon<f64>, params: &FillParams) -> Result<Toolpath, FillError>;
}

/// Built-in fill strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillMethod {
    /// Contour-parallel insets.
    Standard,
    /// Concentric rings grown from an interior seed point.
    Seed,
    /// Parallel raster lines.
    Lines,
}

impl PolygonFill for FillMethod {
    fn fill(&self, polygon: &Polygon<f64>, params: &FillParams) -> Result<Toolpath, FillError> {
        params.check()?;
        let method = *self;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let toolpath = match method {
                FillMethod::Standard => fill_standard(polygon, params)?,
                FillMethod::Seed => fill_seed(polygon, params)?,
                FillMethod::Lines => fill_lines(polygon, params)?,
            };
            if params.connect {
                Ok(connect_paths(toolpath, polygon, params))
            } else {
                Ok(toolpath)
            }
        }));

        let toolpath = outcome.map_err(|_| {
            FillError::Degenerate(format!("{method:?} fill failed inside the geometry kernel"))
        })??;

        if toolpath.is_empty() {
            return Err(FillError::Degenerate(format!(
                "{method:?} fill produced no paths"
            )));
        }
        Ok(toolpath)
    }
}
