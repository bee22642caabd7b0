use crate::error::{ParameterError, ParameterResult};
use crate::fill::FillMethod;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Order in which clearing tools are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolOrder {
    /// Tool pool order, unchanged.
    AsGiven,
    Ascending,
    Descending,
}

/// Direction the isolation envelope is traversed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MillingDirection {
    Climb,
    Conventional,
}

/// Immutable configuration for one clearing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearingConfig {
    /// Fraction of the tool diameter consecutive passes overlap by, in `[0, 1)`.
    pub overlap: f64,
    /// Distance the boundary is grown past the target.
    pub margin: f64,
    pub order: ToolOrder,
    pub rest_machining: bool,
    /// Join consecutive paths with straight moves where it is safe.
    pub connect: bool,
    /// Add a final pass around each cleared polygon.
    pub contour: bool,
    /// Keep this far away from copper.
    pub offset: Option<f64>,
    pub method: FillMethod,
    /// Segments used to approximate a full circle.
    pub steps_per_circle: u32,
    pub milling: MillingDirection,
    /// Decimal places used when comparing tool diameters.
    pub decimals: u32,
}

impl Default for ClearingConfig {
    fn default() -> Self {
        Self {
            overlap: 0.4,
            margin: 1.0,
            order: ToolOrder::Descending,
            rest_machining: false,
            connect: true,
            contour: true,
            offset: None,
            method: FillMethod::Seed,
            steps_per_circle: 64,
            milling: MillingDirection::Climb,
            decimals: 4,
        }
    }
}

impl ClearingConfig {
    /// Parse a JSON configuration; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("deserialize clearing config")
    }

    /// Load a JSON configuration from disk.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("read clearing config {}", path.display()))?;
        Self::from_json_str(&data).with_context(|| format!("parse {}", path.display()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ParameterResult<()> {
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(ParameterError::OutOfRange {
                name: "overlap".to_string(),
                value: self.overlap,
                min: 0.0,
                max: 1.0,
            });
        }

        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "margin".to_string(),
                reason: format!("must be a finite value >= 0, got {}", self.margin),
            });
        }

        if let Some(offset) = self.offset {
            if !offset.is_finite() || offset < 0.0 {
                return Err(ParameterError::InvalidValue {
                    name: "offset".to_string(),
                    reason: format!("must be a finite value >= 0, got {offset}"),
                });
            }
        }

        if self.steps_per_circle < 3 {
            return Err(ParameterError::OutOfRange {
                name: "steps_per_circle".to_string(),
                value: self.steps_per_circle as f64,
                min: 3.0,
                max: f64::from(u32::MAX),
            });
        }

        if self.decimals > 10 {
            return Err(ParameterError::OutOfRange {
                name: "decimals".to_string(),
                value: self.decimals as f64,
                min: 0.0,
                max: 10.0,
            });
        }

        Ok(())
    }

    /// The offset from copper, if one is configured and non-zero.
    pub fn copper_offset(&self) -> f64 {
        self.offset.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClearingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.order, ToolOrder::Descending);
        assert_eq!(config.method, FillMethod::Seed);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = ClearingConfig::from_json_str(r#"{"overlap": 0.2, "rest_machining": true}"#)
            .expect("parse config");
        assert_eq!(config.overlap, 0.2);
        assert!(config.rest_machining);
        assert_eq!(config.margin, 1.0);
        assert_eq!(config.steps_per_circle, 64);
    }

    #[test]
    fn test_overlap_out_of_range() {
        let config = ClearingConfig {
            overlap: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ParameterError::OutOfRange { ref name, .. }) if name == "overlap"
        ));
    }

    #[test]
    fn test_negative_margin_rejected() {
        let config = ClearingConfig {
            margin: -0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_offset_rejected() {
        let config = ClearingConfig {
            offset: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(ClearingConfig::default().copper_offset(), 0.0);
    }

    #[test]
    fn test_invalid_json_reports_context() {
        let err = ClearingConfig::from_json_str("{ not json").expect_err("should fail");
        assert!(format!("{err:#}").contains("deserialize clearing config"));
    }
}
