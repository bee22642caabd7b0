use crate::error::ClearError;
use crate::result::{ClearingResult, ClearingSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearingStatus {
    Ready { tool_count: usize, path_count: usize },
    Cancelled,
    Failed,
}

/// Condensed outcome of a run for UI or script layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingReport {
    pub output_name: String,
    pub status: ClearingStatus,
    pub summary: ClearingSummary,
    /// Headline first, then any warnings.
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl ClearingReport {
    pub fn from_outcome(output_name: &str, outcome: &Result<ClearingResult, ClearError>) -> Self {
        match outcome {
            Ok(result) => Self {
                output_name: output_name.to_string(),
                status: ClearingStatus::Ready {
                    tool_count: result.tools.len(),
                    path_count: result.path_count(),
                },
                summary: result.summary.clone(),
                warnings: result.messages.clone(),
                error: None,
            },
            Err(err) => Self {
                output_name: output_name.to_string(),
                status: if err.is_cancelled() {
                    ClearingStatus::Cancelled
                } else {
                    ClearingStatus::Failed
                },
                summary: ClearingSummary::default(),
                warnings: vec![],
                error: Some(err.to_string()),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        self.summary.succeeded
    }
}
