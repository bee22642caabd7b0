//! Error types for copper clearing runs.
//!
//! `ClearError` is fatal for a run. `FillError` is per polygon and never
//! aborts a run on its own; the passes count it and move on.

use thiserror::Error;

/// Errors that end a clearing run without a result.
#[derive(Error, Debug)]
pub enum ClearError {
    /// Neither the target nor the reference produced any geometry.
    #[error("no object available")]
    NoObjectAvailable,

    /// The boundary resolved to an empty region.
    #[error("boundary is empty: {0}")]
    EmptyBoundary(String),

    /// `boundary - copper` is empty.
    #[error("could not get extent of area to clear")]
    NoClearingExtent,

    /// Both the direct and the incremental set difference failed.
    #[error(
        "could not compute the area to clear ({reason}); try a coarser buffering of the source geometry"
    )]
    EmptyAreaFailed { reason: String },

    /// Every tool ended the run without geometry.
    #[error(
        "no clearing geometry produced - tool diameter likely too large for the target features"
    )]
    NoClearingGeometry,

    /// The run parameters or tool pool are invalid.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    /// A run for this output name is already in progress.
    #[error("a clearing run for '{name}' is already in progress")]
    AlreadyRunning { name: String },

    /// The worker thread panicked before producing an outcome.
    #[error("clearing worker panicked")]
    WorkerPanicked,

    /// The worker thread could not be started.
    #[error("could not start clearing worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The run was cancelled through its `CancelToken`.
    #[error("clearing run cancelled")]
    Cancelled,
}

impl ClearError {
    /// Cancellation is a control-flow signal, not a failure of the run.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClearError::Cancelled)
    }
}

/// Errors related to run parameter and tool pool validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Two active tools share a diameter at the configured precision.
    #[error("Duplicate tool diameter: {diameter}")]
    DuplicateTool { diameter: f64 },

    /// The tool pool has nothing to cut with.
    #[error("No tools in the tool pool")]
    NoTools,
}

/// Why a single polygon could not be turned into toolpaths.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FillError {
    /// The polygon vanishes once inset by the tool radius.
    #[error("polygon could not be cleared: tool diameter {diameter} does not fit")]
    ToolTooLarge { diameter: f64 },

    /// The geometry kernel failed on this polygon.
    #[error("polygon could not be cleared: {0}")]
    Degenerate(String),
}

/// Result type alias for clearing runs.
pub type ClearResult<T> = Result<T, ClearError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
