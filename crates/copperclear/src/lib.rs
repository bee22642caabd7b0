mod boundary;
mod clearing;
mod config;
mod empty_area;
mod engine;
mod error;
mod fill;
mod geometry;
mod isolation;
mod progress;
mod report;
mod rest_machining;
mod result;
mod tool_library;
mod types;
mod worker;

pub use boundary::resolve_boundary;
pub use clearing::{standard_pass, PassOutcome, PassStep};
pub use config::*;
pub use empty_area::compute_empty;
pub use engine::{clear_copper, clear_copper_with};
pub use error::*;
pub use fill::*;
pub use geometry::*;
pub use isolation::{isolation_pass, IsolationOutcome};
pub use progress::*;
pub use report::*;
pub use rest_machining::rest_pass;
pub use result::*;
pub use tool_library::*;
pub use types::*;
pub use worker::{ClearingHandle, ClearingWorker};

/// Install a tracing subscriber that logs to stdout.
///
/// `RUST_LOG` refines the filter; INFO is always enabled.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
