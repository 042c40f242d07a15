//! Tracing setup and latency reporting.
//!
//! `--timing` logs every `#[instrument]`ed span when it closes, with its duration
//! (`FmtSpan::CLOSE`). The business crate logs through `log`; those records reach the same
//! subscriber through the `tracing-log` bridge installed by `init()`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Level used when `RUST_LOG` is unset.
///
/// Span close events are emitted at INFO, so `--timing` needs at least that.
fn default_level(verbose: bool, timing: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else if timing {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

fn span_events(timing: bool) -> FmtSpan {
    if timing { FmtSpan::CLOSE } else { FmtSpan::NONE }
}

/// Install the global subscriber, writing to stderr so stdout stays clean for tables and
/// completions.
pub fn init_tracing(verbose: bool, timing: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, timing).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_level(true)
                .with_span_events(span_events(timing))
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
