//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// Logs go to stderr so that `show` can print a document on stdout. The
/// level comes from `RUST_LOG`, defaulting to `info`; `verbose` forces
/// `debug`.
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .compact();

    let filter_layer = if verbose {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init_only_once() {
        // A second install fails instead of replacing the first
        let first = init(false);
        let second = init(true);
        assert!(first.is_err() || second.is_err());
    }
}
