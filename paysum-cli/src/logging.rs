use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_DIRECTIVE: &str = "paysum=info";
const VERBOSE_DIRECTIVE: &str = "paysum=debug";

/// Console logging on stderr so stdout carries only the report.
///
/// `RUST_LOG` wins over the default directive; `--verbose` wins over both.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_DIRECTIVE)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    };

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
