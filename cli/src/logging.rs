use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
/// `-v` shows info, `-vv` debug, `-vvv` trace; `RUST_LOG` takes precedence when set.
pub fn init(verbose: u8, json: bool) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}
