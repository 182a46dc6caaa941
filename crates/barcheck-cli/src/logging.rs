use std::env;
use tracing::{debug, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Console logs go to stderr, one line per event, so they never break up the
/// scan results printed on stdout. The file keeps full detail.
pub fn init_logger() -> impl Drop {
    let console_level = env::var("TRACING_LEVEL").unwrap_or_else(|_| "warn".to_string());
    let file_level = env::var("FILE_TRACING_LEVEL").unwrap_or_else(|_| "debug".to_string());

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/barcheck.log".to_string());

    let file_appender = tracing_appender::rolling::daily("./", log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(console_layer(std::io::stderr, &console_level, true))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(EnvFilter::new(file_level)),
        )
        .init();

    debug!("Logging to stderr and file");

    guard
}

fn console_layer<S, W>(writer: W, level: &str, ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .compact()
        .with_target(false)
        .without_time()
        .with_ansi(ansi)
        .with_filter(EnvFilter::new(level))
}
