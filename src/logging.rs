//! Diagnostic logging setup for the binary.
//!
//! The library only emits `tracing` events. Installing a subscriber is
//! left to the binary, which writes compact events to stderr so they never
//! mix with blob or plaintext output on stdout.

use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "FINVAULT_LOG";

/// Install the global stderr subscriber.
///
/// The default level is `warn`, or `debug` with `verbose`. Directives in
/// `FINVAULT_LOG` are applied on top. Colors are used only when stderr is a
/// terminal. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
