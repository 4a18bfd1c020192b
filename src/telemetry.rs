//! Structured tracing for the launcher (feature `tracing`).
//!
//! Filter comes from `OCEANIX_DEV_LOG` (EnvFilter syntax, default `warn`).
//! Output goes to stderr so it never mixes with the dev server's stdout.

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env("OCEANIX_DEV_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(crate::color_enabled_stderr());
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}
