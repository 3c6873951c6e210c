// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide :: logging  -  tracing subscriber setup
//
//  Diagnostics go to stderr through `tracing`; user-facing status lines stay
//  on stdout. The filter comes from SNESIDE_LOG when set, otherwise from the
//  verbosity flag.
// ─────────────────────────────────────────────────────────────────────────────

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::settings::ENV_LOG;

#[derive(Debug, Clone, Default)]
pub struct LogConfig<'a> {
    /// `-v` / `--debug`: debug level for this crate.
    pub verbose:  bool,
    /// Extra sink receiving every event at debug level, without colors.
    pub log_file: Option<&'a Path>,
}

/// Default filter when SNESIDE_LOG is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "snes_ide=debug,snes_ide_build=debug,create_new_project=debug,warn"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Calling it twice is harmless; the second
/// call keeps the first subscriber.
pub fn init(config: LogConfig<'_>) -> io::Result<()> {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.verbose)));

    let file_layer = match config.log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(EnvFilter::new(default_directive(true))),
            )
        }
        None => None,
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter);

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_debug_for_all_binaries() {
        let d = default_directive(true);
        assert!(d.contains("snes_ide=debug"));
        assert!(d.contains("snes_ide_build=debug"));
        assert_eq!(default_directive(false), "warn");
    }
}
