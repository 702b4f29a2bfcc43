//! `env_logger` setup for the binary.
//!
//! `RUST_LOG` wins when set; otherwise `-q` selects errors only, `-v` debug,
//! `-vv` trace, and the default is warnings.

use std::env;

use env_logger::Builder;
use log::LevelFilter;

/// Install the global logger. Call once, before anything logs.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbose, quiet));
    }

    builder.format_timestamp(None).format_target(false).init();
}

fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbosity() {
        assert_eq!(level_for(2, true), LevelFilter::Error);
    }

    #[test]
    fn verbosity_steps() {
        assert_eq!(level_for(0, false), LevelFilter::Warn);
        assert_eq!(level_for(1, false), LevelFilter::Debug);
        assert_eq!(level_for(5, false), LevelFilter::Trace);
    }
}
