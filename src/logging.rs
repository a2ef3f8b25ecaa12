use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding an `EnvFilter` directive, e.g. `debug`.
pub const LOG_ENV: &str = "AUTOSKILL_LOG";

const LOG_FILE: &str = "autoskill-hook.log";

/// Install a file-backed subscriber when `AUTOSKILL_LOG` is set.
///
/// stdout carries the decision and stderr carries the tip shown to the
/// user, so logs go to `autoskill-hook.log` in the state directory instead.
/// Any failure here leaves logging disabled.
pub fn init(state_dir: &Path) {
    let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
        return;
    };
    if std::fs::create_dir_all(state_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(state_dir.join(LOG_FILE))
    else {
        return;
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
