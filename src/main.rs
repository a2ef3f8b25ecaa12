mod config;
mod hook;
mod logging;
mod session;
mod signals;
mod state;
mod transcript;
mod types;

use anyhow::Result;
use config::Cli;
use hook::StopHook;
use signals::SignalDetector;
use state::FileStore;
use std::io::{self, Read, Write};
use std::process;
use types::{HookOutput, Outcome};

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn main() {
    let cli = Cli::parse_or_default();
    let state_dir = cli.state_dir();
    logging::init(&state_dir);

    let prefs = cli.preferences();
    let hook = StopHook::new(
        FileStore::new(state_dir),
        SignalDetector::with_extra(&prefs.extra_patterns),
        prefs.tip_message,
    );

    let outcome = match read_stdin() {
        Ok(input) => hook.handle_input(&input),
        Err(err) => {
            tracing::warn!("approving without input: {err:#}");
            Outcome::Approve
        }
    };

    match &outcome {
        Outcome::Approve => {
            if let Ok(body) = serde_json::to_string(&HookOutput::approve()) {
                let mut stdout = io::stdout().lock();
                let _ = writeln!(stdout, "{body}");
                let _ = stdout.flush();
            }
        }
        Outcome::Remind(tip) => {
            let _ = writeln!(io::stderr(), "{tip}");
        }
    }
    process::exit(outcome.exit_code());
}
