use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::signals::SignalGroup;
use crate::state::FileStore;

pub const DEFAULT_TIP: &str = "Tip: Run /autoskill to capture this session's learnings";

/// Command-line flags. The host normally runs the hook with no arguments, so
/// every flag has an environment-variable fallback.
#[derive(Debug, Default, Parser)]
#[command(
    name = "autoskill-hook",
    about = "Stop hook that suggests /autoskill when a session contains learnings"
)]
pub struct Cli {
    /// Directory holding per-session checkpoints.
    #[arg(long, env = "AUTOSKILL_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Preferences file (TOML). Without it the built-in defaults are used;
    /// nothing is read from the shared state directory.
    #[arg(long, env = "AUTOSKILL_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse arguments without ever exiting the process: clap's own exit
    /// code 2 would read as "signal detected" to the host. Bad arguments
    /// are dropped but the environment is still honoured.
    pub fn parse_or_default() -> Self {
        Cli::try_parse()
            .or_else(|_| Cli::try_parse_from(["autoskill-hook"]))
            .unwrap_or_default()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(FileStore::default_dir)
    }

    /// Preferences from `--config`, or defaults when no file was named.
    pub fn preferences(&self) -> Preferences {
        match &self.config {
            Some(path) => Preferences::load_or_default(path),
            None => Preferences::default(),
        }
    }
}

/// A user-supplied rule appended after the built-in table.
///
/// ```toml
/// [[extra_patterns]]
/// pattern = "\\bfrom now on\\b"
/// group = "preference"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub pattern: String,
    pub group: SignalGroup,
}

/// Optional user preferences. Missing keys fall back to defaults via serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Line written to stderr when a learning signal is found.
    #[serde(default = "default_tip_message")]
    pub tip_message: String,

    #[serde(default)]
    pub extra_patterns: Vec<CustomPattern>,
}

fn default_tip_message() -> String {
    DEFAULT_TIP.into()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tip_message: default_tip_message(),
            extra_patterns: Vec::new(),
        }
    }
}

impl Preferences {
    /// Load preferences from `path`. A missing file yields defaults and is
    /// not created.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let prefs: Preferences = toml::from_str(&contents)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(prefs.with_single_line_tip())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// The tip is printed as exactly one stderr line: embedded line breaks
    /// collapse to spaces and a blank tip falls back to the default.
    fn with_single_line_tip(mut self) -> Self {
        let tip = self
            .tip_message
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.tip_message = if tip.is_empty() { default_tip_message() } else { tip };
        self
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            tracing::warn!("using default preferences: {err:#}");
            Preferences::default()
        })
    }
}
