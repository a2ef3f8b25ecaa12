use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

// ===================================================================
// Lenient views of transcript entries
// ===================================================================

/// The parts of a `"user"` entry we care about. Every field is defaulted
/// because the transcript shape belongs to the host and may drift.
#[derive(Debug, Deserialize)]
struct UserEntry {
    #[serde(default)]
    message: UserMessage,
}

/// `content` is either plain text or a list of content blocks; anything
/// else contributes no messages.
#[derive(Debug, Deserialize)]
struct UserMessage {
    #[serde(default = "empty_content")]
    content: serde_json::Value,
}

fn empty_content() -> serde_json::Value {
    serde_json::Value::String(String::new())
}

impl Default for UserMessage {
    fn default() -> Self {
        Self {
            content: empty_content(),
        }
    }
}

/// A single item inside a content list. Blocks are decoded one at a time so
/// a malformed block doesn't hide its siblings.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

// ===================================================================
// Transcript
// ===================================================================

/// A parsed JSONL transcript: one JSON value per non-blank line, in file order.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<serde_json::Value>,
}

impl Transcript {
    /// An empty transcript (no entries).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse JSONL content. Lines that fail to parse are skipped and
    /// returned alongside their 1-based line number.
    pub fn parse(contents: &str) -> (Self, Vec<(usize, serde_json::Error)>) {
        let mut entries = Vec::new();
        let mut errors = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(value) => entries.push(value),
                Err(e) => errors.push((idx + 1, e)),
            }
        }
        (Self { entries }, errors)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower-cased text of every user-authored message, in transcript order.
    ///
    /// A string `message.content` yields one message; a list yields one
    /// message per `"text"` block.
    pub fn user_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for value in &self.entries {
            if value.get("type").and_then(|t| t.as_str()) != Some("user") {
                continue;
            }
            let Ok(entry) = UserEntry::deserialize(value) else {
                continue;
            };
            match &entry.message.content {
                serde_json::Value::String(text) => messages.push(text.to_lowercase()),
                serde_json::Value::Array(blocks) => {
                    for block in blocks {
                        if let Ok(ContentBlock::Text { text }) = ContentBlock::deserialize(block) {
                            messages.push(text.to_lowercase());
                        }
                    }
                }
                _ => {}
            }
        }
        messages
    }
}

/// Read a transcript from disk. A missing file yields an empty transcript;
/// other I/O errors are returned for the caller to collapse.
pub fn read_transcript(path: &Path) -> Result<Transcript> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Transcript::empty()),
        Err(e) => return Err(e).with_context(|| format!("reading transcript {}", path.display())),
    };
    let contents = String::from_utf8_lossy(&bytes);
    let (transcript, errors) = Transcript::parse(&contents);
    for (line, err) in &errors {
        tracing::debug!(line, "skipping malformed transcript line: {err}");
    }
    Ok(transcript)
}
