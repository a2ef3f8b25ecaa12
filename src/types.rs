use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ===================================================================
// Hook input (received via stdin)
// ===================================================================

/// The Stop hook payload. Only the two fields the hook reads are modelled;
/// the rest (`session_id`, `cwd`, `hook_event_name`, ...) are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct HookRequest {
    /// Set by the host when this stop was itself triggered by a stop hook.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stop_hook_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcript_path: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl HookRequest {
    pub fn parse(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("parsing hook input")
    }
}

// ===================================================================
// Hook output
// ===================================================================

/// JSON body written to stdout on exit code 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookOutput {
    pub decision: String,
}

impl HookOutput {
    pub fn approve() -> Self {
        Self {
            decision: "approve".into(),
        }
    }
}

/// What a single invocation ends with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to surface: print the approve body, exit 0.
    Approve,
    /// A learning signal was found: print the tip to stderr, exit 2 so the
    /// host shows it to the user.
    Remind(String),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Approve => 0,
            Outcome::Remind(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_stop_payload() {
        let input = json!({
            "session_id": "sess-1",
            "transcript_path": "/tmp/transcript.jsonl",
            "cwd": "/home/user/project",
            "permission_mode": "default",
            "hook_event_name": "Stop",
            "stop_hook_active": true
        });
        let req = HookRequest::parse(&input.to_string()).unwrap();
        assert!(req.stop_hook_active);
        assert_eq!(req.transcript_path, "/tmp/transcript.jsonl");
    }

    #[test]
    fn missing_fields_default() {
        let req = HookRequest::parse("{}").unwrap();
        assert_eq!(req, HookRequest::default());
        assert!(!req.stop_hook_active);
        assert!(req.transcript_path.is_empty());
    }

    #[test]
    fn null_fields_default() {
        let req =
            HookRequest::parse(r#"{"stop_hook_active": null, "transcript_path": null}"#).unwrap();
        assert_eq!(req, HookRequest::default());
    }

    #[test]
    fn rejects_non_object_input() {
        assert!(HookRequest::parse("").is_err());
        assert!(HookRequest::parse("not json").is_err());
        assert!(HookRequest::parse("[1, 2]").is_err());
        assert!(HookRequest::parse(r#"{"stop_hook_active": "yes"}"#).is_err());
    }

    #[test]
    fn approve_serializes_compactly() {
        let out = serde_json::to_string(&HookOutput::approve()).unwrap();
        assert_eq!(out, r#"{"decision":"approve"}"#);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Approve.exit_code(), 0);
        assert_eq!(Outcome::Remind("tip".into()).exit_code(), 2);
    }
}
