#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

pub const TIP: &str = "Tip: Run /autoskill to capture this session's learnings";

/// Run the hook binary with `stdin_json` on stdin and an isolated state
/// directory. Returns (exit code, stdout, stderr).
pub fn run_cli(stdin_json: &str, state_dir: &Path) -> (i32, String, String) {
    run_cli_with_args(stdin_json, state_dir, &[])
}

pub fn run_cli_with_args(
    stdin_json: &str,
    state_dir: &Path,
    args: &[&str],
) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_autoskill-hook"))
        .args(args)
        .env("AUTOSKILL_STATE_DIR", state_dir)
        .env_remove("AUTOSKILL_CONFIG")
        .env_remove("AUTOSKILL_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin_json.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// A Stop payload as the host sends it.
pub fn stop_input(transcript_path: &Path) -> String {
    serde_json::json!({
        "session_id": "test-session",
        "transcript_path": transcript_path.to_str().unwrap(),
        "cwd": "/tmp",
        "permission_mode": "default",
        "hook_event_name": "Stop",
        "stop_hook_active": false
    })
    .to_string()
}

pub fn user_line(text: &str) -> String {
    serde_json::json!({
        "type": "user",
        "uuid": "u",
        "isSidechain": false,
        "userType": "external",
        "cwd": "/tmp",
        "sessionId": "s",
        "timestamp": "t",
        "version": "v",
        "message": { "role": "user", "content": text }
    })
    .to_string()
}

pub fn assistant_line(text: &str) -> String {
    serde_json::json!({
        "type": "assistant",
        "uuid": "a",
        "message": { "role": "assistant", "content": [ { "type": "text", "text": text } ] }
    })
    .to_string()
}

pub fn write_transcript(path: &Path, lines: &[String]) {
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents).unwrap();
}

/// The single checkpoint file in `state_dir`, parsed.
pub fn only_checkpoint(state_dir: &Path) -> Option<serde_json::Value> {
    let mut files: Vec<_> = fs::read_dir(state_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    assert!(files.len() <= 1, "expected at most one checkpoint, got {files:?}");
    let path = files.pop()?;
    let name = path.file_stem().unwrap().to_str().unwrap();
    assert_eq!(name.len(), 12, "checkpoint should be named by a 12-char id");
    Some(serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap())
}

pub fn processed_count(state_dir: &Path) -> Option<u64> {
    only_checkpoint(state_dir).and_then(|v| v["processed_count"].as_u64())
}

pub fn assert_approve(code: i32, stdout: &str, stderr: &str) {
    assert_eq!(code, 0, "expected exit 0, stderr: {stderr}");
    assert!(stderr.is_empty(), "expected no stderr, got: {stderr}");
    let output: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(output, serde_json::json!({ "decision": "approve" }));
    assert_eq!(stdout.lines().count(), 1);
}

pub fn assert_remind(code: i32, stdout: &str, stderr: &str) {
    assert_eq!(code, 2, "expected exit 2, stdout: {stdout}");
    assert!(stdout.is_empty(), "expected no stdout, got: {stdout}");
    assert_eq!(stderr, format!("{TIP}\n"));
}
