use std::path::Path;

use crate::session::session_id;
use crate::signals::SignalDetector;
use crate::state::CheckpointStore;
use crate::transcript::{read_transcript, Transcript};
use crate::types::{HookRequest, Outcome};

/// Handles one Stop event: scans the user messages added since the last
/// checkpoint and decides whether to remind the user about `/autoskill`.
pub struct StopHook<S> {
    store: S,
    detector: SignalDetector,
    tip: String,
}

impl<S: CheckpointStore> StopHook<S> {
    pub fn new(store: S, detector: SignalDetector, tip: impl Into<String>) -> Self {
        Self {
            store,
            detector,
            tip: tip.into(),
        }
    }

    /// Run the hook on raw stdin. Input that doesn't parse approves.
    pub fn handle_input(&self, input: &str) -> Outcome {
        match HookRequest::parse(input) {
            Ok(request) => self.handle(&request),
            Err(err) => {
                tracing::warn!("approving unparseable input: {err:#}");
                Outcome::Approve
            }
        }
    }

    pub fn handle(&self, request: &HookRequest) -> Outcome {
        // Re-entrant stop (our own reminder caused this turn): never block again.
        if request.stop_hook_active {
            tracing::debug!("stop hook already active");
            return Outcome::Approve;
        }

        let path = Path::new(&request.transcript_path);
        if request.transcript_path.is_empty() || !path.exists() {
            tracing::debug!(transcript_path = %request.transcript_path, "no transcript");
            return Outcome::Approve;
        }

        let session = session_id(&request.transcript_path);
        let last_processed = self.store.load(&session);

        let transcript = read_transcript(path).unwrap_or_else(|err| {
            tracing::warn!("treating transcript as empty: {err:#}");
            Transcript::empty()
        });
        let messages = transcript.user_messages();
        if transcript.is_empty() {
            tracing::debug!("transcript has no entries");
        } else {
            tracing::debug!(
                entries = transcript.len(),
                rules = self.detector.rules().len(),
                "transcript loaded"
            );
        }
        let new_messages = messages.get(last_processed..).unwrap_or_default();
        tracing::debug!(
            session = %session,
            last_processed,
            total = messages.len(),
            new = new_messages.len(),
            "scanning user messages"
        );

        // Checkpoint before deciding so nothing is scanned twice.
        self.store.save(&session, messages.len());

        match self.detector.detect(new_messages) {
            Some(hit) => {
                tracing::info!(
                    session = %session,
                    group = %hit.group,
                    pattern = hit.pattern,
                    message = last_processed + hit.message_index,
                    "learning signal"
                );
                Outcome::Remind(self.tip.clone())
            }
            None => Outcome::Approve,
        }
    }
}
