use crate::{HttpOutcome, UploadReply};

/// Phase of one upload session, from modal open to terminal classification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Preparing,
    Uploading(u8),
    Succeeded(u32),
    Failed(String),
}

/// Transient state of the Upload modal. Created when the modal opens and
/// dropped when it closes; exactly one request is in flight per session.
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    phase: UploadPhase,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.phase, UploadPhase::Preparing | UploadPhase::Uploading(_))
    }

    /// Guards submission. An empty candidate set fails synchronously with a
    /// user-visible message and must not reach the network; a session with a
    /// request already in flight rejects re-entrant submits.
    pub fn begin(&mut self, file_count: usize) -> Result<(), String> {
        if self.in_flight() {
            return Err("Upload already in progress.".to_string());
        }
        if file_count == 0 {
            return Err("Please select files first.".to_string());
        }
        self.phase = UploadPhase::Preparing;
        Ok(())
    }

    /// Applies one transfer progress event. When the total is unknown the
    /// phase keeps its last value; the percent never decreases and stays in
    /// 0..=100.
    pub fn progress(&mut self, bytes_sent: u64, bytes_total: u64) {
        if !self.in_flight() || bytes_total == 0 {
            return;
        }
        let percent = ((bytes_sent.min(bytes_total) * 100) / bytes_total) as u8;
        let floor = match self.phase {
            UploadPhase::Uploading(p) => p,
            _ => 0,
        };
        self.phase = UploadPhase::Uploading(percent.max(floor));
    }

    /// Classifies the terminal outcome. Returns `true` when the upload
    /// succeeded and the view should be refreshed.
    pub fn finish(&mut self, outcome: HttpOutcome<UploadReply>) -> bool {
        self.phase = match outcome {
            HttpOutcome::NetworkError => UploadPhase::Failed("Network error".to_string()),
            HttpOutcome::Response { status, .. } if !(200..300).contains(&status) => {
                UploadPhase::Failed(format!("Error ({status})"))
            }
            HttpOutcome::Response { body, .. } => match body {
                Some(UploadReply { ok: true, saved, .. }) => {
                    UploadPhase::Succeeded(saved.unwrap_or(0))
                }
                Some(UploadReply { msg: Some(msg), .. }) => UploadPhase::Failed(msg),
                _ => UploadPhase::Failed("Upload failed".to_string()),
            },
        };
        matches!(self.phase, UploadPhase::Succeeded(_))
    }

    pub fn status_line(&self) -> String {
        match &self.phase {
            UploadPhase::Idle => String::new(),
            UploadPhase::Preparing => "Preparing...".to_string(),
            UploadPhase::Uploading(percent) => format!("Uploading... {percent}%"),
            UploadPhase::Succeeded(count) => format!("Done ✓ ({count} files)"),
            UploadPhase::Failed(reason) => reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(ok: bool, saved: Option<u32>, msg: Option<&str>) -> UploadReply {
        UploadReply { ok, saved, msg: msg.map(str::to_string) }
    }

    #[test]
    fn empty_set_is_rejected_before_any_io() {
        let mut session = UploadSession::new();
        let err = session.begin(0).unwrap_err();
        assert_eq!(err, "Please select files first.");
        assert_eq!(*session.phase(), UploadPhase::Idle);
    }

    #[test]
    fn reentrant_submit_is_rejected_while_in_flight() {
        let mut session = UploadSession::new();
        session.begin(2).unwrap();
        assert!(session.begin(2).is_err());
        session.progress(10, 100);
        assert!(session.begin(2).is_err());
    }

    #[test]
    fn progress_is_floored_monotone_and_bounded() {
        let mut session = UploadSession::new();
        session.begin(1).unwrap();
        session.progress(999, 1000);
        assert_eq!(*session.phase(), UploadPhase::Uploading(99));
        // a late event with fewer bytes must not move the percent backwards
        session.progress(500, 1000);
        assert_eq!(*session.phase(), UploadPhase::Uploading(99));
        session.progress(2000, 1000);
        assert_eq!(*session.phase(), UploadPhase::Uploading(100));
    }

    #[test]
    fn unknown_total_keeps_last_phase() {
        let mut session = UploadSession::new();
        session.begin(1).unwrap();
        session.progress(512, 0);
        assert_eq!(*session.phase(), UploadPhase::Preparing);
        session.progress(40, 100);
        session.progress(512, 0);
        assert_eq!(*session.phase(), UploadPhase::Uploading(40));
    }

    #[test]
    fn three_files_saved_yields_done_message_and_refresh() {
        let mut session = UploadSession::new();
        session.begin(3).unwrap();
        let refresh = session.finish(HttpOutcome::Response {
            status: 200,
            body: Some(reply(true, Some(3), None)),
        });
        assert!(refresh);
        assert_eq!(session.status_line(), "Done ✓ (3 files)");
    }

    #[test]
    fn transport_failure_reads_network_error() {
        let mut session = UploadSession::new();
        session.begin(1).unwrap();
        assert!(!session.finish(HttpOutcome::NetworkError));
        assert_eq!(session.status_line(), "Network error");
    }

    #[test]
    fn non_success_status_embeds_the_code() {
        let mut session = UploadSession::new();
        session.begin(1).unwrap();
        session.finish(HttpOutcome::Response { status: 413, body: Some(reply(false, None, None)) });
        assert_eq!(session.status_line(), "Error (413)");
    }

    #[test]
    fn not_ok_body_prefers_server_message() {
        let mut session = UploadSession::new();
        session.begin(1).unwrap();
        session.finish(HttpOutcome::Response {
            status: 200,
            body: Some(reply(false, None, Some("Storage quota exceeded."))),
        });
        assert_eq!(session.status_line(), "Storage quota exceeded.");
    }

    #[test]
    fn unparseable_body_falls_back_instead_of_crashing() {
        let mut session = UploadSession::new();
        session.begin(1).unwrap();
        let refresh = session.finish(HttpOutcome::Response { status: 200, body: None });
        assert!(!refresh);
        assert_eq!(session.status_line(), "Upload failed");
    }
}
