use crate::{ActionReply, HttpOutcome};

/// Per-row state of the delete control. Rows are independent; the lock is
/// scoped to one file id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Ready,
    Confirmed,
    InFlight,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteVerdict {
    /// The file is gone; the caller refreshes the view.
    Removed,
    /// The row was restored to Ready with this user-visible message.
    Failed(String),
}

/// Confirm → lock → request → unlock-or-finalize state machine for one
/// file row.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRow {
    id: u64,
    state: DeleteState,
}

impl DeleteRow {
    pub fn new(id: u64) -> Self {
        DeleteRow { id, state: DeleteState::Ready }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> DeleteState {
        self.state
    }

    /// Records the user's answer to the confirmation prompt. Returns `true`
    /// only when the row was Ready and the user accepted; declining leaves
    /// the state untouched and sends nothing.
    pub fn confirm(&mut self, accepted: bool) -> bool {
        if accepted && self.state == DeleteState::Ready {
            self.state = DeleteState::Confirmed;
            true
        } else {
            false
        }
    }

    /// Locks the row while its request is outstanding.
    pub fn begin(&mut self) {
        if self.state == DeleteState::Confirmed {
            self.state = DeleteState::InFlight;
        }
    }

    /// Classifies the outcome of `POST /files/{id}/delete`. Any failure
    /// restores the row to Ready; no stuck lock state is possible.
    pub fn finish(&mut self, outcome: HttpOutcome<ActionReply>) -> DeleteVerdict {
        let failure = match outcome {
            HttpOutcome::NetworkError => Some("Network error".to_string()),
            HttpOutcome::Response { status, body } => {
                let ok_status = (200..300).contains(&status);
                match body {
                    Some(ActionReply { ok: true, .. }) if ok_status => None,
                    Some(ActionReply { msg: Some(msg), .. }) => Some(msg),
                    _ => Some(format!("Delete failed ({status})")),
                }
            }
        };
        match failure {
            Some(msg) => {
                self.state = DeleteState::Ready;
                DeleteVerdict::Failed(msg)
            }
            None => {
                self.state = DeleteState::Removed;
                DeleteVerdict::Removed
            }
        }
    }

    pub fn control_enabled(&self) -> bool {
        self.state == DeleteState::Ready
    }

    pub fn control_label(&self) -> &'static str {
        match self.state {
            DeleteState::Confirmed | DeleteState::InFlight => "Deleting...",
            _ => "Delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decline_sends_nothing_and_stays_ready() {
        let mut row = DeleteRow::new(7);
        assert!(!row.confirm(false));
        assert_eq!(row.state(), DeleteState::Ready);
        assert!(row.control_enabled());
        assert_eq!(row.control_label(), "Delete");
    }

    #[test]
    fn confirm_locks_the_row_against_duplicates() {
        let mut row = DeleteRow::new(7);
        assert!(row.confirm(true));
        row.begin();
        assert_eq!(row.state(), DeleteState::InFlight);
        assert!(!row.control_enabled());
        assert_eq!(row.control_label(), "Deleting...");
        // a second click while in flight cannot start another request
        assert!(!row.confirm(true));
    }

    #[test]
    fn server_500_with_unparseable_body_restores_the_row() {
        let mut row = DeleteRow::new(3);
        row.confirm(true);
        row.begin();
        let verdict = row.finish(HttpOutcome::Response { status: 500, body: None });
        assert_eq!(verdict, DeleteVerdict::Failed("Delete failed (500)".to_string()));
        assert_eq!(row.state(), DeleteState::Ready);
        assert!(row.control_enabled());
        assert_eq!(row.control_label(), "Delete");
    }

    #[test]
    fn failure_prefers_server_message() {
        let mut row = DeleteRow::new(3);
        row.confirm(true);
        row.begin();
        let verdict = row.finish(HttpOutcome::Response {
            status: 404,
            body: Some(ActionReply { ok: false, msg: Some("File not found.".to_string()) }),
        });
        assert_eq!(verdict, DeleteVerdict::Failed("File not found.".to_string()));
    }

    #[test]
    fn network_error_restores_with_generic_message() {
        let mut row = DeleteRow::new(9);
        row.confirm(true);
        row.begin();
        let verdict = row.finish(HttpOutcome::NetworkError);
        assert_eq!(verdict, DeleteVerdict::Failed("Network error".to_string()));
        assert!(row.control_enabled());
    }

    #[test]
    fn success_finalizes_the_row() {
        let mut row = DeleteRow::new(1);
        row.confirm(true);
        row.begin();
        let verdict = row.finish(HttpOutcome::Response {
            status: 200,
            body: Some(ActionReply { ok: true, msg: None }),
        });
        assert_eq!(verdict, DeleteVerdict::Removed);
        assert_eq!(row.state(), DeleteState::Removed);
        assert!(!row.control_enabled());
    }
}
