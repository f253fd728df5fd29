use crate::{ActionReply, HttpOutcome, StorageSettings};

const GIB: u64 = 1 << 30;
const MIB: u64 = 1 << 20;

/// Display unit for a byte count, as submitted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeUnit {
    #[default]
    Mb,
    Gb,
}

impl SizeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeUnit::Mb => "mb",
            SizeUnit::Gb => "gb",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mb" => Some(SizeUnit::Mb),
            "gb" => Some(SizeUnit::Gb),
            _ => None,
        }
    }
}

/// Projects a canonical byte count into its display form: GB with one
/// decimal at or above 2^30 bytes, whole MB below. The value is kept as a
/// string because it is submitted back verbatim; the server owns the
/// reverse conversion.
pub fn project_bytes(bytes: u64) -> (String, SizeUnit) {
    if bytes >= GIB {
        (format!("{:.1}", bytes as f64 / GIB as f64), SizeUnit::Gb)
    } else {
        (format!("{:.0}", bytes as f64 / MIB as f64), SizeUnit::Mb)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SettingsStatus {
    #[default]
    Idle,
    Loading,
    Saving,
    Saved,
    Error(String),
}

/// The Settings modal form: four display fields plus a status line. Fields
/// are populated all-or-nothing from a load and preserved across a failed
/// save so the user can correct and retry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsForm {
    pub quota_value: String,
    pub quota_unit: SizeUnit,
    pub file_value: String,
    pub file_unit: SizeUnit,
    pub status: SettingsStatus,
}

impl SettingsForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) {
        self.status = SettingsStatus::Loading;
    }

    /// Applies the result of `GET /settings/storage`. Either all four
    /// projected fields are set and the status cleared, or none are touched.
    pub fn finish_load(&mut self, outcome: HttpOutcome<StorageSettings>) {
        let settings = match outcome {
            HttpOutcome::NetworkError => {
                self.status = SettingsStatus::Error("Network error".to_string());
                return;
            }
            HttpOutcome::Response { status, body } => {
                if !(200..300).contains(&status) {
                    self.status = SettingsStatus::Error(format!("Error ({status})"));
                    return;
                }
                match body {
                    Some(settings) => settings,
                    None => {
                        self.status = SettingsStatus::Error("Error (bad response)".to_string());
                        return;
                    }
                }
            }
        };
        let (quota_value, quota_unit) = project_bytes(settings.quota_bytes);
        let (file_value, file_unit) = project_bytes(settings.max_file_bytes);
        self.quota_value = quota_value;
        self.quota_unit = quota_unit;
        self.file_value = file_value;
        self.file_unit = file_unit;
        self.status = SettingsStatus::Idle;
    }

    pub fn begin_save(&mut self) {
        self.status = SettingsStatus::Saving;
    }

    /// Applies the result of `POST /settings/storage`. Returns `true` when
    /// the save succeeded and the view should be refreshed. Failure keeps
    /// the edited fields in place.
    pub fn finish_save(&mut self, outcome: HttpOutcome<ActionReply>) -> bool {
        let failure = match outcome {
            HttpOutcome::NetworkError => Some("Network error".to_string()),
            HttpOutcome::Response { status, body } => {
                let ok_status = (200..300).contains(&status);
                match body {
                    Some(ActionReply { ok: true, .. }) if ok_status => None,
                    Some(ActionReply { msg: Some(msg), .. }) => Some(msg),
                    _ => Some("Failed".to_string()),
                }
            }
        };
        match failure {
            Some(msg) => {
                self.status = SettingsStatus::Error(msg);
                false
            }
            None => {
                self.status = SettingsStatus::Saved;
                true
            }
        }
    }

    pub fn status_line(&self) -> String {
        match &self.status {
            SettingsStatus::Idle => String::new(),
            SettingsStatus::Loading => "Loading...".to_string(),
            SettingsStatus::Saving => "Saving...".to_string(),
            SettingsStatus::Saved => "Saved ✓".to_string(),
            SettingsStatus::Error(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mirrors the server's parse of a (value, unit) pair, the contract the
    // round trip is validated against.
    fn server_parse(value: &str, unit: SizeUnit) -> u64 {
        let v: f64 = value.parse().unwrap();
        match unit {
            SizeUnit::Mb => (v * MIB as f64) as u64,
            SizeUnit::Gb => (v * GIB as f64) as u64,
        }
    }

    fn loaded(quota_bytes: u64, max_file_bytes: u64) -> HttpOutcome<StorageSettings> {
        HttpOutcome::Response { status: 200, body: Some(StorageSettings { quota_bytes, max_file_bytes }) }
    }

    #[test]
    fn projection_examples() {
        assert_eq!(project_bytes(1073741824), ("1.0".to_string(), SizeUnit::Gb));
        assert_eq!(project_bytes(52428800), ("50".to_string(), SizeUnit::Mb));
        assert_eq!(project_bytes(1610612736), ("1.5".to_string(), SizeUnit::Gb));
    }

    #[test]
    fn projection_boundary_at_one_gib() {
        let (value, unit) = project_bytes(GIB - 1);
        assert_eq!(unit, SizeUnit::Mb);
        assert_eq!(value, "1024");
        assert_eq!(project_bytes(GIB).1, SizeUnit::Gb);
        assert_eq!(project_bytes(0), ("0".to_string(), SizeUnit::Mb));
    }

    #[test]
    fn load_populates_all_four_fields() {
        let mut form = SettingsForm::new();
        form.begin_load();
        assert_eq!(form.status_line(), "Loading...");
        form.finish_load(loaded(10 * GIB, 200 * MIB));
        assert_eq!(form.quota_value, "10.0");
        assert_eq!(form.quota_unit, SizeUnit::Gb);
        assert_eq!(form.file_value, "200");
        assert_eq!(form.file_unit, SizeUnit::Mb);
        assert_eq!(form.status_line(), "");
    }

    #[test]
    fn failed_load_leaves_the_form_unpopulated() {
        let mut form = SettingsForm::new();
        form.begin_load();
        form.finish_load(HttpOutcome::Response { status: 502, body: None });
        assert_eq!(form.quota_value, "");
        assert_eq!(form.file_value, "");
        assert_eq!(form.status_line(), "Error (502)");

        form.begin_load();
        form.finish_load(HttpOutcome::NetworkError);
        assert_eq!(form.quota_value, "");
        assert_eq!(form.status_line(), "Network error");
    }

    #[test]
    fn round_trip_without_edits_is_idempotent() {
        for bytes in [GIB, 50 * MIB, 3 * GIB / 2, 200 * MIB, 1181116006] {
            let (value, unit) = project_bytes(bytes);
            let stored = server_parse(&value, unit);
            // the server-held value may shift within display rounding, but
            // it must project back to the same display fields
            assert_eq!(project_bytes(stored), (value, unit), "bytes = {bytes}");
        }
    }

    #[test]
    fn save_failure_preserves_edits_and_prefers_server_message() {
        let mut form = SettingsForm::new();
        form.finish_load(loaded(GIB, 100 * MIB));
        form.quota_value = "2.5".to_string();
        form.begin_save();
        assert_eq!(form.status_line(), "Saving...");
        let refresh = form.finish_save(HttpOutcome::Response {
            status: 400,
            body: Some(ActionReply { ok: false, msg: Some("Invalid size value.".to_string()) }),
        });
        assert!(!refresh);
        assert_eq!(form.quota_value, "2.5");
        assert_eq!(form.status_line(), "Invalid size value.");
    }

    #[test]
    fn save_failure_without_message_falls_back() {
        let mut form = SettingsForm::new();
        assert!(!form.finish_save(HttpOutcome::Response { status: 200, body: None }));
        assert_eq!(form.status_line(), "Failed");
        assert!(!form.finish_save(HttpOutcome::NetworkError));
        assert_eq!(form.status_line(), "Network error");
    }

    #[test]
    fn successful_save_reports_and_requests_refresh() {
        let mut form = SettingsForm::new();
        let refresh = form.finish_save(HttpOutcome::Response {
            status: 200,
            body: Some(ActionReply { ok: true, msg: None }),
        });
        assert!(refresh);
        assert_eq!(form.status_line(), "Saved ✓");
    }
}
