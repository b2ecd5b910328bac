//! Transport-agnostic application state for the symptom entry flow.
//!
//! `CoreState` owns the current draft and the path of the local store.
//! The UI shell holds one instance (typically in an `Arc`) and hands it to
//! every command instead of mutating a process-wide global.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;
use crate::db;
use crate::journal::{self, SubmissionReceipt};
use crate::models::enums::{SymptomFlag, TimeOfDay};
use crate::models::SymptomDraft;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// Draft for the entry flow in progress.
    draft: RwLock<SymptomDraft>,
    /// SQLite file holding `Symptom` and `SymptomLog`.
    pub db_path: PathBuf,
    /// Set for the whole duration of a submission.
    submitting: AtomicBool,
}

impl CoreState {
    /// State backed by the default database location.
    pub fn new() -> Self {
        Self::with_db_path(config::database_path())
    }

    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            draft: RwLock::new(SymptomDraft::starting_now()),
            db_path,
            submitting: AtomicBool::new(false),
        }
    }

    // ── Draft access ────────────────────────────────────────

    /// Snapshot of the current draft.
    pub fn read_draft(&self) -> Result<SymptomDraft, CoreError> {
        let guard = self.draft.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(guard.clone())
    }

    /// Merges one field/value pair into the draft and returns the result.
    pub fn update_symptom(&self, update: &SymptomUpdate) -> Result<SymptomDraft, CoreError> {
        let mut guard = self.draft.write().map_err(|_| CoreError::LockPoisoned)?;
        apply_update(&mut guard, update)?;
        tracing::debug!(field = %update.field, "Draft field updated");
        Ok(guard.clone())
    }

    /// Flips a flag based on the value currently held in the draft.
    pub fn toggle_flag(&self, flag: SymptomFlag) -> Result<SymptomDraft, CoreError> {
        let mut guard = self.draft.write().map_err(|_| CoreError::LockPoisoned)?;
        let value = guard.toggle(flag);
        tracing::debug!(field = %flag, value, "Draft flag toggled");
        Ok(guard.clone())
    }

    /// Starts a new entry flow with an empty draft for the current time.
    pub fn reset_draft(&self) -> Result<SymptomDraft, CoreError> {
        self.replace_draft(SymptomDraft::starting_now())
    }

    pub fn replace_draft(&self, draft: SymptomDraft) -> Result<SymptomDraft, CoreError> {
        let mut guard = self.draft.write().map_err(|_| CoreError::LockPoisoned)?;
        *guard = draft;
        Ok(guard.clone())
    }

    // ── Store access ────────────────────────────────────────

    /// Open a connection to the local store (migrated, ready to use).
    ///
    /// The connection closes when dropped.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    // ── Submission ──────────────────────────────────────────

    /// Claim the submission slot without blocking.
    ///
    /// Fails with `SubmissionInProgress` while another guard is alive.
    pub fn begin_submission(&self) -> Result<SubmissionGuard<'_>, CoreError> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::SubmissionInProgress)?;
        Ok(SubmissionGuard {
            submitting: &self.submitting,
        })
    }

    /// Is a submission currently in flight? Never blocks a submitter.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Persist the current draft: one record plus one log row, atomically.
    ///
    /// The draft is left untouched so it stays available to later screens.
    pub fn submit(&self) -> Result<SubmissionReceipt, CoreError> {
        let _guard = self.begin_submission().inspect_err(|e| {
            if matches!(e, CoreError::SubmissionInProgress) {
                tracing::warn!("Submission ignored: previous submission still in flight");
            }
        })?;

        let draft = self.read_draft()?;
        let mut conn = self.open_db()?;
        let timestamp_ms = Utc::now().timestamp_millis();

        journal::submit_draft(&mut conn, &draft, timestamp_ms).map_err(|e| {
            if let db::DatabaseError::DuplicateRecord { ref key } = e {
                tracing::warn!(%key, "Symptom record already submitted");
            }
            CoreError::Database(e)
        })
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// SubmissionGuard — RAII re-entrancy token
// ═══════════════════════════════════════════════════════════

/// Dropping the guard lets the next submission through.
pub struct SubmissionGuard<'a> {
    submitting: &'a AtomicBool,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.submitting.store(false, Ordering::Release);
        tracing::debug!("Submission slot released");
    }
}

// ═══════════════════════════════════════════════════════════
// Field updates
// ═══════════════════════════════════════════════════════════

/// One `{field, value}` pair dispatched by the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomUpdate {
    pub field: String,
    pub value: Value,
}

impl SymptomUpdate {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

fn apply_update(draft: &mut SymptomDraft, update: &SymptomUpdate) -> Result<(), CoreError> {
    let field = update.field.as_str();
    let value = &update.value;

    if let Ok(flag) = SymptomFlag::from_str(field) {
        draft.set_flag(flag, parse_flag(field, value)?);
        return Ok(());
    }

    match field {
        "date" => {
            draft.date = parse_optional_date(field, value)?
                .ok_or_else(|| invalid(field, "date is required"))?;
        }
        "timeOfDay" => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid(field, "expected \"AM\" or \"PM\""))?;
            draft.time_of_day =
                TimeOfDay::from_str(s).map_err(|_| invalid(field, "expected \"AM\" or \"PM\""))?;
        }
        "feverOnsetDate" => draft.fever_onset_date = parse_optional_date(field, value)?,
        "coughOnsetDate" => draft.cough_onset_date = parse_optional_date(field, value)?,
        "feverTemperature" => draft.fever_temperature = parse_optional_number(field, value)?,
        "feverDays" => draft.fever_days = parse_optional_days(field, value)?,
        "coughDays" => draft.cough_days = parse_optional_days(field, value)?,
        "coughSeverity" => draft.cough_severity = parse_optional_text(field, value)?,
        _ => return Err(CoreError::UnknownField(field.to_string())),
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> CoreError {
    CoreError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_flag(field: &str, value: &Value) -> Result<bool, CoreError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid(field, "flag must be 0 or 1")),
        },
        _ => Err(invalid(field, "flag must be 0 or 1")),
    }
}

fn parse_optional_date(field: &str, value: &Value) -> Result<Option<NaiveDate>, CoreError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(field, "expected YYYY-MM-DD")),
        _ => Err(invalid(field, "expected YYYY-MM-DD")),
    }
}

fn parse_optional_number(field: &str, value: &Value) -> Result<Option<f64>, CoreError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|t| t.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(field, "expected a finite number")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(field, "expected a finite number")),
        _ => Err(invalid(field, "expected a finite number")),
    }
}

fn parse_optional_days(field: &str, value: &Value) -> Result<Option<u32>, CoreError> {
    let reason = "expected a non-negative whole number of days";
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .map(Some)
            .ok_or_else(|| invalid(field, reason)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| invalid(field, reason)),
        _ => Err(invalid(field, reason)),
    }
}

/// Upper bound for free-text detail fields.
const MAX_TEXT_LEN: usize = 50;

fn parse_optional_text(field: &str, value: &Value) -> Result<Option<String>, CoreError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) if s.trim().chars().count() > MAX_TEXT_LEN => Err(invalid(
            field,
            &format!("must be {MAX_TEXT_LEN} characters or fewer"),
        )),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        _ => Err(invalid(field, "expected text")),
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("A submission is already in progress")]
    SubmissionInProgress,
    #[error("Unknown symptom field: {0}")]
    UnknownField(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_state() -> (tempfile::TempDir, CoreState) {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::with_db_path(dir.path().join("symptoms.db"));
        (dir, state)
    }

    fn jan_first_am() -> SymptomDraft {
        SymptomDraft::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), TimeOfDay::Am)
    }

    fn count(state: &CoreState, table: &str) -> i64 {
        let conn = state.open_db().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    // ── field updates ───────────────────────────────────────

    #[test]
    fn new_state_starts_with_empty_draft() {
        let (_dir, state) = temp_state();
        let draft = state.read_draft().unwrap();
        assert!(draft.selected().is_empty());
        assert!(!state.is_submitting());
    }

    #[test]
    fn update_sets_flag_from_int_and_bool() {
        let (_dir, state) = temp_state();
        let d = state.update_symptom(&SymptomUpdate::new("chills", 1)).unwrap();
        assert_eq!(d.flag(SymptomFlag::Chills), 1);
        let d = state.update_symptom(&SymptomUpdate::new("chills", false)).unwrap();
        assert_eq!(d.flag(SymptomFlag::Chills), 0);
    }

    #[test]
    fn update_rejects_out_of_range_flag() {
        let (_dir, state) = temp_state();
        let err = state.update_symptom(&SymptomUpdate::new("fever", 2)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { .. }));
        assert_eq!(state.read_draft().unwrap().flag(SymptomFlag::Fever), 0);
    }

    #[test]
    fn update_unknown_field_is_typed_error() {
        let (_dir, state) = temp_state();
        let err = state.update_symptom(&SymptomUpdate::new("sneezing", 1)).unwrap_err();
        assert!(matches!(err, CoreError::UnknownField(ref f) if f == "sneezing"));
    }

    #[test]
    fn update_detail_fields() {
        let (_dir, state) = temp_state();
        state.update_symptom(&SymptomUpdate::new("date", "2024-01-01")).unwrap();
        state.update_symptom(&SymptomUpdate::new("timeOfDay", "PM")).unwrap();
        state.update_symptom(&SymptomUpdate::new("feverOnsetDate", "2023-12-31")).unwrap();
        state.update_symptom(&SymptomUpdate::new("feverTemperature", json!(38.2))).unwrap();
        state.update_symptom(&SymptomUpdate::new("feverDays", "3")).unwrap();
        state.update_symptom(&SymptomUpdate::new("coughSeverity", "Moderate")).unwrap();

        let d = state.read_draft().unwrap();
        assert_eq!(d.record_key(), "2024-01-01_PM");
        assert_eq!(d.fever_onset_date, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(d.fever_temperature, Some(38.2));
        assert_eq!(d.fever_days, Some(3));
        assert_eq!(d.cough_severity.as_deref(), Some("Moderate"));

        state.update_symptom(&SymptomUpdate::new("feverDays", Value::Null)).unwrap();
        assert_eq!(state.read_draft().unwrap().fever_days, None);
    }

    #[test]
    fn update_rejects_malformed_values() {
        let (_dir, state) = temp_state();
        for (field, value) in [
            ("date", json!("01/01/2024")),
            ("date", Value::Null),
            ("timeOfDay", json!("noon")),
            ("coughDays", json!(-1)),
            ("feverTemperature", json!("hot")),
            ("coughSeverity", json!(3)),
            ("coughSeverity", json!("x".repeat(MAX_TEXT_LEN + 1))),
            ("feverTemperature", json!("NaN")),
            ("feverTemperature", json!("inf")),
            ("feverTemperature", json!("-inf")),
        ] {
            let err = state.update_symptom(&SymptomUpdate::new(field, value)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidValue { .. }), "{field}");
        }
    }

    #[test]
    fn non_finite_temperature_leaves_draft_unchanged() {
        let (_dir, state) = temp_state();
        state.replace_draft(jan_first_am()).unwrap();
        state.update_symptom(&SymptomUpdate::new("feverTemperature", "38.5")).unwrap();
        assert!(state.update_symptom(&SymptomUpdate::new("feverTemperature", "NaN")).is_err());

        state.submit().unwrap();
        let conn = state.open_db().unwrap();
        let record = db::get_symptom_record(&conn, "2024-01-01_AM").unwrap().unwrap();
        assert_eq!(record.fever_temperature, Some(38.5));
    }

    #[test]
    fn cough_severity_at_limit_is_accepted() {
        let (_dir, state) = temp_state();
        let text = "m".repeat(MAX_TEXT_LEN);
        let d = state.update_symptom(&SymptomUpdate::new("coughSeverity", text.clone())).unwrap();
        assert_eq!(d.cough_severity, Some(text));
    }

    #[test]
    fn update_deserializes_from_dispatch_payload() {
        let (_dir, state) = temp_state();
        let update: SymptomUpdate =
            serde_json::from_str(r#"{"field":"soreThroat","value":1}"#).unwrap();
        let d = state.update_symptom(&update).unwrap();
        assert_eq!(d.flag(SymptomFlag::SoreThroat), 1);
    }

    #[test]
    fn toggle_flag_flips_stored_value() {
        let (_dir, state) = temp_state();
        assert_eq!(state.toggle_flag(SymptomFlag::Headache).unwrap().flag(SymptomFlag::Headache), 1);
        assert_eq!(state.toggle_flag(SymptomFlag::Headache).unwrap().flag(SymptomFlag::Headache), 0);
    }

    #[test]
    fn reset_draft_clears_selection() {
        let (_dir, state) = temp_state();
        state.toggle_flag(SymptomFlag::Vomiting).unwrap();
        let d = state.reset_draft().unwrap();
        assert!(d.selected().is_empty());
    }

    // ── submission ──────────────────────────────────────────

    #[test]
    fn submit_persists_and_keeps_draft() {
        let (_dir, state) = temp_state();
        let mut draft = jan_first_am();
        draft.set_flag(SymptomFlag::Fever, true);
        state.replace_draft(draft.clone()).unwrap();

        let before = Utc::now().timestamp_millis();
        let receipt = state.submit().unwrap();
        let after = Utc::now().timestamp_millis();

        assert_eq!(receipt.record_key, "2024-01-01_AM");
        assert_eq!(receipt.date, "2024-01-01");
        assert!(receipt.submitted_at_ms >= before && receipt.submitted_at_ms <= after);
        assert_eq!(count(&state, "Symptom"), 1);
        assert_eq!(count(&state, "SymptomLog"), 1);
        assert_eq!(state.read_draft().unwrap(), draft);
        assert!(!state.is_submitting());
    }

    #[test]
    fn second_submit_of_same_draft_is_duplicate() {
        let (_dir, state) = temp_state();
        state.replace_draft(jan_first_am()).unwrap();
        state.submit().unwrap();

        let err = state.submit().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Database(db::DatabaseError::DuplicateRecord { .. })
        ));
        assert_eq!(count(&state, "Symptom"), 1);
        assert_eq!(count(&state, "SymptomLog"), 1);
        assert!(!state.is_submitting());
    }

    #[test]
    fn submit_rejected_while_another_is_in_flight() {
        let (_dir, state) = temp_state();
        state.replace_draft(jan_first_am()).unwrap();

        let guard = state.begin_submission().unwrap();
        assert!(state.is_submitting());
        let err = state.submit().unwrap_err();
        assert!(matches!(err, CoreError::SubmissionInProgress));
        assert_eq!(count(&state, "Symptom"), 0);

        drop(guard);
        assert!(!state.is_submitting());
        assert!(state.submit().is_ok());
    }

    #[test]
    fn checking_in_flight_state_does_not_claim_the_slot() {
        let (_dir, state) = temp_state();
        state.replace_draft(jan_first_am()).unwrap();
        assert!(!state.is_submitting());
        let guard = state.begin_submission().unwrap();
        assert!(matches!(
            state.begin_submission(),
            Err(CoreError::SubmissionInProgress)
        ));
        drop(guard);
        assert!(state.begin_submission().is_ok());
    }

    #[test]
    fn submit_surfaces_store_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the database file should be cannot be opened.
        let state = CoreState::with_db_path(dir.path().to_path_buf());
        let err = state.submit().unwrap_err();
        assert!(matches!(err, CoreError::Database(_)));
        assert!(!state.is_submitting());
    }
}
