//! Symptom form commands.
//!
//! - `handle_checkbox_press`: flips a checkbox given the value the UI rendered
//! - `toggle_symptom`: flips a checkbox from the value held in the draft
//! - `update_symptom`: merges one `{field, value}` pair (detail sections)
//! - `get_symptom_draft` / `start_symptom_entry`: read or reset the draft
//! - `submit_form`: persists the draft ("Next")
//! - `get_symptom_history` / `get_symptom_log`: read back submissions
//! - `get_symptom_options`: the checkbox list (static data)

use std::str::FromStr;

use crate::core_state::{CoreError, CoreState, SymptomUpdate};
use crate::journal::{self, StoredSymptom, SubmissionReceipt, SymptomOption};
use crate::models::enums::SymptomFlag;
use crate::models::{SymptomDraft, SymptomLogEntry};

/// Checkbox press: sets `field` to the flipped `current_value` (0 → 1, else → 0).
pub fn handle_checkbox_press(
    state: &CoreState,
    field: &str,
    current_value: u8,
) -> Result<SymptomDraft, String> {
    let flag = parse_flag(field)?;
    let next = if current_value == 0 { 1 } else { 0 };
    state
        .update_symptom(&SymptomUpdate::new(flag.as_str(), next))
        .map_err(|e| e.to_string())
}

/// Flips `field` based on the draft's own value.
pub fn toggle_symptom(state: &CoreState, field: &str) -> Result<SymptomDraft, String> {
    let flag = parse_flag(field)?;
    state.toggle_flag(flag).map_err(|e| e.to_string())
}

pub fn update_symptom(state: &CoreState, update: SymptomUpdate) -> Result<SymptomDraft, String> {
    state.update_symptom(&update).map_err(|e| e.to_string())
}

pub fn get_symptom_draft(state: &CoreState) -> Result<SymptomDraft, String> {
    state.read_draft().map_err(|e| e.to_string())
}

/// Begins a new entry flow with an empty draft.
pub fn start_symptom_entry(state: &CoreState) -> Result<SymptomDraft, String> {
    state.reset_draft().map_err(|e| e.to_string())
}

/// Persists the current draft. Rejected while a previous submit is running.
pub fn submit_form(state: &CoreState) -> Result<SubmissionReceipt, String> {
    state.submit().map_err(|e| e.to_string())
}

pub fn get_symptom_history(state: &CoreState) -> Result<Vec<StoredSymptom>, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    journal::fetch_symptom_history(&conn).map_err(|e| e.to_string())
}

pub fn get_symptom_log(state: &CoreState) -> Result<Vec<SymptomLogEntry>, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    journal::fetch_symptom_log(&conn).map_err(|e| e.to_string())
}

pub fn get_symptom_options() -> Vec<SymptomOption> {
    journal::symptom_options()
}

fn parse_flag(field: &str) -> Result<SymptomFlag, String> {
    SymptomFlag::from_str(field).map_err(|_| CoreError::UnknownField(field.to_string()).to_string())
}
