//! Symptom journal — submission writer, history views and form options.
//!
//! `submit_draft` turns the current draft into one `Symptom` row and one
//! `SymptomLog` row inside a single transaction: either both land or
//! neither does.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{self, DatabaseError};
use crate::models::enums::{SymptomFlag, TimeOfDay};
use crate::models::*;

// ═══════════════════════════════════════════
// View types — serialised to the UI
// ═══════════════════════════════════════════

/// Returned after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub record_key: String,
    pub date: String,
    pub time_of_day: TimeOfDay,
    pub submitted_at_ms: i64,
}

/// A persisted record with its submission time, for history display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSymptom {
    pub record: SymptomRecord,
    /// Labels of the symptoms marked present.
    pub symptoms: Vec<String>,
    /// Latest log timestamp for this key, if any.
    pub submitted_at_ms: Option<i64>,
}

/// One checkbox on the symptom form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomOption {
    pub id: String,
    pub label: String,
    pub expandable: bool,
}

// ═══════════════════════════════════════════
// Submission
// ═══════════════════════════════════════════

/// Persists `draft` as one `Symptom` row plus one `SymptomLog` row.
///
/// Both inserts run in one transaction; on any error the transaction is
/// dropped without commit and nothing is written.
pub fn submit_draft(
    conn: &mut Connection,
    draft: &SymptomDraft,
    timestamp_ms: i64,
) -> Result<SubmissionReceipt, DatabaseError> {
    let record = SymptomRecord::from_draft(draft);
    let log_entry = SymptomLogEntry {
        date: draft.date,
        time_of_day: draft.time_of_day,
        timestamp: timestamp_ms,
    };

    let tx = conn.transaction()?;
    db::insert_symptom_record(&tx, &record)?;
    db::insert_log_entry(&tx, &log_entry)?;
    tx.commit()?;

    tracing::info!(
        key = %record.key,
        symptoms = record.present().len(),
        "Symptom record saved"
    );

    Ok(SubmissionReceipt {
        record_key: record.key,
        date: draft.date.to_string(),
        time_of_day: draft.time_of_day,
        submitted_at_ms: timestamp_ms,
    })
}

// ═══════════════════════════════════════════
// History
// ═══════════════════════════════════════════

/// All records joined with their latest submission time, most recent first.
///
/// Records without a log row (written outside this pathway) sort last.
pub fn fetch_symptom_history(conn: &Connection) -> Result<Vec<StoredSymptom>, DatabaseError> {
    let mut latest: HashMap<String, i64> = HashMap::new();
    for entry in db::list_log_entries(conn)? {
        let ts = latest.entry(entry.record_key()).or_insert(entry.timestamp);
        if entry.timestamp > *ts {
            *ts = entry.timestamp;
        }
    }

    let mut history: Vec<StoredSymptom> = db::list_symptom_records(conn)?
        .into_iter()
        .map(|record| StoredSymptom {
            symptoms: record
                .present()
                .iter()
                .map(|f| f.label().to_string())
                .collect(),
            submitted_at_ms: latest.get(&record.key).copied(),
            record,
        })
        .collect();

    history.sort_by(|a, b| b.submitted_at_ms.cmp(&a.submitted_at_ms));
    Ok(history)
}

/// The raw submission log, oldest first.
pub fn fetch_symptom_log(conn: &Connection) -> Result<Vec<SymptomLogEntry>, DatabaseError> {
    db::list_log_entries(conn)
}

// ═══════════════════════════════════════════
// Form options
// ═══════════════════════════════════════════

/// Checkbox list in display order.
pub fn symptom_options() -> Vec<SymptomOption> {
    SymptomFlag::ALL
        .iter()
        .map(|flag| SymptomOption {
            id: flag.as_str().to_string(),
            label: flag.label().to_string(),
            expandable: flag.is_expandable(),
        })
        .collect()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
