use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::TimeOfDay;
use crate::models::*;

/// Appends one row to `SymptomLog`. The table is never updated or pruned.
pub fn insert_log_entry(conn: &Connection, entry: &SymptomLogEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO SymptomLog (date, timeOfDate, timestamp) VALUES (?1, ?2, ?3)",
        params![
            entry.date.to_string(),
            entry.time_of_day.as_str(),
            entry.timestamp,
        ],
    )?;
    Ok(())
}

/// Full log in submission order (oldest first).
pub fn list_log_entries(conn: &Connection) -> Result<Vec<SymptomLogEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT date, timeOfDate, timestamp FROM SymptomLog ORDER BY timestamp ASC, rowid ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (date, time_of_day, timestamp) = row?;
        entries.push(SymptomLogEntry {
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid log date {date}: {e}")))?,
            time_of_day: TimeOfDay::from_str(&time_of_day)?,
            timestamp,
        });
    }
    Ok(entries)
}
