use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

const SELECT_COLUMNS: &str = "date, fever, feverOnsetDate, feverTemperature, feverDays,
     abdominalPain, chills, cough, coughOnsetDate, coughDays, coughSeverity, diarrhea,
     difficultyBreathing, headache, muscleAches, soreThroat, vomiting, other";

/// Inserts one `Symptom` row. The composite key goes in the `date` column.
///
/// A second insert for the same key fails with `DuplicateRecord`.
pub fn insert_symptom_record(conn: &Connection, record: &SymptomRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO Symptom (date, fever, feverOnsetDate, feverTemperature, feverDays,
         abdominalPain, chills, cough, coughOnsetDate, coughDays, coughSeverity, diarrhea,
         difficultyBreathing, headache, muscleAches, soreThroat, vomiting, other)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            record.key,
            record.fever,
            record.fever_onset_date.map(|d| d.to_string()),
            record.fever_temperature,
            record.fever_days,
            record.abdominal_pain,
            record.chills,
            record.cough,
            record.cough_onset_date.map(|d| d.to_string()),
            record.cough_days,
            record.cough_severity,
            record.diarrhea,
            record.difficulty_breathing,
            record.headache,
            record.muscle_aches,
            record.sore_throat,
            record.vomiting,
            record.other,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == ErrorCode::ConstraintViolation
                && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) =>
        {
            DatabaseError::DuplicateRecord {
                key: record.key.clone(),
            }
        }
        other => DatabaseError::Sqlite(other),
    })?;
    Ok(())
}

pub fn get_symptom_record(conn: &Connection, key: &str) -> Result<Option<SymptomRecord>, DatabaseError> {
    let record = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM Symptom WHERE date = ?1"),
            params![key],
            row_to_record,
        )
        .optional()?;
    Ok(record)
}

/// All records, newest key first.
pub fn list_symptom_records(conn: &Connection) -> Result<Vec<SymptomRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM Symptom ORDER BY date DESC"
    ))?;
    let rows = stmt.query_map([], row_to_record)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SymptomRecord> {
    Ok(SymptomRecord {
        key: row.get(0)?,
        fever: row.get(1)?,
        fever_onset_date: parse_optional_date(row, 2)?,
        fever_temperature: row.get(3)?,
        fever_days: row.get(4)?,
        abdominal_pain: row.get(5)?,
        chills: row.get(6)?,
        cough: row.get(7)?,
        cough_onset_date: parse_optional_date(row, 8)?,
        cough_days: row.get(9)?,
        cough_severity: row.get(10)?,
        diarrhea: row.get(11)?,
        difficulty_breathing: row.get(12)?,
        headache: row.get(13)?,
        muscle_aches: row.get(14)?,
        sore_throat: row.get(15)?,
        vomiting: row.get(16)?,
        other: row.get(17)?,
    })
}

/// Stored dates must be `YYYY-MM-DD`; anything else is a conversion error.
fn parse_optional_date(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}
