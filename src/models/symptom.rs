use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::draft::SymptomDraft;
use super::enums::{SymptomFlag, TimeOfDay};

/// One persisted row of the `Symptom` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecord {
    /// Composite key `<date>_<timeOfDay>`.
    pub key: String,
    pub fever: u8,
    pub fever_onset_date: Option<NaiveDate>,
    pub fever_temperature: Option<f64>,
    pub fever_days: Option<u32>,
    pub abdominal_pain: u8,
    pub chills: u8,
    pub cough: u8,
    pub cough_onset_date: Option<NaiveDate>,
    pub cough_days: Option<u32>,
    pub cough_severity: Option<String>,
    pub diarrhea: u8,
    pub difficulty_breathing: u8,
    pub headache: u8,
    pub muscle_aches: u8,
    pub sore_throat: u8,
    pub vomiting: u8,
    pub other: u8,
}

impl SymptomRecord {
    pub fn from_draft(draft: &SymptomDraft) -> Self {
        Self {
            key: draft.record_key(),
            fever: draft.flag(SymptomFlag::Fever),
            fever_onset_date: draft.fever_onset_date,
            fever_temperature: draft.fever_temperature,
            fever_days: draft.fever_days,
            abdominal_pain: draft.flag(SymptomFlag::AbdominalPain),
            chills: draft.flag(SymptomFlag::Chills),
            cough: draft.flag(SymptomFlag::Cough),
            cough_onset_date: draft.cough_onset_date,
            cough_days: draft.cough_days,
            cough_severity: draft.cough_severity.clone(),
            diarrhea: draft.flag(SymptomFlag::Diarrhea),
            difficulty_breathing: draft.flag(SymptomFlag::DifficultyBreathing),
            headache: draft.flag(SymptomFlag::Headache),
            muscle_aches: draft.flag(SymptomFlag::MuscleAches),
            sore_throat: draft.flag(SymptomFlag::SoreThroat),
            vomiting: draft.flag(SymptomFlag::Vomiting),
            other: draft.flag(SymptomFlag::Other),
        }
    }

    /// Flags recorded as present, in form order.
    pub fn present(&self) -> Vec<SymptomFlag> {
        let values = [
            self.fever,
            self.abdominal_pain,
            self.chills,
            self.cough,
            self.diarrhea,
            self.difficulty_breathing,
            self.headache,
            self.muscle_aches,
            self.sore_throat,
            self.vomiting,
            self.other,
        ];
        SymptomFlag::ALL
            .into_iter()
            .zip(values)
            .filter(|(_, v)| *v != 0)
            .map(|(f, _)| f)
            .collect()
    }
}

/// One row of the append-only `SymptomLog` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLogEntry {
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    /// Submission time, epoch milliseconds.
    pub timestamp: i64,
}

impl SymptomLogEntry {
    pub fn record_key(&self) -> String {
        format!("{}_{}", self.date, self.time_of_day.as_str())
    }
}
