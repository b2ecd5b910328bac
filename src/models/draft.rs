use chrono::{Local, NaiveDate, Timelike};
use serde::{Serialize, Serializer};

use super::enums::{SymptomFlag, TimeOfDay};

/// In-progress symptom selection for the current entry flow.
///
/// Flags are private so they can only change through [`SymptomDraft::set_flag`]
/// and [`SymptomDraft::toggle`]; they are exposed as 0/1.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomDraft {
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    #[serde(serialize_with = "flag_as_int")]
    fever: bool,
    pub fever_onset_date: Option<NaiveDate>,
    pub fever_temperature: Option<f64>,
    pub fever_days: Option<u32>,
    #[serde(serialize_with = "flag_as_int")]
    abdominal_pain: bool,
    #[serde(serialize_with = "flag_as_int")]
    chills: bool,
    #[serde(serialize_with = "flag_as_int")]
    cough: bool,
    pub cough_onset_date: Option<NaiveDate>,
    pub cough_days: Option<u32>,
    pub cough_severity: Option<String>,
    #[serde(serialize_with = "flag_as_int")]
    diarrhea: bool,
    #[serde(serialize_with = "flag_as_int")]
    difficulty_breathing: bool,
    #[serde(serialize_with = "flag_as_int")]
    headache: bool,
    #[serde(serialize_with = "flag_as_int")]
    muscle_aches: bool,
    #[serde(serialize_with = "flag_as_int")]
    sore_throat: bool,
    #[serde(serialize_with = "flag_as_int")]
    vomiting: bool,
    #[serde(serialize_with = "flag_as_int")]
    other: bool,
}

fn flag_as_int<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(*value as u8)
}

impl SymptomDraft {
    /// Empty draft for the given entry slot: no symptoms, no details.
    pub fn new(date: NaiveDate, time_of_day: TimeOfDay) -> Self {
        Self {
            date,
            time_of_day,
            fever: false,
            fever_onset_date: None,
            fever_temperature: None,
            fever_days: None,
            abdominal_pain: false,
            chills: false,
            cough: false,
            cough_onset_date: None,
            cough_days: None,
            cough_severity: None,
            diarrhea: false,
            difficulty_breathing: false,
            headache: false,
            muscle_aches: false,
            sore_throat: false,
            vomiting: false,
            other: false,
        }
    }

    /// Empty draft for today's local date and the current half of the day.
    pub fn starting_now() -> Self {
        let now = Local::now();
        Self::new(now.date_naive(), TimeOfDay::from_hour(now.hour()))
    }

    /// Composite record key: `<date>_<timeOfDay>`, e.g. `2024-01-01_AM`.
    pub fn record_key(&self) -> String {
        format!("{}_{}", self.date, self.time_of_day.as_str())
    }

    pub fn is_set(&self, flag: SymptomFlag) -> bool {
        *self.slot(flag)
    }

    /// Flag value as stored: 0 or 1.
    pub fn flag(&self, flag: SymptomFlag) -> u8 {
        self.is_set(flag) as u8
    }

    pub fn set_flag(&mut self, flag: SymptomFlag, present: bool) {
        *self.slot_mut(flag) = present;
    }

    /// Flips a flag and returns its new 0/1 value.
    pub fn toggle(&mut self, flag: SymptomFlag) -> u8 {
        let slot = self.slot_mut(flag);
        *slot = !*slot;
        *slot as u8
    }

    /// Flags currently set, in form order.
    pub fn selected(&self) -> Vec<SymptomFlag> {
        SymptomFlag::ALL
            .into_iter()
            .filter(|f| self.is_set(*f))
            .collect()
    }

    fn slot(&self, flag: SymptomFlag) -> &bool {
        match flag {
            SymptomFlag::Fever => &self.fever,
            SymptomFlag::AbdominalPain => &self.abdominal_pain,
            SymptomFlag::Chills => &self.chills,
            SymptomFlag::Cough => &self.cough,
            SymptomFlag::Diarrhea => &self.diarrhea,
            SymptomFlag::DifficultyBreathing => &self.difficulty_breathing,
            SymptomFlag::Headache => &self.headache,
            SymptomFlag::MuscleAches => &self.muscle_aches,
            SymptomFlag::SoreThroat => &self.sore_throat,
            SymptomFlag::Vomiting => &self.vomiting,
            SymptomFlag::Other => &self.other,
        }
    }

    fn slot_mut(&mut self, flag: SymptomFlag) -> &mut bool {
        match flag {
            SymptomFlag::Fever => &mut self.fever,
            SymptomFlag::AbdominalPain => &mut self.abdominal_pain,
            SymptomFlag::Chills => &mut self.chills,
            SymptomFlag::Cough => &mut self.cough,
            SymptomFlag::Diarrhea => &mut self.diarrhea,
            SymptomFlag::DifficultyBreathing => &mut self.difficulty_breathing,
            SymptomFlag::Headache => &mut self.headache,
            SymptomFlag::MuscleAches => &mut self.muscle_aches,
            SymptomFlag::SoreThroat => &mut self.sore_throat,
            SymptomFlag::Vomiting => &mut self.vomiting,
            SymptomFlag::Other => &mut self.other,
        }
    }
}

impl Default for SymptomDraft {
    fn default() -> Self {
        Self::starting_now()
    }
}
