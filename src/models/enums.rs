use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(TimeOfDay {
    Am => "AM",
    Pm => "PM",
});

impl TimeOfDay {
    /// AM before noon, PM from noon on.
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Am
        } else {
            Self::Pm
        }
    }
}

// Identifiers match the form's field names and the `Symptom` column names.
str_enum!(SymptomFlag {
    Fever => "fever",
    AbdominalPain => "abdominalPain",
    Chills => "chills",
    Cough => "cough",
    Diarrhea => "diarrhea",
    DifficultyBreathing => "difficultyBreathing",
    Headache => "headache",
    MuscleAches => "muscleAches",
    SoreThroat => "soreThroat",
    Vomiting => "vomiting",
    Other => "other",
});

impl SymptomFlag {
    /// Every flag, in the order the form lists them.
    pub const ALL: [SymptomFlag; 11] = [
        Self::Fever,
        Self::AbdominalPain,
        Self::Chills,
        Self::Cough,
        Self::Diarrhea,
        Self::DifficultyBreathing,
        Self::Headache,
        Self::MuscleAches,
        Self::SoreThroat,
        Self::Vomiting,
        Self::Other,
    ];

    /// Checkbox label shown to the patient.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fever => "Fever",
            Self::AbdominalPain => "Abdominal pain",
            Self::Chills => "Chills",
            Self::Cough => "Cough",
            Self::Diarrhea => "Diarrhea",
            Self::DifficultyBreathing => "Difficulty breathing",
            Self::Headache => "Headache",
            Self::MuscleAches => "Muscle aches / pains",
            Self::SoreThroat => "Sore throat",
            Self::Vomiting => "Vomiting",
            Self::Other => "Other",
        }
    }

    /// Fever and cough open a detail section (onset, days, temperature or severity).
    pub fn is_expandable(&self) -> bool {
        matches!(self, Self::Fever | Self::Cough)
    }
}
