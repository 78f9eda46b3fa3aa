//! Profile data models collected during intake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::nutrition;

/// Biological sex used by the BMR formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Canonical display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Case-insensitive match against the canonical labels.
    pub fn parse(input: &str) -> Option<Self> {
        match_label(&Self::ALL, input, Self::label)
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Daily activity level. Each level scales BMR by a fixed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    NoActivity,
    Minimal,
    Medium,
    AboveAverage,
    High,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::NoActivity,
        ActivityLevel::Minimal,
        ActivityLevel::Medium,
        ActivityLevel::AboveAverage,
        ActivityLevel::High,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoActivity => "No activity",
            Self::Minimal => "Minimal activity",
            Self::Medium => "Medium activity",
            Self::AboveAverage => "Above average activity",
            Self::High => "High activity",
        }
    }

    /// TDEE multiplier applied to BMR.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::NoActivity => 1.2,
            Self::Minimal => 1.375,
            Self::Medium => 1.55,
            Self::AboveAverage => 1.725,
            Self::High => 1.9,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match_label(&Self::ALL, input, Self::label)
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user wants to do with their weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    MaintainWeight,
    GainWeight,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::LoseWeight, Goal::MaintainWeight, Goal::GainWeight];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LoseWeight => "Lose weight",
            Self::MaintainWeight => "Maintain weight",
            Self::GainWeight => "Gain weight",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match_label(&Self::ALL, input, Self::label)
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Collapse whitespace runs and compare case-insensitively, so " lose   WEIGHT "
/// still matches "Lose weight".
fn match_label<T: Copy>(options: &[T], input: &str, label: fn(&T) -> &'static str) -> Option<T> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    options
        .iter()
        .find(|opt| label(*opt).eq_ignore_ascii_case(&normalized))
        .copied()
}

/// A profile being filled in field by field during intake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftProfile {
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
}

impl DraftProfile {
    /// All six inputs, or `None` while any is still missing.
    pub fn inputs(&self) -> Option<ProfileInputs> {
        Some(ProfileInputs {
            gender: self.gender?,
            age: self.age?,
            weight_kg: self.weight_kg?,
            height_cm: self.height_cm?,
            activity_level: self.activity_level?,
            goal: self.goal?,
        })
    }
}

/// The six validated inputs of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileInputs {
    pub gender: Gender,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

/// A complete profile with its computed energy values (kcal/day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub inputs: ProfileInputs,
    pub bmr: f64,
    pub tdee: f64,
    pub calorie_target: f64,
    pub completed_at: DateTime<Utc>,
}

impl Profile {
    /// Run the calculation engine over validated inputs.
    pub fn complete(inputs: ProfileInputs) -> Self {
        let bmr = nutrition::bmr(inputs.gender, inputs.weight_kg, inputs.height_cm, inputs.age);
        let tdee = nutrition::tdee(bmr, inputs.activity_level);
        let calorie_target = nutrition::calorie_target(tdee, inputs.goal);
        Self {
            inputs,
            bmr,
            tdee,
            calorie_target,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> ProfileInputs {
        ProfileInputs {
            gender: Gender::Male,
            age: 30,
            weight_kg: 70.0,
            height_cm: 175.0,
            activity_level: ActivityLevel::Medium,
            goal: Goal::MaintainWeight,
        }
    }

    #[test]
    fn gender_parse_is_case_insensitive() {
        for input in ["MALE", "male", "Male", "  mAlE "] {
            assert_eq!(Gender::parse(input), Some(Gender::Male), "input {input:?}");
        }
        assert_eq!(Gender::parse("female"), Some(Gender::Female));
        assert_eq!(Gender::parse("m"), None);
        assert_eq!(Gender::parse(""), None);
    }

    #[test]
    fn activity_parse_normalizes_whitespace() {
        assert_eq!(
            ActivityLevel::parse("above   AVERAGE activity"),
            Some(ActivityLevel::AboveAverage)
        );
        assert_eq!(ActivityLevel::parse("no activity"), Some(ActivityLevel::NoActivity));
        assert_eq!(ActivityLevel::parse("lots of activity"), None);
    }

    #[test]
    fn activity_multipliers_are_exact() {
        let expected = [1.2, 1.375, 1.55, 1.725, 1.9];
        for (level, multiplier) in ActivityLevel::ALL.iter().zip(expected) {
            assert_eq!(level.multiplier(), multiplier, "{level}");
        }
    }

    #[test]
    fn goal_labels_round_trip_through_parse() {
        for goal in Goal::ALL {
            assert_eq!(Goal::parse(goal.label()), Some(goal));
            assert_eq!(Goal::parse(&goal.label().to_uppercase()), Some(goal));
        }
        assert_eq!(Goal::parse("lose"), None);
    }

    #[test]
    fn draft_inputs_require_every_field() {
        let mut draft = DraftProfile::default();
        assert!(draft.inputs().is_none());

        draft.gender = Some(Gender::Female);
        draft.age = Some(40);
        draft.weight_kg = Some(60.0);
        draft.height_cm = Some(165.0);
        draft.activity_level = Some(ActivityLevel::High);
        assert!(draft.inputs().is_none(), "goal still missing");

        draft.goal = Some(Goal::GainWeight);
        let inputs = draft.inputs().unwrap();
        assert_eq!(inputs.gender, Gender::Female);
        assert_eq!(inputs.goal, Goal::GainWeight);
    }

    #[test]
    fn complete_profile_computes_energy_values() {
        let profile = Profile::complete(sample_inputs());
        assert_eq!(profile.bmr, 1648.75);
        assert!((profile.tdee - 2555.5625).abs() < 1e-9);
        assert_eq!(profile.calorie_target, profile.tdee);
    }

    #[test]
    fn complete_is_deterministic() {
        let a = Profile::complete(sample_inputs());
        let b = Profile::complete(sample_inputs());
        assert_eq!(a.bmr.to_bits(), b.bmr.to_bits());
        assert_eq!(a.tdee.to_bits(), b.tdee.to_bits());
        assert_eq!(a.calorie_target.to_bits(), b.calorie_target.to_bits());
    }

    #[test]
    fn profile_serde_flattens_inputs() {
        let profile = Profile::complete(sample_inputs());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["gender"], "male");
        assert_eq!(json["activity_level"], "medium");
        assert_eq!(json["age"], 30);

        let parsed: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.inputs, profile.inputs);
    }
}
