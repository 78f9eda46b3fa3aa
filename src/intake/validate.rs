//! Per-step input validators.
//!
//! A rejected answer never advances the intake; the error's display text is
//! the re-prompt shown to the user.

use std::ops::RangeInclusive;

use super::model::{ActivityLevel, DraftProfile, Gender, Goal};

pub const AGE_RANGE: RangeInclusive<u32> = 1..=120;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 1.0..=300.0;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 30.0..=250.0;

/// Why an answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please choose your gender: Male or Female.")]
    Gender,

    #[error("Please enter a valid age as a whole number between 1 and 120.")]
    Age,

    #[error("Please enter a valid weight in kilograms between 1 and 300.")]
    Weight,

    #[error("Please enter a valid height in centimeters between 30 and 250.")]
    Height,

    #[error(
        "Please choose one of: No activity, Minimal activity, Medium activity, \
         Above average activity, High activity."
    )]
    ActivityLevel,

    #[error("Please choose one of: Lose weight, Maintain weight, Gain weight.")]
    Goal,
}

/// Validates one answer and writes it into the draft.
pub type Validator = fn(&str, &mut DraftProfile) -> Result<(), ValidationError>;

pub fn validate_gender(input: &str) -> Result<Gender, ValidationError> {
    Gender::parse(input).ok_or(ValidationError::Gender)
}

pub fn validate_age(input: &str) -> Result<u32, ValidationError> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|age| AGE_RANGE.contains(age))
        .ok_or(ValidationError::Age)
}

pub fn validate_weight(input: &str) -> Result<f64, ValidationError> {
    parse_in_range(input, &WEIGHT_RANGE_KG).ok_or(ValidationError::Weight)
}

pub fn validate_height(input: &str) -> Result<f64, ValidationError> {
    parse_in_range(input, &HEIGHT_RANGE_CM).ok_or(ValidationError::Height)
}

pub fn validate_activity(input: &str) -> Result<ActivityLevel, ValidationError> {
    ActivityLevel::parse(input).ok_or(ValidationError::ActivityLevel)
}

pub fn validate_goal(input: &str) -> Result<Goal, ValidationError> {
    Goal::parse(input).ok_or(ValidationError::Goal)
}

// `RangeInclusive::contains` is false for NaN and infinities, which `f64::from_str`
// happily produces from "nan" and "inf".
fn parse_in_range(input: &str, range: &RangeInclusive<f64>) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| range.contains(value))
}

pub(crate) fn apply_gender(input: &str, draft: &mut DraftProfile) -> Result<(), ValidationError> {
    draft.gender = Some(validate_gender(input)?);
    Ok(())
}

pub(crate) fn apply_age(input: &str, draft: &mut DraftProfile) -> Result<(), ValidationError> {
    draft.age = Some(validate_age(input)?);
    Ok(())
}

pub(crate) fn apply_weight(input: &str, draft: &mut DraftProfile) -> Result<(), ValidationError> {
    draft.weight_kg = Some(validate_weight(input)?);
    Ok(())
}

pub(crate) fn apply_height(input: &str, draft: &mut DraftProfile) -> Result<(), ValidationError> {
    draft.height_cm = Some(validate_height(input)?);
    Ok(())
}

pub(crate) fn apply_activity(input: &str, draft: &mut DraftProfile) -> Result<(), ValidationError> {
    draft.activity_level = Some(validate_activity(input)?);
    Ok(())
}

pub(crate) fn apply_goal(input: &str, draft: &mut DraftProfile) -> Result<(), ValidationError> {
    draft.goal = Some(validate_goal(input)?);
    Ok(())
}
