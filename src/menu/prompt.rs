//! Prompt text for weekly-menu generation.

use crate::intake::Profile;

pub const SYSTEM_INSTRUCTION: &str =
    "You are a nutritionist expert specializing in creating practical meal plans.";

/// Build the user prompt describing the profile and the expected answer shape.
pub fn build_menu_prompt(profile: &Profile) -> String {
    let inputs = &profile.inputs;
    format!(
        "Create a personalized weekly meal plan for a {age}-year-old {gender} \
         with the following characteristics:\n\
         - Weight: {weight} kg\n\
         - Height: {height} cm\n\
         - Activity level: {activity}\n\
         - Goal: {goal}\n\
         - Daily calorie target: {target:.0} calories\n\
         - BMR: {bmr:.0} calories\n\
         - TDEE: {tdee:.0} calories\n\
         \n\
         Please create a simple, practical weekly menu with breakfast, lunch, dinner, \
         and a snack for each day from Monday to Sunday.\n\
         Focus on common, affordable ingredients. Include portion sizes in grams or common measurements.\n\
         Start each day with the day name on its own line and each meal with the meal name.\n\
         Write plain text only: no markdown, no headings, no bullet symbols, no bold or italics.",
        age = inputs.age,
        gender = inputs.gender.label().to_lowercase(),
        weight = inputs.weight_kg,
        height = inputs.height_cm,
        activity = inputs.activity_level,
        goal = inputs.goal,
        target = profile.calorie_target,
        bmr = profile.bmr,
        tdee = profile.tdee,
    )
}
