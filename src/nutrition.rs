//! Calculation engine for BMR, TDEE, calorie target, macros and meal split.
//!
//! Everything here is a pure function of the profile inputs.

use serde::Serialize;

use crate::intake::{ActivityLevel, Gender, Goal, Profile};

/// Daily deficit or surplus applied for weight loss or gain (kcal).
pub const GOAL_ADJUSTMENT_KCAL: f64 = 500.0;

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Basal metabolic rate using the Mifflin-St Jeor equation.
pub fn bmr(gender: Gender, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Total daily energy expenditure.
pub fn tdee(bmr: f64, activity: ActivityLevel) -> f64 {
    bmr * activity.multiplier()
}

pub fn calorie_target(tdee: f64, goal: Goal) -> f64 {
    match goal {
        Goal::LoseWeight => tdee - GOAL_ADJUSTMENT_KCAL,
        Goal::MaintainWeight => tdee,
        Goal::GainWeight => tdee + GOAL_ADJUSTMENT_KCAL,
    }
}

/// Share of calories per macronutrient, as fractions summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroRatio {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroRatio {
    pub fn for_goal(goal: Goal) -> Self {
        let (protein, carbs, fat) = match goal {
            Goal::LoseWeight => (0.30, 0.35, 0.35),
            Goal::GainWeight => (0.25, 0.40, 0.35),
            Goal::MaintainWeight => (0.25, 0.35, 0.40),
        };
        Self { protein, carbs, fat }
    }
}

/// Daily macronutrients in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

pub fn macros(calorie_target: f64, goal: Goal) -> Macros {
    let ratio = MacroRatio::for_goal(goal);
    Macros {
        protein_g: ratio.protein * calorie_target / KCAL_PER_GRAM_PROTEIN,
        carbs_g: ratio.carbs * calorie_target / KCAL_PER_GRAM_CARBS,
        fat_g: ratio.fat * calorie_target / KCAL_PER_GRAM_FAT,
    }
}

/// Calories per meal slot for a sample day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MealSplit {
    pub breakfast: f64,
    pub lunch: f64,
    pub dinner: f64,
    pub snack: f64,
}

pub fn meal_split(calorie_target: f64) -> MealSplit {
    MealSplit {
        breakfast: calorie_target * 0.25,
        lunch: calorie_target * 0.35,
        dinner: calorie_target * 0.30,
        snack: calorie_target * 0.10,
    }
}

/// Everything derived from a complete profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionPlan {
    pub bmr: f64,
    pub tdee: f64,
    pub calorie_target: f64,
    pub macros: Macros,
    pub meals: MealSplit,
}

impl NutritionPlan {
    pub fn for_profile(profile: &Profile) -> Self {
        let goal = profile.inputs.goal;
        Self {
            bmr: profile.bmr,
            tdee: profile.tdee,
            calorie_target: profile.calorie_target,
            macros: macros(profile.calorie_target, goal),
            meals: meal_split(profile.calorie_target),
        }
    }
}

/// Plain-text summary sent after intake and on /diet.
pub fn render_diet_summary(profile: &Profile) -> String {
    let plan = NutritionPlan::for_profile(profile);
    let inputs = &profile.inputs;
    let ratio = MacroRatio::for_goal(inputs.goal);

    format!(
        "📊 Your nutrition profile\n\
         \n\
         Gender: {gender}\n\
         Age: {age}\n\
         Weight: {weight} kg\n\
         Height: {height} cm\n\
         Activity level: {activity}\n\
         Goal: {goal}\n\
         \n\
         BMR: {bmr:.0} kcal/day\n\
         TDEE: {tdee:.0} kcal/day\n\
         Daily calorie target: {target:.0} kcal\n\
         \n\
         🥩 Protein: {protein:.0} g ({protein_pct:.0}%)\n\
         🍚 Carbohydrates: {carbs:.0} g ({carbs_pct:.0}%)\n\
         🥑 Fat: {fat:.0} g ({fat_pct:.0}%)\n\
         \n\
         Sample day:\n\
         🍳 Breakfast: {breakfast:.0} kcal\n\
         🥗 Lunch: {lunch:.0} kcal\n\
         🍽 Dinner: {dinner:.0} kcal\n\
         🍎 Snack: {snack:.0} kcal",
        gender = inputs.gender,
        age = inputs.age,
        weight = inputs.weight_kg,
        height = inputs.height_cm,
        activity = inputs.activity_level,
        goal = inputs.goal,
        bmr = plan.bmr,
        tdee = plan.tdee,
        target = plan.calorie_target,
        protein = plan.macros.protein_g,
        protein_pct = ratio.protein * 100.0,
        carbs = plan.macros.carbs_g,
        carbs_pct = ratio.carbs * 100.0,
        fat = plan.macros.fat_g,
        fat_pct = ratio.fat * 100.0,
        breakfast = plan.meals.breakfast,
        lunch = plan.meals.lunch,
        dinner = plan.meals.dinner,
        snack = plan.meals.snack,
    )
}
