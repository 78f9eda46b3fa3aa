//! User-facing texts for the intake conversation and the surrounding dialogue.

use super::model::{ActivityLevel, Gender, Goal};
use super::state::IntakeStep;

pub const USE_SAVED: &str = "Use saved data";
pub const UPDATE_DATA: &str = "Update data";
pub const YES: &str = "Yes";
pub const NO: &str = "No";

pub const REUSE_PROMPT: &str = "I already have your information from last time. \
Would you like to use your saved data or update it?";

pub const MENU_CONFIRM_PROMPT: &str = "Would you like me to generate a personalized weekly menu?";

pub const MENU_DECLINED: &str =
    "No problem! Send /weekly_menu whenever you want a personalized weekly menu.";

pub const MENU_IN_PROGRESS: &str = "Generating your weekly menu, this can take up to a minute...";

pub const MISSING_PROFILE: &str =
    "I don't have your information yet. Please complete the intake first by sending /start.";

pub const MENU_APOLOGY: &str = "I apologize, but I'm having trouble generating your menu at the moment. \
Please try again later.";

pub const MENU_UNAVAILABLE: &str =
    "AI menu generation is currently unavailable. Please configure the DeepSeek API key.";

pub const CANCELLED: &str =
    "Conversation cancelled. Your saved data was not changed. Send /start to begin again.";

pub const IDLE_HINT: &str = "Send /start to calculate your daily calorie needs, or /help for all commands.";

pub const INTERNAL_ERROR: &str = "Something went wrong. Send /start to begin again.";

pub const ADMIN_ONLY: &str = "This command is only available to administrators.";

pub const UNKNOWN_COMMAND: &str = "I don't know that command. Send /help to see what I can do.";

pub const DATA_CLEARED: &str = "Your saved data has been deleted.";

pub const NOTHING_TO_CLEAR: &str = "You don't have any saved data.";

pub const HELP: &str = "\
Available commands:
/start - calculate your daily calorie needs
/diet - show your calorie target, macros and meal split
/weekly_menu - generate a personalized weekly menu
/clear - delete your saved data
/cancel - stop the current conversation
/help - show this message";

/// Greeting sent on /start.
pub fn welcome(first_name: Option<&str>) -> String {
    let name = first_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!(" {n}"))
        .unwrap_or_default();
    format!(
        "Welcome{name} to the Nutrition Bot! 🍎\n\n\
         I will help you calculate your daily caloric needs and generate a personalized diet plan.\n\n\
         Type /cancel at any time to stop our conversation."
    )
}

/// The question asked at each step. Empty for terminal steps.
pub fn question(step: IntakeStep) -> &'static str {
    match step {
        IntakeStep::Gender => {
            "Please select your gender.\n\nIf you don't see buttons, please type: \"Male\" or \"Female\""
        }
        IntakeStep::Age => "How old are you? (years, 1-120)",
        IntakeStep::Weight => "What is your weight? (kg, 1-300)",
        IntakeStep::Height => "What is your height? (cm, 30-250)",
        IntakeStep::ActivityLevel => "What is your activity level?",
        IntakeStep::Goal => "What is your goal?",
        IntakeStep::Complete | IntakeStep::Cancelled => "",
    }
}

/// Option labels offered as buttons for enum steps.
pub fn choices(step: IntakeStep) -> Vec<String> {
    match step {
        IntakeStep::Gender => Gender::ALL.iter().map(|g| g.label().to_string()).collect(),
        IntakeStep::ActivityLevel => ActivityLevel::ALL
            .iter()
            .map(|a| a.label().to_string())
            .collect(),
        IntakeStep::Goal => Goal::ALL.iter().map(|g| g.label().to_string()).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_uses_first_name() {
        assert!(welcome(Some("Ada")).starts_with("Welcome Ada to"));
        assert!(welcome(None).starts_with("Welcome to"));
        assert!(welcome(Some("  ")).starts_with("Welcome to"));
    }

    #[test]
    fn every_active_step_has_a_question() {
        let mut step = IntakeStep::Gender;
        while !step.is_terminal() {
            assert!(!question(step).is_empty(), "{step}");
            step = step.next().unwrap();
        }
        assert!(question(IntakeStep::Complete).is_empty());
    }

    #[test]
    fn only_enum_steps_offer_choices() {
        assert_eq!(choices(IntakeStep::Gender), vec!["Male", "Female"]);
        assert_eq!(choices(IntakeStep::ActivityLevel).len(), 5);
        assert_eq!(choices(IntakeStep::Goal).len(), 3);
        assert!(choices(IntakeStep::Age).is_empty());
        assert!(choices(IntakeStep::Weight).is_empty());
        assert!(choices(IntakeStep::Height).is_empty());
    }
}
