//! Intake state machine. Tracks which question the user is answering.

use serde::{Deserialize, Serialize};

/// The steps of the intake conversation.
///
/// Progresses linearly: Gender → Age → Weight → Height → ActivityLevel →
/// Goal → Complete. Any non-terminal step may jump to Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    Gender,
    Age,
    Weight,
    Height,
    ActivityLevel,
    Goal,
    Complete,
    Cancelled,
}

impl IntakeStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: IntakeStep) -> bool {
        use IntakeStep::*;
        if target == Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Gender, Age)
                | (Age, Weight)
                | (Weight, Height)
                | (Height, ActivityLevel)
                | (ActivityLevel, Goal)
                | (Goal, Complete)
        )
    }

    /// Whether this step ends the intake.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<IntakeStep> {
        use IntakeStep::*;
        match self {
            Gender => Some(Age),
            Age => Some(Weight),
            Weight => Some(Height),
            Height => Some(ActivityLevel),
            ActivityLevel => Some(Goal),
            Goal => Some(Complete),
            Complete | Cancelled => None,
        }
    }
}

impl Default for IntakeStep {
    fn default() -> Self {
        Self::Gender
    }
}

impl std::fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Weight => "weight",
            Self::Height => "height",
            Self::ActivityLevel => "activity_level",
            Self::Goal => "goal",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [IntakeStep; 8] = [
        IntakeStep::Gender,
        IntakeStep::Age,
        IntakeStep::Weight,
        IntakeStep::Height,
        IntakeStep::ActivityLevel,
        IntakeStep::Goal,
        IntakeStep::Complete,
        IntakeStep::Cancelled,
    ];

    #[test]
    fn valid_transitions() {
        use IntakeStep::*;
        let transitions = [
            (Gender, Age),
            (Age, Weight),
            (Weight, Height),
            (Height, ActivityLevel),
            (ActivityLevel, Goal),
            (Goal, Complete),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use IntakeStep::*;
        // Skip steps
        assert!(!Gender.can_transition_to(Weight));
        assert!(!Age.can_transition_to(Complete));
        // Go backward
        assert!(!Height.can_transition_to(Weight));
        // Self-transition
        assert!(!Age.can_transition_to(Age));
        // Terminal
        assert!(!Complete.can_transition_to(Gender));
        assert!(!Cancelled.can_transition_to(Gender));
    }

    #[test]
    fn cancel_allowed_only_from_non_terminal() {
        for step in ALL {
            assert_eq!(
                step.can_transition_to(IntakeStep::Cancelled),
                !step.is_terminal(),
                "{step}"
            );
        }
    }

    #[test]
    fn next_walks_all_steps() {
        use IntakeStep::*;
        let expected = [Age, Weight, Height, ActivityLevel, Goal, Complete];
        let mut current = IntakeStep::default();
        assert_eq!(current, Gender);
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            assert!(current.can_transition_to(next));
            current = next;
        }
        assert!(current.next().is_none());
        assert!(Cancelled.next().is_none());
    }

    #[test]
    fn display_matches_serde() {
        for step in ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json, "Display and serde should match for {step:?}");
        }
    }
}
