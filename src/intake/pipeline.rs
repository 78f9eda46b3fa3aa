//! The intake pipeline: current step plus the draft being filled in.

use super::model::{DraftProfile, ProfileInputs};
use super::state::IntakeStep;
use super::validate::{self, ValidationError, Validator};

/// What happened after feeding one answer into the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// Answer accepted; now waiting on `IntakeStep`.
    Advanced(IntakeStep),
    /// Answer rejected; the step did not change.
    Rejected(ValidationError),
    /// The last answer was accepted and every input is present.
    Completed(ProfileInputs),
    /// The pipeline already finished; input is ignored.
    Finished,
}

/// Internal failures that should never happen with a well-formed pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IntakeError {
    #[error("Reached {0} with an incomplete draft")]
    IncompleteDraft(IntakeStep),

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: IntakeStep, to: IntakeStep },
}

impl IntakeStep {
    /// The validator that consumes an answer in this step.
    pub fn validator(&self) -> Option<Validator> {
        match self {
            Self::Gender => Some(validate::apply_gender),
            Self::Age => Some(validate::apply_age),
            Self::Weight => Some(validate::apply_weight),
            Self::Height => Some(validate::apply_height),
            Self::ActivityLevel => Some(validate::apply_activity),
            Self::Goal => Some(validate::apply_goal),
            Self::Complete | Self::Cancelled => None,
        }
    }
}

/// One user's in-progress intake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intake {
    step: IntakeStep,
    draft: DraftProfile,
}

impl Intake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> IntakeStep {
        self.step
    }

    pub fn draft(&self) -> &DraftProfile {
        &self.draft
    }

    /// Feed one answer to the current step.
    pub fn handle(&mut self, input: &str) -> Result<IntakeOutcome, IntakeError> {
        let Some(validator) = self.step.validator() else {
            return Ok(IntakeOutcome::Finished);
        };

        if let Err(e) = validator(input, &mut self.draft) {
            return Ok(IntakeOutcome::Rejected(e));
        }

        let next = self
            .step
            .next()
            .ok_or(IntakeError::IncompleteDraft(self.step))?;
        self.transition(next)?;

        if next == IntakeStep::Complete {
            let inputs = self
                .draft
                .inputs()
                .ok_or(IntakeError::IncompleteDraft(next))?;
            return Ok(IntakeOutcome::Completed(inputs));
        }
        Ok(IntakeOutcome::Advanced(next))
    }

    /// Abandon the intake and discard the draft. Returns false if already finished.
    pub fn cancel(&mut self) -> bool {
        if self.transition(IntakeStep::Cancelled).is_err() {
            return false;
        }
        self.draft = DraftProfile::default();
        true
    }

    /// Start over from the first question with an empty draft.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    fn transition(&mut self, target: IntakeStep) -> Result<(), IntakeError> {
        if !self.step.can_transition_to(target) {
            return Err(IntakeError::InvalidTransition {
                from: self.step,
                to: target,
            });
        }
        self.step = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::model::{ActivityLevel, Gender, Goal};

    const ANSWERS: [&str; 6] = ["male", "30", "70", "175", "medium activity", "MAINTAIN WEIGHT"];

    #[test]
    fn happy_path_completes_with_canonical_values() {
        let mut intake = Intake::new();
        let expected_steps = [
            IntakeStep::Age,
            IntakeStep::Weight,
            IntakeStep::Height,
            IntakeStep::ActivityLevel,
            IntakeStep::Goal,
        ];
        for (answer, expected) in ANSWERS.iter().zip(expected_steps) {
            assert_eq!(intake.handle(answer).unwrap(), IntakeOutcome::Advanced(expected));
        }

        let outcome = intake.handle(ANSWERS[5]).unwrap();
        let IntakeOutcome::Completed(inputs) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(inputs.gender, Gender::Male);
        assert_eq!(inputs.age, 30);
        assert_eq!(inputs.weight_kg, 70.0);
        assert_eq!(inputs.height_cm, 175.0);
        assert_eq!(inputs.activity_level, ActivityLevel::Medium);
        assert_eq!(inputs.goal, Goal::MaintainWeight);
        assert_eq!(intake.step(), IntakeStep::Complete);
    }

    #[test]
    fn invalid_answer_stays_on_step() {
        let mut intake = Intake::new();
        intake.handle("female").unwrap();
        let before = intake.clone();

        for bad in ["0", "121", "abc", "25.5"] {
            assert_eq!(
                intake.handle(bad).unwrap(),
                IntakeOutcome::Rejected(ValidationError::Age)
            );
            assert_eq!(intake, before, "state must not change on {bad:?}");
        }

        assert_eq!(
            intake.handle("25").unwrap(),
            IntakeOutcome::Advanced(IntakeStep::Weight)
        );
    }

    #[test]
    fn unknown_enum_text_does_not_mutate_draft() {
        let mut intake = Intake::new();
        assert_eq!(
            intake.handle("alien").unwrap(),
            IntakeOutcome::Rejected(ValidationError::Gender)
        );
        assert_eq!(intake.draft(), &DraftProfile::default());
        assert_eq!(intake.step(), IntakeStep::Gender);
    }

    #[test]
    fn cancel_from_any_active_step_discards_draft() {
        for answered in 0..6 {
            let mut intake = Intake::new();
            for answer in &ANSWERS[..answered] {
                intake.handle(answer).unwrap();
            }
            assert!(intake.cancel(), "cancel after {answered} answers");
            assert_eq!(intake.step(), IntakeStep::Cancelled);
            assert_eq!(intake.draft(), &DraftProfile::default());
        }
    }

    #[test]
    fn finished_intake_ignores_input_and_cancel() {
        let mut intake = Intake::new();
        for answer in ANSWERS {
            intake.handle(answer).unwrap();
        }
        assert_eq!(intake.handle("male").unwrap(), IntakeOutcome::Finished);
        assert!(!intake.cancel());
        assert_eq!(intake.step(), IntakeStep::Complete);
    }

    #[test]
    fn restart_returns_to_first_step() {
        let mut intake = Intake::new();
        intake.handle("male").unwrap();
        intake.handle("44").unwrap();
        intake.restart();
        assert_eq!(intake, Intake::new());
    }

    #[test]
    fn only_terminal_steps_lack_validators() {
        let mut step = IntakeStep::Gender;
        while !step.is_terminal() {
            assert!(step.validator().is_some(), "{step}");
            step = step.next().unwrap();
        }
        assert!(IntakeStep::Complete.validator().is_none());
        assert!(IntakeStep::Cancelled.validator().is_none());
    }
}
