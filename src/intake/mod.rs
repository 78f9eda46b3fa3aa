//! The linear question-and-answer intake flow.
//!
//! The intake walks a new user through six questions. Each answer is
//! validated before the pipeline advances; an invalid answer re-prompts the
//! same question. Once all six are in, the draft becomes a `Profile` with its
//! calorie values computed.

pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod state;
pub mod validate;

pub use model::{ActivityLevel, DraftProfile, Gender, Goal, Profile, ProfileInputs};
pub use pipeline::{Intake, IntakeError, IntakeOutcome};
pub use state::IntakeStep;
pub use validate::ValidationError;
