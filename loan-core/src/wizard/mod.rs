//! The multi-step report wizard: steps, validation, the form reducer and
//! the session state machine.

mod machine;
mod reducer;
mod steps;
mod validation;

pub use machine::{FormWizard, JumpOutcome, JumpPolicy, NextOutcome, WizardError, WizardStatus};
pub use reducer::{BusinessField, FinancingField, FormAction, PersonalField};
pub use steps::WizardStep;
pub use validation::{ErrorMap, validate_all, validate_step};
