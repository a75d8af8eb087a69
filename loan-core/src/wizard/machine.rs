//! The report wizard as a state machine over [`WizardStep`]s.
//!
//! A session moves forward only through validated steps, backward freely,
//! and submits its aggregate exactly once. While a submission is in flight
//! the session refuses further edits and advances; once the submission
//! completes the aggregate is dropped and the session is closed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::reducer::FormAction;
use super::steps::WizardStep;
use super::validation::{ErrorMap, validate_all, validate_step};
use crate::calculations::DerivedTotals;
use crate::models::FormAggregate;

/// How [`FormWizard::jump_to`] treats forward jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JumpPolicy {
    /// Jump anywhere without validation.
    #[default]
    Free,
    /// Validate every step from the active one up to the target and stop
    /// at the first that fails.
    ValidateIntervening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStatus {
    Active,
    /// The aggregate has been handed off for persistence.
    Submitting,
    Closed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("step {0} is out of range")]
    StepOutOfRange(usize),

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("no submission is in flight")]
    NotSubmitting,

    #[error("the wizard session is closed")]
    Closed,
}

/// Result of [`FormWizard::go_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    Advanced(WizardStep),
    /// Validation failed; the active step is unchanged.
    Rejected(ErrorMap),
    /// The last step passed. The caller persists this aggregate and then
    /// reports back through [`FormWizard::complete_submission`] or
    /// [`FormWizard::submission_failed`].
    Submit(FormAggregate),
}

/// Result of [`FormWizard::jump_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpOutcome {
    Moved(WizardStep),
    /// A step on the way failed validation; the wizard stopped there.
    Blocked { step: WizardStep, errors: ErrorMap },
}

#[derive(Debug, Clone)]
pub struct FormWizard {
    form: FormAggregate,
    active_step: usize,
    status: WizardStatus,
    jump_policy: JumpPolicy,
    errors: ErrorMap,
    last_failure: Option<String>,
}

impl Default for FormWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl FormWizard {
    pub fn new() -> Self {
        Self::with_form(FormAggregate::new())
    }

    /// Starts a session over an existing aggregate, at the first step.
    pub fn with_form(form: FormAggregate) -> Self {
        Self {
            form,
            active_step: 0,
            status: WizardStatus::Active,
            jump_policy: JumpPolicy::default(),
            errors: ErrorMap::new(),
            last_failure: None,
        }
    }

    pub fn with_jump_policy(
        mut self,
        policy: JumpPolicy,
    ) -> Self {
        self.jump_policy = policy;
        self
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn step(&self) -> WizardStep {
        WizardStep::from_index(self.active_step).unwrap_or(WizardStep::BusinessName)
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn jump_policy(&self) -> JumpPolicy {
        self.jump_policy
    }

    pub fn form(&self) -> &FormAggregate {
        &self.form
    }

    /// Errors from the most recent rejected move.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Message from the most recent failed submission.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Totals shown on the review step.
    pub fn review(&self) -> DerivedTotals {
        DerivedTotals::from_form(&self.form)
    }

    /// Applies an edit to the aggregate.
    pub fn dispatch(
        &mut self,
        action: FormAction,
    ) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.form.apply(action);
        Ok(())
    }

    pub fn dispatch_all(
        &mut self,
        actions: impl IntoIterator<Item = FormAction>,
    ) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.form.apply_all(actions);
        Ok(())
    }

    /// Validates the active step and moves forward, or submits from the
    /// last step.
    ///
    /// Submitting validates every step, since free jumps may have skipped
    /// some. On success the wizard enters [`WizardStatus::Submitting`].
    pub fn go_next(&mut self) -> Result<NextOutcome, WizardError> {
        self.ensure_active()?;

        let step = self.step();
        let errors = if step.is_last() {
            validate_all(&self.form)
        } else {
            validate_step(step, &self.form)
        };

        if !errors.is_empty() {
            debug!(?step, errors = errors.len(), "step rejected");
            self.errors = errors.clone();
            return Ok(NextOutcome::Rejected(errors));
        }
        self.errors = ErrorMap::new();

        if step.is_last() {
            debug!("submitting report");
            self.status = WizardStatus::Submitting;
            self.last_failure = None;
            return Ok(NextOutcome::Submit(self.form.clone()));
        }

        self.active_step += 1;
        let next = self.step();
        debug!(from = ?step, to = ?next, "advanced");
        Ok(NextOutcome::Advanced(next))
    }

    /// Moves back one step without validation, stopping at the first step.
    ///
    /// Does nothing unless the wizard is active, so a failed submission
    /// leaves it on the review step.
    pub fn go_previous(&mut self) -> WizardStep {
        if self.status == WizardStatus::Active {
            self.active_step = self.active_step.saturating_sub(1);
            self.errors = ErrorMap::new();
        }
        self.step()
    }

    /// Moves to `index` according to the session's [`JumpPolicy`].
    ///
    /// Backward jumps are never validated.
    pub fn jump_to(
        &mut self,
        index: usize,
    ) -> Result<JumpOutcome, WizardError> {
        self.ensure_active()?;
        let target = WizardStep::from_index(index).ok_or(WizardError::StepOutOfRange(index))?;

        if self.jump_policy == JumpPolicy::ValidateIntervening {
            for i in self.active_step..index {
                let step = WizardStep::ALL[i];
                let errors = validate_step(step, &self.form);
                if !errors.is_empty() {
                    debug!(?step, ?target, "jump blocked");
                    self.active_step = i;
                    self.errors = errors.clone();
                    return Ok(JumpOutcome::Blocked { step, errors });
                }
            }
        }

        self.active_step = index;
        self.errors = ErrorMap::new();
        Ok(JumpOutcome::Moved(target))
    }

    /// Marks the in-flight submission as stored. The aggregate is dropped
    /// and the session closes.
    pub fn complete_submission(&mut self) -> Result<(), WizardError> {
        self.ensure_submitting()?;
        self.close();
        Ok(())
    }

    /// Marks the in-flight submission as failed. The aggregate is kept so
    /// the caller can retry.
    pub fn submission_failed(
        &mut self,
        message: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.ensure_submitting()?;
        let message = message.into();
        debug!(%message, "submission failed");
        self.status = WizardStatus::Active;
        self.last_failure = Some(message);
        Ok(())
    }

    /// Abandons the session without submitting.
    ///
    /// Refused while a submission is in flight; its outcome decides whether
    /// the session closes.
    pub fn discard(&mut self) -> Result<(), WizardError> {
        if self.status == WizardStatus::Submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        self.close();
        Ok(())
    }

    fn close(&mut self) {
        self.form = FormAggregate::default();
        self.active_step = 0;
        self.errors = ErrorMap::new();
        self.status = WizardStatus::Closed;
    }

    fn ensure_active(&self) -> Result<(), WizardError> {
        match self.status {
            WizardStatus::Active => Ok(()),
            WizardStatus::Submitting => Err(WizardError::SubmissionInFlight),
            WizardStatus::Closed => Err(WizardError::Closed),
        }
    }

    fn ensure_submitting(&self) -> Result<(), WizardError> {
        match self.status {
            WizardStatus::Submitting => Ok(()),
            WizardStatus::Closed => Err(WizardError::Closed),
            WizardStatus::Active => Err(WizardError::NotSubmitting),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{CostEntry, LoanCategory, RequirementKey};

    fn wizard_at(step: WizardStep) -> FormWizard {
        let mut wizard = FormWizard::with_form(FormAggregate::sample());
        wizard.jump_to(step.index()).unwrap();
        wizard
    }

    // =========================================================================
    // go_next tests
    // =========================================================================

    #[test]
    fn go_next_advances_when_step_is_valid() {
        let mut wizard = FormWizard::new();
        wizard
            .dispatch(FormAction::SetFullName {
                value: "Acme".to_string(),
            })
            .unwrap();

        let outcome = wizard.go_next().unwrap();

        assert_eq!(outcome, NextOutcome::Advanced(WizardStep::BusinessType));
        assert_eq!(wizard.active_step(), 1);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn go_next_on_requirements_with_nothing_selected_stays_put() {
        let mut form = FormAggregate::sample();
        for entry in form.requirements.values_mut() {
            entry.selected = false;
        }
        let mut wizard = FormWizard::with_form(form);
        wizard.jump_to(WizardStep::Requirements.index()).unwrap();

        let outcome = wizard.go_next().unwrap();

        let NextOutcome::Rejected(errors) = outcome else {
            panic!("expected rejection, got {outcome:?}");
        };
        assert!(!errors.is_empty());
        assert!(errors.contains("requirements"));
        assert_eq!(wizard.active_step(), WizardStep::Requirements.index());
        assert_eq!(wizard.errors(), &errors);
    }

    #[test]
    fn go_next_walks_the_sample_through_every_step() {
        let mut wizard = FormWizard::with_form(FormAggregate::sample());

        for expected in &WizardStep::ALL[1..] {
            assert_eq!(wizard.go_next().unwrap(), NextOutcome::Advanced(*expected));
        }

        let outcome = wizard.go_next().unwrap();

        assert_eq!(outcome, NextOutcome::Submit(FormAggregate::sample()));
        assert_eq!(wizard.status(), WizardStatus::Submitting);
    }

    #[test]
    fn submit_revalidates_steps_skipped_by_free_jumps() {
        let mut wizard = FormWizard::new();
        wizard.jump_to(WizardStep::Review.index()).unwrap();

        let outcome = wizard.go_next().unwrap();

        let NextOutcome::Rejected(errors) = outcome else {
            panic!("expected rejection, got {outcome:?}");
        };
        assert!(errors.contains("fullName"));
        assert_eq!(wizard.status(), WizardStatus::Active);
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    // =========================================================================
    // go_previous tests
    // =========================================================================

    #[test]
    fn go_previous_at_first_step_stays_at_zero() {
        let mut wizard = FormWizard::new();

        let step = wizard.go_previous();

        assert_eq!(step, WizardStep::BusinessName);
        assert_eq!(wizard.active_step(), 0);
    }

    #[test]
    fn go_previous_skips_validation_and_clears_errors() {
        let mut wizard = FormWizard::new();
        wizard.jump_to(WizardStep::Industry.index()).unwrap();
        assert!(matches!(wizard.go_next().unwrap(), NextOutcome::Rejected(_)));

        let step = wizard.go_previous();

        assert_eq!(step, WizardStep::BusinessType);
        assert!(wizard.errors().is_empty());
    }

    // =========================================================================
    // jump_to tests
    // =========================================================================

    #[test]
    fn free_jump_ignores_validation() {
        let mut wizard = FormWizard::new();

        let outcome = wizard.jump_to(8).unwrap();

        assert_eq!(outcome, JumpOutcome::Moved(WizardStep::Address));
        assert_eq!(wizard.active_step(), 8);
    }

    #[test]
    fn jump_out_of_range_is_rejected() {
        let mut wizard = FormWizard::new();

        assert_eq!(wizard.jump_to(10), Err(WizardError::StepOutOfRange(10)));
        assert_eq!(wizard.active_step(), 0);
    }

    #[test]
    fn validated_jump_stops_at_first_failing_step() {
        let mut wizard = FormWizard::new().with_jump_policy(JumpPolicy::ValidateIntervening);
        wizard
            .dispatch_all([
                FormAction::SetFullName {
                    value: "Acme".to_string(),
                },
                FormAction::SetBusinessType {
                    value: "Retail".to_string(),
                },
            ])
            .unwrap();

        let outcome = wizard.jump_to(WizardStep::Review.index()).unwrap();

        let JumpOutcome::Blocked { step, errors } = outcome else {
            panic!("expected a blocked jump, got {outcome:?}");
        };
        assert_eq!(step, WizardStep::Industry);
        assert!(errors.contains("industry"));
        assert_eq!(wizard.step(), WizardStep::Industry);
    }

    #[test]
    fn validated_jump_backwards_is_free() {
        let mut wizard = FormWizard::new().with_jump_policy(JumpPolicy::ValidateIntervening);
        wizard
            .dispatch(FormAction::SetFullName {
                value: "Acme".to_string(),
            })
            .unwrap();
        wizard.go_next().unwrap();

        assert_eq!(wizard.jump_to(0).unwrap(), JumpOutcome::Moved(WizardStep::BusinessName));
    }

    #[test]
    fn validated_jump_with_valid_form_reaches_target() {
        let mut wizard = FormWizard::with_form(FormAggregate::sample())
            .with_jump_policy(JumpPolicy::ValidateIntervening);

        assert_eq!(wizard.jump_to(9).unwrap(), JumpOutcome::Moved(WizardStep::Review));
    }

    // =========================================================================
    // submission tests
    // =========================================================================

    #[test]
    fn in_flight_submission_blocks_a_second_submit() {
        let mut wizard = wizard_at(WizardStep::Review);
        assert!(matches!(wizard.go_next().unwrap(), NextOutcome::Submit(_)));

        assert_eq!(wizard.go_next(), Err(WizardError::SubmissionInFlight));
        assert_eq!(
            wizard.dispatch(FormAction::SetNotes {
                value: "late edit".to_string(),
            }),
            Err(WizardError::SubmissionInFlight)
        );
    }

    #[test]
    fn in_flight_submission_holds_the_review_step() {
        let mut wizard = wizard_at(WizardStep::Review);
        wizard.go_next().unwrap();

        assert_eq!(wizard.go_previous(), WizardStep::Review);
        assert_eq!(wizard.discard(), Err(WizardError::SubmissionInFlight));
        assert_eq!(wizard.status(), WizardStatus::Submitting);

        wizard.submission_failed("disk full").unwrap();

        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.form(), &FormAggregate::sample());
    }

    #[test]
    fn completed_submission_closes_and_drops_the_form() {
        let mut wizard = wizard_at(WizardStep::Review);
        wizard.go_next().unwrap();

        wizard.complete_submission().unwrap();

        assert_eq!(wizard.status(), WizardStatus::Closed);
        assert_eq!(wizard.form(), &FormAggregate::default());
        assert_eq!(wizard.go_next(), Err(WizardError::Closed));
    }

    #[test]
    fn failed_submission_keeps_the_form_for_retry() {
        let mut wizard = wizard_at(WizardStep::Review);
        wizard.go_next().unwrap();

        wizard.submission_failed("database is locked").unwrap();

        assert_eq!(wizard.status(), WizardStatus::Active);
        assert_eq!(wizard.form(), &FormAggregate::sample());
        assert_eq!(wizard.last_failure(), Some("database is locked"));
        assert!(matches!(wizard.go_next().unwrap(), NextOutcome::Submit(_)));
        assert_eq!(wizard.last_failure(), None);
    }

    #[test]
    fn completing_without_submission_is_an_error() {
        let mut wizard = FormWizard::new();

        assert_eq!(wizard.complete_submission(), Err(WizardError::NotSubmitting));
        assert_eq!(wizard.submission_failed("x"), Err(WizardError::NotSubmitting));
    }

    #[test]
    fn discard_closes_the_session() {
        let mut wizard = FormWizard::with_form(FormAggregate::sample());

        wizard.discard().unwrap();

        assert_eq!(wizard.status(), WizardStatus::Closed);
        assert_eq!(wizard.jump_to(1), Err(WizardError::Closed));
    }

    // =========================================================================
    // review tests
    // =========================================================================

    #[test]
    fn review_reflects_current_form() {
        let mut wizard = FormWizard::new();
        wizard
            .dispatch_all([
                FormAction::SetLoan {
                    value: Some(LoanCategory::TermLoan),
                },
                FormAction::SelectRequirement {
                    key: RequirementKey::Machinery,
                    selected: true,
                },
                FormAction::SetRequirementCost {
                    key: RequirementKey::Machinery,
                    cost: "1000".to_string(),
                },
            ])
            .unwrap();

        let totals = wizard.review();

        assert_eq!(totals.total_cost, dec!(1000));
        assert_eq!(totals.eligible_loan, dec!(900));
        assert_eq!(
            wizard.form().requirement(RequirementKey::Machinery),
            Some(&CostEntry::new(true, "1000"))
        );
    }
}
