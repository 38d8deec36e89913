//! The application wizard: a linear walk over a form's step table that ends
//! in exactly one submission.
//!
//! Callers driven by an event loop use the split API: [`Wizard::try_advance`]
//! hands out a [`SubmissionDraft`] and marks the wizard busy, the caller runs
//! the write, and [`Wizard::complete_submission`] feeds the result back.
//! [`Wizard::advance`] does both in one call.

use tracing::{debug, info, warn};

use crate::error::ApplicationError;
use crate::field::{FieldValue, FormField, FormValues};
use crate::format::format;
use crate::forms::{ApplicationForm, StepDefinition};
use crate::session::Session;
use crate::submission::{ApplicationStatus, Applications, SubmitOutcome};
use crate::validate::{ValidationErrors, validate_step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    Step(usize),
    Submitted(ApplicationStatus),
}

/// The form as it was when the last step validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft<F> {
    pub form: F,
}

/// Outcome of [`Wizard::try_advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<F: ApplicationForm> {
    /// The current step has errors; the state did not change.
    Rejected(ValidationErrors<F::Field>),
    Moved { from: usize, to: usize },
    /// The last step validated; the caller must write the draft and report back.
    ReadyToSubmit(SubmissionDraft<F>),
    /// A submission is already in flight.
    Busy,
    /// The wizard is in its terminal state.
    Closed,
}

/// Outcome of a completed advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance<Field> {
    Rejected(ValidationErrors<Field>),
    Moved { from: usize, to: usize },
    Submitted(ApplicationStatus),
    /// Someone else submitted first; the wizard now shows that status.
    Duplicate(ApplicationStatus),
}

pub struct Wizard<F: ApplicationForm> {
    state: WizardState,
    form: F,
    errors: ValidationErrors<F::Field>,
    busy: bool,
}

impl<F: ApplicationForm> Default for Wizard<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ApplicationForm> Wizard<F> {
    /// A fresh wizard on its first step.
    pub fn new() -> Self {
        Self {
            state: WizardState::Step(0),
            form: F::default(),
            errors: ValidationErrors::new(),
            busy: false,
        }
    }

    /// A wizard that only shows an existing submission.
    pub fn submitted(status: ApplicationStatus) -> Self {
        Self {
            state: WizardState::Submitted(status),
            ..Self::new()
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Errors of the last advance attempt.
    pub fn errors(&self) -> &ValidationErrors<F::Field> {
        &self.errors
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn status(&self) -> Option<&ApplicationStatus> {
        match &self.state {
            WizardState::Submitted(status) => Some(status),
            WizardState::Step(_) => None,
        }
    }

    pub fn current_step(&self) -> Option<&'static StepDefinition<F::Field>> {
        match self.state {
            WizardState::Step(index) => F::STEPS.get(index),
            WizardState::Submitted(_) => None,
        }
    }

    pub fn is_last_step(&self) -> bool {
        matches!(self.state, WizardState::Step(index) if index + 1 == F::STEPS.len())
    }

    /// Store user input for a field, formatted for its kind.
    ///
    /// Returns the stored value, or `None` once the wizard is submitted.
    pub fn set_field(&mut self, field: F::Field, raw: impl Into<FieldValue>) -> Option<FieldValue> {
        if matches!(self.state, WizardState::Submitted(_)) {
            debug!(field = field.key(), "ignoring input on a submitted wizard");
            return None;
        }
        let value = match raw.into() {
            FieldValue::Text(raw) => {
                let previous = self.form.value(field);
                FieldValue::Text(format(field.kind(), &raw, previous.as_text()))
            }
            flag => flag,
        };
        self.form.set(field, value.clone());
        Some(value)
    }

    /// Empty a field without going through the formatter.
    pub fn clear_field(&mut self, field: F::Field) -> bool {
        if matches!(self.state, WizardState::Submitted(_)) {
            return false;
        }
        self.form.set(field, FieldValue::default());
        true
    }

    /// Validate the current step and move on, or hand out the draft on the last step.
    pub fn try_advance(&mut self) -> Transition<F> {
        let step = match self.state {
            WizardState::Submitted(_) => return Transition::Closed,
            WizardState::Step(step) => step,
        };
        if self.busy {
            return Transition::Busy;
        }

        self.errors = validate_step(step, &self.form);
        if !self.errors.is_empty() {
            debug!(step, errors = self.errors.len(), "step rejected");
            return Transition::Rejected(self.errors.clone());
        }

        if step + 1 < F::STEPS.len() {
            self.state = WizardState::Step(step + 1);
            Transition::Moved {
                from: step,
                to: step + 1,
            }
        } else {
            self.busy = true;
            Transition::ReadyToSubmit(SubmissionDraft {
                form: self.form.clone(),
            })
        }
    }

    /// Feed back the result of writing a draft.
    ///
    /// The busy flag is cleared on every path. A failure leaves the wizard on
    /// its last step with the form untouched.
    pub fn complete_submission(
        &mut self,
        result: Result<SubmitOutcome, ApplicationError>,
    ) -> Result<Advance<F::Field>, ApplicationError> {
        self.busy = false;
        if matches!(self.state, WizardState::Submitted(_)) {
            return Err(ApplicationError::WizardClosed);
        }
        match result {
            Ok(SubmitOutcome::Created(status)) => {
                info!(variant = F::VARIANT, %status, "application submitted");
                self.state = WizardState::Submitted(status.clone());
                Ok(Advance::Submitted(status))
            }
            Ok(SubmitOutcome::Duplicate(status)) => {
                info!(variant = F::VARIANT, %status, "application was already submitted");
                self.state = WizardState::Submitted(status.clone());
                Ok(Advance::Duplicate(status))
            }
            Err(err) => {
                warn!(variant = F::VARIANT, error = %err, "submission failed");
                Err(err)
            }
        }
    }

    pub async fn advance(
        &mut self,
        applications: &Applications,
        session: &Session,
    ) -> Result<Advance<F::Field>, ApplicationError> {
        match self.try_advance() {
            Transition::Rejected(errors) => Ok(Advance::Rejected(errors)),
            Transition::Moved { from, to } => Ok(Advance::Moved { from, to }),
            Transition::Busy => Err(ApplicationError::Busy),
            Transition::Closed => Err(ApplicationError::WizardClosed),
            Transition::ReadyToSubmit(draft) => {
                let result = match session.require() {
                    Ok(identity) => applications
                        .submit(identity, &draft.form)
                        .await
                        .map_err(ApplicationError::from),
                    Err(err) => Err(err),
                };
                self.complete_submission(result)
            }
        }
    }

    /// Go back one step. Values and errors are kept.
    pub fn retreat(&mut self) -> bool {
        match self.state {
            WizardState::Step(step) if step > 0 => {
                self.state = WizardState::Step(step - 1);
                true
            }
            _ => false,
        }
    }
}
