//! Wizard variants. Each variant is its own typed record with its own step
//! table; the two are never merged.

mod consultation;
mod enrollment;

pub use consultation::{
    ADDITIONAL_CONSULTATION, CITIES, CONSULTATION_METHODS, COURSES, ConsultationField,
    ConsultationForm, LANGUAGES,
};
pub use enrollment::{EnrollmentField, EnrollmentForm};

use std::fmt::Debug;

use crate::field::{Fields, FormField, FormValues};

/// One screen of the wizard: a prompt and the fields it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition<F: 'static> {
    pub prompt: &'static str,
    pub fields: &'static [F],
}

/// A form filled in by a wizard.
pub trait ApplicationForm: FormValues + Default + Clone + Debug + Send + Sync + 'static {
    /// Stored alongside the submission so staff can tell the variants apart.
    const VARIANT: &'static str;

    /// The step table. The position in the slice is the step index.
    const STEPS: &'static [StepDefinition<Self::Field>];

    fn step_count() -> usize {
        Self::STEPS.len()
    }

    /// Every field of the form, in step order.
    fn all_fields() -> impl Iterator<Item = Self::Field> {
        Self::STEPS.iter().flat_map(|step| step.fields.iter().copied())
    }

    /// Flat snapshot for storage.
    fn to_fields(&self) -> Fields {
        Self::all_fields()
            .map(|field| (field.key().to_string(), self.value(field)))
            .collect()
    }

    /// Rebuild a form from a stored snapshot. Unknown keys are ignored.
    fn from_fields(fields: &Fields) -> Self {
        let mut form = Self::default();
        for field in Self::all_fields() {
            if let Some(value) = fields.get(field.key()) {
                form.set(field, value.clone());
            }
        }
        form
    }
}
