use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApplicationError;
use crate::field::{FieldKind, FieldValue, FormField, FormValues};
use crate::forms::ApplicationForm;

lazy_static! {
    static ref PHONE: Regex =
        Regex::new(r"^\+7 \([0-9]{3}\) [0-9]{3}-[0-9]{2}-[0-9]{2}$").expect("phone pattern");
    static ref COMPACT_PHONE: Regex = Regex::new(r"^\+7[0-9]{10}$").expect("compact phone pattern");
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern");
    static ref DATE: Regex = Regex::new(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}$").expect("date pattern");
}

const SUMMARY_HEADER: &str = "Заполните все необходимые поля:";

/// Field errors of one validation pass, in the order the fields were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors<F> {
    entries: Vec<(F, &'static str)>,
}

impl<F> Default for ValidationErrors<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: FormField> ValidationErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record an error. The first error for a field wins.
    pub fn push(&mut self, field: F, message: &'static str) {
        if !self.contains(field) {
            self.entries.push((field, message));
        }
    }

    pub fn contains(&self, field: F) -> bool {
        self.entries.iter().any(|(f, _)| *f == field)
    }

    pub fn get(&self, field: F) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// The aggregated alert text: a header line followed by one message per line.
    pub fn summary(&self) -> String {
        let mut out = String::from(SUMMARY_HEADER);
        for (_, message) in &self.entries {
            out.push('\n');
            out.push_str(message);
        }
        out
    }

    pub fn into_error(self) -> ApplicationError {
        ApplicationError::Invalid(self.summary())
    }
}

impl<F: FormField> fmt::Display for ValidationErrors<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Whether a non-empty value has the shape its kind requires.
pub fn is_well_formed(kind: FieldKind, text: &str) -> bool {
    match kind {
        FieldKind::Phone => PHONE.is_match(text),
        FieldKind::CompactPhone => COMPACT_PHONE.is_match(text),
        FieldKind::Email => EMAIL.is_match(text),
        FieldKind::Date => {
            DATE.is_match(text) && NaiveDate::parse_from_str(text, "%d.%m.%Y").is_ok()
        }
        FieldKind::Choice(options) => options.iter().any(|choice| choice.value == text),
        FieldKind::Text | FieldKind::Secret | FieldKind::Flag => true,
    }
}

/// Check one field. Presence first; the format is only looked at when filled in.
pub fn check_field<F: FormField>(field: F, value: &FieldValue) -> Option<&'static str> {
    if value.is_blank() {
        return Some(field.missing_message());
    }
    match value {
        FieldValue::Text(text) if !is_well_formed(field.kind(), text) => {
            Some(field.invalid_message())
        }
        _ => None,
    }
}

/// Validate exactly the given fields of a form.
pub fn validate_fields<V: FormValues>(form: &V, fields: &[V::Field]) -> ValidationErrors<V::Field> {
    let mut errors = ValidationErrors::new();
    for &field in fields {
        if let Some(message) = check_field(field, &form.value(field)) {
            errors.push(field, message);
        }
    }
    errors
}

/// Validate the required fields of one wizard step.
///
/// Fields of other steps are never looked at. An index outside the step table
/// has nothing to check and yields an empty set.
pub fn validate_step<F: ApplicationForm>(step: usize, form: &F) -> ValidationErrors<F::Field> {
    match F::STEPS.get(step) {
        Some(definition) => validate_fields(form, definition.fields),
        None => ValidationErrors::new(),
    }
}
