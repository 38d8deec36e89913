use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A single form value. Forms only ever hold text or a yes/no flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Empty text and an unset flag both count as "not filled in".
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Flag(set) => !set,
            FieldValue::Text(text) => text.is_empty(),
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Flag(_) => "",
        }
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Flat field dictionary as it is stored in a record.
pub type Fields = BTreeMap<String, FieldValue>;

/// One selectable option: the stored value and the text shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

impl Choice {
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }

    /// An option whose label is its value.
    pub const fn plain(value: &'static str) -> Self {
        Self {
            value,
            label: value,
        }
    }
}

/// Input kind of a field. Drives both formatting and the format check.
///
/// Notes:
/// - `Phone` is the punctuated `+7 (DDD) DDD-DD-DD` mask
/// - `CompactPhone` is `+7` followed by ten digits, typed as is
/// - `Date` is `DD.MM.YYYY`
/// - `Choice` values must be one of the listed options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Secret,
    Email,
    Phone,
    CompactPhone,
    Date,
    Choice(&'static [Choice]),
    Flag,
}

impl FieldKind {
    pub fn options(self) -> &'static [Choice] {
        match self {
            FieldKind::Choice(options) => options,
            _ => &[],
        }
    }
}

/// A named, typed slot of a form.
pub trait FormField: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Key used in the stored record.
    fn key(self) -> &'static str;

    fn kind(self) -> FieldKind;

    /// Short prompt shown next to the input.
    fn label(self) -> &'static str;

    /// Error shown when the field is left empty.
    fn missing_message(self) -> &'static str;

    /// Error shown when the field is filled in but malformed.
    fn invalid_message(self) -> &'static str {
        "Неверный формат"
    }
}

/// Typed access to the values of a form.
pub trait FormValues {
    type Field: FormField;

    fn value(&self, field: Self::Field) -> FieldValue;

    fn set(&mut self, field: Self::Field, value: FieldValue);
}
