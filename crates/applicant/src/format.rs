//! Keystroke formatting for masked inputs.
//!
//! Every function here is total: partial or garbage input yields a partially
//! punctuated prefix, never an error.

use crate::field::FieldKind;

pub const PHONE_MAX_LEN: usize = 18;
pub const DATE_MAX_LEN: usize = 10;
pub const COMPACT_PHONE_MAX_LEN: usize = 12;
pub const COUNTRY_PREFIX: &str = "+7";

/// Turn the raw text of an input into its canonical display form.
///
/// `previous` is the value the field held before this keystroke.
pub fn format(kind: FieldKind, raw: &str, previous: &str) -> String {
    match kind {
        FieldKind::Phone => masked(raw, previous, format_phone),
        FieldKind::Date => masked(raw, previous, format_date),
        FieldKind::CompactPhone => format_compact_phone(raw, previous),
        _ => raw.to_string(),
    }
}

/// `8 700 123 45 67` -> `+7 (700) 123-45-67`.
///
/// The first digit is the trunk/country digit and is always rendered as `+7`.
pub fn format_phone(raw: &str) -> String {
    let digits = digits(raw, 11);
    let n = digits.len();

    let mut out = String::with_capacity(PHONE_MAX_LEN);
    out.push_str(COUNTRY_PREFIX);
    out.push(' ');
    if n > 1 {
        out.push('(');
        out.push_str(&digits[1..n.min(4)]);
        out.push_str(") ");
    }
    if n > 4 {
        out.push_str(&digits[4..n.min(7)]);
        out.push('-');
    }
    if n > 7 {
        out.push_str(&digits[7..n.min(9)]);
        out.push('-');
    }
    if n > 9 {
        out.push_str(&digits[9..n.min(11)]);
    }
    out.truncate(PHONE_MAX_LEN);
    out
}

/// `01021999` -> `01.02.1999`.
pub fn format_date(raw: &str) -> String {
    let digits = digits(raw, 8);
    let n = digits.len();

    let mut out = String::with_capacity(DATE_MAX_LEN);
    out.push_str(&digits[..n.min(2)]);
    if n > 2 {
        out.push('.');
        out.push_str(&digits[2..n.min(4)]);
    }
    if n > 4 {
        out.push('.');
        out.push_str(&digits[4..n]);
    }
    out.truncate(DATE_MAX_LEN);
    out
}

/// Registration phone input: always starts with `+7`, at most 12 characters.
///
/// Text that lost the prefix snaps back to `+7`. Text that grew past the limit
/// keeps the previous value, or is cut when the previous value is unusable.
pub fn format_compact_phone(raw: &str, previous: &str) -> String {
    if !raw.starts_with(COUNTRY_PREFIX) {
        return COUNTRY_PREFIX.to_string();
    }
    if raw.chars().count() <= COMPACT_PHONE_MAX_LEN {
        return raw.to_string();
    }
    if previous.starts_with(COUNTRY_PREFIX) && previous.chars().count() <= COMPACT_PHONE_MAX_LEN {
        previous.to_string()
    } else {
        raw.chars().take(COMPACT_PHONE_MAX_LEN).collect()
    }
}

// Deleting a separator leaves the digits unchanged, so the mask would put it
// straight back. Treat it as deleting the digit before it. Only a single
// deleted character counts; a retyped whole value is formatted as is.
fn masked(raw: &str, previous: &str, mask: fn(&str) -> String) -> String {
    let formatted = mask(raw);
    if formatted == previous && is_one_deletion(raw, previous) {
        let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        digits.pop();
        return mask(&digits);
    }
    formatted
}

/// `raw` is `previous` with exactly one character removed.
fn is_one_deletion(raw: &str, previous: &str) -> bool {
    if raw.chars().count() + 1 != previous.chars().count() {
        return false;
    }
    let split = raw
        .char_indices()
        .zip(previous.chars())
        .find(|((_, a), b)| a != b)
        .map_or(raw.len(), |((at, _), _)| at);
    let Some(removed) = previous[split..].chars().next() else {
        return false;
    };
    raw[split..] == previous[split + removed.len_utf8()..]
}

fn digits(raw: &str, limit: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(limit).collect()
}
