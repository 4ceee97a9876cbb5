use crate::models::Action;
use serde_yaml::Value;

/// True when a quality score carries no meaningful value.
///
/// Null, `false`, numeric zero, `"0"` and blank strings are empty. Everything
/// else is a score, including negative numbers, sequences and mappings.
pub fn is_empty_score(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text == "0" || text.trim().is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => false,
        Value::Tagged(tagged) => is_empty_score(&tagged.value),
    }
}

fn is_marker(icon: Option<&Value>, marker: &str) -> bool {
    icon.and_then(Value::as_str) == Some(marker)
}

/// Picks the single action for a note from its score and icon fields.
///
/// `None` means the field is absent from the header; `Some(Value::Null)` means
/// the key is present with no value.
pub fn decide(score: Option<&Value>, icon: Option<&Value>, marker: &str) -> Action {
    match score {
        Some(score) if is_empty_score(score) && is_marker(icon, marker) => Action::RemoveIcon,
        Some(score) if !is_empty_score(score) && icon.is_none() => Action::AddIcon,
        None if is_marker(icon, marker) => Action::WarnOrphan,
        _ => Action::NoOp,
    }
}
