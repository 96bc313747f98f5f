use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidateLength;

/// Optional-field semantics for PUT bodies.
///
/// - `Unchanged` → key absent from the body
/// - `SetToNull` → key present with `null`
/// - `SetToValue` → key present with a value
///
/// Structs holding these must use `#[serde(default)]` so that absent keys
/// become `Unchanged`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

impl<T> ValidateLength<u64> for OptionField<T>
where
    T: ValidateLength<u64>
{
    fn length(&self) -> Option<u64> {
        match self {
            OptionField::SetToValue(value) => value.length(),
            _ => None,
        }
    }
    fn validate_length(&self, min: Option<u64>, max: Option<u64>, equal: Option<u64>) -> bool {
        match self {
            OptionField::SetToValue(value) => value.validate_length(min, max, equal),
            _ => true,
        }
    }
}

impl<T> OptionField<T> {
    /// Transform inner value if `SetToValue`
    pub fn map_value<U, F: FnOnce(T) -> U>(self, f: F) -> OptionField<U> {
        match self {
            Self::Unchanged => OptionField::Unchanged,
            Self::SetToNull => OptionField::SetToNull,
            Self::SetToValue(v) => OptionField::SetToValue(f(v)),
        }
    }

    /// Writes the change into `target`, leaving it alone when `Unchanged`.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Self::Unchanged => {}
            Self::SetToNull => *target = None,
            Self::SetToValue(v) => *target = Some(v),
        }
    }
}

impl OptionField<String> {
    /// Trims the value; blank strings count as `null`.
    pub fn trimmed(self) -> Self {
        match self {
            Self::SetToValue(v) if v.trim().is_empty() => Self::SetToNull,
            Self::SetToValue(v) => Self::SetToValue(v.trim().to_string()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct Patch {
        outcome: OptionField<String>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"outcome": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"outcome": "shipped"}"#).unwrap();

        assert_eq!(absent.outcome, OptionField::Unchanged);
        assert_eq!(null.outcome, OptionField::SetToNull);
        assert_eq!(value.outcome, OptionField::SetToValue("shipped".to_string()));
    }

    #[test]
    fn apply_to_respects_semantics() {
        let mut target = Some("old".to_string());
        OptionField::Unchanged.apply_to(&mut target);
        assert_eq!(target.as_deref(), Some("old"));

        OptionField::SetToValue("new".to_string()).apply_to(&mut target);
        assert_eq!(target.as_deref(), Some("new"));

        OptionField::<String>::SetToNull.apply_to(&mut target);
        assert_eq!(target, None);
    }

    #[test]
    fn blank_strings_become_null() {
        assert_eq!(OptionField::SetToValue("   ".to_string()).trimmed(), OptionField::SetToNull);
    }
}
