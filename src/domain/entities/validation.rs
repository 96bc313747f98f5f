use std::borrow::Cow;
use std::str::FromStr;

use validator::{ValidationError, ValidationErrors};

pub const MIN_SLUG_LENGTH: u64 = 2;
pub const MAX_SLUG_LENGTH: u64 = 80;

pub fn new_validation_error(code: &'static str, msg: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(msg.into());
    err
}

/// Builds a single-field `ValidationErrors`, for checks that run after the
/// derive-based pass.
pub fn field_error(field: &'static str, code: &'static str, msg: impl Into<Cow<'static, str>>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, new_validation_error(code, msg));
    errors
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(new_validation_error("slug_empty", "Slug cannot be empty"));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(new_validation_error("slug_invalid_chars", "Slug must contain only lowercase letters, digits, or hyphens"));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(new_validation_error("slug_edge_hyphen", "Slug must not start or end with a hyphen"));
    }
    if slug.contains("--") {
        return Err(new_validation_error("slug_double_hyphen", "Slug must not contain consecutive hyphens"));
    }
    Ok(())
}

/// Checks a raw string against an enum's accepted spellings and names the
/// allowed values in the message.
pub fn validate_enum<E>(value: &str, field_label: &str) -> Result<(), ValidationError>
where
    E: FromStr + strum::VariantNames,
{
    if E::from_str(value).is_ok() {
        return Ok(());
    }
    Err(new_validation_error(
        "invalid_enum",
        format!(
            "`{}` is not a valid {} (expected one of: {})",
            value,
            field_label,
            E::VARIANTS.join(", ")
        ),
    ))
}

/// Trims every entry and drops the empty ones.
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

pub fn trim_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("creative-os").is_ok());
        assert!(validate_slug("Creative-OS").is_err());
        assert!(validate_slug("-edge").is_err());
        assert!(validate_slug("double--hyphen").is_err());
    }

    #[test]
    fn urls_must_be_http() {
        assert!(validate_url("https://elsafa-egypt.com/").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn clean_list_drops_blanks() {
        let cleaned = clean_list(vec![" Rust ".into(), "".into(), "  ".into(), "SQL".into()]);
        assert_eq!(cleaned, vec!["Rust".to_string(), "SQL".to_string()]);
    }
}
