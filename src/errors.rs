use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse
};
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Whether 500 responses carry the underlying error text. Only enabled in
/// development.
static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

pub fn expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAILS.store(enabled, Ordering::Relaxed);
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    BadRequest(String),
    DuplicateKey(String),
    Forbidden(String),
    NotFound(String),
    TooManyRequests { retry_after: u64 },
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", messages)
            }
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::DuplicateKey(field) => write!(f, "Duplicate value for field: {}", field),
            AppError::Forbidden(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::TooManyRequests { .. } => write!(f, "Too many requests, please try again later"),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": errors
                })
            }
            AppError::InternalError(detail) => {
                tracing::error!(error = %detail, "Unhandled error");
                if EXPOSE_INTERNAL_DETAILS.load(Ordering::Relaxed) {
                    serde_json::json!({
                        "success": false,
                        "message": "Internal server error",
                        "detail": detail
                    })
                } else {
                    serde_json::json!({"success": false, "message": "Internal server error"})
                }
            }
            _ => {
                serde_json::json!({"success": false, "message": self.to_string()})
            }
        };

        let mut response = HttpResponse::build(self.status_code());
        response.insert_header(ContentType::json());
        if let AppError::TooManyRequests { retry_after } = self {
            response.insert_header((header::RETRY_AFTER, retry_after.to_string()));
        }
        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateKey(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors = Vec::new();
        collect_field_errors(None, &errors, &mut field_errors);
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

/// Flattens nested struct errors into dotted field paths, e.g.
/// `caseStudy.problem`. Field names are reported in the camelCase spelling
/// used by the JSON bodies.
fn collect_field_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let field = to_camel_case(field);
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field,
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError {
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", path)),
                    field: path.clone(),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(Some(&path), inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(Some(&format!("{}[{}]", path, index)), inner, out);
                }
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".into()),
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23505")) => {
                let field = e.constraint()
                    .and_then(field_from_constraint)
                    .unwrap_or("unknown");
                AppError::DuplicateKey(field.to_string())
            }
            _ => AppError::InternalError(format!("Database error: {}", err))
        }
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Maps `<table>_<column>_key` constraint names back to the column.
fn field_from_constraint(constraint: &str) -> Option<&str> {
    constraint
        .strip_suffix("_key")
        .and_then(|rest| rest.split_once('_'))
        .map(|(_, column)| column)
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("IO error: {}", err))
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError { field: field.into(), message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn validation_errors_keep_field_messages() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("Project title is required"));
        errors.add("title", err);

        match AppError::from(errors) {
            AppError::ValidationError(fields) => {
                assert_eq!(fields, vec![FieldError::new("title", "Project title is required")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn field_names_use_json_spelling() {
        let mut errors = ValidationErrors::new();
        errors.add("tech_stack", ValidationError::new("length"));

        match AppError::from(errors) {
            AppError::ValidationError(fields) => assert_eq!(fields[0].field, "techStack"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn constraint_names_map_to_columns() {
        assert_eq!(field_from_constraint("projects_slug_key"), Some("slug"));
        assert_eq!(field_from_constraint("projects_pkey"), None);
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::DuplicateKey("slug".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Forbidden("no".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::TooManyRequests { retry_after: 3 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::InternalError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_key_names_field() {
        assert_eq!(
            AppError::DuplicateKey("slug".into()).to_string(),
            "Duplicate value for field: slug"
        );
    }
}
