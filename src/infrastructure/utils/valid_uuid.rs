use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path id. A malformed id can never match a stored record, so it
/// surfaces as `NotFound` carrying the caller's message.
pub fn valid_uuid(id: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound(not_found.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        let err = valid_uuid("not-an-id", "Event not found").unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Event not found"));
    }

    #[test]
    fn well_formed_ids_parse() {
        let id = Uuid::new_v4();
        assert_eq!(valid_uuid(&id.to_string(), "x").unwrap(), id);
    }
}
