//! Request validation
//!
//! Payload types derive [`validator::Validate`]; this module turns the
//! collected failures into the flat violation list returned with a 422.

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, Result};

/// One violated rule on one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flatten validator errors, ordered by field name.
pub fn violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            out.push(FieldViolation::new(field.to_string(), message));
        }
    }
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Violations of `input`, empty when it is valid.
pub fn collect<T: Validate>(input: &T) -> Vec<FieldViolation> {
    match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => violations(&errors),
    }
}

/// Fail with a 422 carrying every violation of `input`.
pub fn check<T: Validate>(input: &T) -> Result<()> {
    let found = collect(input);
    if found.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_input(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn valid_input_has_no_violations() {
        let sample = Sample {
            name: "abcd".into(),
            email: "a@b.io".into(),
        };
        assert!(collect(&sample).is_empty());
        assert!(check(&sample).is_ok());
    }

    #[test]
    fn violations_are_sorted_and_fall_back_to_code() {
        let sample = Sample {
            name: "a".into(),
            email: "nope".into(),
        };
        let found = collect(&sample);
        assert_eq!(
            found,
            vec![
                FieldViolation::new("email", "email"),
                FieldViolation::new("name", "too short"),
            ]
        );
    }

    #[test]
    fn check_maps_to_unprocessable_entity() {
        let sample = Sample {
            name: "".into(),
            email: "a@b.io".into(),
        };
        match check(&sample) {
            Err(AppError::Validation { violations, .. }) => assert_eq!(violations.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
