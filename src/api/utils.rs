//! Pure, stateless helper functions for ingress request processing.

use crate::api::error::ApiError;

/// Validates that body size does not exceed the configured maximum.
pub fn validate_body_size(size: u64, max_size: u64) -> Result<(), ApiError> {
    if size > max_size {
        return Err(ApiError::PayloadTooLarge(size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_body_size_ok() {
        assert!(validate_body_size(1000, 1000).is_ok());
        assert!(validate_body_size(1000, 2000).is_ok());
        assert!(validate_body_size(0, 100).is_ok());
    }

    #[test]
    fn test_validate_body_size_too_large() {
        let result = validate_body_size(1000, 999);
        assert!(result.is_err());
        match result {
            Err(ApiError::PayloadTooLarge(size)) => assert_eq!(size, 1000),
            _ => panic!("Expected PayloadTooLarge error"),
        }
    }
}
