use super::error::ApiError;

/// Rejects file names that could escape the blob directory (`..`, path
/// separators) and enforces a sane length, mirroring the teacher's
/// `validate_manifest` defense-in-depth checks on client-controlled paths.
pub fn validate_file_name(file_name: &str) -> Result<(), ApiError> {
    if file_name.is_empty() {
        return Err(ApiError::InvalidPayload("file name must not be empty".into()));
    }
    if file_name.len() > 255 {
        return Err(ApiError::InvalidPayload("file name exceeds 255 characters".into()));
    }
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(ApiError::InvalidPayload("file name must not contain path separators".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plain_file_name() {
        assert!(validate_file_name("invoice_001.pdf").is_ok());
    }

    #[test]
    fn rejects_empty_and_traversal_names() {
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("../../etc/passwd").is_err());
        assert!(validate_file_name("a/b.pdf").is_err());
    }
}
