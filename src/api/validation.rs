use super::ApiError;

pub fn validate_id(id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1).is_ok());
        assert!(validate_id(12345).is_ok());
        assert!(validate_id(0).is_err());
        assert!(validate_id(-1).is_err());
    }
}
