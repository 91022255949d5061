//! Result type alias for hallticket

use super::errors::HallTicketError;

/// Result type alias for hallticket operations
///
/// # Examples
///
/// ```
/// use hallticket::domain::result::Result;
/// use hallticket::domain::errors::HallTicketError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HallTicketError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HallTicketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
