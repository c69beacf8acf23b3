//! Result type alias for framequeue

use super::errors::FramequeueError;

/// Result type alias for framequeue operations
///
/// # Examples
///
/// ```
/// use framequeue::domain::result::Result;
/// use framequeue::domain::errors::FramequeueError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FramequeueError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FramequeueError>;

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

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(FramequeueError::Validation("test error".to_string()));
        assert!(result.is_err());
    }
}
