//! Result type alias for Tessera

use super::errors::TesseraError;

/// Result type alias for Tessera operations
///
/// # Examples
///
/// ```
/// use tessera::domain::result::Result;
/// use tessera::domain::errors::TesseraError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TesseraError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TesseraError>;
