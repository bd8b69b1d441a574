use std::fmt;

/// Error type for gateway operations
/// Implements Clone so batch results can carry it per item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Input text or prompt is blank after trimming
    EmptyInput(String)
  , /// Content type needs a context string and none was given
    MissingRequiredContext(crate::ContentType)
  , /// Name outside one of the closed enum sets
    UnknownEnumValue
    {   kind: &'static str
      , value: String
    }
  , /// Batch exceeds its item cap
    BatchTooLarge
    {   limit: usize
      , got: usize
    }
  , /// Request body failed schema or range validation
    InvalidRequest(String)
  , /// Provider credential is not configured
    ServiceUnavailable
  , /// External completion call failed
    CompletionFailed(String)
  , /// Template kept a placeholder after rendering
    UnrenderedPlaceholder(String)
  , /// API key is missing for the provider
    MissingApiKey(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Timeout error
    Timeout
  , /// Terminal or socket I/O failure
    Io(String)
}

impl Error
{   /// True for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool
    {   matches!(
          self
        , Error::EmptyInput(_)
          | Error::MissingRequiredContext(_)
          | Error::UnknownEnumValue { .. }
          | Error::BatchTooLarge { .. }
          | Error::InvalidRequest(_)
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::EmptyInput(field) => {
              write!(f, "{} cannot be empty", field)
            }
          , Error::MissingRequiredContext(kind) => {
              write!(f,
                "Context is required for {} content generation",
                kind
              )
            }
          , Error::UnknownEnumValue { kind, value } => {
              write!(f, "Unknown {}: {}", kind, value)
            }
          , Error::BatchTooLarge { limit, got } => {
              write!(f,
                "Batch size limited to {} requests (got {})",
                limit, got
              )
            }
          , Error::InvalidRequest(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::ServiceUnavailable => {
              write!(f,
                "AI service unavailable. Check Groq API configuration."
              )
            }
          , Error::CompletionFailed(msg) => {
              write!(f, "Completion failed: {}", msg)
            }
          , Error::UnrenderedPlaceholder(name) => {
              write!(f,
                "Template placeholder left unrendered: {}",
                name
              )
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}
