use thiserror::Error;

/// Errors returned by [`WundergroundClient`](crate::WundergroundClient) operations.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No usable API key was supplied or found in the environment.
    #[error(
        "Weather Underground client requires a valid API key.\n\
         Hint: pass a key or set the {} environment variable.",
        crate::config::API_KEY_ENV
    )]
    InvalidCredential,

    /// The request could not be sent or the API answered with a non-success status.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The response body is not valid JSON.
    #[error("Malformed response body: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// A field expected in the response is absent.
    #[error("Response is missing field '{0}'")]
    MissingField(String),

    /// A field is present but does not have the JSON type the caller relies on.
    #[error("Response field '{path}' is not {expected}")]
    UnexpectedType { path: String, expected: &'static str },
}
