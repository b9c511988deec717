//! Provider error types.

/// Errors from a geocoding or places provider.
///
/// The resolver treats all of these as "this stage failed" and moves on to
/// the next provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Google answered 200 with a non-OK `status` field
    #[error("{provider} returned status {status}{}", message_suffix(.message))]
    Status {
        provider: &'static str,
        status: String,
        message: Option<String>,
    },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// No API key configured for this provider
    #[error("missing API key for {0}")]
    MissingKey(&'static str),
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}
