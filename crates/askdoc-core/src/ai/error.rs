use thiserror::Error;

/// Errors from the hosted model gateway
#[derive(Error, Debug)]
pub enum AiError {
    /// None of the known environment variables (or the config file) held a key
    #[error("API key not found")]
    MissingCredential,

    /// The API rejected the key
    #[error("API key rejected ({status}): {message}")]
    InvalidCredential { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("The model returned no text")]
    EmptyResponse,
}

impl AiError {
    /// Configuration problems the user has to fix, as opposed to transient failures.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            AiError::MissingCredential | AiError::InvalidCredential { .. }
        )
    }

    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, body: String) -> Self {
        let rejected_key = status == 401
            || status == 403
            || (status == 400 && body.contains("API_KEY_INVALID"));
        if rejected_key {
            AiError::InvalidCredential {
                status,
                message: body,
            }
        } else {
            AiError::Api { status, body }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_are_distinct() {
        assert!(AiError::MissingCredential.is_credential_error());
        assert!(AiError::from_status(403, "forbidden".into()).is_credential_error());
        assert!(AiError::from_status(400, "{\"reason\":\"API_KEY_INVALID\"}".into())
            .is_credential_error());

        assert!(!AiError::from_status(500, "oops".into()).is_credential_error());
        assert!(!AiError::from_status(400, "bad request".into()).is_credential_error());
        assert!(!AiError::EmptyResponse.is_credential_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AiError::MissingCredential.to_string(), "API key not found");
        assert_eq!(
            AiError::from_status(429, "slow down".into()).to_string(),
            "Gemini API error 429: slow down"
        );
    }
}
