use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body could not be parsed into the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = body
                .char_indices()
                .take_while(|(i, _)| *i < MAX_ERROR_BODY_LENGTH)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Http {
            status,
            body: Self::truncate_body(body),
        }
    }
}
