use thiserror::Error;

/// Classified outcome of a failed AI call. Raw transport errors are folded
/// into this taxonomy at the gateway boundary; views only ever see these
/// variants.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("request was cancelled")]
    Cancelled,
    #[error("request timed out")]
    TimedOut,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response missing result text")]
    MalformedResponse,
    #[error("invalid gateway config: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::TimedOut
        } else {
            AiError::Transport(err.to_string())
        }
    }
}

impl AiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AiError::Cancelled)
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, AiError::TimedOut)
    }
}
