use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid mail api config: {0}")]
    Config(String),
    #[error("request timed out")]
    TimedOut,
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for EmailError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmailError::TimedOut
        } else {
            EmailError::Transport(err.to_string())
        }
    }
}
