use tern_core::FlowKind;
use thiserror::Error;

/// Rejected operations on the draft flow controller. These are precondition
/// failures; AI outcomes (success, failure, cancellation) travel as
/// `FlowResult` values instead.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("a {0} flow is already running")]
    FlowBusy(FlowKind),
    #[error("prompt text is empty")]
    EmptyPrompt,
    #[error("there is no draft text to work with")]
    EmptyDraft,
    #[error("to, subject, and message are all required to send")]
    MissingFields,
    #[error("mail backend error: {0}")]
    Email(#[from] tern_email::EmailError),
}
