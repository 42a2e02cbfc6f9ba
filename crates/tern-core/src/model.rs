use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fetched email as the mail backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// Raw backend category label; may be empty. Normalization for display
    /// happens in the inbox layer.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `GET /emails` response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPage {
    #[serde(default)]
    pub emails: Vec<Email>,
    #[serde(default)]
    pub total: usize,
}

/// Payload for `POST /emails/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A server-side saved draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// The three AI action kinds a view can trigger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Draft,
    Polish,
    Analyze,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Draft => "draft",
            FlowKind::Polish => "polish",
            FlowKind::Analyze => "analyze",
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one AI flow. Consumed exactly once by the view that
/// started the flow; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowResult {
    Succeeded(String),
    Failed(String),
    Cancelled,
}

/// Which shape the editor view is in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComposeMode {
    Compose,
    Reply,
}

impl Default for ComposeMode {
    fn default() -> Self {
        Self::Compose
    }
}
