use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    pub backend: BackendConfig,
    pub ai: AiTimeouts,
}

/// Where the mail and AI services live. The AI routes are mounted at the
/// service root, not under the `/api` prefix, so the two bases differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_base_url: String,
    pub ai_base_url: String,
    pub request_timeout_secs: u64,
}

/// Per-call overrides for the short AI operations. Draft generation has no
/// override and rides the transport default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTimeouts {
    pub polish_timeout_secs: u64,
    pub analyze_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            backend: BackendConfig {
                api_base_url: "https://mail.ternmail.example/api".to_string(),
                ai_base_url: "https://mail.ternmail.example".to_string(),
                request_timeout_secs: 30,
            },
            ai: AiTimeouts {
                polish_timeout_secs: 20,
                analyze_timeout_secs: 20,
            },
        }
    }
}
