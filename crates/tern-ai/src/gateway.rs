use crate::{AiError, CancellableCall, RequestRegistry};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tern_core::{ComposeMode, FlowKind};

#[derive(Debug, Clone)]
pub struct AiGatewayConfig {
    pub base_url: String,
    /// Client-level transport timeout. Draft generation rides this default.
    pub request_timeout: Duration,
    pub polish_timeout: Duration,
    pub analyze_timeout: Duration,
}

impl Default for AiGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mail.ternmail.example".to_string(),
            request_timeout: Duration::from_secs(30),
            polish_timeout: Duration::from_secs(20),
            analyze_timeout: Duration::from_secs(20),
        }
    }
}

/// Envelope the draft route answers with. `success == false` is an in-band
/// backend refusal, distinct from transport failure.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: String,
}

/// Thin typed client over the three AI routes. Every operation runs through
/// the registry's cancellable-request factory, so callers get a pending
/// result plus a cancel handle.
#[derive(Clone)]
pub struct AiGateway {
    config: AiGatewayConfig,
    http: reqwest::Client,
    registry: Arc<RequestRegistry>,
}

impl AiGateway {
    pub fn new(config: AiGatewayConfig, registry: Arc<RequestRegistry>) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| AiError::Config(err.to_string()))?;

        Ok(Self {
            config,
            http,
            registry,
        })
    }

    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// `POST {base}/draft`. An empty prompt falls back to the source email
    /// body; reply drafts ask for a professional tone, fresh compositions
    /// for a friendly one.
    pub fn generate_draft(
        &self,
        body: &str,
        subject: &str,
        mode: ComposeMode,
        prompt: &str,
    ) -> CancellableCall<DraftResponse> {
        let payload = serde_json::json!({
            "prompt": if prompt.is_empty() { body } else { prompt },
            "tone": if mode == ComposeMode::Reply { "professional" } else { "friendly" },
            "length": "medium",
        });
        tracing::debug!(subject, ?mode, "requesting ai draft");

        let url = self.route("draft");
        let http = self.http.clone();
        self.registry.track(FlowKind::Draft, move |_cancel| async move {
            let response = http
                .post(&url)
                .json(&payload)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.json::<DraftResponse>().await?)
        })
    }

    /// `POST {base}/polish` with the 20 s per-call override.
    pub fn polish(&self, text: &str) -> CancellableCall<String> {
        let payload = serde_json::json!({
            "text": text,
            "style": "professional",
        });

        let url = self.route("polish");
        let timeout = self.config.polish_timeout;
        let http = self.http.clone();
        self.registry.track(FlowKind::Polish, move |_cancel| async move {
            let response = http
                .post(&url)
                .json(&payload)
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            let value: serde_json::Value = response.json().await?;
            reply_text(&value).ok_or(AiError::MalformedResponse)
        })
    }

    /// `POST {base}/grammar-check` with the 20 s per-call override.
    pub fn analyze(&self, text: &str) -> CancellableCall<String> {
        let payload = serde_json::json!({ "text": text });

        let url = self.route("grammar-check");
        let timeout = self.config.analyze_timeout;
        let http = self.http.clone();
        self.registry.track(FlowKind::Analyze, move |_cancel| async move {
            let response = http
                .post(&url)
                .json(&payload)
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            let value: serde_json::Value = response.json().await?;
            reply_text(&value).ok_or(AiError::MalformedResponse)
        })
    }

    fn route(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

/// The short AI routes answer with one of several field names depending on
/// backend version; take the first present.
fn reply_text(value: &serde_json::Value) -> Option<String> {
    ["result", "text", "reply"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{AiGateway, AiGatewayConfig};
    use crate::{AiError, RequestRegistry};
    use std::time::Duration;
    use tern_core::ComposeMode;

    fn gateway_for(server: &mockito::ServerGuard) -> AiGateway {
        let config = AiGatewayConfig {
            base_url: server.url(),
            request_timeout: Duration::from_secs(5),
            polish_timeout: Duration::from_secs(5),
            analyze_timeout: Duration::from_secs(5),
        };
        AiGateway::new(config, RequestRegistry::new()).expect("gateway")
    }

    #[tokio::test]
    async fn draft_sends_prompt_tone_and_length() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/draft")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "prompt": "Thank them + ask for next steps",
                "tone": "friendly",
                "length": "medium",
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "result": "Dear team, thank you."}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let call = gateway.generate_draft(
            "original body",
            "",
            ComposeMode::Compose,
            "Thank them + ask for next steps",
        );
        let draft = call.resolve().await.expect("draft resolves");

        mock.assert_async().await;
        assert!(draft.success);
        assert_eq!(draft.result, "Dear team, thank you.");
        assert!(gateway.registry().is_empty());
    }

    #[tokio::test]
    async fn draft_with_empty_prompt_falls_back_to_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/draft")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "prompt": "please review the attached report",
                "tone": "professional",
                "length": "medium",
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "result": "Will do."}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        gateway
            .generate_draft(
                "please review the attached report",
                "Report",
                ComposeMode::Reply,
                "",
            )
            .resolve()
            .await
            .expect("draft resolves");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn polish_takes_first_of_result_text_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/polish")
            .with_header("content-type", "application/json")
            .with_body(r#"{"reply": "Hello,"}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let polished = gateway.polish("hello").resolve().await.expect("polish");
        assert_eq!(polished, "Hello,");
    }

    #[tokio::test]
    async fn analyze_hits_the_grammar_check_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/grammar-check")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "text": "some text",
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"result": "Looks good."}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let report = gateway.analyze("some text").resolve().await.expect("analyze");

        mock.assert_async().await;
        assert_eq!(report, "Looks good.");
    }

    #[tokio::test]
    async fn missing_result_fields_classify_as_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/polish")
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let err = gateway
            .polish("hello")
            .resolve()
            .await
            .expect_err("malformed");
        assert!(matches!(err, AiError::MalformedResponse));
        assert!(gateway.registry().is_empty());
    }

    #[tokio::test]
    async fn server_errors_classify_as_transport() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/grammar-check")
            .with_status(500)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let err = gateway
            .analyze("text")
            .resolve()
            .await
            .expect_err("server error");
        assert!(matches!(err, AiError::Transport(_)));
        assert!(gateway.registry().is_empty());
    }
}
