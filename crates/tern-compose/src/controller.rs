use crate::flow::FlowBoard;
use crate::{ComposeError, EditorView, PromptView};
use tern_ai::{AiError, AiGateway, DraftResponse};
use tern_core::{ComposeMode, Email, FlowKind, FlowResult, OutgoingEmail};
use tern_email::MailApi;
use tokio::sync::RwLock;

const DRAFT_CANCELLED: &str = "Draft generation was cancelled.";
const DRAFT_TIMED_OUT: &str =
    "Draft generation timed out. The AI service may be slow or unavailable.";
const DRAFT_FAILED: &str = "AI failed to generate a draft.";
const DRAFT_EMPTY: &str = "AI failed to generate.";

const POLISH_CANCELLED: &str = "Polish request was cancelled.";
const POLISH_TIMED_OUT: &str =
    "Polish request timed out. The AI service may be slow or unavailable.";
const POLISH_FAILED: &str =
    "AI failed to polish your message. Please check if the AI service is running.";
const POLISH_MALFORMED: &str = "AI polish failed.";

const ANALYZE_CANCELLED: &str = "Analysis request was cancelled.";
const ANALYZE_TIMED_OUT: &str =
    "Analysis request timed out. The AI service may be slow or unavailable.";
const ANALYZE_FAILED: &str =
    "AI failed to analyze your message. Please check if the AI service is running.";
const ANALYZE_MALFORMED: &str = "AI grammar check failed.";

#[derive(Debug, Default)]
struct PromptState {
    open: bool,
    text: String,
    target: Option<Email>,
}

#[derive(Debug, Default)]
struct EditorState {
    open: bool,
    mode: ComposeMode,
    to: String,
    subject: String,
    draft: String,
    target: Option<Email>,
}

#[derive(Debug, Default)]
struct Inner {
    prompt: PromptState,
    editor: EditorState,
    board: FlowBoard,
}

impl Inner {
    /// Switch the editor surface into `mode` carrying `target`, prefilling
    /// the reply header fields. The draft-content slot is left alone; a
    /// mode switch never overwrites what a flow already placed there.
    fn enter_editor(&mut self, mode: ComposeMode, target: Option<Email>) {
        if mode == ComposeMode::Reply {
            if let Some(email) = &target {
                self.editor.to = email.sender.clone();
                self.editor.subject = if email.subject.is_empty() {
                    String::new()
                } else {
                    format!("Re: {}", email.subject)
                };
            }
        }
        self.editor.mode = mode;
        self.editor.target = target;
        self.editor.open = true;
    }
}

/// Owns the prompt-entry and compose/reply surfaces and every AI flow that
/// feeds them: at most one in-flight request per action kind, user-initiated
/// cancellation, and the prompt-to-editor handoff when a draft flow reaches
/// a terminal state.
///
/// Flow outcomes come back as `Ok(FlowResult)`; `Err(ComposeError)` means
/// the operation was rejected before anything started.
pub struct DraftFlowController {
    gateway: AiGateway,
    state: RwLock<Inner>,
}

impl DraftFlowController {
    pub fn new(gateway: AiGateway) -> Self {
        Self {
            gateway,
            state: RwLock::new(Inner::default()),
        }
    }

    pub async fn prompt_view(&self) -> PromptView {
        let inner = self.state.read().await;
        PromptView {
            open: inner.prompt.open,
            text: inner.prompt.text.clone(),
            busy: inner.board.is_busy(FlowKind::Draft),
            target: inner.prompt.target.clone(),
        }
    }

    pub async fn editor_view(&self) -> EditorView {
        let inner = self.state.read().await;
        EditorView {
            open: inner.editor.open,
            mode: inner.editor.mode,
            to: inner.editor.to.clone(),
            subject: inner.editor.subject.clone(),
            draft: inner.editor.draft.clone(),
            target: inner.editor.target.clone(),
            drafting: inner.board.is_busy(FlowKind::Draft),
            polishing: inner.board.is_busy(FlowKind::Polish),
            analyzing: inner.board.is_busy(FlowKind::Analyze),
        }
    }

    pub async fn is_busy(&self, kind: FlowKind) -> bool {
        self.state.read().await.board.is_busy(kind)
    }

    /// Arm the prompt view, recording which email (if any) the eventual
    /// draft will reply to.
    pub async fn open_prompt(&self, target: Option<Email>) {
        let mut inner = self.state.write().await;
        inner.prompt.open = true;
        inner.prompt.target = target;
    }

    pub async fn set_prompt_text(&self, text: impl Into<String>) {
        self.state.write().await.prompt.text = text.into();
    }

    pub async fn open_editor(&self, mode: ComposeMode, target: Option<Email>) {
        let mut inner = self.state.write().await;
        let target = match mode {
            ComposeMode::Reply => target,
            ComposeMode::Compose => None,
        };
        inner.enter_editor(mode, target);
    }

    pub async fn set_draft_text(&self, text: impl Into<String>) {
        self.state.write().await.editor.draft = text.into();
    }

    pub async fn set_recipient(&self, to: impl Into<String>) {
        self.state.write().await.editor.to = to.into();
    }

    pub async fn set_subject(&self, subject: impl Into<String>) {
        self.state.write().await.editor.subject = subject.into();
    }

    /// Run the draft flow from the prompt view. On any terminal state the
    /// prompt closes, its text and target clear, and the editor opens with
    /// the generated text (or an explanatory placeholder) in the draft
    /// slot, in reply mode when a target was set.
    pub async fn submit_prompt(&self) -> Result<FlowResult, ComposeError> {
        let (call, id, mode) = {
            let mut inner = self.state.write().await;
            if inner.board.is_busy(FlowKind::Draft) {
                return Err(ComposeError::FlowBusy(FlowKind::Draft));
            }
            if inner.prompt.text.trim().is_empty() {
                return Err(ComposeError::EmptyPrompt);
            }

            let mode = match inner.prompt.target {
                Some(_) => ComposeMode::Reply,
                None => ComposeMode::Compose,
            };
            let (body, subject) = inner
                .prompt
                .target
                .as_ref()
                .map(|email| (email.body.as_str(), email.subject.as_str()))
                .unwrap_or(("", ""));
            let call =
                self.gateway
                    .generate_draft(body, subject, mode, inner.prompt.text.trim());
            let id = call.id().clone();
            // Claiming the slot and registering the request happen under the
            // same lock, so a cancel can never slip between them.
            inner.board.begin(id.clone(), call.cancel_handle())?;
            (call, id, mode)
        };
        tracing::info!(request = %id, ?mode, "prompt draft flow started");

        let result = draft_outcome(call.resolve().await);

        let mut inner = self.state.write().await;
        if !inner.board.finish(&id) {
            tracing::debug!(request = %id, "discarding stale draft settlement");
            return Ok(FlowResult::Cancelled);
        }

        inner.editor.draft = display_text(&result, DRAFT_CANCELLED);
        let target = inner.prompt.target.take();
        inner.prompt.text.clear();
        inner.prompt.open = false;
        let mode = match target {
            Some(_) => ComposeMode::Reply,
            None => ComposeMode::Compose,
        };
        inner.enter_editor(mode, target);
        Ok(result)
    }

    /// Editor-initiated full-reply generation against the editor's target
    /// email. The generated text (or placeholder) lands in the draft slot.
    pub async fn draft_reply(&self) -> Result<FlowResult, ComposeError> {
        let (call, id) = {
            let mut inner = self.state.write().await;
            if inner.board.is_busy(FlowKind::Draft) {
                return Err(ComposeError::FlowBusy(FlowKind::Draft));
            }

            let prompt = match inner.editor.target.as_ref().filter(|e| !e.body.is_empty()) {
                Some(email) => {
                    let head: String = email.body.chars().take(200).collect();
                    format!(
                        "Reply to: \"{head}...\" - Write a professional response acknowledging their message."
                    )
                }
                None => "Write a professional email response.".to_string(),
            };
            let (body, subject) = inner
                .editor
                .target
                .as_ref()
                .map(|email| (email.body.as_str(), email.subject.as_str()))
                .unwrap_or(("", ""));
            let call = self
                .gateway
                .generate_draft(body, subject, ComposeMode::Reply, &prompt);
            let id = call.id().clone();
            inner.board.begin(id.clone(), call.cancel_handle())?;
            (call, id)
        };
        tracing::info!(request = %id, "reply draft flow started");

        let result = draft_outcome(call.resolve().await);

        let mut inner = self.state.write().await;
        if !inner.board.finish(&id) {
            tracing::debug!(request = %id, "discarding stale draft settlement");
            return Ok(FlowResult::Cancelled);
        }
        inner.editor.draft = display_text(&result, DRAFT_CANCELLED);
        Ok(result)
    }

    /// Polish the current draft slot. On success the polished text replaces
    /// the slot; on failure the classified status string does.
    pub async fn polish_message(&self) -> Result<FlowResult, ComposeError> {
        let (call, id) = {
            let mut inner = self.state.write().await;
            if inner.board.is_busy(FlowKind::Polish) {
                return Err(ComposeError::FlowBusy(FlowKind::Polish));
            }
            if inner.editor.draft.trim().is_empty() {
                return Err(ComposeError::EmptyDraft);
            }
            let call = self.gateway.polish(&inner.editor.draft);
            let id = call.id().clone();
            inner.board.begin(id.clone(), call.cancel_handle())?;
            (call, id)
        };
        tracing::info!(request = %id, "polish flow started");

        let result = short_outcome(
            call.resolve().await,
            POLISH_TIMED_OUT,
            POLISH_MALFORMED,
            POLISH_FAILED,
        );

        let mut inner = self.state.write().await;
        if !inner.board.finish(&id) {
            tracing::debug!(request = %id, "discarding stale polish settlement");
            return Ok(FlowResult::Cancelled);
        }
        inner.editor.draft = display_text(&result, POLISH_CANCELLED);
        Ok(result)
    }

    /// Grammar-check the current draft slot. The report (or the classified
    /// status string) replaces the slot.
    pub async fn analyze_message(&self) -> Result<FlowResult, ComposeError> {
        let (call, id) = {
            let mut inner = self.state.write().await;
            if inner.board.is_busy(FlowKind::Analyze) {
                return Err(ComposeError::FlowBusy(FlowKind::Analyze));
            }
            if inner.editor.draft.trim().is_empty() {
                return Err(ComposeError::EmptyDraft);
            }
            let call = self.gateway.analyze(&inner.editor.draft);
            let id = call.id().clone();
            inner.board.begin(id.clone(), call.cancel_handle())?;
            (call, id)
        };
        tracing::info!(request = %id, "analyze flow started");

        let result = short_outcome(
            call.resolve().await,
            ANALYZE_TIMED_OUT,
            ANALYZE_MALFORMED,
            ANALYZE_FAILED,
        );

        let mut inner = self.state.write().await;
        if !inner.board.finish(&id) {
            tracing::debug!(request = %id, "discarding stale analyze settlement");
            return Ok(FlowResult::Cancelled);
        }
        inner.editor.draft = display_text(&result, ANALYZE_CANCELLED);
        Ok(result)
    }

    /// Cancel the in-flight flow of `kind`, if any. A no-op otherwise, and
    /// a no-op when the flow has already settled.
    pub async fn cancel(&self, kind: FlowKind) {
        let handle = self.state.read().await.board.cancel_handle(kind);
        if let Some(handle) = handle {
            tracing::info!(%kind, "cancelling flow");
            handle.cancel();
        }
    }

    /// Close the prompt view without running a flow: switch the editor into
    /// reply mode when a target was set (compose otherwise) and keep
    /// whatever already sits in the draft slot. Rejected while the draft
    /// flow is generating; cancel it first.
    pub async fn close_prompt(&self) -> Result<(), ComposeError> {
        let mut inner = self.state.write().await;
        if inner.board.is_busy(FlowKind::Draft) {
            return Err(ComposeError::FlowBusy(FlowKind::Draft));
        }
        let target = inner.prompt.target.take();
        inner.prompt.text.clear();
        inner.prompt.open = false;
        let mode = match target {
            Some(_) => ComposeMode::Reply,
            None => ComposeMode::Compose,
        };
        inner.enter_editor(mode, target);
        Ok(())
    }

    /// Reset the editor surface: fields, mode, target, and the draft slot.
    pub async fn close_editor(&self) {
        let mut inner = self.state.write().await;
        inner.editor = EditorState::default();
    }

    /// Send the editor's current content through the mail backend. All
    /// three fields are required; success closes the editor and ends the
    /// compose flow.
    pub async fn send_message(&self, mail: &MailApi) -> Result<(), ComposeError> {
        let outgoing = {
            let inner = self.state.read().await;
            let to = inner.editor.to.trim();
            let subject = inner.editor.subject.trim();
            let body = inner.editor.draft.trim();
            if to.is_empty() || subject.is_empty() || body.is_empty() {
                return Err(ComposeError::MissingFields);
            }
            OutgoingEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            }
        };

        mail.send(&outgoing).await?;
        self.close_editor().await;
        Ok(())
    }

    /// Teardown: cancel every in-flight request and clear both surfaces.
    /// In-flight flows observe their cancellation as a stale settlement and
    /// leave the fresh state alone.
    pub async fn reset(&self) {
        self.gateway.registry().cancel_all();
        let mut inner = self.state.write().await;
        inner.board.clear();
        inner.prompt = PromptState::default();
        inner.editor = EditorState::default();
    }
}

/// Outcome text that lands in the draft-content slot. Failure reasons are
/// already user-facing strings by the time they are inside a `FlowResult`.
fn display_text(result: &FlowResult, cancelled: &str) -> String {
    match result {
        FlowResult::Succeeded(text) | FlowResult::Failed(text) => text.clone(),
        FlowResult::Cancelled => cancelled.to_string(),
    }
}

/// Classify a settled draft call. The `{success, result}` envelope carries
/// in-band backend refusals; everything else arrives as an `AiError`.
fn draft_outcome(outcome: Result<DraftResponse, AiError>) -> FlowResult {
    match outcome {
        Ok(response) if response.success => {
            if response.result.trim().is_empty() {
                FlowResult::Failed(DRAFT_EMPTY.to_string())
            } else {
                FlowResult::Succeeded(response.result)
            }
        }
        Ok(response) => {
            let reason = if response.result.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                response.result
            };
            FlowResult::Failed(format!("AI Error: {reason}"))
        }
        Err(AiError::Cancelled) => FlowResult::Cancelled,
        Err(AiError::TimedOut) => FlowResult::Failed(DRAFT_TIMED_OUT.to_string()),
        Err(err) => {
            tracing::warn!(%err, "draft flow failed");
            FlowResult::Failed(DRAFT_FAILED.to_string())
        }
    }
}

/// Classify a settled polish/analyze call.
fn short_outcome(
    outcome: Result<String, AiError>,
    timed_out: &str,
    malformed: &str,
    failed: &str,
) -> FlowResult {
    match outcome {
        Ok(text) => FlowResult::Succeeded(text),
        Err(AiError::Cancelled) => FlowResult::Cancelled,
        Err(AiError::TimedOut) => FlowResult::Failed(timed_out.to_string()),
        Err(AiError::MalformedResponse) => FlowResult::Failed(malformed.to_string()),
        Err(err) => {
            tracing::warn!(%err, "ai flow failed");
            FlowResult::Failed(failed.to_string())
        }
    }
}
