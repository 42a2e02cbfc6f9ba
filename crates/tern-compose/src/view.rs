use serde::Serialize;
use tern_core::{ComposeMode, Email};

/// Snapshot of the prompt-entry surface. The controller owns the state;
/// a renderer only reads these fields and calls back into the controller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptView {
    pub open: bool,
    pub text: String,
    /// True while the draft flow is generating. The view renders a progress
    /// indicator with a cancel affordance while this is set.
    pub busy: bool,
    pub target: Option<Email>,
}

/// Snapshot of the compose/reply editor. `draft` is the shared
/// draft-content slot that AI flows and the user both write into.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EditorView {
    pub open: bool,
    pub mode: ComposeMode,
    pub to: String,
    pub subject: String,
    pub draft: String,
    pub target: Option<Email>,
    pub drafting: bool,
    pub polishing: bool,
    pub analyzing: bool,
}
