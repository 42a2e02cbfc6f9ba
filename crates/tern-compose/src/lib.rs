mod controller;
mod error;
mod flow;
mod view;

pub use controller::DraftFlowController;
pub use error::ComposeError;
pub use view::{EditorView, PromptView};
