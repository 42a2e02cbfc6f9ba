use crate::ComposeError;
use tern_ai::{CancelHandle, RequestId};
use tern_core::FlowKind;

/// Lifecycle slot for one AI action kind. The slot only distinguishes idle
/// from generating; terminal outcomes are returned to the caller as
/// `FlowResult`s. Keeping the cancel handle inside the generating variant
/// means a busy flag can never exist without one.
#[derive(Debug, Default)]
pub(crate) enum FlowSlot {
    #[default]
    Idle,
    Generating { id: RequestId, cancel: CancelHandle },
}

/// All three per-kind flow slots in one container.
#[derive(Debug, Default)]
pub(crate) struct FlowBoard {
    draft: FlowSlot,
    polish: FlowSlot,
    analyze: FlowSlot,
}

impl FlowBoard {
    pub(crate) fn is_busy(&self, kind: FlowKind) -> bool {
        matches!(self.slot(kind), FlowSlot::Generating { .. })
    }

    /// Claim the slot for a freshly started request. A second flow of an
    /// active kind is rejected, never auto-cancelled.
    pub(crate) fn begin(&mut self, id: RequestId, cancel: CancelHandle) -> Result<(), ComposeError> {
        let slot = self.slot_mut(id.kind());
        if matches!(slot, FlowSlot::Generating { .. }) {
            return Err(ComposeError::FlowBusy(id.kind()));
        }
        *slot = FlowSlot::Generating { id, cancel };
        Ok(())
    }

    /// Release the slot if `id` is still its active request. Returns false
    /// for a stale settlement (the flow was already finalized by something
    /// else), leaving the slot untouched.
    pub(crate) fn finish(&mut self, id: &RequestId) -> bool {
        let slot = self.slot_mut(id.kind());
        match slot {
            FlowSlot::Generating { id: active, .. } if active == id => {
                *slot = FlowSlot::Idle;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cancel_handle(&self, kind: FlowKind) -> Option<CancelHandle> {
        match self.slot(kind) {
            FlowSlot::Generating { cancel, .. } => Some(cancel.clone()),
            FlowSlot::Idle => None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.draft = FlowSlot::Idle;
        self.polish = FlowSlot::Idle;
        self.analyze = FlowSlot::Idle;
    }

    fn slot(&self, kind: FlowKind) -> &FlowSlot {
        match kind {
            FlowKind::Draft => &self.draft,
            FlowKind::Polish => &self.polish,
            FlowKind::Analyze => &self.analyze,
        }
    }

    fn slot_mut(&mut self, kind: FlowKind) -> &mut FlowSlot {
        match kind {
            FlowKind::Draft => &mut self.draft,
            FlowKind::Polish => &mut self.polish,
            FlowKind::Analyze => &mut self.analyze,
        }
    }
}
