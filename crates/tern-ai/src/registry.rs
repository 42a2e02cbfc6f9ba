use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tern_core::FlowKind;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Correlates a started call with its registry entry. Ids are never reused
/// while a request is live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    kind: FlowKind,
    nonce: Uuid,
}

impl RequestId {
    pub(crate) fn mint(kind: FlowKind) -> Self {
        Self {
            kind,
            nonce: Uuid::new_v4(),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.nonce)
    }
}

/// Process-wide map from request id to the cancellation token of the
/// in-flight call. One explicitly-owned instance is shared by the gateway
/// and whoever needs teardown; there is no ambient global.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    entries: Mutex<HashMap<RequestId, CancellationToken>>,
}

impl RequestRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn register(&self, id: RequestId, token: CancellationToken) {
        tracing::debug!(request = %id, "registering cancellable request");
        self.entries().insert(id, token);
    }

    /// Trigger the stored token for `id`, if any, and drop the entry.
    /// Cancelling an id with no entry is a no-op.
    pub fn cancel(&self, id: &RequestId) {
        if let Some(token) = self.entries().remove(id) {
            tracing::debug!(request = %id, "cancelling request");
            token.cancel();
        }
    }

    /// Drop the entry for `id` without triggering it. Called when a request
    /// settles on its own.
    pub(crate) fn remove(&self, id: &RequestId) {
        self.entries().remove(id);
    }

    /// Trigger and clear every live entry. Teardown/reset path.
    pub fn cancel_all(&self) {
        let drained: Vec<(RequestId, CancellationToken)> =
            self.entries().drain().collect();
        for (id, token) in drained {
            tracing::debug!(request = %id, "cancelling request on reset");
            token.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<RequestId, CancellationToken>> {
        // The map is only touched for synchronous insert/remove, so a
        // poisoned lock can safely be recovered.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clonable handle bound to one registry entry. Invoking it after the
/// request has settled is a safe no-op.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    id: RequestId,
    registry: Arc<RequestRegistry>,
}

impl CancelHandle {
    pub(crate) fn new(id: RequestId, registry: Arc<RequestRegistry>) -> Self {
        Self { id, registry }
    }

    pub fn cancel(&self) {
        self.registry.cancel(&self.id);
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestId, RequestRegistry};
    use tern_core::FlowKind;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn cancel_triggers_token_and_drops_entry() {
        let registry = RequestRegistry::new();
        let id = RequestId::mint(FlowKind::Polish);
        let token = CancellationToken::new();
        registry.register(id.clone(), token.clone());
        assert_eq!(registry.len(), 1);

        registry.cancel(&id);
        assert!(token.is_cancelled());
        assert!(registry.is_empty());

        // Second cancel finds nothing and must not fail.
        registry.cancel(&id);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_does_not_trigger_token() {
        let registry = RequestRegistry::new();
        let id = RequestId::mint(FlowKind::Draft);
        let token = CancellationToken::new();
        registry.register(id.clone(), token.clone());

        registry.remove(&id);
        assert!(!token.is_cancelled());
        assert!(registry.is_empty());
    }

    #[test]
    fn cancel_all_clears_every_entry() {
        let registry = RequestRegistry::new();
        let tokens: Vec<CancellationToken> = [FlowKind::Draft, FlowKind::Polish, FlowKind::Analyze]
            .into_iter()
            .map(|kind| {
                let token = CancellationToken::new();
                registry.register(RequestId::mint(kind), token.clone());
                token
            })
            .collect();

        registry.cancel_all();
        assert!(registry.is_empty());
        assert!(tokens.iter().all(CancellationToken::is_cancelled));
    }

    #[test]
    fn ids_are_unique_per_mint() {
        let first = RequestId::mint(FlowKind::Analyze);
        let second = RequestId::mint(FlowKind::Analyze);
        assert_ne!(first, second);
        assert!(first.to_string().starts_with("analyze-"));
    }
}
