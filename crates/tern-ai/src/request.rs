use crate::{AiError, CancelHandle, RequestId, RequestRegistry};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tern_core::FlowKind;
use tokio_util::sync::CancellationToken;

/// An in-flight AI call: the pending result plus a cancel handle bound to
/// the registry entry minted for it.
pub struct CancellableCall<T> {
    id: RequestId,
    cancel: CancelHandle,
    future: Pin<Box<dyn Future<Output = Result<T, AiError>> + Send>>,
}

impl<T> CancellableCall<T> {
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Await the call. Settles `Err(AiError::Cancelled)` when the handle
    /// fired first, and deregisters the id in every case.
    pub async fn resolve(self) -> Result<T, AiError> {
        self.future.await
    }
}

/// Removes the registry entry when the tracked future settles, and also
/// when it is dropped unpolled, so no path leaks an id.
struct DeregisterGuard {
    registry: Arc<RequestRegistry>,
    id: RequestId,
}

impl Drop for DeregisterGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}

impl RequestRegistry {
    /// Wrap an asynchronous call in a fresh registry entry.
    ///
    /// The id is registered before the call future is first polled, so a
    /// cancel issued before the transport even starts is equivalent to one
    /// issued mid-flight — never lost. The callee receives the token and
    /// may observe it; non-cooperative callees are still raced against it
    /// and settle as `Cancelled` when it fires first.
    pub fn track<T, F, Fut>(self: &Arc<Self>, kind: FlowKind, make_call: F) -> CancellableCall<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, AiError>> + Send + 'static,
    {
        let id = RequestId::mint(kind);
        let token = CancellationToken::new();
        self.register(id.clone(), token.clone());

        let call = make_call(token.clone());
        let guard = DeregisterGuard {
            registry: Arc::clone(self),
            id: id.clone(),
        };

        let settle_id = id.clone();
        let future = Box::pin(async move {
            let _guard = guard;
            // Biased: a cancel requested before the call settles always
            // wins the race, even when both are ready on the same poll.
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(AiError::Cancelled),
                result = call => result,
            };
            match &result {
                Ok(_) => tracing::debug!(request = %settle_id, "request settled"),
                Err(err) => tracing::debug!(request = %settle_id, %err, "request failed"),
            }
            result
        });

        let cancel = CancelHandle::new(id.clone(), Arc::clone(self));
        CancellableCall { id, cancel, future }
    }
}
