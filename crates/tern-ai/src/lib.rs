mod error;
mod gateway;
mod registry;
mod request;

pub use error::AiError;
pub use gateway::{AiGateway, AiGatewayConfig, DraftResponse};
pub use registry::{CancelHandle, RequestId, RequestRegistry};
pub use request::CancellableCall;
