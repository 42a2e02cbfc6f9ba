mod error;
pub mod inbox;
mod service;

pub use error::EmailError;
pub use service::{MailApi, MailApiConfig};
