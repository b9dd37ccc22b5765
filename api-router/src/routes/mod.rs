pub mod index;
pub mod liveness;
pub mod messages;
pub mod readiness;

pub(crate) const SERVICE_NAME: &str = "chat-message-api";
