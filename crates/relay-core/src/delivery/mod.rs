//! Delivery of manifest projects to Gerrit.

mod destination;
mod orchestrator;
mod pusher;
mod result;

pub use destination::{compose_destination_url, redact_url, strip_password};
pub use orchestrator::DeliveryOrchestrator;
pub use pusher::{GerritPusher, PUSH_REMOTE_NAME, ProjectPusher, PushOutcome};
pub use result::DeliveryResult;
