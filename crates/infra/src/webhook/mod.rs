//! Webhook ingestion: signature check, envelope parsing, dispatch.

mod router;

pub use router::{webhook_router, WebhookState};
