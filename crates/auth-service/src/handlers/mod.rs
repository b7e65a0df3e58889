pub mod auth_handler;
pub mod metrics;

pub use auth_handler::{handle_ping, handle_token, handle_whoami, health_check};
pub use metrics::metrics_handler;
