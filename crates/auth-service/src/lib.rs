//! Token issuer service library
//!
//! Validates a static client credential pair and issues short-lived HS256
//! service tokens. Also verifies those tokens on protected routes.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `credentials` - Basic credential parsing and validation
//! - `crypto` - Token signing and verification
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer authentication and HTTP metrics
//! - `observability` - Metrics and log-safe hashing
//! - `routes` - Router and application state
//! - `services` - Issuance entry point

pub mod config;
pub mod credentials;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod services;
