//! Common utilities and types shared by the token issuer and the API client.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for the service token claim set and compact-token inspection
pub mod jwt;

/// Module for the injectable time source
pub mod clock;
