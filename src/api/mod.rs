//! HTTP API: router, server lifecycle, shared context, error mapping.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;
