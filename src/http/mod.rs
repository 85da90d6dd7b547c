//! JSON-over-HTTP transport
//!
//! Binds each operation to a static `POST` path and answers with JSON.

pub mod handlers;
