//! Transport-agnostic business logic
//!
//! Provides the closed set of arithmetic operations and the service that computes them.

pub mod operation;
pub mod service;

pub use operation::Operation;
pub use service::{Calculator, RequestContext, Service, TransportKind};
