//! Domain service for the arithmetic operations
//!
//! Knows nothing about the wire: transports reach it only through the endpoint set.

use std::fmt;

use tracing::{info, Span};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Grpc,
    Http,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grpc => f.write_str("gRPC"),
            Self::Http => f.write_str("HTTP"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub transport: TransportKind,
}

impl RequestContext {
    pub fn new(transport: TransportKind) -> Self {
        Self { transport }
    }
}

pub trait Service: Send + Sync {
    fn add(&self, ctx: &RequestContext, num_a: f32, num_b: f32) -> Result<f32, ServiceError>;
    fn subtract(&self, ctx: &RequestContext, num_a: f32, num_b: f32)
        -> Result<f32, ServiceError>;
    fn divide(&self, ctx: &RequestContext, num_a: f32, num_b: f32) -> Result<f32, ServiceError>;
    fn multiply(&self, ctx: &RequestContext, num_a: f32, num_b: f32)
        -> Result<f32, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct Calculator {
    span: Span,
}

impl Calculator {
    pub fn new(span: Span) -> Self {
        Self { span }
    }
}

impl Service for Calculator {
    fn add(&self, ctx: &RequestContext, num_a: f32, num_b: f32) -> Result<f32, ServiceError> {
        info!(parent: &self.span, operation = "add", transport = %ctx.transport, "adding up request");
        Ok(num_a + num_b)
    }

    fn subtract(
        &self,
        ctx: &RequestContext,
        num_a: f32,
        num_b: f32,
    ) -> Result<f32, ServiceError> {
        info!(parent: &self.span, operation = "subtract", transport = %ctx.transport, "subtracting request");
        Ok(num_a - num_b)
    }

    // Division by zero is not an error here: IEEE-754 gives inf or NaN and the
    // endpoint decides what to do with the value.
    fn divide(&self, ctx: &RequestContext, num_a: f32, num_b: f32) -> Result<f32, ServiceError> {
        info!(parent: &self.span, operation = "divide", transport = %ctx.transport, "dividing request");
        Ok(num_a / num_b)
    }

    fn multiply(
        &self,
        ctx: &RequestContext,
        num_a: f32,
        num_b: f32,
    ) -> Result<f32, ServiceError> {
        info!(parent: &self.span, operation = "multiply", transport = %ctx.transport, "multiplying request");
        Ok(num_a * num_b)
    }
}
