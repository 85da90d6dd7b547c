//! Binary RPC transport
//!
//! Exposes every operation as a unary method of `pb.MathService` over tonic.

pub mod pb;
pub mod transport;

pub use pb::math_service_client::MathServiceClient;
pub use pb::math_service_server::{MathService, MathServiceServer};
pub use transport::GrpcTransport;
