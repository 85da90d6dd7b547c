//! `pb.MathService` wire contract
//!
//! Generated from `proto/math_service.proto` by `build.rs`.

tonic::include_proto!("pb");
