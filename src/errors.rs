use std::{io, net::SocketAddr};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;

use crate::{config::ConfigError, domain::Operation};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("{operation} failed: {message}")]
    Computation {
        operation: Operation,
        message: String,
    },
}

impl ServiceError {
    pub fn computation(operation: Operation, message: impl Into<String>) -> Self {
        Self::Computation {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EndpointError {
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("EOF")]
    EmptyBody,
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("unsupported value: {0}")]
    UnsupportedValue(f32),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {transport} listener on {addr}: {source}")]
    Bind {
        transport: &'static str,
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("gRPC server failed: {0}")]
    Grpc(#[from] tonic::transport::Error),
    #[error("HTTP server failed: {0}")]
    Http(#[source] io::Error),
    #[error("{transport} server stopped")]
    Stopped { transport: &'static str },
    #[error("server task failed: {0}")]
    Task(#[from] JoinError),
    #[error("{0}")]
    Signal(String),
    #[error("failed to install signal handlers: {0}")]
    SignalHandler(#[source] io::Error),
}

impl ServeError {
    pub fn is_signal(&self) -> bool {
        matches!(self, Self::Signal(_))
    }
}
