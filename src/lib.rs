use axum::{middleware, routing::post, Router};
use tracing::{info_span, Span};

pub mod config;
pub mod domain;
pub mod endpoints;
pub mod errors;
pub mod grpc;
pub mod http;
pub mod logging;
pub mod server;

use domain::Operation;
use endpoints::Endpoints;

#[derive(Clone)]
pub struct HttpState {
    pub endpoints: Endpoints,
    pub span: Span,
}

impl HttpState {
    pub fn new(endpoints: Endpoints, parent: &Span) -> Self {
        Self {
            endpoints,
            span: info_span!(parent: parent, "transport", transport = "HTTP"),
        }
    }
}

pub fn build_app(endpoints: Endpoints, parent: &Span) -> Router {
    let state = HttpState::new(endpoints, parent);

    Router::new()
        .route(Operation::Add.http_path(), post(http::handlers::add))
        .route(Operation::Subtract.http_path(), post(http::handlers::sub))
        .route(Operation::Divide.http_path(), post(http::handlers::div))
        .route(Operation::Multiply.http_path(), post(http::handlers::mul))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
