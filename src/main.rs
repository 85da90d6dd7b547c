use std::sync::Arc;

use math_service::{
    build_app,
    config::Config,
    domain::Calculator,
    endpoints::Endpoints,
    grpc::GrpcTransport,
    logging,
    server::{self, Listeners},
};
use tracing::{error, info, info_span};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_logging(config.log_format);

    let span = info_span!("math_service");
    let service = Arc::new(Calculator::new(span.clone()));
    let endpoints = Endpoints::new(service, &span);
    let grpc = GrpcTransport::new(endpoints.clone(), &span).into_server();
    let http = build_app(endpoints, &span);

    let listeners = Listeners::bind(&config).await?;
    info!(
        bind_addr = %config.bind_addr,
        grpc_port = config.grpc_port,
        http_port = config.http_port,
        "server starting"
    );

    let cause = server::run(listeners, grpc, http, server::wait_for_termination()).await;
    if cause.is_signal() {
        info!(cause = %cause, "server stopped");
        return Ok(());
    }

    error!(cause = %cause, "server stopped");
    Err(cause.into())
}
