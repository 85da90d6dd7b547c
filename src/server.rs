//! Process composition: listeners, serve loops and termination
//!
//! Both transports and the termination watcher run as sibling tasks. The first
//! one to finish decides why the process stops; the shared cancellation token
//! then tells the listeners to stop accepting and the remaining tasks are dropped
//! without draining in-flight requests.

use std::{future::Future, io, net::SocketAddr};

use axum::Router;
use tokio::{net::TcpListener, task::JoinSet};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    config::Config,
    errors::ServeError,
    grpc::{GrpcTransport, MathServiceServer},
};

pub struct Listeners {
    pub grpc: TcpListener,
    pub http: TcpListener,
}

impl Listeners {
    pub async fn bind(config: &Config) -> Result<Self, ServeError> {
        let grpc = bind_listener("gRPC", config.grpc_socket()?).await?;
        let http = bind_listener("HTTP", config.http_socket()?).await?;
        Ok(Self { grpc, http })
    }

    pub fn grpc_addr(&self) -> io::Result<SocketAddr> {
        self.grpc.local_addr()
    }

    pub fn http_addr(&self) -> io::Result<SocketAddr> {
        self.http.local_addr()
    }
}

async fn bind_listener(transport: &'static str, addr: SocketAddr) -> Result<TcpListener, ServeError> {
    TcpListener::bind(addr).await.map_err(|source| {
        error!(transport, %addr, error = %source, "failed to bind listener");
        ServeError::Bind {
            transport,
            addr,
            source,
        }
    })
}

pub async fn run<F>(
    listeners: Listeners,
    grpc: MathServiceServer<GrpcTransport>,
    http: Router,
    termination: F,
) -> ServeError
where
    F: Future<Output = ServeError> + Send + 'static,
{
    let shutdown = CancellationToken::new();
    let mut tasks = JoinSet::new();

    tasks.spawn(serve_grpc(listeners.grpc, grpc, shutdown.clone()));
    tasks.spawn(serve_http(listeners.http, http, shutdown.clone()));
    tasks.spawn(termination);

    let cause = match tasks.join_next().await {
        Some(Ok(cause)) => cause,
        Some(Err(err)) => ServeError::Task(err),
        None => ServeError::Stopped { transport: "all" },
    };

    shutdown.cancel();
    tasks.abort_all();
    cause
}

async fn serve_grpc(
    listener: TcpListener,
    server: MathServiceServer<GrpcTransport>,
    shutdown: CancellationToken,
) -> ServeError {
    if let Ok(addr) = listener.local_addr() {
        info!(transport = "gRPC", %addr, "gRPC server started");
    }

    let result = tonic::transport::Server::builder()
        .add_service(server)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown.cancelled_owned())
        .await;

    match result {
        Ok(()) => ServeError::Stopped { transport: "gRPC" },
        Err(err) => {
            error!(during = "serve gRPC", error = %err, "gRPC server failed");
            ServeError::Grpc(err)
        }
    }
}

async fn serve_http(listener: TcpListener, app: Router, shutdown: CancellationToken) -> ServeError {
    if let Ok(addr) = listener.local_addr() {
        info!(transport = "HTTP", %addr, "HTTP server started");
    }

    let result = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await;

    match result {
        Ok(()) => ServeError::Stopped { transport: "HTTP" },
        Err(err) => {
            error!(during = "serve HTTP", error = %err, "HTTP server failed");
            ServeError::Http(err)
        }
    }
}

pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    alarm: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            alarm: signal(SignalKind::alarm())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    pub async fn recv(&mut self) -> io::Result<&'static str> {
        let name = tokio::select! {
            _ = self.interrupt.recv() => "interrupt",
            _ = self.terminate.recv() => "terminated",
            _ = self.alarm.recv() => "alarm clock",
        };
        Ok(name)
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> io::Result<&'static str> {
        tokio::signal::ctrl_c().await?;
        Ok("interrupt")
    }
}

pub async fn wait_for_termination() -> ServeError {
    let received = match TerminationSignals::install() {
        Ok(mut signals) => signals.recv().await,
        Err(err) => Err(err),
    };

    match received {
        Ok(name) => {
            info!(signal = name, "termination signal received");
            ServeError::Signal(name.to_string())
        }
        Err(err) => {
            error!(error = %err, "failed to wait for termination signals");
            ServeError::SignalHandler(err)
        }
    }
}
