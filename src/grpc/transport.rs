use tonic::{async_trait, Request, Response, Status};
use tracing::{info_span, warn, Instrument, Span};

use crate::{
    domain::{Operation, RequestContext, TransportKind},
    endpoints::{Endpoints, MathRequest, MathResponse},
    grpc::pb::{self, math_service_server::MathService, math_service_server::MathServiceServer},
};

impl From<pb::MathRequest> for MathRequest {
    fn from(request: pb::MathRequest) -> Self {
        Self::new(request.num_a, request.num_b)
    }
}

impl From<MathResponse> for pb::MathResponse {
    fn from(response: MathResponse) -> Self {
        Self {
            result: response.result,
        }
    }
}

#[derive(Clone)]
pub struct GrpcTransport {
    endpoints: Endpoints,
    span: Span,
}

impl GrpcTransport {
    pub fn new(endpoints: Endpoints, parent: &Span) -> Self {
        Self {
            endpoints,
            span: info_span!(parent: parent, "transport", transport = "gRPC"),
        }
    }

    pub fn into_server(self) -> MathServiceServer<Self> {
        MathServiceServer::new(self)
    }

    async fn serve_unary(
        &self,
        operation: Operation,
        request: Request<pb::MathRequest>,
    ) -> Result<Response<pb::MathResponse>, Status> {
        let ctx = RequestContext::new(TransportKind::Grpc);
        let request = MathRequest::from(request.into_inner());

        match self
            .endpoints
            .get(operation)
            .call(&ctx, request)
            .instrument(self.span.clone())
            .await
        {
            Ok(response) => Ok(Response::new(response.into())),
            Err(err) => {
                warn!(parent: &self.span, operation = %operation, error = %err, "endpoint failed");
                Err(Status::unknown(err.to_string()))
            }
        }
    }
}

#[async_trait]
impl MathService for GrpcTransport {
    async fn add(
        &self,
        request: Request<pb::MathRequest>,
    ) -> Result<Response<pb::MathResponse>, Status> {
        self.serve_unary(Operation::Add, request).await
    }

    async fn sub(
        &self,
        request: Request<pb::MathRequest>,
    ) -> Result<Response<pb::MathResponse>, Status> {
        self.serve_unary(Operation::Subtract, request).await
    }

    async fn div(
        &self,
        request: Request<pb::MathRequest>,
    ) -> Result<Response<pb::MathResponse>, Status> {
        self.serve_unary(Operation::Divide, request).await
    }

    async fn mul(
        &self,
        request: Request<pb::MathRequest>,
    ) -> Result<Response<pb::MathResponse>, Status> {
        self.serve_unary(Operation::Multiply, request).await
    }
}
