//! Protocol-neutral endpoints
//!
//! Each endpoint adapts one [`Service`] method to the uniform
//! `(context, MathRequest) -> MathResponse | EndpointError` shape that both
//! transports bind to, and applies the operation's response policy.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{
    de::{self, IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use tracing::{debug, Span};

use crate::{
    domain::{Operation, RequestContext, Service},
    errors::{EndpointError, ServiceError},
};

pub const DIVIDE_ZERO_SENTINEL: f32 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MathRequest {
    #[serde(rename = "NumA")]
    pub num_a: f32,
    #[serde(rename = "NumB")]
    pub num_b: f32,
}

impl MathRequest {
    pub fn new(num_a: f32, num_b: f32) -> Self {
        Self { num_a, num_b }
    }
}

// Keys match `NumA`/`NumB` ignoring ASCII case. Missing or null operands
// read as zero, unknown keys are skipped and a repeated key keeps its last value.
impl<'de> Deserialize<'de> for MathRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RequestVisitor;

        impl<'de> Visitor<'de> for RequestVisitor {
            type Value = MathRequest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with NumA and NumB")
            }

            fn visit_map<A>(self, mut map: A) -> Result<MathRequest, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut request = MathRequest::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("NumA") {
                        if let Some(value) = map.next_value::<Option<f32>>()? {
                            request.num_a = value;
                        }
                    } else if key.eq_ignore_ascii_case("NumB") {
                        if let Some(value) = map.next_value::<Option<f32>>()? {
                            request.num_b = value;
                        }
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(request)
            }
        }

        deserializer.deserialize_map(RequestVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MathResponse {
    #[serde(rename = "Result")]
    pub result: f32,
}

impl MathResponse {
    pub fn new(result: f32) -> Self {
        Self { result }
    }
}

#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(
        &self,
        ctx: &RequestContext,
        request: MathRequest,
    ) -> Result<MathResponse, EndpointError>;
}

#[derive(Clone)]
pub struct Endpoints {
    pub add: Arc<dyn Endpoint>,
    pub subtract: Arc<dyn Endpoint>,
    pub divide: Arc<dyn Endpoint>,
    pub multiply: Arc<dyn Endpoint>,
}

impl Endpoints {
    pub fn new(service: Arc<dyn Service>, parent: &Span) -> Self {
        Self {
            add: Arc::new(AddEndpoint {
                service: Arc::clone(&service),
                span: parent.clone(),
            }),
            subtract: Arc::new(SubtractEndpoint {
                service: Arc::clone(&service),
                span: parent.clone(),
            }),
            divide: Arc::new(DivideEndpoint {
                service: Arc::clone(&service),
                span: parent.clone(),
            }),
            multiply: Arc::new(MultiplyEndpoint { service }),
        }
    }

    pub fn get(&self, operation: Operation) -> &dyn Endpoint {
        match operation {
            Operation::Add => self.add.as_ref(),
            Operation::Subtract => self.subtract.as_ref(),
            Operation::Divide => self.divide.as_ref(),
            Operation::Multiply => self.multiply.as_ref(),
        }
    }
}

// A dropped failure reads as `0.0`.
fn discard_failure(span: &Span, outcome: Result<f32, ServiceError>) -> f32 {
    outcome.unwrap_or_else(|err| {
        debug!(parent: span, error = %err, "service failure discarded");
        0.0
    })
}

struct AddEndpoint {
    service: Arc<dyn Service>,
    span: Span,
}

#[async_trait]
impl Endpoint for AddEndpoint {
    async fn call(
        &self,
        ctx: &RequestContext,
        request: MathRequest,
    ) -> Result<MathResponse, EndpointError> {
        let result = discard_failure(
            &self.span,
            self.service.add(ctx, request.num_a, request.num_b),
        );
        Ok(MathResponse::new(result))
    }
}

struct SubtractEndpoint {
    service: Arc<dyn Service>,
    span: Span,
}

#[async_trait]
impl Endpoint for SubtractEndpoint {
    async fn call(
        &self,
        ctx: &RequestContext,
        request: MathRequest,
    ) -> Result<MathResponse, EndpointError> {
        let result = discard_failure(
            &self.span,
            self.service.subtract(ctx, request.num_a, request.num_b),
        );
        Ok(MathResponse::new(result))
    }
}

struct DivideEndpoint {
    service: Arc<dyn Service>,
    span: Span,
}

#[async_trait]
impl Endpoint for DivideEndpoint {
    async fn call(
        &self,
        ctx: &RequestContext,
        request: MathRequest,
    ) -> Result<MathResponse, EndpointError> {
        let result = discard_failure(
            &self.span,
            self.service.divide(ctx, request.num_a, request.num_b),
        );
        // Any exact zero is replaced, whether it came from 0/x or from a discarded failure.
        if result == 0.0 {
            return Ok(MathResponse::new(DIVIDE_ZERO_SENTINEL));
        }
        Ok(MathResponse::new(result))
    }
}

struct MultiplyEndpoint {
    service: Arc<dyn Service>,
}

#[async_trait]
impl Endpoint for MultiplyEndpoint {
    async fn call(
        &self,
        ctx: &RequestContext,
        request: MathRequest,
    ) -> Result<MathResponse, EndpointError> {
        let result = self
            .service
            .multiply(ctx, request.num_a, request.num_b)?;
        Ok(MathResponse::new(result))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio::task::JoinSet;
    use tracing::info_span;
    use tracing_test::traced_test;

    use super::*;
    use crate::domain::{Calculator, TransportKind};

    pub(crate) struct FailingService;

    impl Service for FailingService {
        fn add(&self, _: &RequestContext, _: f32, _: f32) -> Result<f32, ServiceError> {
            Err(ServiceError::computation(Operation::Add, "unavailable"))
        }

        fn subtract(&self, _: &RequestContext, _: f32, _: f32) -> Result<f32, ServiceError> {
            Err(ServiceError::computation(Operation::Subtract, "unavailable"))
        }

        fn divide(&self, _: &RequestContext, _: f32, _: f32) -> Result<f32, ServiceError> {
            Err(ServiceError::computation(Operation::Divide, "unavailable"))
        }

        fn multiply(&self, _: &RequestContext, _: f32, _: f32) -> Result<f32, ServiceError> {
            Err(ServiceError::computation(Operation::Multiply, "overflow"))
        }
    }

    fn endpoints() -> Endpoints {
        Endpoints::new(Arc::new(Calculator::new(Span::none())), &Span::none())
    }

    fn ctx() -> RequestContext {
        RequestContext::new(TransportKind::Http)
    }

    async fn call(endpoints: &Endpoints, op: Operation, a: f32, b: f32) -> f32 {
        endpoints
            .get(op)
            .call(&ctx(), MathRequest::new(a, b))
            .await
            .expect("endpoint should succeed")
            .result
    }

    #[tokio::test]
    async fn endpoints_forward_to_service() {
        let endpoints = endpoints();
        assert_eq!(call(&endpoints, Operation::Add, 3.0, 4.0).await, 7.0);
        assert_eq!(call(&endpoints, Operation::Subtract, 3.0, 4.0).await, -1.0);
        assert_eq!(call(&endpoints, Operation::Multiply, 3.0, 4.0).await, 12.0);
        assert_eq!(call(&endpoints, Operation::Divide, 3.0, 4.0).await, 0.75);
    }

    #[tokio::test]
    async fn divide_zero_result_is_replaced_by_sentinel() {
        let endpoints = endpoints();
        assert_eq!(call(&endpoints, Operation::Divide, 0.0, 5.0).await, 50.0);
        assert_eq!(call(&endpoints, Operation::Divide, -0.0, 5.0).await, 50.0);
        // Underflow to zero is an exact zero too.
        assert_eq!(call(&endpoints, Operation::Divide, 1e-30, 1e30).await, 50.0);
    }

    #[tokio::test]
    async fn divide_by_zero_returns_infinity_unmodified() {
        let endpoints = endpoints();
        assert_eq!(
            call(&endpoints, Operation::Divide, 1.0, 0.0).await,
            f32::INFINITY
        );
        assert_eq!(
            call(&endpoints, Operation::Divide, -2.0, 0.0).await,
            f32::NEG_INFINITY
        );
        assert!(call(&endpoints, Operation::Divide, 0.0, 0.0).await.is_nan());
    }

    #[tokio::test]
    async fn add_and_subtract_discard_service_failures() {
        let endpoints = Endpoints::new(Arc::new(FailingService), &Span::none());
        assert_eq!(call(&endpoints, Operation::Add, 3.0, 4.0).await, 0.0);
        assert_eq!(call(&endpoints, Operation::Subtract, 3.0, 4.0).await, 0.0);
    }

    #[tokio::test]
    #[traced_test]
    async fn discarded_failure_is_logged_under_injected_span() {
        let parent = info_span!("endpoints", owner = "injected_parent");
        let endpoints = Endpoints::new(Arc::new(FailingService), &parent);

        assert_eq!(call(&endpoints, Operation::Add, 3.0, 4.0).await, 0.0);

        assert!(logs_contain("service failure discarded"));
        assert!(logs_contain("injected_parent"));
        assert!(logs_contain("add failed: unavailable"));
    }

    #[tokio::test]
    async fn divide_failure_is_discarded_then_replaced() {
        let endpoints = Endpoints::new(Arc::new(FailingService), &Span::none());
        assert_eq!(call(&endpoints, Operation::Divide, 3.0, 4.0).await, 50.0);
    }

    #[tokio::test]
    async fn multiply_propagates_service_failure() {
        let endpoints = Endpoints::new(Arc::new(FailingService), &Span::none());
        let err = endpoints
            .get(Operation::Multiply)
            .call(&ctx(), MathRequest::new(3.0, 4.0))
            .await
            .expect_err("multiply should fail");

        assert_eq!(
            err,
            EndpointError::Service(ServiceError::computation(Operation::Multiply, "overflow"))
        );
        assert_eq!(err.to_string(), "multiply failed: overflow");
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let endpoints = endpoints();
        let mut tasks = JoinSet::new();

        for i in 0..64_u16 {
            let endpoints = endpoints.clone();
            let op = Operation::ALL[usize::from(i) % Operation::ALL.len()];
            let (a, b) = (f32::from(i) + 1.0, f32::from(i % 7) + 2.0);
            tasks.spawn(async move {
                let got = call(&endpoints, op, a, b).await;
                (op, a, b, got)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (op, a, b, got) = joined.expect("task should not panic");
            let expected = match op {
                Operation::Add => a + b,
                Operation::Subtract => a - b,
                Operation::Divide => a / b,
                Operation::Multiply => a * b,
            };
            assert_eq!(got, expected, "{op}({a}, {b})");
        }
    }

    #[test]
    fn request_json_uses_wire_names_and_defaults() {
        let request: MathRequest =
            serde_json::from_str(r#"{"NumA":1.5,"NumB":-2}"#).expect("valid request");
        assert_eq!(request, MathRequest::new(1.5, -2.0));

        let empty: MathRequest = serde_json::from_str("{}").expect("empty object");
        assert_eq!(empty, MathRequest::default());

        let body = serde_json::to_value(MathResponse::new(7.0)).expect("serialize");
        assert_eq!(body["Result"].as_f64(), Some(7.0));
    }

    #[test]
    fn request_keys_match_ignoring_case() {
        let camel: MathRequest =
            serde_json::from_str(r#"{"numA":3,"numB":4}"#).expect("camel case");
        assert_eq!(camel, MathRequest::new(3.0, 4.0));

        let mixed: MathRequest =
            serde_json::from_str(r#"{"NUMA":1,"nUmB":2,"extra":[1,{"x":null}]}"#)
                .expect("mixed case");
        assert_eq!(mixed, MathRequest::new(1.0, 2.0));

        let repeated: MathRequest =
            serde_json::from_str(r#"{"NumA":1,"numa":5}"#).expect("repeated key");
        assert_eq!(repeated, MathRequest::new(5.0, 0.0));

        let nulls: MathRequest =
            serde_json::from_str(r#"{"NumA":null,"NumB":2}"#).expect("null operand");
        assert_eq!(nulls, MathRequest::new(0.0, 2.0));

        assert!(serde_json::from_str::<MathRequest>(r#"{"NumA":"3"}"#).is_err());
        assert!(serde_json::from_str::<MathRequest>("[1,2]").is_err());
    }
}
