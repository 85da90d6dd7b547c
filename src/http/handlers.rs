//! Axum HTTP handlers for the arithmetic routes
//!
//! Each handler decodes the JSON body, runs the operation's endpoint and
//! encodes the response; any failure is answered by [`HttpError`].

use axum::{body::Bytes, extract::State, Json};
use tracing::{warn, Instrument};

use crate::{
    domain::{Operation, RequestContext, TransportKind},
    endpoints::{MathRequest, MathResponse},
    errors::HttpError,
    HttpState,
};

pub async fn add(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<MathResponse>, HttpError> {
    dispatch(&state, Operation::Add, &body).await
}

pub async fn sub(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<MathResponse>, HttpError> {
    dispatch(&state, Operation::Subtract, &body).await
}

pub async fn div(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<MathResponse>, HttpError> {
    dispatch(&state, Operation::Divide, &body).await
}

pub async fn mul(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<MathResponse>, HttpError> {
    dispatch(&state, Operation::Multiply, &body).await
}

async fn dispatch(
    state: &HttpState,
    operation: Operation,
    body: &[u8],
) -> Result<Json<MathResponse>, HttpError> {
    handle(state, operation, body).await.map_err(|err| {
        warn!(parent: &state.span, operation = %operation, error = %err, "request failed");
        err
    })
}

async fn handle(
    state: &HttpState,
    operation: Operation,
    body: &[u8],
) -> Result<Json<MathResponse>, HttpError> {
    let request = decode_math_request(body)?;
    let ctx = RequestContext::new(TransportKind::Http);

    let response = state
        .endpoints
        .get(operation)
        .call(&ctx, request)
        .instrument(state.span.clone())
        .await?;

    encode_math_response(response)
}

// Only the first JSON value is read; anything after it is ignored. A `null`
// body decodes to zero operands.
fn decode_math_request(body: &[u8]) -> Result<MathRequest, HttpError> {
    let mut values =
        serde_json::Deserializer::from_slice(body).into_iter::<Option<MathRequest>>();
    match values.next() {
        Some(value) => Ok(value?.unwrap_or_default()),
        None => Err(HttpError::EmptyBody),
    }
}

// JSON has no representation for infinities or NaN.
fn encode_math_response(response: MathResponse) -> Result<Json<MathResponse>, HttpError> {
    if !response.result.is_finite() {
        return Err(HttpError::UnsupportedValue(response.result));
    }
    Ok(Json(response))
}
