use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{field::Empty, Span};

use crate::{
    web::{midware, routes::routes, REQUEST_ID_HEADER},
    App, AppState, Result,
};

/// Serves the app until the listener fails.
pub async fn serve(app: App) -> Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, router(app_state)).await?;

    Ok(())
}

/// The full application router.
///
/// Layers, outermost first: request id generation, one tracing span per request, the error
/// response mapper and request id propagation. Responses travel the stack bottom up, so the
/// mapper already sees the propagated `x-request-id` header.
pub fn router(app_state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_request(())
        .on_response(record_response);

    routes(app_state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(trace_layer)
            .layer(middleware::map_response(midware::response_mapper))
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

fn request_span(req: &Request<Body>) -> Span {
    let req_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|hv| hv.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        req_id,
        method = %req.method(),
        path = req.uri().path(),
        status = Empty,
        latency_ms = Empty,
    )
}

fn record_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", status.as_u16());
    span.record("latency_ms", latency.as_millis() as u64);

    if status.is_server_error() {
        tracing::error!("request failed");
    } else if status.is_client_error() {
        tracing::warn!("request rejected");
    } else {
        tracing::info!("request served");
    }
}
