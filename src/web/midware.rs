use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, to_value};
use uuid::Uuid;

use crate::web::{log::RequestLog, types::ValidEmail, Error, REQUEST_ID_HEADER};

/// Turns the `Error` a handler stashed in the response extensions into the JSON body the
/// client receives, and logs one line per request.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    // The id set by the request-id layer, so the client and the logs agree on it.
    let uuid = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|hv| Uuid::parse_str(hv).ok())
        .unwrap_or_else(Uuid::new_v4);

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let client_error = to_value(cl_err).ok();
        let message = client_error.as_ref().and_then(|v| v.get("message"));
        let detail = client_error.as_ref().and_then(|v| v.get("detail"));

        let client_error_body = json!({
            "detail": detail,
            "error": {
                "message": message,
                "req_id": uuid.to_string(),
            }
        });

        let mut err_resp = (*status, Json(client_error_body)).into_response();
        // Keep the request id on the rebuilt response.
        if let Some(req_id) = resp.headers().get(REQUEST_ID_HEADER) {
            err_resp
                .headers_mut()
                .insert(REQUEST_ID_HEADER, req_id.clone());
        }
        err_resp
    });

    let subscriber = resp.extensions().get::<ValidEmail>();
    RequestLog::new(
        uuid,
        &req_method,
        &uri,
        resp.status(),
        subscriber,
        web_error,
        client_status_and_error.as_ref(),
    )
    .emit();

    err_resp.unwrap_or(resp)
}
