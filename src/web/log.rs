use axum::http::{Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::json;
use serde_with::skip_serializing_none;
use uuid::Uuid;

use super::{error::ClientError, types::ValidEmail};
use crate::web::Error;

/// What a request ended up doing to the subscriber list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Subscribed,
    Duplicate,
    Invalid,
    Failed,
    /// Requests that never reached the subscriber list (health checks, unknown routes).
    Untouched,
}

impl Outcome {
    fn classify(subscriber: Option<&ValidEmail>, client_error: Option<&ClientError>) -> Self {
        match (client_error, subscriber) {
            (Some(ClientError::InvalidInput(_)), _) => Outcome::Invalid,
            (Some(ClientError::DuplicateSubscription(_)), _) => Outcome::Duplicate,
            (Some(ClientError::ServiceError(_)), _) => Outcome::Failed,
            (None, Some(_)) => Outcome::Subscribed,
            (None, None) => Outcome::Untouched,
        }
    }
}

/// One structured line per request.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct RequestLog {
    timestamp: String,
    req_id: String,
    method: String,
    path: String,
    status: u16,
    outcome: Outcome,

    subscriber_email: Option<String>,
    client_error: Option<String>,
    server_error: Option<String>,
}

impl RequestLog {
    /// `subscriber` is the normalized email a successful subscribe left in the response
    /// extensions. `status` is overridden by the client error's status when there is one.
    pub fn new(
        req_id: Uuid,
        method: &Method,
        uri: &Uri,
        status: StatusCode,
        subscriber: Option<&ValidEmail>,
        web_error: Option<&Error>,
        client_status_and_error: Option<&(StatusCode, ClientError)>,
    ) -> Self {
        let client_error = client_status_and_error.map(|(_, ce)| ce);
        let status = client_status_and_error
            .map(|(sc, _)| *sc)
            .unwrap_or(status);

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            req_id: req_id.to_string(),
            method: method.to_string(),
            path: uri.path().to_string(),
            status: status.as_u16(),
            outcome: Outcome::classify(subscriber, client_error),
            subscriber_email: subscriber.map(ToString::to_string),
            client_error: client_error.map(|ce| ce.as_ref().to_string()),
            server_error: web_error
                .filter(|_| status.is_server_error())
                .map(ToString::to_string),
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn emit(&self) {
        let line = json!(self);
        match self.outcome() {
            Outcome::Failed => tracing::error!("REQUEST_LOG: {line}"),
            Outcome::Subscribed => tracing::info!("REQUEST_LOG: {line}"),
            _ => tracing::debug!("REQUEST_LOG: {line}"),
        }
    }
}
