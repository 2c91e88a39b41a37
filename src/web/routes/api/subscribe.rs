use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, Span};

use crate::{
    model,
    web::{
        types::{DataParsingError, SubscribeRequest, SubscribeResponse, ValidEmail},
        ClientError, FieldError, WebResult,
    },
    AppState,
};

pub const ALREADY_SUBSCRIBED_MSG: &str = "Email is already subscribed.";

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("invalid request body: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
    #[error("model error: {0}")]
    Model(#[from] model::Error),

    #[error("error awaiting a blocking tokio task: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),
}

impl SubscribeError {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        match self {
            SubscribeError::JsonRejection(rejection) => {
                // Anything wrong with the body itself is a schema failure (422), the rest keeps
                // the status axum picked for it.
                let (status, kind) = match rejection {
                    JsonRejection::JsonDataError(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "value_error")
                    }
                    JsonRejection::JsonSyntaxError(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "json_invalid")
                    }
                    JsonRejection::MissingJsonContentType(_) => (rejection.status(), "content_type"),
                    _ => (rejection.status(), "body_error"),
                };
                let field_error = FieldError::new(&["body"], rejection.body_text(), kind);
                (status, ClientError::InvalidInput(vec![field_error]))
            }
            SubscribeError::DataParsing(er) => {
                let field_error = FieldError::new(&["body", "email"], er.to_string(), "value_error");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ClientError::InvalidInput(vec![field_error]),
                )
            }
            SubscribeError::Model(model::Error::DuplicateSubscription) => (
                StatusCode::BAD_REQUEST,
                ClientError::DuplicateSubscription(ALREADY_SUBSCRIBED_MSG),
            ),
            SubscribeError::Model(model::Error::StoreUnavailable(_))
            | SubscribeError::BlockingTask(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::ServiceError("Internal Server Error"),
            ),
        }
    }
}

// ###################################
// ->   API
// ###################################
#[tracing::instrument(
    name = "Subscribing a new email to the newsletter",
    skip(app_state, payload),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> WebResult<(StatusCode, Extension<ValidEmail>, Json<SubscribeResponse>)> {
    let Json(request) = payload.map_err(SubscribeError::JsonRejection)?;

    // Spawn a blocking task to validate and normalize the email.
    let email = tokio::task::spawn_blocking(move || ValidEmail::parse(request.email))
        .await
        .map_err(SubscribeError::BlockingTask)?
        .map_err(SubscribeError::DataParsing)?;
    Span::current().record("subscriber_email", tracing::field::display(&email));

    let email = app_state
        .model_mgr
        .subscribe(email)
        .await
        .map_err(SubscribeError::Model)?;
    info!("SUCCESS");

    // The request log picks the subscriber up from the response extensions.
    Ok((
        StatusCode::CREATED,
        Extension(email.clone()),
        Json(SubscribeResponse::new(email)),
    ))
}
