use anyhow::Result;
use neuronex::web::types::{SubscribeResponse, ValidEmail};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::TestApp;

#[tokio::test]
async fn api_subscribe_new_email_201() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_subscriptions(&json!({ "email": "New.User@Domain.COM" }))
        .await?;

    assert_eq!(
        res.status(),
        StatusCode::CREATED,
        "Wrong response StatusCode: {}",
        res.status()
    );

    let body: SubscribeResponse = res.json().await?;
    assert_eq!(
        body,
        SubscribeResponse {
            message: "Successfully subscribed to NeuroNex updates!".to_string(),
            email: "new.user@domain.com".to_string(),
        }
    );

    let stored = ValidEmail::parse("new.user@domain.com")?;
    assert!(app.model_mgr.is_subscribed(&stored).await?);
    assert_eq!(app.model_mgr.subscriber_count().await, 3);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_non_ascii_local_part_201() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_subscriptions(&json!({ "email": "José@Example.com" }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: SubscribeResponse = res.json().await?;
    assert_eq!(body.email, "josé@example.com");

    Ok(())
}

#[tokio::test]
async fn api_subscribe_seeded_email_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        "test@example.com",
        "  Test@Example.com ",
        "ALEX.CARTER@example.com",
    ];

    for email in cases {
        let res = app.post_subscriptions(&json!({ "email": email })).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Expected a duplicate for seeded email: {email:?}"
        );

        let body: Value = res.json().await?;
        assert_eq!(body["detail"], "Email is already subscribed.");
    }

    assert_eq!(app.model_mgr.subscriber_count().await, 2);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_twice_second_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_subscriptions(&json!({ "email": "ursula@le-guin.com" }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    for variant in ["ursula@le-guin.com", " Ursula@Le-Guin.com\t"] {
        let res = app.post_subscriptions(&json!({ "email": variant })).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_invalid_email_422() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        ("not-an-email", "Missing @"),
        ("", "Empty email"),
        ("   ", "Whitespace only"),
        ("a@b", "Domain without a dot"),
        ("@domain.com", "Missing local part"),
        ("new user@domain.com", "Inner whitespace"),
        ("a..b@example.com", "Consecutive dots in local part"),
        (".a@example.com", "Leading dot in local part"),
        ("a.@example.com", "Trailing dot in local part"),
        ("a@example.123", "Numeric top level label"),
    ];

    for (email, description) in cases {
        let res = app.post_subscriptions(&json!({ "email": email })).await?;
        assert_eq!(
            res.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "The API did not return a 422 when the payload was: {description}"
        );

        let body: Value = res.json().await?;
        assert_eq!(body["detail"][0]["loc"], json!(["body", "email"]));
        assert_eq!(body["detail"][0]["type"], "value_error");
        assert!(
            body["detail"][0]["msg"]
                .as_str()
                .is_some_and(|msg| msg.contains("valid email")),
            "Unexpected error message for: {description}"
        );
    }

    // Nothing was stored.
    assert_eq!(app.model_mgr.subscriber_count().await, 2);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_unprocessable_entity() -> Result<()> {
    let app = TestApp::spawn().await?;

    let tests = [
        (json!({}), "Empty json"),
        (json!({ "email": null }), "Null email"),
        (json!({ "email": 42 }), "Email is not a string"),
        (json!({ "name": "John Doe" }), "Missing email"),
        (json!("test@example.com"), "Not an object"),
    ];

    for (json_request, params) in tests {
        let res = app.post_subscriptions(&json_request).await?;
        assert_eq!(
            res.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "Wrong response: ({}), Expected: ({}); for request with: {params}",
            res.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let body: Value = res.json().await?;
        assert_eq!(body["detail"][0]["loc"], json!(["body"]));
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_malformed_json_422() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .post(app.subscribe_url())
        .header("content-type", "application/json")
        .body(r#"{"email": "#)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"][0]["type"], "json_invalid");

    Ok(())
}

#[tokio::test]
async fn api_subscribe_without_json_content_type_415() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .post(app.subscribe_url())
        .body(r#"{"email": "ursula@le-guin.com"}"#)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"][0]["type"], "content_type");

    Ok(())
}

#[tokio::test]
async fn api_subscribe_error_carries_request_id() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_subscriptions(&json!({ "email": "test@example.com" }))
        .await?;

    let header_id = res
        .headers()
        .get("x-request-id")
        .and_then(|hv| hv.to_str().ok())
        .map(ToString::to_string)
        .expect("x-request-id header is set");

    let body: Value = res.json().await?;
    assert_eq!(body["error"]["req_id"], header_id.as_str());
    assert_eq!(body["error"]["message"], "DuplicateSubscription");

    Ok(())
}

#[tokio::test]
async fn api_subscribe_get_method_not_allowed() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.subscribe_url()).send().await?;

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_concurrent_same_email_exactly_one_201() -> Result<()> {
    let app = TestApp::spawn().await?;
    let url = app.subscribe_url();

    let mut set = tokio::task::JoinSet::new();
    for i in 0..20 {
        let http_client = app.http_client.clone();
        let url = url.clone();
        // Same address, different casing and padding.
        let email = if i % 2 == 0 {
            "race@domain.com".to_string()
        } else {
            " RACE@Domain.com ".to_string()
        };

        set.spawn(async move {
            http_client
                .post(url)
                .json(&json!({ "email": email }))
                .send()
                .await
        });
    }

    let (mut created, mut duplicate) = (0, 0);
    while let Some(res) = set.join_next().await {
        match res??.status() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => duplicate += 1,
            other => panic!("unexpected status: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(duplicate, 19);
    assert_eq!(app.model_mgr.subscriber_count().await, 3);

    Ok(())
}
