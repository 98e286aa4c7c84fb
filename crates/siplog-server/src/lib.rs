pub mod response;
pub mod server;

pub use response::{ApiError, ErrorResponse};
pub use server::{router, SipLogServer};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use siplog_core::{DispatchPolicy, RedactionConfig};
    use siplog_engine::Dispatcher;
    use siplog_security::{RedactError, SipRedactor};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    const EXAMPLE: &str = r#"{
        "log_message_list": [
            { "meta_info": { "dialog_id": "d-1", "level": 1 }, "text": "INVITE sip:alice@example.com", "type": "sip" },
            { "meta_info": { "dialog_id": "d-2" }, "text": "operator comment", "type": "note" }
        ],
        "meta_info": { "call_id": "c-1", "session_list": ["s-1"] }
    }"#;

    fn test_router(policy: DispatchPolicy) -> (axum::Router, CancellationToken) {
        let redactor = Arc::new(SipRedactor::new(&RedactionConfig::default()));
        let dispatcher = Arc::new(Dispatcher::new(redactor, policy));
        let shutdown = CancellationToken::new();
        (router(dispatcher, "/sip", shutdown.clone()), shutdown)
    }

    fn post_batch(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/sip")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_batch_redacts_sip_entries() {
        for policy in [DispatchPolicy::sequential(), DispatchPolicy::fan_out(4)] {
            let (app, _shutdown) = test_router(policy);

            let response = app.oneshot(post_batch(EXAMPLE)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = read_json(response).await;
            let entries = body["log_message_list"].as_array().unwrap();
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0]["text"], "INVITE sip:REDACTED@example.com");
            assert_eq!(entries[0]["meta_info"]["dialog_id"], "d-1");
            assert_eq!(entries[1]["text"], "operator comment");
            assert_eq!(entries[1]["type"], "note");
            assert_eq!(body["meta_info"]["call_id"], "c-1");
            assert_eq!(body["meta_info"]["session_list"][0], "s-1");
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (app, _shutdown) = test_router(DispatchPolicy::default());

        let response = app.oneshot(post_batch("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["log_message_list"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_batch_is_bad_request() {
        let (app, _shutdown) = test_router(DispatchPolicy::default());

        let response = app
            .oneshot(post_batch(r#"{"log_message_list": "nope"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["status"], "Invalid request.");
        assert!(body["error"].as_str().unwrap().starts_with("Malformed batch"));
        assert!(body.get("entry").is_none());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let (app, _shutdown) = test_router(DispatchPolicy::default());
        let request = Request::builder()
            .method("POST")
            .uri("/sip")
            .body(Body::from(EXAMPLE))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_redaction_failure_is_server_error() {
        let failing = |m: &[u8]| -> Result<Vec<u8>, RedactError> {
            if m.starts_with(b"BYE") {
                Err(RedactError::Failed("unparseable".to_string()))
            } else {
                Ok(m.to_vec())
            }
        };
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(failing), DispatchPolicy::fan_out(2)));
        let app = router(dispatcher, "/sip", CancellationToken::new());
        let body = r#"{"log_message_list": [
            {"text": "INVITE sip:a@b", "type": "sip"},
            {"text": "BYE sip:a@b", "type": "sip"}
        ]}"#;

        let response = app.oneshot(post_batch(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = read_json(response).await;
        assert_eq!(body["status"], "Redaction failed.");
        assert_eq!(body["entry"], 1);
        let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["entry", "error", "status"]);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_batches() {
        let (app, shutdown) = test_router(DispatchPolicy::sequential());
        shutdown.cancel();

        let response = app.oneshot(post_batch(EXAMPLE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_info() {
        let (app, _shutdown) = test_router(DispatchPolicy::fan_out(8));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["name"], "siplog");
        assert_eq!(body["strategy"], "fan_out");
        assert_eq!(body["max_in_flight"], 8);
    }

    #[test]
    fn test_error_status_codes() {
        use siplog_core::Error;
        use std::time::Duration;

        let cases = [
            (Error::MalformedBatch("x".into()), StatusCode::BAD_REQUEST),
            (
                Error::RedactionFailure {
                    index: 0,
                    reason: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (Error::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (
                Error::DeadlineExceeded(Duration::from_secs(1)),
                StatusCode::REQUEST_TIMEOUT,
            ),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }
}
