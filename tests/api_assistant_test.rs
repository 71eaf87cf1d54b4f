//! Integration tests for the assistant API endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use mockito::Matcher;
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::util::ServiceExt;

    use dawriya::api::{InFlight, SharedState};

    use crate::test_utils::{
        body_to_string, loading_app, test_app, test_app_with_config, test_config, wait_for_booking,
    };

    const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

    fn gemini_reply(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    async fn post_json(app: &Router, uri: &str, payload: Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn booked_app(gemini_host: &str, month: &str) -> (Router, SharedState) {
        let mut config = test_config();
        config.gemini_api_hostname = gemini_host.to_string();
        let (app, state) = test_app_with_config(config).await;

        let response = post_json(
            &app,
            "/api/bookings",
            json!({"month": month, "host": "أبو سلطان", "location": "Hall A", "day": "Friday"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        wait_for_booking(&state, month).await;

        (app, state)
    }

    /// Tests generating an invitation for a booked month
    #[tokio::test]
    #[serial]
    async fn it_generates_an_invitation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("أبو سلطان".into()),
                Matcher::Regex("Hall A".into()),
                Matcher::Regex("الجمعة".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(gemini_reply("أهلاً وسهلاً بكم"))
            .create_async()
            .await;

        let (app, _state) = booked_app(&server.url(), "رجب").await;

        let response = post_json(
            &app,
            "/api/assistant",
            json!({"month": "رجب", "kind": "invitation"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["kind"], "invitation");
        assert_eq!(body["text"], "أهلاً وسهلاً بكم");

        mock.assert_async().await;
    }

    /// Tests a failed generation returns the fixed apology
    #[tokio::test]
    #[serial]
    async fn it_reports_generation_failures() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", GENERATE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"candidates": []}).to_string())
            .create_async()
            .await;

        let (app, _state) = booked_app(&server.url(), "شوال").await;

        let response = post_json(
            &app,
            "/api/assistant",
            json!({"month": "شوال", "kind": "ideas"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(
            body["error"],
            "عذراً، حدث خطأ أثناء إنشاء المحتوى. الرجاء المحاولة مرة أخرى."
        );
    }

    /// Tests the assistant is only offered for booked months
    #[tokio::test]
    #[serial]
    async fn it_rejects_unbooked_months() {
        let (app, _state) = test_app().await;

        let response = post_json(
            &app,
            "/api/assistant",
            json!({"month": "صفر", "kind": "ideas"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests the assistant waits for the first snapshot
    #[tokio::test]
    #[serial]
    async fn it_reports_loading_before_sign_in() {
        let (app, _state) = loading_app().await;

        let response = post_json(
            &app,
            "/api/assistant",
            json!({"month": "صفر", "kind": "ideas"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    /// Tests a second request for the same booking is refused while one
    /// is in flight
    #[tokio::test]
    #[serial]
    async fn it_refuses_concurrent_requests_for_a_booking() {
        let server = mockito::Server::new_async().await;
        let (app, state) = booked_app(&server.url(), "محرم").await;

        let guard = InFlight::begin(&state, "1447_محرم").unwrap();
        assert!(InFlight::begin(&state, "1447_محرم").is_none());

        let response = post_json(
            &app,
            "/api/assistant",
            json!({"month": "محرم", "kind": "invitation"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["error"], "جاري الإبداع...");

        drop(guard);
        assert!(InFlight::begin(&state, "1447_محرم").is_some());
    }
}
