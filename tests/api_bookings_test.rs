//! Integration tests for the bookings API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use futures::StreamExt;
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::util::ServiceExt;

    use dawriya::controller::ViewStatus;

    use crate::test_utils::{
        body_to_string, booking, broken_feed_app, loading_app, test_app, wait_for_booking,
    };

    async fn claim(app: &Router, payload: Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/bookings")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn list(app: &Router) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/bookings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Tests every month is listed unbooked in display order
    #[tokio::test]
    #[serial]
    async fn it_lists_every_month_unbooked() {
        let (app, _state) = test_app().await;

        let response = list(&app).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["status"], "live");
        assert_eq!(body["year"], "1447");

        let months = body["months"].as_array().unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0]["name"], "ربيع الثاني");
        assert_eq!(months[0]["calendarIndex"], 4);
        assert_eq!(months[11]["name"], "ربيع الأول");
        assert!(months.iter().all(|m| m["booked"] == false));
    }

    /// Tests the list is refused until the first snapshot arrives
    #[tokio::test]
    #[serial]
    async fn it_reports_loading_before_sign_in() {
        let (app, _state) = loading_app().await;

        let response = list(&app).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["status"], "loading");
        assert_eq!(body["error"], "جاري تحميل جدول الدورية...");
    }

    /// Tests claims are refused before the session is ready
    #[tokio::test]
    #[serial]
    async fn it_refuses_claims_while_loading() {
        let (app, _state) = loading_app().await;

        let response = claim(
            &app,
            json!({"month": "رجب", "host": "أبو سلطان", "location": "Hall A", "day": "Friday"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    /// Tests claiming a month and seeing it in the next list
    #[tokio::test]
    #[serial]
    async fn it_claims_a_month() {
        let (app, state) = test_app().await;

        let response = claim(
            &app,
            json!({"month": "رجب", "host": "أبو سلطان", "location": "Hall A", "day": "Friday"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let booking: Value =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(booking["month"], "رجب");
        assert_eq!(booking["year"], "1447");
        assert_eq!(booking["host"], "أبو سلطان");
        assert_eq!(booking["day"], "Friday");
        assert!(booking["createdAt"].is_string());

        wait_for_booking(&state, "رجب").await;

        let body: Value =
            serde_json::from_str(&body_to_string(list(&app).await.into_body()).await).unwrap();
        let months = body["months"].as_array().unwrap();
        let rajab = months.iter().find(|m| m["name"] == "رجب").unwrap();
        assert_eq!(rajab["booked"], true);
        assert_eq!(rajab["booking"]["location"], "Hall A");
        assert_eq!(months.iter().filter(|m| m["booked"] == true).count(), 1);
    }

    /// Tests a second claim for a booked month is rejected
    #[tokio::test]
    #[serial]
    async fn it_rejects_claiming_a_booked_month() {
        let (app, state) = test_app().await;

        let response = claim(
            &app,
            json!({"month": "شعبان", "host": "أبو سلطان", "location": "Hall A", "day": "Thursday"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        wait_for_booking(&state, "شعبان").await;

        let response = claim(
            &app,
            json!({"month": "شعبان", "host": "أم فهد", "location": "Hall A", "day": "Friday"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["error"], "هذا الشهر محجوز بالفعل.");

        // The first booking is untouched
        let body: Value =
            serde_json::from_str(&body_to_string(list(&app).await.into_body()).await).unwrap();
        let shaban = body["months"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["name"] == "شعبان")
            .cloned()
            .unwrap();
        assert_eq!(shaban["booking"]["host"], "أبو سلطان");
    }

    /// Tests a claim without a host is rejected
    #[tokio::test]
    #[serial]
    async fn it_rejects_an_empty_host() {
        let (app, _state) = test_app().await;

        let response = claim(
            &app,
            json!({"month": "رجب", "host": "  ", "location": "Hall A", "day": "Friday"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["error"], "الرجاء اختيار المضيف.");
    }

    /// Tests a claim for a month outside the catalog is rejected
    #[tokio::test]
    #[serial]
    async fn it_rejects_an_unknown_month() {
        let (app, _state) = test_app().await;

        let response = claim(
            &app,
            json!({"month": "January", "host": "أبو سلطان", "location": "Hall A"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests the stream starts with the current snapshot
    #[tokio::test]
    #[serial]
    async fn it_streams_snapshots() {
        let (app, _state) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bookings/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        let mut stream = response.into_body().into_data_stream();
        let frame = stream.next().await.unwrap().unwrap();
        let frame = String::from_utf8(frame.to_vec()).unwrap();
        assert!(frame.contains("event: snapshot"));
        assert!(frame.contains("\"status\":\"live\""));
    }

    /// Tests a feed that fails before the first snapshot is reported as
    /// unavailable
    #[tokio::test]
    #[serial]
    async fn it_reports_a_feed_failure_before_any_snapshot() {
        let (app, state) = broken_feed_app(vec![]).await;

        let status = state.read().unwrap().view.borrow().clone();
        assert!(matches!(status, ViewStatus::Failed { last: None, .. }));

        let response = list(&app).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["error"], "حدث خطأ في تحميل الحجوزات.");
        assert!(body["status"].is_null());
    }

    /// Tests the last view stays available with an error after the feed
    /// fails
    #[tokio::test]
    #[serial]
    async fn it_keeps_the_last_view_after_a_feed_failure() {
        let (app, state) = broken_feed_app(vec![vec![booking("رجب", "أبو سلطان")]]).await;

        let status = state.read().unwrap().view.borrow().clone();
        assert!(matches!(status, ViewStatus::Failed { last: Some(_), .. }));

        let response = list(&app).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(body["status"], "failed");
        assert_eq!(body["error"], "حدث خطأ في تحميل الحجوزات.");
        let rajab = body["months"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["name"] == "رجب")
            .cloned()
            .unwrap();
        assert_eq!(rajab["booking"]["host"], "أبو سلطان");
    }
}
