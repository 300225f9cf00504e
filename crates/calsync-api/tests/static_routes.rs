mod support;

use support::{FakeCalendar, TestApp, VERIFICATION_CONTENT, body_string};

#[tokio::test]
async fn health_check() {
    let app = TestApp::new(FakeCalendar::with_events(Vec::new())).await;

    let response = app.send(app.get("/health")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn verification_file_is_served() {
    let app = TestApp::new(FakeCalendar::with_events(Vec::new())).await;

    let response = app.send(app.get("/googletest.html")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_string(response).await, VERIFICATION_CONTENT);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new(FakeCalendar::with_events(Vec::new())).await;

    let response = app.send(app.get("/nothing-here")).await;
    assert_eq!(response.status(), 404);
}
