//! Integration tests for the analysis session against a mocked backend.
//!
//! Each test starts its own wiremock server, drives the session through its
//! public operations and applies completion events the way the event loop
//! does, one at a time.

use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::mpsc;
use truelens::api::{AnalysisSource, ApiClient};
use truelens::config::ResponseOrder;
use truelens::session::{AnalysisSession, Phase, SessionEvent, Surface, MANUAL_TEXT_LABEL};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

fn session_for(
    server: &MockServer,
    surface: Surface,
    order: ResponseOrder,
) -> (AnalysisSession, mpsc::Receiver<SessionEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let client = ApiClient::new(&server.uri()).unwrap();
    (AnalysisSession::new(client, tx, surface, order), rx)
}

/// Apply events until `done` holds, failing after five seconds.
async fn pump_until(
    session: &mut AnalysisSession,
    rx: &mut mpsc::Receiver<SessionEvent>,
    done: impl Fn(&AnalysisSession) -> bool,
) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !done(session) {
        let event = tokio::time::timeout_at(deadline, rx.recv())
            .await
            .expect("timed out waiting for session event")
            .expect("event channel closed");
        session.handle_event(event);
    }
}

fn analysis(status: &str, report: &str) -> serde_json::Value {
    serde_json::json!({
        "status": status,
        "report": report,
        "verification_results": [
            {"claim": "The moon landing was staged", "status": "False", "explanation": "Independent evidence"}
        ]
    })
}

fn article_json(id: i64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "source_id": "bbc",
        "external_id": format!("ext-{}", id),
        "url": format!("https://news.example.com/{}", id),
        "content_type": "article",
        "title": title,
        "text_content": "Body",
        "published_at": "2024-05-01T10:00:00Z"
    })
}

async fn mount_trends(server: &MockServer, expected_calls: impl Into<Times>) {
    Mock::given(method("GET"))
        .and(path("/api/trends"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"topic": "5G towers", "count": 4}])),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ============================================================================
// Text analysis
// ============================================================================

#[tokio::test]
async fn test_text_success_refreshes_trends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-text"))
        .and(body_json(serde_json::json!({"text": "Garlic cures flu"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(analysis("completed", "**Verdict**\n\nFalse.")),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_trends(&server, 1).await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    assert_eq!(session.phase(), Phase::Idle);

    session.submit_text("  Garlic cures flu ", None);
    assert_eq!(session.phase(), Phase::Loading);

    pump_until(&mut session, &mut rx, |s| s.phase() != Phase::Loading).await;
    assert_eq!(session.phase(), Phase::Succeeded);
    assert_eq!(
        session.active_source(),
        Some(&AnalysisSource::Text {
            label: MANUAL_TEXT_LABEL.to_string()
        })
    );
    let result = session.active_result().unwrap();
    assert_eq!(result.status, "completed");
    assert_eq!(result.verification_results.len(), 1);

    pump_until(&mut session, &mut rx, |s| !s.trends_loading()).await;
    assert_eq!(session.trends().len(), 1);
    assert_eq!(session.trends()[0].topic, "5G towers");
}

#[tokio::test]
async fn test_text_http_error_surfaces_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-text"))
        .respond_with(ResponseTemplate::new(500).set_body_string("no-op"))
        .mount(&server)
        .await;
    mount_trends(&server, 0).await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    session.submit_text("anything", Some("Custom"));
    pump_until(&mut session, &mut rx, |s| s.phase() != Phase::Loading).await;

    assert_eq!(session.phase(), Phase::Failed);
    assert_eq!(session.last_error(), Some("no-op"));
    assert!(session.active_result().is_none());
}

#[tokio::test]
async fn test_failure_after_success_keeps_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-text"))
        .and(body_json(serde_json::json!({"text": "first"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis("completed", "")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-text"))
        .and(body_json(serde_json::json!({"text": "second"})))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_trends(&server, 1).await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    session.submit_text("first", None);
    pump_until(&mut session, &mut rx, |s| {
        s.phase() == Phase::Succeeded && !s.trends_loading()
    })
    .await;

    session.submit_text("second", None);
    pump_until(&mut session, &mut rx, |s| s.phase() != Phase::Loading).await;

    assert_eq!(session.phase(), Phase::Failed);
    assert_eq!(
        session.last_error(),
        Some("Request failed with status 503 Service Unavailable")
    );
    assert_eq!(session.active_result().map(|r| r.status.as_str()), Some("completed"));
    assert_eq!(session.submitted_text(), "second");
}

#[tokio::test]
async fn test_panel_does_not_refresh_trends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis("completed", "Plain")))
        .mount(&server)
        .await;
    mount_trends(&server, 0).await;

    let (mut session, mut rx) = session_for(&server, Surface::Panel, ResponseOrder::LastResolved);
    session.submit_text("claim", None);
    pump_until(&mut session, &mut rx, |s| s.phase() == Phase::Succeeded).await;

    assert!(!session.trends_loading());
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// Article analysis
// ============================================================================

#[tokio::test]
async fn test_article_success_requests_focus() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis("completed", "Body")))
        .expect(1)
        .mount(&server)
        .await;
    mount_trends(&server, 1).await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    let article: truelens::api::RawArticle =
        serde_json::from_value(article_json(12, "Flood hoax")).unwrap();

    session.submit_article(&article);
    assert_eq!(session.analyzing_article_id(), Some(12));

    pump_until(&mut session, &mut rx, |s| s.analyzing_article_id().is_none()).await;
    assert_eq!(
        session.active_source(),
        Some(&AnalysisSource::Article {
            label: "Flood hoax".to_string()
        })
    );
    assert!(session.take_focus_request());

    pump_until(&mut session, &mut rx, |s| !s.trends_loading()).await;
}

#[tokio::test]
async fn test_article_error_clears_marker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze/5"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Content not found"))
        .mount(&server)
        .await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    let article: truelens::api::RawArticle =
        serde_json::from_value(article_json(5, "Missing")).unwrap();
    session.submit_article(&article);
    pump_until(&mut session, &mut rx, |s| s.analyzing_article_id().is_none()).await;

    assert_eq!(session.last_error(), Some("Content not found"));
    assert!(session.active_result().is_none());
}

async fn race(order: ResponseOrder) -> String {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(analysis("a", "A"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/analyze/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis("b", "B")))
        .mount(&server)
        .await;
    mount_trends(&server, 0..=2).await;

    let (mut session, mut rx) = session_for(&server, Surface::Dashboard, order);
    let a: truelens::api::RawArticle = serde_json::from_value(article_json(1, "A")).unwrap();
    let b: truelens::api::RawArticle = serde_json::from_value(article_json(2, "B")).unwrap();

    session.submit_article(&a);
    session.submit_article(&b);

    // Wait for B, then for the delayed A.
    pump_until(&mut session, &mut rx, |s| {
        s.active_source().map(|src| src.label()) == Some("B")
    })
    .await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    while let Ok(event) = rx.try_recv() {
        session.handle_event(event);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    while let Ok(event) = rx.try_recv() {
        session.handle_event(event);
    }

    session
        .active_source()
        .map(|src| src.label().to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_last_resolved_lets_slow_response_win() {
    assert_eq!(race(ResponseOrder::LastResolved).await, "A");
}

#[tokio::test]
async fn test_latest_issued_discards_slow_response() {
    assert_eq!(race(ResponseOrder::LatestIssued).await, "B");
}

// ============================================================================
// Trends, dashboard and scan
// ============================================================================

#[tokio::test]
async fn test_trend_refresh_failure_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trends"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    session.refresh_trends();
    pump_until(&mut session, &mut rx, |s| !s.trends_loading()).await;

    assert!(session.trends().is_empty());
    assert!(session.last_error().is_none());
    assert_eq!(session.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_load_dashboard_populates_lists() {
    let server = MockServer::start().await;
    mount_trends(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([article_json(1, "One"), article_json(2, "Two")])),
        )
        .mount(&server)
        .await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    session.load_dashboard();
    pump_until(&mut session, &mut rx, |s| !s.articles_loading()).await;

    assert_eq!(session.trends().len(), 1);
    assert_eq!(session.articles().len(), 2);
    assert_eq!(session.articles()[1].title.as_deref(), Some("Two"));
}

#[tokio::test]
async fn test_scan_success_refreshes_lists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/trigger-scan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "Scan started"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_trends(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([article_json(9, "New")])))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    session.trigger_scan();
    pump_until(&mut session, &mut rx, |s| !s.scan_loading()).await;

    assert_eq!(session.scan_message(), Some("Scan started"));
    assert_eq!(session.articles().len(), 1);
    assert_eq!(session.trends().len(), 1);
}

#[tokio::test]
async fn test_scan_failure_shares_message_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/trigger-scan"))
        .respond_with(ResponseTemplate::new(502).set_body_string("scanner offline"))
        .mount(&server)
        .await;

    let (mut session, mut rx) =
        session_for(&server, Surface::Dashboard, ResponseOrder::LastResolved);
    session.trigger_scan();
    pump_until(&mut session, &mut rx, |s| !s.scan_loading()).await;

    assert_eq!(session.scan_message(), Some("scanner offline"));
    assert!(session.last_error().is_none());
}
