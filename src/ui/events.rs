//! Session event handling.
//!
//! Applies background task completions to the session, then reconciles the
//! UI state that depends on it: list selections, focus, scroll and the
//! status bar.

use crate::app::App;
use crate::session::SessionEvent;

/// Apply one completion event. Runs to completion before the next event.
pub(super) fn handle_session_event(app: &mut App, event: SessionEvent) {
    let resets_scroll = matches!(
        event,
        SessionEvent::TextAnalyzed { result: Ok(_), .. }
            | SessionEvent::ArticleAnalyzed { result: Ok(_), .. }
    );

    if let SessionEvent::TaskPanicked { task, .. } = &event {
        app.set_status(format!("Internal error in {} task", task));
    }

    app.session.handle_event(event);

    if resets_scroll {
        app.analysis_scroll = 0;
    }
    app.clamp_selections();
    app.apply_focus_request();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AnalysisResult, ApiClient, RawArticle};
    use crate::app::Focus;
    use crate::config::ResponseOrder;
    use crate::keybindings::KeybindingRegistry;
    use crate::session::{AnalysisSession, Surface};
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let session =
            AnalysisSession::new(client, tx, Surface::Dashboard, ResponseOrder::LastResolved);
        (App::new(session, KeybindingRegistry::new()), rx)
    }

    fn article(id: i64) -> RawArticle {
        RawArticle {
            id,
            source_id: Some("cnn".to_string()),
            external_id: None,
            url: None,
            content_type: None,
            title: None,
            text_content: None,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_panic_sets_status() {
        let (mut app, _rx) = test_app();
        handle_session_event(
            &mut app,
            SessionEvent::TaskPanicked {
                task: "trends",
                error: "boom".to_string(),
            },
        );
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Internal error in trends task");
    }

    #[tokio::test]
    async fn test_article_success_moves_focus_to_analysis() {
        let (mut app, _rx) = test_app();
        handle_session_event(
            &mut app,
            SessionEvent::DashboardLoaded(Ok((Vec::new(), vec![article(8)]))),
        );
        app.focus = Focus::Articles;
        app.analysis_scroll = 12;
        assert!(app.analyze_selected_article());

        handle_session_event(
            &mut app,
            SessionEvent::ArticleAnalyzed {
                seq: 1,
                article_id: 8,
                label: "cnn".to_string(),
                result: Ok(AnalysisResult::default()),
            },
        );
        assert_eq!(app.focus, Focus::Analysis);
        assert_eq!(app.analysis_scroll, 0);
    }

    #[tokio::test]
    async fn test_shrinking_list_clamps_selection() {
        let (mut app, _rx) = test_app();
        handle_session_event(
            &mut app,
            SessionEvent::DashboardLoaded(Ok((Vec::new(), vec![article(1), article(2)]))),
        );
        app.selected_article = 1;
        handle_session_event(
            &mut app,
            SessionEvent::ScanRefreshed(Ok((Vec::new(), vec![article(3)]))),
        );
        assert_eq!(app.selected_article, 0);
    }
}
