//! Analysis session controller.
//!
//! Owns the request lifecycle for every backend call the UI can trigger.
//! Operations start a spawned task and return immediately; each task reports
//! back with a [`SessionEvent`] on the loop's channel, and the loop feeds that
//! event to [`AnalysisSession::handle_event`]. State is only ever mutated on
//! the loop, one event at a time.
//!
//! Every analysis request carries a sequence number taken at issue time. With
//! [`ResponseOrder::LastResolved`] it is ignored and whichever response
//! arrives last wins. With [`ResponseOrder::LatestIssued`] a response older
//! than the newest one already applied is dropped.

use crate::api::{AnalysisResult, AnalysisSource, ApiClient, ApiError, RawArticle, TrendCluster};
use crate::config::ResponseOrder;
use crate::util::catch_task_panic;
use std::future::Future;
use tokio::sync::mpsc;

/// Label recorded for text analyses submitted without one.
pub const MANUAL_TEXT_LABEL: &str = "Manual text input";

/// Scan message used when the backend returns a blank status.
pub const SCAN_COMPLETED: &str = "Scan completed";

// ============================================================================
// Types
// ============================================================================

/// Lifecycle of the text analysis flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Which screen hosts the session.
///
/// The standalone panel clears the previous result when a new text request
/// starts and never refreshes trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Dashboard,
    Panel,
}

/// Completion of a background task, delivered to the event loop.
#[derive(Debug)]
pub enum SessionEvent {
    TextAnalyzed {
        seq: u64,
        label: String,
        result: Result<AnalysisResult, ApiError>,
    },
    ArticleAnalyzed {
        seq: u64,
        article_id: i64,
        label: String,
        result: Result<AnalysisResult, ApiError>,
    },
    TrendsLoaded(Result<Vec<TrendCluster>, ApiError>),
    DashboardLoaded(Result<(Vec<TrendCluster>, Vec<RawArticle>), ApiError>),
    /// The scan call itself returned. On success the same task goes on to
    /// refresh articles and trends and reports `ScanRefreshed`.
    ScanFinished(Result<String, ApiError>),
    ScanRefreshed(Result<(Vec<TrendCluster>, Vec<RawArticle>), ApiError>),
    /// A background task panicked.
    ///
    /// - `task`: name passed when the task was spawned
    /// - `error`: the panic message
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// Task names, also used to reset loading flags after a panic.
const TASK_ANALYZE_TEXT: &str = "analyze_text";
const TASK_ANALYZE_ARTICLE: &str = "analyze_article";
const TASK_TRENDS: &str = "trends";
const TASK_DASHBOARD: &str = "dashboard";
const TASK_SCAN: &str = "scan";

// ============================================================================
// Session
// ============================================================================

pub struct AnalysisSession {
    client: ApiClient,
    event_tx: mpsc::Sender<SessionEvent>,
    surface: Surface,
    response_order: ResponseOrder,

    phase: Phase,
    active_result: Option<AnalysisResult>,
    active_source: Option<AnalysisSource>,
    last_error: Option<String>,
    analyzing_article_id: Option<i64>,
    submitted_text: String,

    trends: Vec<TrendCluster>,
    trends_loading: bool,
    articles: Vec<RawArticle>,
    articles_loading: bool,
    scan_loading: bool,
    scan_message: Option<String>,

    /// Last sequence number handed out.
    issued_seq: u64,
    /// Sequence number of the newest applied analysis response.
    applied_seq: u64,
    /// Sequence number of the newest text request.
    text_seq: u64,
    /// Sequence number of the newest article request.
    article_seq: u64,
    focus_requested: bool,
}

impl AnalysisSession {
    pub fn new(
        client: ApiClient,
        event_tx: mpsc::Sender<SessionEvent>,
        surface: Surface,
        response_order: ResponseOrder,
    ) -> Self {
        Self {
            client,
            event_tx,
            surface,
            response_order,
            phase: Phase::Idle,
            active_result: None,
            active_source: None,
            last_error: None,
            analyzing_article_id: None,
            submitted_text: String::new(),
            trends: Vec::new(),
            trends_loading: false,
            articles: Vec::new(),
            articles_loading: false,
            scan_loading: false,
            scan_message: None,
            issued_seq: 0,
            applied_seq: 0,
            text_seq: 0,
            article_seq: 0,
            focus_requested: false,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn response_order(&self) -> ResponseOrder {
        self.response_order
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_result(&self) -> Option<&AnalysisResult> {
        self.active_result.as_ref()
    }

    pub fn active_source(&self) -> Option<&AnalysisSource> {
        self.active_source.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn analyzing_article_id(&self) -> Option<i64> {
        self.analyzing_article_id
    }

    /// The trimmed text of the most recent text submission.
    pub fn submitted_text(&self) -> &str {
        &self.submitted_text
    }

    pub fn trends(&self) -> &[TrendCluster] {
        &self.trends
    }

    pub fn trends_loading(&self) -> bool {
        self.trends_loading
    }

    pub fn articles(&self) -> &[RawArticle] {
        &self.articles
    }

    pub fn articles_loading(&self) -> bool {
        self.articles_loading
    }

    pub fn scan_loading(&self) -> bool {
        self.scan_loading
    }

    pub fn scan_message(&self) -> Option<&str> {
        self.scan_message.as_deref()
    }

    /// True while any analysis request (text or article) is outstanding.
    pub fn is_analyzing(&self) -> bool {
        self.phase == Phase::Loading || self.analyzing_article_id.is_some()
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Submit free text for analysis.
    ///
    /// Blank input is ignored. `label` defaults to [`MANUAL_TEXT_LABEL`].
    pub fn submit_text(&mut self, value: &str, label: Option<&str>) {
        let text = value.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring blank text submission");
            return;
        }

        let seq = self.next_seq();
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(MANUAL_TEXT_LABEL)
            .to_string();

        self.submitted_text = text.to_string();
        self.phase = Phase::Loading;
        self.text_seq = seq;
        self.last_error = None;
        if self.surface == Surface::Panel {
            self.active_result = None;
            self.active_source = None;
        }

        tracing::info!(seq, label = %label, chars = text.len(), "Submitting text analysis");

        let text = self.submitted_text.clone();
        self.spawn_task(TASK_ANALYZE_TEXT, move |client, tx| async move {
            let result = client.analyze_text(&text).await;
            send(&tx, SessionEvent::TextAnalyzed { seq, label, result }).await;
        });
    }

    /// Submit an ingested article for analysis by id.
    pub fn submit_article(&mut self, article: &RawArticle) {
        let seq = self.next_seq();
        let article_id = article.id;
        let label = article.analysis_label();

        self.active_result = None;
        self.active_source = None;
        self.last_error = None;
        self.analyzing_article_id = Some(article_id);
        self.article_seq = seq;

        tracing::info!(seq, article_id, label = %label, "Submitting article analysis");

        self.spawn_task(TASK_ANALYZE_ARTICLE, move |client, tx| async move {
            let result = client.analyze_article(article_id).await;
            send(
                &tx,
                SessionEvent::ArticleAnalyzed {
                    seq,
                    article_id,
                    label,
                    result,
                },
            )
            .await;
        });
    }

    /// Re-fetch trending narratives. Failures keep the previous list.
    pub fn refresh_trends(&mut self) {
        self.trends_loading = true;
        self.spawn_task(TASK_TRENDS, |client, tx| async move {
            let result = client.get_trends().await;
            send(&tx, SessionEvent::TrendsLoaded(result)).await;
        });
    }

    /// Ask the backend to scan its sources, then reload articles and trends.
    ///
    /// Ignored while a scan is already running.
    pub fn trigger_scan(&mut self) {
        if self.scan_loading {
            tracing::debug!("Scan already in progress");
            return;
        }
        self.scan_loading = true;
        self.scan_message = None;

        tracing::info!("Triggering backend scan");

        self.spawn_task(TASK_SCAN, |client, tx| async move {
            match client.trigger_scan().await {
                Ok(scan) => {
                    send(&tx, SessionEvent::ScanFinished(Ok(scan.status))).await;
                    let result = fetch_lists(&client).await;
                    send(&tx, SessionEvent::ScanRefreshed(result)).await;
                }
                Err(e) => send(&tx, SessionEvent::ScanFinished(Err(e))).await,
            }
        });
    }

    /// Initial fetch of trends and articles. Both lists are applied or neither.
    pub fn load_dashboard(&mut self) {
        self.trends_loading = true;
        self.articles_loading = true;
        self.spawn_task(TASK_DASHBOARD, |client, tx| async move {
            let result = fetch_lists(&client).await;
            send(&tx, SessionEvent::DashboardLoaded(result)).await;
        });
    }

    /// Returns true once after an article analysis succeeds.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    // ------------------------------------------------------------------------
    // Event application
    // ------------------------------------------------------------------------

    /// Apply a completed task's outcome to the session state.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TextAnalyzed { seq, label, result } => {
                self.apply_text_result(seq, label, result);
            }
            SessionEvent::ArticleAnalyzed {
                seq,
                article_id,
                label,
                result,
            } => {
                self.apply_article_result(seq, article_id, label, result);
            }
            SessionEvent::TrendsLoaded(result) => {
                self.trends_loading = false;
                match result {
                    Ok(trends) => {
                        tracing::debug!(count = trends.len(), "Trends refreshed");
                        self.trends = trends;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Trend refresh failed, keeping previous list");
                    }
                }
            }
            SessionEvent::DashboardLoaded(result) => {
                self.trends_loading = false;
                self.articles_loading = false;
                match result {
                    Ok((trends, articles)) => {
                        tracing::info!(
                            trends = trends.len(),
                            articles = articles.len(),
                            "Dashboard loaded"
                        );
                        self.trends = trends;
                        self.articles = articles;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Initial dashboard load failed");
                    }
                }
            }
            SessionEvent::ScanFinished(result) => match result {
                Ok(status) => {
                    let message = if status.trim().is_empty() {
                        SCAN_COMPLETED.to_string()
                    } else {
                        status
                    };
                    tracing::info!(status = %message, "Scan finished");
                    self.scan_message = Some(message);
                    // The scan task goes on to reload both lists.
                    self.trends_loading = true;
                    self.articles_loading = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Scan failed");
                    self.scan_loading = false;
                    self.scan_message = Some(e.user_message());
                }
            },
            SessionEvent::ScanRefreshed(result) => {
                self.scan_loading = false;
                self.trends_loading = false;
                self.articles_loading = false;
                match result {
                    Ok((trends, articles)) => {
                        self.trends = trends;
                        self.articles = articles;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Refresh after scan failed");
                        self.scan_message = Some(e.user_message());
                    }
                }
            }
            SessionEvent::TaskPanicked { task, error } => {
                tracing::error!(task, error = %error, "Background task panicked");
                self.reset_after_panic(task);
            }
        }
    }

    fn apply_text_result(
        &mut self,
        seq: u64,
        label: String,
        result: Result<AnalysisResult, ApiError>,
    ) {
        if self.is_stale(seq) {
            tracing::debug!(seq, applied = self.applied_seq, "Dropping stale text analysis");
            // A newer response was applied, but the text flow still ends here.
            if seq == self.text_seq && self.phase == Phase::Loading {
                self.phase = if self.active_result.is_some() {
                    Phase::Succeeded
                } else {
                    Phase::Idle
                };
            }
            return;
        }
        self.applied_seq = self.applied_seq.max(seq);

        match result {
            Ok(analysis) => {
                tracing::info!(
                    seq,
                    status = %analysis.status,
                    claims = analysis.verification_results.len(),
                    "Text analysis succeeded"
                );
                self.phase = Phase::Succeeded;
                self.active_result = Some(analysis);
                self.active_source = Some(AnalysisSource::Text { label });
                if self.surface == Surface::Dashboard {
                    self.refresh_trends();
                }
            }
            Err(e) => {
                tracing::warn!(seq, status = ?e.status(), error = %e, "Text analysis failed");
                self.phase = Phase::Failed;
                self.last_error = Some(e.user_message());
            }
        }
    }

    fn apply_article_result(
        &mut self,
        seq: u64,
        article_id: i64,
        label: String,
        result: Result<AnalysisResult, ApiError>,
    ) {
        let clears_marker = match self.response_order {
            ResponseOrder::LastResolved => true,
            ResponseOrder::LatestIssued => seq == self.article_seq,
        };
        if clears_marker {
            self.analyzing_article_id = None;
        }

        if self.is_stale(seq) {
            tracing::debug!(seq, article_id, "Dropping stale article analysis");
            return;
        }
        self.applied_seq = self.applied_seq.max(seq);

        match result {
            Ok(analysis) => {
                tracing::info!(
                    seq,
                    article_id,
                    status = %analysis.status,
                    claims = analysis.verification_results.len(),
                    "Article analysis succeeded"
                );
                self.active_result = Some(analysis);
                self.active_source = Some(AnalysisSource::Article { label });
                self.focus_requested = true;
                if self.surface == Surface::Dashboard {
                    self.refresh_trends();
                }
            }
            Err(e) => {
                tracing::warn!(seq, article_id, status = ?e.status(), error = %e, "Article analysis failed");
                self.last_error = Some(e.user_message());
            }
        }
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.response_order == ResponseOrder::LatestIssued && seq < self.applied_seq
    }

    fn reset_after_panic(&mut self, task: &str) {
        match task {
            TASK_ANALYZE_TEXT => {
                if self.phase == Phase::Loading {
                    self.phase = Phase::Failed;
                    self.last_error = Some("Failed to analyze text".to_string());
                }
            }
            TASK_ANALYZE_ARTICLE => {
                self.analyzing_article_id = None;
                self.last_error = Some("Failed to analyze article".to_string());
            }
            TASK_TRENDS => self.trends_loading = false,
            TASK_DASHBOARD => {
                self.trends_loading = false;
                self.articles_loading = false;
            }
            TASK_SCAN => {
                self.scan_loading = false;
                self.trends_loading = false;
                self.articles_loading = false;
            }
            _ => {}
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.issued_seq += 1;
        self.issued_seq
    }

    /// Spawn `work` on the runtime with panic capture.
    fn spawn_task<F, Fut>(&self, task: &'static str, work: F)
    where
        F: FnOnce(ApiClient, mpsc::Sender<SessionEvent>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tx = self.event_tx.clone();
        let fut = work(self.client.clone(), tx.clone());
        tokio::spawn(async move {
            if let Err(error) = catch_task_panic(fut).await {
                send(&tx, SessionEvent::TaskPanicked { task, error }).await;
            }
        });
    }
}

async fn fetch_lists(client: &ApiClient) -> Result<(Vec<TrendCluster>, Vec<RawArticle>), ApiError> {
    tokio::try_join!(client.get_trends(), client.get_articles())
}

async fn send(tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(event = ?e.0, "Channel send failed (receiver dropped)");
    }
}

// ============================================================================
// Tests
// ============================================================================
