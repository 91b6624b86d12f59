use crate::api::{RawArticle, TrendCluster};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::session::{AnalysisSession, Phase, Surface};
use std::borrow::Cow;
use tokio::time::Instant;

/// How long a status bar message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// Focus
// ============================================================================

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Analysis,
    Trends,
    Articles,
}

impl Focus {
    pub fn context(self) -> Context {
        match self {
            Focus::Input => Context::Input,
            Focus::Analysis => Context::Analysis,
            Focus::Trends => Context::Trends,
            Focus::Articles => Context::Articles,
        }
    }
}

const DASHBOARD_FOCUS: [Focus; 4] = [Focus::Input, Focus::Analysis, Focus::Trends, Focus::Articles];
const PANEL_FOCUS: [Focus; 2] = [Focus::Input, Focus::Analysis];

// ============================================================================
// App State
// ============================================================================

/// UI state layered over the analysis session.
///
/// The session owns everything the backend produces; `App` owns focus,
/// selection, the text being edited, scroll position and overlays.
pub struct App {
    pub session: AnalysisSession,
    pub keybindings: KeybindingRegistry,
    pub focus: Focus,
    /// Text box contents.
    pub input: String,
    pub selected_trend: usize,
    pub selected_article: usize,
    pub analysis_scroll: usize,
    /// Lines produced by the last analysis render.
    pub analysis_content_lines: usize,
    /// Height of the analysis pane at the last render.
    pub analysis_visible_lines: usize,
    pub show_raw_json: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(session: AnalysisSession, keybindings: KeybindingRegistry) -> Self {
        Self {
            session,
            keybindings,
            focus: Focus::Input,
            input: String::new(),
            selected_trend: 0,
            selected_article: 0,
            analysis_scroll: 0,
            analysis_content_lines: 0,
            analysis_visible_lines: 0,
            show_raw_json: false,
            show_help: false,
            help_scroll: 0,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    pub fn surface(&self) -> Surface {
        self.session.surface()
    }

    /// Keybinding context for the focused pane.
    pub fn context(&self) -> Context {
        self.focus.context()
    }

    fn focus_order(&self) -> &'static [Focus] {
        match self.surface() {
            Surface::Dashboard => &DASHBOARD_FOCUS,
            Surface::Panel => &PANEL_FOCUS,
        }
    }

    pub fn cycle_focus(&mut self) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(idx + 1) % order.len()];
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn selected_trend(&self) -> Option<&TrendCluster> {
        self.session.trends().get(self.selected_trend)
    }

    pub fn selected_article(&self) -> Option<&RawArticle> {
        self.session.articles().get(self.selected_article)
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Trends if self.selected_trend + 1 < self.session.trends().len() => {
                self.selected_trend += 1;
            }
            Focus::Articles if self.selected_article + 1 < self.session.articles().len() => {
                self.selected_article += 1;
            }
            _ => {}
        }
    }

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Trends => self.selected_trend = self.selected_trend.saturating_sub(1),
            Focus::Articles => self.selected_article = self.selected_article.saturating_sub(1),
            _ => {}
        }
    }

    /// Keep selections inside the lists after they are replaced.
    pub fn clamp_selections(&mut self) {
        self.selected_trend = self
            .selected_trend
            .min(self.session.trends().len().saturating_sub(1));
        self.selected_article = self
            .selected_article
            .min(self.session.articles().len().saturating_sub(1));
    }

    // ------------------------------------------------------------------------
    // Analysis pane scrolling
    // ------------------------------------------------------------------------

    fn max_scroll(&self) -> usize {
        self.analysis_content_lines
            .saturating_sub(self.analysis_visible_lines)
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.analysis_scroll = self
            .analysis_scroll
            .saturating_add(amount)
            .min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.analysis_scroll = self.analysis_scroll.saturating_sub(amount);
    }

    /// Lines moved by a page scroll: the visible height minus one line of overlap.
    pub fn page_size(&self) -> usize {
        self.analysis_visible_lines.saturating_sub(1).max(1)
    }

    // ------------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------------

    /// Submit the text box. Ignored while a text analysis is loading or the
    /// box is blank.
    pub fn submit_input(&mut self) -> bool {
        if self.session.phase() == Phase::Loading || self.input.trim().is_empty() {
            return false;
        }
        self.session.submit_text(&self.input, None);
        self.input = self.session.submitted_text().to_string();
        self.analysis_scroll = 0;
        true
    }

    /// Analyze the selected trend's topic, labelled with the topic.
    pub fn analyze_selected_trend(&mut self) -> bool {
        if self.session.phase() == Phase::Loading {
            return false;
        }
        let Some(topic) = self.selected_trend().map(|t| t.topic.clone()) else {
            return false;
        };
        self.input = topic.clone();
        self.session.submit_text(&topic, Some(&topic));
        self.analysis_scroll = 0;
        true
    }

    /// Analyze the selected article unless that same article is in flight.
    pub fn analyze_selected_article(&mut self) -> bool {
        let Some(article) = self.selected_article().cloned() else {
            return false;
        };
        if self.session.analyzing_article_id() == Some(article.id) {
            return false;
        }
        self.session.submit_article(&article);
        self.analysis_scroll = 0;
        true
    }

    /// Move focus to the analysis pane if the session asked for it.
    pub fn apply_focus_request(&mut self) {
        if self.session.take_focus_request() {
            self.focus = Focus::Analysis;
            self.analysis_scroll = 0;
        }
    }

    // ------------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
