//! Keybinding registry: maps key events to actions with config overrides.
//!
//! Bindings are looked up per focus context, falling back to `Global`. The
//! `Input` context is exclusive so that typed characters reach the text box
//! instead of triggering global shortcuts.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    CycleFocus,
    Back,
    Select,
    EditInput,
    RefreshTrends,
    TriggerScan,
    ToggleRawJson,
    OpenInBrowser,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ShowHelp,
}

/// Config name, extra aliases and help text for every action.
const ACTIONS: &[(Action, &str, &[&str], &str)] = &[
    (Action::Quit, "quit", &[], "Quit application"),
    (Action::NavDown, "nav_down", &["down"], "Navigate down"),
    (Action::NavUp, "nav_up", &["up"], "Navigate up"),
    (Action::CycleFocus, "cycle_focus", &["tab"], "Cycle panel focus"),
    (Action::Back, "back", &[], "Go back / dismiss"),
    (Action::Select, "select", &["enter", "submit"], "Submit / analyze selection"),
    (Action::EditInput, "edit_input", &["edit"], "Edit the analysis text"),
    (Action::RefreshTrends, "refresh_trends", &["refresh"], "Refresh trending narratives"),
    (Action::TriggerScan, "trigger_scan", &["scan"], "Trigger a backend scan"),
    (Action::ToggleRawJson, "toggle_raw_json", &["raw", "debug"], "Toggle raw JSON view"),
    (Action::OpenInBrowser, "open_in_browser", &["open"], "Open article in browser"),
    (Action::ScrollDown, "scroll_down", &[], "Scroll down one line"),
    (Action::ScrollUp, "scroll_up", &[], "Scroll up one line"),
    (Action::PageDown, "page_down", &[], "Page down"),
    (Action::PageUp, "page_up", &[], "Page up"),
    (Action::ShowHelp, "show_help", &["help"], "Show help"),
];

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        ACTIONS
            .iter()
            .find(|(a, ..)| *a == self)
            .map(|(.., desc)| *desc)
            .unwrap_or("")
    }
}

/// Parse an action name from config. Case-insensitive; `-` and `_` are interchangeable.
fn parse_action_name(name: &str) -> Option<Action> {
    let name = name.trim().to_lowercase().replace('-', "_");
    ACTIONS
        .iter()
        .find(|(_, canonical, aliases, _)| *canonical == name || aliases.contains(&name.as_str()))
        .map(|(action, ..)| *action)
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context, determined by which pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Input,
    Trends,
    Articles,
    Analysis,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace", "Space"
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(|c: char| c.eq_ignore_ascii_case(&'f'))
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Format a KeySpec for the help overlay and status bar hints.
pub fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help overlay
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    /// Create a registry with the default bindings.
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Context::*;

        let defaults = [
            (Global, KeySpec::ch('q'), Action::Quit),
            (Global, KeySpec::ctrl('c'), Action::Quit),
            (Global, KeySpec::ch('j'), Action::NavDown),
            (Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
            (Global, KeySpec::ch('k'), Action::NavUp),
            (Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
            (Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
            (Global, KeySpec::plain(KeyCode::Esc), Action::Back),
            (Global, KeySpec::plain(KeyCode::Enter), Action::Select),
            (Global, KeySpec::ch('i'), Action::EditInput),
            (Global, KeySpec::ch('r'), Action::RefreshTrends),
            (Global, KeySpec::ch('s'), Action::TriggerScan),
            (Global, KeySpec::ch('d'), Action::ToggleRawJson),
            (Global, KeySpec::ch('?'), Action::ShowHelp),
            (Articles, KeySpec::ch('o'), Action::OpenInBrowser),
            // Analysis pane scrolls instead of navigating lists
            (Analysis, KeySpec::ch('j'), Action::ScrollDown),
            (Analysis, KeySpec::plain(KeyCode::Down), Action::ScrollDown),
            (Analysis, KeySpec::ch('k'), Action::ScrollUp),
            (Analysis, KeySpec::plain(KeyCode::Up), Action::ScrollUp),
            (Analysis, KeySpec::ctrl('d'), Action::PageDown),
            (Analysis, KeySpec::plain(KeyCode::PageDown), Action::PageDown),
            (Analysis, KeySpec::ctrl('u'), Action::PageUp),
            (Analysis, KeySpec::plain(KeyCode::PageUp), Action::PageUp),
            // Text entry: everything unbound is typed
            (Input, KeySpec::plain(KeyCode::Enter), Action::Select),
            (Input, KeySpec::plain(KeyCode::Esc), Action::Back),
            (Input, KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
            (Input, KeySpec::ctrl('c'), Action::Quit),
        ];

        for (context, key, action) in defaults {
            self.bind(context, key, action);
        }
    }

    /// Apply user overrides from the config `keybindings` table.
    ///
    /// Keys in the map are action names (e.g., "quit", "trigger_scan").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). The new key
    /// replaces every existing binding of the action, in the same contexts.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global, except in
    /// `Input` where unbound keys are left for text entry.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        match context {
            Context::Global | Context::Input => None,
            _ => self.lookup.get(&(Context::Global, key)).copied(),
        }
    }

    /// First key bound to `action` in `context`, else in Global (same
    /// fallback rules as `action_for_key`), formatted for display.
    pub fn key_hint(&self, action: Action, context: Context) -> Option<String> {
        let first_in = |ctx: Context| {
            self.bindings
                .iter()
                .find(|(c, _, a)| *a == action && *c == ctx)
                .map(|(_, key, _)| format_key(key))
        };
        first_in(context).or_else(|| match context {
            Context::Input => None,
            _ => first_in(Context::Global),
        })
    }

    /// Get all bindings for the help overlay.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
