use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use askdoc_core::content::{self, ResourceLink, CHAT_FAILURE_MESSAGE, CONNECTION_TROUBLE_MESSAGE};
use askdoc_core::config::API_KEY_VARS;
use askdoc_core::{
    AiError, ChatRole, ChatSession, DeltaStream, History, JournalEntry, Mood, MoodEntry, Theme,
    Transcript,
};
use askdoc_core::state::{MAX_INTENSITY, MIN_INTENSITY};

use crate::input::TextInput;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Companion,
    Mood,
    Journal,
    Insights,
    Resources,
}

impl View {
    pub fn all() -> [View; 5] {
        [
            View::Companion,
            View::Mood,
            View::Journal,
            View::Insights,
            View::Resources,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Companion => "Companion",
            View::Mood => "Mood",
            View::Journal => "Journal",
            View::Insights => "Insights",
            View::Resources => "Resources",
        }
    }

    fn index(&self) -> usize {
        View::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(self) -> View {
        let all = View::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(self) -> View {
        let all = View::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Remediation shown whenever the API key is missing or rejected
pub fn credential_help() -> String {
    format!(
        "Configuration Error: API key is missing or invalid. Set one of {} (or \"api_key\" in the config file) and restart.",
        API_KEY_VARS[..3].join(", ")
    )
}

pub struct ChatState {
    pub transcript: Transcript,
    pub input: TextInput,
    pub session: Option<ChatSession>,
    pub typing: bool,
    pub reply_id: Option<String>,
    /// Last message whose reply failed, resent by the retry key
    pub failed_message: Option<String>,
    pub config_error: Option<String>,
    pub scroll: u16,
    pub follow: bool,
    pub view_height: u16,
    pub view_width: u16,
    pub task: Option<JoinHandle<()>>,
}

pub struct MoodForm {
    pub selected: usize,
    pub intensity: u8,
    pub note: TextInput,
}

impl Default for MoodForm {
    fn default() -> Self {
        Self {
            selected: 0,
            intensity: 5,
            note: TextInput::new(),
        }
    }
}

impl MoodForm {
    pub fn mood(&self) -> Mood {
        Mood::all()[self.selected.min(Mood::all().len() - 1)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalPhase {
    Writing,
    Reflecting,
    Reflected(String),
    ConfigError(String),
}

pub struct JournalState {
    pub prompt: &'static str,
    pub content: TextInput,
    pub phase: JournalPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightsState {
    Idle,
    Loading,
    Ready(String),
    Failed(String),
    ConfigError(String),
}

pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub input_mode: InputMode,
    pub theme: Theme,

    pub history: History,
    pub chat: ChatState,
    pub mood: MoodForm,
    pub journal: JournalState,
    pub insights: InsightsState,
    pub resources_state: ListState,
    pub resources: Vec<&'static ResourceLink>,

    /// One-line notice shown in the footer until the next key press
    pub status: Option<String>,
    pub animation_frame: u8,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    pub events: UnboundedSender<AppEvent>,
    pub tasks: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(
        history: History,
        theme: Theme,
        events: UnboundedSender<AppEvent>,
        session: Result<ChatSession, AiError>,
    ) -> Self {
        let mut transcript = Transcript::with_greeting(content::WELCOME_MESSAGE);
        let (session, config_error) = match session {
            Ok(session) => (Some(session), None),
            Err(e) => {
                warn!(error = %e, "chat session unavailable");
                transcript.push(ChatRole::Assistant, CONNECTION_TROUBLE_MESSAGE);
                let detail = if e.is_credential_error() {
                    credential_help()
                } else {
                    e.to_string()
                };
                (None, Some(detail))
            }
        };

        let mut resources_state = ListState::default();
        resources_state.select(Some(0));

        Self {
            should_quit: false,
            view: View::Companion,
            input_mode: InputMode::Normal,
            theme,

            history,
            chat: ChatState {
                transcript,
                input: TextInput::new(),
                session,
                typing: false,
                reply_id: None,
                failed_message: None,
                config_error,
                scroll: 0,
                follow: true,
                view_height: 0,
                view_width: 0,
                task: None,
            },
            mood: MoodForm::default(),
            journal: JournalState {
                prompt: content::JOURNAL_PROMPTS[0],
                content: TextInput::multiline(),
                phase: JournalPhase::Writing,
            },
            insights: InsightsState::Idle,
            resources_state,
            resources: content::resources_by_category(),

            status: None,
            animation_frame: 0,
            chat_area: None,

            events,
            tasks: Vec::new(),
        }
    }

    // View switching
    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.input_mode = InputMode::Normal;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.history.store().save_theme(self.theme) {
            warn!(error = %e, "failed to persist theme");
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.typing || self.insights == InsightsState::Loading
            || self.journal.phase == JournalPhase::Reflecting
        {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.tasks.retain(|task| !task.is_finished());
    }

    /// Abort anything still talking to the network (called on quit)
    pub fn abort_tasks(&mut self) {
        if let Some(task) = self.chat.task.take() {
            task.abort();
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    // Companion chat

    /// Whether the send action is available right now.
    pub fn can_send(&self) -> bool {
        self.chat.session.is_some() && !self.chat.typing && !self.chat.input.is_blank()
    }

    /// Move the typed message into the transcript and open the reply stream.
    ///
    /// Returns the reply id and the stream for the caller to drive.
    pub fn begin_chat_send(&mut self) -> Option<(String, DeltaStream)> {
        if !self.can_send() {
            return None;
        }
        let text = self.chat.input.take().trim().to_string();
        let session = self.chat.session.as_mut()?;

        self.chat.transcript.push(ChatRole::User, &text);
        let stream = session.send_message_stream(&text);
        let reply_id = self.chat.transcript.begin_reply();

        self.chat.typing = true;
        self.chat.reply_id = Some(reply_id.clone());
        self.chat.failed_message = None;
        self.chat.follow = true;
        self.scroll_chat_to_bottom();
        Some((reply_id, stream))
    }

    /// Put the last failed message back in the input so it can be resent.
    pub fn restore_failed_message(&mut self) -> bool {
        match self.chat.failed_message.take() {
            Some(text) if !self.chat.typing => {
                self.chat.input.set(&text);
                true
            }
            Some(text) => {
                self.chat.failed_message = Some(text);
                false
            }
            None => false,
        }
    }

    pub fn on_chat_delta(&mut self, reply_id: &str, text: &str) {
        if self.chat.transcript.append_delta(reply_id, text) && self.chat.follow {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn on_chat_finished(&mut self, reply_id: &str, result: Result<(), AiError>) {
        if self.chat.reply_id.as_deref() != Some(reply_id) {
            return;
        }
        self.chat.typing = false;
        self.chat.reply_id = None;
        self.chat.task = None;

        let reply = self
            .chat
            .transcript
            .text_of(reply_id)
            .unwrap_or_default()
            .to_string();
        // A clean finish with nothing streamed still leaves the user without an answer
        let result = match result {
            Ok(()) if reply.trim().is_empty() => Err(AiError::EmptyResponse),
            other => other,
        };

        match result {
            Ok(()) => {
                if let Some(session) = self.chat.session.as_mut() {
                    session.commit_reply(&reply);
                }
            }
            Err(e) => {
                warn!(error = %e, "chat reply failed");
                let failed = self
                    .chat
                    .session
                    .as_mut()
                    .and_then(|session| session.abandon_turn());
                self.chat.transcript.discard_if_empty(reply_id);
                if e.is_credential_error() {
                    self.chat
                        .transcript
                        .push(ChatRole::Assistant, CONNECTION_TROUBLE_MESSAGE);
                    self.chat.config_error = Some(credential_help());
                } else {
                    self.chat.transcript.push(ChatRole::Assistant, CHAT_FAILURE_MESSAGE);
                }
                self.chat.failed_message = failed;
            }
        }
        if self.chat.follow {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat.scroll = self.chat.scroll.saturating_sub(lines);
        self.chat.follow = false;
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.chat_max_scroll();
        self.chat.scroll = self.chat.scroll.saturating_add(lines).min(max);
        self.chat.follow = self.chat.scroll >= max;
    }

    fn chat_max_scroll(&self) -> u16 {
        let visible_height = if self.chat.view_height > 0 {
            self.chat.view_height
        } else {
            20
        };
        self.chat_total_lines().saturating_sub(visible_height)
    }

    /// Approximate wrapped height of the transcript, plus the typing indicator.
    fn chat_total_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat.view_width > 0 {
            self.chat.view_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.chat.transcript.messages() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in msg.text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count / wrap_width + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }
        if self.chat.typing {
            total_lines = total_lines.saturating_add(2);
        }
        total_lines
    }

    /// Scroll chat to bottom so the newest text is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat.scroll = self.chat_max_scroll();
        self.chat.follow = true;
    }

    // Mood tracker

    pub fn mood_prev(&mut self) {
        self.mood.selected = self.mood.selected.saturating_sub(1);
    }

    pub fn mood_next(&mut self) {
        self.mood.selected = (self.mood.selected + 1).min(Mood::all().len() - 1);
    }

    pub fn intensity_up(&mut self) {
        self.mood.intensity = (self.mood.intensity + 1).min(MAX_INTENSITY);
    }

    pub fn intensity_down(&mut self) {
        self.mood.intensity = self.mood.intensity.saturating_sub(1).max(MIN_INTENSITY);
    }

    /// Log the mood currently selected in the form.
    pub fn save_mood(&mut self) {
        let entry = MoodEntry::new(
            self.mood.mood().as_str(),
            self.mood.intensity,
            self.mood.note.value(),
        );
        info!(mood = %entry.mood, intensity = entry.intensity, "saving mood");

        match self.history.add_mood(entry) {
            Ok(()) => self.status = Some("Mood logged.".to_string()),
            Err(e) => {
                warn!(error = %e, "failed to persist moods");
                self.status = Some(format!("Mood kept for this session, but saving failed: {}", e));
            }
        }
        self.mood.note.clear();
        self.mood.intensity = 5;
    }

    // Journal

    pub fn new_journal_prompt(&mut self) {
        if self.journal.phase == JournalPhase::Writing {
            self.journal.prompt = content::random_prompt();
        }
    }

    /// Save the entry and return its text so feedback can be requested.
    ///
    /// The entry is persisted before any model call is made.
    pub fn submit_journal(&mut self) -> Option<String> {
        if self.journal.phase != JournalPhase::Writing || self.journal.content.is_blank() {
            return None;
        }
        let text = self.journal.content.value().to_string();
        let entry = JournalEntry::new(self.journal.prompt, &text);
        info!(chars = text.len(), "saving journal entry");

        if let Err(e) = self.history.add_journal(entry) {
            warn!(error = %e, "failed to persist journals");
            self.status = Some(format!("Entry kept for this session, but saving failed: {}", e));
        }
        self.journal.phase = JournalPhase::Reflecting;
        self.input_mode = InputMode::Normal;
        Some(text)
    }

    pub fn on_journal_feedback(&mut self, result: Result<String, AiError>) {
        if self.journal.phase != JournalPhase::Reflecting {
            return;
        }
        self.journal.phase = match result {
            Ok(feedback) => JournalPhase::Reflected(feedback),
            Err(e) => {
                warn!(error = %e, "journal feedback unavailable");
                JournalPhase::ConfigError(credential_help())
            }
        };
    }

    /// Clear the editor and start over with a fresh prompt.
    pub fn write_another_entry(&mut self) {
        if matches!(
            self.journal.phase,
            JournalPhase::Reflected(_) | JournalPhase::ConfigError(_)
        ) {
            self.journal.content.clear();
            self.journal.phase = JournalPhase::Writing;
            self.new_journal_prompt();
        }
    }

    // Insights

    pub fn has_wellness_data(&self) -> bool {
        !self.history.is_empty()
    }

    /// Enter the loading state. Returns false while a request is already running.
    pub fn begin_insights(&mut self) -> bool {
        if self.insights == InsightsState::Loading {
            return false;
        }
        self.insights = InsightsState::Loading;
        true
    }

    pub fn on_insights(&mut self, result: Result<String, AiError>) {
        self.insights = match result {
            Ok(text) => InsightsState::Ready(text),
            Err(e) if e.is_credential_error() => InsightsState::ConfigError(credential_help()),
            Err(e) => {
                warn!(error = %e, "insights failed");
                InsightsState::Failed(
                    "I'm having trouble analyzing your data right now. Please try again later."
                        .to_string(),
                )
            }
        };
    }

    // Resources

    pub fn resources_nav_down(&mut self) {
        let len = self.resources.len();
        if len > 0 {
            let i = self.resources_state.selected().unwrap_or(0);
            self.resources_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn resources_nav_up(&mut self) {
        let i = self.resources_state.selected().unwrap_or(0);
        self.resources_state.select(Some(i.saturating_sub(1)));
    }

    pub fn selected_resource(&self) -> Option<&'static ResourceLink> {
        self.resources_state
            .selected()
            .and_then(|i| self.resources.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdoc_core::ai::SessionOptions;
    use askdoc_core::storage::MOODS_KEY;
    use askdoc_core::{GeminiClient, LocalStore};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn session() -> ChatSession {
        let client = GeminiClient::new("test-key").with_base_url("http://127.0.0.1:9");
        ChatSession::new(client, SessionOptions::new("sys", 0.7, 500))
    }

    fn app_with(session: Result<ChatSession, AiError>) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let history = History::load(LocalStore::open(dir.path()).unwrap());
        let (tx, _rx) = mpsc::unbounded_channel();
        (dir, App::new(history, Theme::Dark, tx, session))
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Companion.next(), View::Mood);
        assert_eq!(View::Resources.next(), View::Companion);
        assert_eq!(View::Companion.prev(), View::Resources);
    }

    #[test]
    fn test_missing_credential_shows_configuration_message() {
        let (_dir, app) = app_with(Err(AiError::MissingCredential));
        let texts: Vec<&str> = app
            .chat
            .transcript
            .messages()
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec![content::WELCOME_MESSAGE, CONNECTION_TROUBLE_MESSAGE]);
        assert!(app.chat.config_error.as_deref().unwrap().starts_with("Configuration Error"));
        assert!(!app.can_send());
    }

    #[test]
    fn test_streamed_reply_is_committed() {
        let (_dir, mut app) = app_with(Ok(session()));
        app.chat.input.set("I feel anxious");
        let (reply_id, _stream) = app.begin_chat_send().unwrap();
        assert!(app.chat.typing);
        assert!(!app.can_send());

        for delta in ["Hel", "lo", " there"] {
            app.on_chat_delta(&reply_id, delta);
        }
        app.on_chat_finished(&reply_id, Ok(()));

        let last = app.chat.transcript.last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, "Hello there");
        assert!(!app.chat.typing);
        assert_eq!(app.chat.session.as_ref().unwrap().turns(), 1);
    }

    #[test]
    fn test_failed_reply_offers_retry() {
        let (_dir, mut app) = app_with(Ok(session()));
        app.chat.input.set("hello");
        let (reply_id, _stream) = app.begin_chat_send().unwrap();

        app.on_chat_finished(&reply_id, Err(AiError::EmptyResponse));

        let last = app.chat.transcript.last().unwrap();
        assert_eq!(last.text, CHAT_FAILURE_MESSAGE);
        assert_eq!(app.chat.session.as_ref().unwrap().turns(), 0);
        assert!(app.chat.config_error.is_none());

        assert!(app.restore_failed_message());
        assert_eq!(app.chat.input.value(), "hello");
        assert!(app.can_send());
    }

    #[test]
    fn test_empty_reply_offers_retry() {
        let (_dir, mut app) = app_with(Ok(session()));
        app.chat.input.set("hello");
        let (reply_id, _stream) = app.begin_chat_send().unwrap();

        app.on_chat_finished(&reply_id, Ok(()));

        assert_eq!(app.chat.transcript.last().unwrap().text, CHAT_FAILURE_MESSAGE);
        assert_eq!(app.chat.transcript.text_of(&reply_id), None);
        assert_eq!(app.chat.failed_message.as_deref(), Some("hello"));
        assert_eq!(app.chat.session.as_ref().unwrap().turns(), 0);
        assert!(!app.chat.typing);
    }

    #[test]
    fn test_rejected_key_during_chat_is_a_configuration_error() {
        let (_dir, mut app) = app_with(Ok(session()));
        app.chat.input.set("hello");
        let (reply_id, _stream) = app.begin_chat_send().unwrap();

        app.on_chat_finished(&reply_id, Err(AiError::from_status(403, "denied".into())));

        assert_eq!(app.chat.transcript.last().unwrap().text, CONNECTION_TROUBLE_MESSAGE);
        assert!(app.chat.config_error.is_some());
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let (_dir, mut app) = app_with(Ok(session()));
        app.chat.input.set("   ");
        assert!(app.begin_chat_send().is_none());
        assert_eq!(app.chat.transcript.len(), 1);
    }

    #[test]
    fn test_save_mood_prepends_and_resets_form() {
        let (dir, mut app) = app_with(Err(AiError::MissingCredential));
        app.mood_next(); // Calm
        app.intensity_up();
        app.mood.note.set("after a walk");
        app.save_mood();

        app.mood_prev(); // Happy
        app.save_mood();

        let moods = app.history.moods();
        assert_eq!(moods.len(), 2);
        assert_eq!(moods[0].mood, "Happy");
        assert_eq!(moods[1].mood, "Calm");
        assert_eq!(moods[1].intensity, 6);
        assert_eq!(moods[1].note, "after a walk");
        assert!(app.mood.note.value().is_empty());

        let stored: Vec<MoodEntry> = LocalStore::open(dir.path()).unwrap().load(MOODS_KEY);
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_intensity_stays_in_range() {
        let (_dir, mut app) = app_with(Err(AiError::MissingCredential));
        for _ in 0..20 {
            app.intensity_up();
        }
        assert_eq!(app.mood.intensity, 10);
        for _ in 0..20 {
            app.intensity_down();
        }
        assert_eq!(app.mood.intensity, 1);
    }

    #[test]
    fn test_journal_is_saved_before_feedback() {
        let (_dir, mut app) = app_with(Err(AiError::MissingCredential));
        assert!(app.submit_journal().is_none());

        app.journal.content.set("Grateful for coffee.");
        let text = app.submit_journal().unwrap();
        assert_eq!(text, "Grateful for coffee.");
        assert_eq!(app.history.journals().len(), 1);
        assert_eq!(app.history.journals()[0].prompt, content::JOURNAL_PROMPTS[0]);
        assert_eq!(app.journal.phase, JournalPhase::Reflecting);

        // Credential failure is shown as configuration guidance, entry stays saved
        app.on_journal_feedback(Err(AiError::MissingCredential));
        assert!(matches!(app.journal.phase, JournalPhase::ConfigError(_)));
        assert_eq!(app.history.journals().len(), 1);

        app.write_another_entry();
        assert_eq!(app.journal.phase, JournalPhase::Writing);
        assert!(app.journal.content.value().is_empty());
    }

    #[test]
    fn test_insights_states() {
        let (_dir, mut app) = app_with(Err(AiError::MissingCredential));
        assert!(!app.has_wellness_data());

        assert!(app.begin_insights());
        assert!(!app.begin_insights());

        app.on_insights(Err(AiError::MissingCredential));
        assert!(matches!(app.insights, InsightsState::ConfigError(_)));

        app.on_insights(Err(AiError::EmptyResponse));
        assert!(matches!(app.insights, InsightsState::Failed(_)));

        app.on_insights(Ok("report".into()));
        assert_eq!(app.insights, InsightsState::Ready("report".into()));
    }

    #[test]
    fn test_theme_toggle_is_persisted() {
        let (dir, mut app) = app_with(Err(AiError::MissingCredential));
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.load_theme(), Some(Theme::Light));
    }

    #[test]
    fn test_resource_navigation_is_clamped() {
        let (_dir, mut app) = app_with(Err(AiError::MissingCredential));
        app.resources_nav_up();
        assert_eq!(app.resources_state.selected(), Some(0));
        for _ in 0..50 {
            app.resources_nav_down();
        }
        assert_eq!(app.resources_state.selected(), Some(app.resources.len() - 1));
        assert!(app.selected_resource().is_some());
    }
}
