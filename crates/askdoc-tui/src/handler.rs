use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use futures_util::StreamExt;
use ratatui::layout::Rect;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use askdoc_core::wellness::{self, NEED_MORE_DATA};

use crate::app::{App, InputMode, JournalPhase, View};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::ChatDelta { reply_id, text } => app.on_chat_delta(&reply_id, &text),
        AppEvent::ChatFinished { reply_id, result } => app.on_chat_finished(&reply_id, result),
        AppEvent::JournalFeedback(result) => app.on_journal_feedback(result),
        AppEvent::Insights(result) => app.on_insights(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    app.status = None;

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.set_view(app.view.next());
            return;
        }
        KeyCode::BackTab => {
            app.set_view(app.view.prev());
            return;
        }
        KeyCode::Char('t') => {
            app.toggle_theme();
            return;
        }
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            app.set_view(View::all()[idx]);
            return;
        }
        _ => {}
    }

    match app.view {
        View::Companion => handle_companion_normal(app, key),
        View::Mood => handle_mood_normal(app, key),
        View::Journal => handle_journal_normal(app, key),
        View::Insights => handle_insights_normal(app, key),
        View::Resources => handle_resources_normal(app, key),
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    match app.view {
        View::Companion => {
            if key.code == KeyCode::Enter {
                send_chat(app);
            } else {
                app.chat.input.handle_key(key);
            }
        }
        View::Mood => {
            if key.code == KeyCode::Enter {
                app.input_mode = InputMode::Normal;
            } else {
                app.mood.note.handle_key(key);
            }
        }
        View::Journal => {
            let save = key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL);
            if save {
                submit_journal(app);
            } else {
                app.journal.content.handle_key(key);
            }
        }
        // Nothing editable on these views
        View::Insights | View::Resources => app.input_mode = InputMode::Normal,
    }
}

fn handle_companion_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            if app.chat.session.is_some() {
                app.input_mode = InputMode::Editing;
            } else {
                app.status = app.chat.config_error.clone();
            }
        }
        KeyCode::Char('r') => {
            if app.restore_failed_message() {
                send_chat(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = (app.chat.view_height / 2).max(1);
            app.scroll_chat_down(half);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = (app.chat.view_height / 2).max(1);
            app.scroll_chat_up(half);
        }
        KeyCode::Char('g') => {
            app.chat.scroll = 0;
            app.chat.follow = false;
        }
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_mood_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.mood_prev(),
        KeyCode::Char('l') | KeyCode::Right => app.mood_next(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Char('+') => app.intensity_up(),
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('-') => app.intensity_down(),
        KeyCode::Char('n') | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Enter | KeyCode::Char('s') => app.save_mood(),
        _ => {}
    }
}

fn handle_journal_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.new_journal_prompt(),
        KeyCode::Char('i') | KeyCode::Enter => {
            if app.journal.phase == JournalPhase::Writing {
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('s') => submit_journal(app),
        KeyCode::Char('w') => app.write_another_entry(),
        _ => {}
    }
}

fn handle_insights_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('g') | KeyCode::Enter | KeyCode::Char('r') => request_insights(app),
        _ => {}
    }
}

fn handle_resources_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.resources_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.resources_nav_up(),
        KeyCode::Enter | KeyCode::Char('o') => {
            if let Some(resource) = app.selected_resource() {
                match open_url(resource.url) {
                    Ok(()) => app.status = Some(format!("Opened {}", resource.url)),
                    Err(e) => {
                        warn!(url = resource.url, error = %e, "failed to open link");
                        app.status = Some(format!("Could not open {}", resource.url));
                    }
                }
            }
        }
        _ => {}
    }
}

/// Send the chat input and forward the streamed reply to the event loop.
fn send_chat(app: &mut App) {
    let Some((reply_id, mut stream)) = app.begin_chat_send() else {
        return;
    };
    app.input_mode = InputMode::Normal;

    let tx = app.events.clone();
    app.chat.task = Some(tokio::spawn(async move {
        let mut result = Ok(());
        while let Some(item) = stream.next().await {
            match item {
                Ok(text) => {
                    let delta = AppEvent::ChatDelta {
                        reply_id: reply_id.clone(),
                        text,
                    };
                    if tx.send(delta).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        let _ = tx.send(AppEvent::ChatFinished { reply_id, result });
    }));
}

/// Save the journal entry, then ask for a reflection in the background.
fn submit_journal(app: &mut App) {
    let Some(text) = app.submit_journal() else {
        return;
    };

    let tx = app.events.clone();
    app.tasks.push(tokio::spawn(async move {
        let result = wellness::generate_journal_feedback(&text).await;
        let _ = tx.send(AppEvent::JournalFeedback(result));
    }));
}

fn request_insights(app: &mut App) {
    if !app.begin_insights() {
        return;
    }
    if !app.has_wellness_data() {
        app.on_insights(Ok(NEED_MORE_DATA.to_string()));
        return;
    }

    let moods = app.history.moods().to_vec();
    let journals = app.history.journals().to_vec();
    debug!(moods = moods.len(), journals = journals.len(), "spawning insights request");

    let tx = app.events.clone();
    app.tasks.push(tokio::spawn(async move {
        let result = wellness::generate_insights(&moods, &journals).await;
        let _ = tx.send(AppEvent::Insights(result));
    }));
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match (app.view, mouse.kind) {
        (View::Companion, MouseEventKind::ScrollDown) if in_chat => app.scroll_chat_down(3),
        (View::Companion, MouseEventKind::ScrollUp) if in_chat => app.scroll_chat_up(3),
        (View::Resources, MouseEventKind::ScrollDown) => app.resources_nav_down(),
        (View::Resources, MouseEventKind::ScrollUp) => app.resources_nav_up(),
        _ => {}
    }
}

/// Open a URL with the platform's default handler.
fn open_url(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    command.arg(url);

    spawn_reaped(command).map(|_| ())
}

/// Spawn a detached helper process and wait on it in the background so it
/// doesn't linger as a zombie.
fn spawn_reaped(mut command: Command) -> std::io::Result<JoinHandle<std::io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(tokio::spawn(async move {
        let status = child.wait().await;
        if let Err(e) = &status {
            debug!(error = %e, "opener did not exit cleanly");
        }
        status
    }))
}
