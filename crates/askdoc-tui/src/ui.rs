use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use askdoc_core::content::{DISCLAIMER, INSIGHTS_DISCLAIMER};
use askdoc_core::state::format_date;
use askdoc_core::{ChatRole, Mood, Theme};

use crate::app::{App, InputMode, InsightsState, JournalPhase, View};

/// Colors for one theme
struct Palette {
    accent: Color,
    user: Color,
    assistant: Color,
    text: Color,
    muted: Color,
    bar_bg: Color,
    highlight_fg: Color,
    error: Color,
    ok: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            accent: Color::Cyan,
            user: Color::Cyan,
            assistant: Color::Yellow,
            text: Color::White,
            muted: Color::DarkGray,
            bar_bg: Color::Black,
            highlight_fg: Color::Black,
            error: Color::LightRed,
            ok: Color::LightGreen,
        },
        Theme::Light => Palette {
            accent: Color::Blue,
            user: Color::Blue,
            assistant: Color::Magenta,
            text: Color::Black,
            muted: Color::Gray,
            bar_bg: Color::White,
            highlight_fg: Color::White,
            error: Color::Red,
            ok: Color::Green,
        },
    }
}

fn mood_color(mood: Mood) -> Color {
    match mood {
        Mood::Happy => Color::Yellow,
        Mood::Calm => Color::Green,
        Mood::Neutral => Color::Gray,
        Mood::Sad => Color::Blue,
        Mood::Anxious => Color::Magenta,
        Mood::Angry => Color::Red,
    }
}

/// Ensure the selected item in a list is visible by adjusting the ListState offset.
fn ensure_selected_visible(state: &mut ListState, visible_height: usize) {
    let visible_height = visible_height.max(1);

    if let Some(selected) = state.selected() {
        let min_offset = selected.saturating_sub(visible_height - 1);
        let max_offset = selected;

        let new_offset = state.offset().clamp(min_offset, max_offset);
        if new_offset != state.offset() {
            *state.offset_mut() = new_offset;
        }
    }
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// "." / ".." / "..." driven by the tick animation
fn dots(app: &App) -> String {
    ".".repeat(app.animation_frame as usize + 1)
}

/// First line of `text`, cut to `max` characters.
fn preview(text: &str, max: usize) -> String {
    let first = text.lines().next().unwrap_or_default();
    if first.chars().count() > max || text.lines().nth(1).is_some() {
        let cut: String = first.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    } else {
        first.to_string()
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.view {
        View::Companion => render_companion(app, frame, body_area),
        View::Mood => render_mood(app, frame, body_area),
        View::Journal => render_journal(app, frame, body_area),
        View::Insights => render_insights(app, frame, body_area),
        View::Resources => render_resources(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let p = palette(app.theme);

    let mut spans = vec![
        Span::styled(" Ask Doc ", Style::default().fg(p.accent).bold()),
        Span::raw(" "),
    ];
    for (i, view) in View::all().iter().enumerate() {
        let label = format!(" {} {} ", i + 1, view.title());
        if *view == app.view {
            spans.push(Span::styled(
                label,
                Style::default().bg(p.accent).fg(p.highlight_fg).bold(),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(p.text)));
        }
    }
    let theme_label = match app.theme {
        Theme::Dark => " ☾ dark ",
        Theme::Light => " ☀ light ",
    };
    spans.push(Span::styled(theme_label, Style::default().fg(p.muted)));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(p.bar_bg));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let p = palette(app.theme);
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(p.bar_bg).fg(p.text);
    let hint = |key: &str, label: &str| -> Vec<Span<'static>> {
        vec![
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    if let Some(status) = &app.status {
        hints.push(Span::styled(format!(" {} ", status), label_style.fg(p.accent)));
    } else {
        let pairs: Vec<(&str, &str)> = match (app.view, app.input_mode) {
            (View::Companion, InputMode::Editing) => vec![("Enter", "send"), ("Esc", "stop typing")],
            (View::Companion, InputMode::Normal) => {
                let mut pairs = vec![("i", "type"), ("j/k", "scroll")];
                if app.chat.failed_message.is_some() {
                    pairs.push(("r", "retry"));
                }
                pairs
            }
            (View::Mood, InputMode::Editing) => vec![("Enter", "done"), ("Esc", "done")],
            (View::Mood, InputMode::Normal) => vec![
                ("h/l", "mood"),
                ("j/k", "intensity"),
                ("n", "note"),
                ("Enter", "save"),
            ],
            (View::Journal, InputMode::Editing) => vec![("Ctrl+S", "save & reflect"), ("Esc", "stop typing")],
            (View::Journal, InputMode::Normal) => match app.journal.phase {
                JournalPhase::Writing => vec![("i", "write"), ("r", "new prompt"), ("s", "save & reflect")],
                JournalPhase::Reflecting => vec![],
                _ => vec![("w", "write another")],
            },
            (View::Insights, _) => match app.insights {
                InsightsState::Loading => vec![],
                InsightsState::Idle => vec![("g", "generate")],
                InsightsState::Ready(_) => vec![("r", "refresh")],
                _ => vec![("r", "retry")],
            },
            (View::Resources, _) => vec![("j/k", "nav"), ("Enter", "open")],
        };
        for (key, label) in pairs {
            hints.extend(hint(key, label));
        }
        if app.input_mode == InputMode::Normal {
            hints.extend(hint("Tab", "view"));
            hints.extend(hint("t", "theme"));
            hints.extend(hint("q", "quit"));
        }
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(p.bar_bg));
    frame.render_widget(footer, area);
}

fn render_companion(app: &mut App, frame: &mut Frame, area: Rect) {
    let p = palette(app.theme);

    let [chat_area, input_area, disclaimer_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    // Store area for mouse hit-testing and the inner size for scroll calculations
    app.chat_area = Some(chat_area);
    app.chat.view_height = chat_area.height.saturating_sub(2);
    app.chat.view_width = chat_area.width.saturating_sub(2);
    if app.chat.follow {
        app.scroll_chat_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted))
        .title(" Companion ");

    let mut lines: Vec<Line> = Vec::new();
    let reply_id = app.chat.reply_id.as_deref();
    for msg in app.chat.transcript.messages() {
        // The open reply is drawn as the typing indicator until text arrives
        if msg.text.is_empty() && Some(msg.id.as_str()) == reply_id {
            continue;
        }
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(p.user).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Ask Doc:",
                    Style::default().fg(p.assistant).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    let waiting_for_first_delta = app.chat.typing
        && reply_id
            .and_then(|id| app.chat.transcript.text_of(id))
            .map(str::is_empty)
            .unwrap_or(true);
    if waiting_for_first_delta {
        lines.push(Line::from(Span::styled(
            "Ask Doc:",
            Style::default().fg(p.assistant).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("typing{}", dots(app)),
            Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    if let Some(err) = &app.chat.config_error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(p.error))));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat.scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_title = if app.chat.session.is_none() {
        " Chat unavailable "
    } else if app.chat.typing {
        " Ask Doc is replying... "
    } else {
        " Message (i to type, Enter to send) "
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { p.muted }))
        .title(input_title);

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = app.chat.input.visible_window(inner_width);
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(p.user))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((input_area.x + cursor_x as u16 + 1, input_area.y + 1));
    }

    let disclaimer = Paragraph::new(Span::styled(
        DISCLAIMER,
        Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
    ));
    frame.render_widget(disclaimer, disclaimer_area);
}

fn intensity_bar(intensity: u8, color: Color, muted: Color) -> Line<'static> {
    let filled = intensity as usize;
    Line::from(vec![
        Span::styled("█".repeat(filled * 2), Style::default().fg(color)),
        Span::styled("░".repeat((10 - filled.min(10)) * 2), Style::default().fg(muted)),
        Span::raw(format!("  {}/10", intensity)),
    ])
}

fn render_mood(app: &mut App, frame: &mut Frame, area: Rect) {
    let p = palette(app.theme);
    let editing = app.input_mode == InputMode::Editing;

    let [form_area, history_area] = Layout::vertical([
        Constraint::Length(11),
        Constraint::Min(0),
    ])
    .areas(area);

    let form_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .title(" How are you feeling? ");
    let inner = form_block.inner(form_area);
    frame.render_widget(form_block, form_area);

    let [moods_area, _, intensity_area, _, note_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(inner);

    let selected = app.mood.mood();
    let mut mood_spans = Vec::new();
    for mood in Mood::all() {
        let label = format!(" {} {} ", mood.emoji(), mood.as_str());
        if mood == selected {
            mood_spans.push(Span::styled(
                label,
                Style::default().bg(mood_color(mood)).fg(Color::Black).bold(),
            ));
        } else {
            mood_spans.push(Span::styled(label, Style::default().fg(mood_color(mood))));
        }
        mood_spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(mood_spans)), moods_area);

    let intensity = Paragraph::new(vec![
        Line::from(Span::styled("Intensity", Style::default().fg(p.muted))),
        intensity_bar(app.mood.intensity, mood_color(selected), p.muted),
    ]);
    frame.render_widget(intensity, intensity_area);

    let note_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { p.muted }))
        .title(" Note (optional, n to edit) ");
    let note_width = note_area.width.saturating_sub(2) as usize;
    let (note_text, cursor_x) = app.mood.note.visible_window(note_width);
    frame.render_widget(
        Paragraph::new(note_text).style(Style::default().fg(p.text)).block(note_block),
        note_area,
    );
    if editing {
        frame.set_cursor_position((note_area.x + cursor_x as u16 + 1, note_area.y + 1));
    }

    let history_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted))
        .title(format!(" Recent moods ({}) ", app.history.moods().len()));

    if app.history.moods().is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No moods logged yet.",
            Style::default().fg(p.muted),
        ))
        .block(history_block);
        frame.render_widget(empty, history_area);
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .moods()
        .iter()
        .map(|entry| {
            let color = Mood::from_label(&entry.mood).map(mood_color).unwrap_or(p.text);
            let mut spans = vec![
                Span::raw(format!("{} ", entry.emoji())),
                Span::styled(entry.mood.clone(), Style::default().fg(color).bold()),
                Span::styled(format!("  {}/10", entry.intensity), Style::default().fg(p.accent)),
                Span::styled(format!("  {}", format_date(entry.timestamp)), Style::default().fg(p.muted)),
            ];
            if !entry.note.is_empty() {
                spans.push(Span::raw(format!("  {}", entry.note)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    frame.render_widget(List::new(items).block(history_block), history_area);
}

fn render_journal(app: &mut App, frame: &mut Frame, area: Rect) {
    let p = palette(app.theme);
    let editing = app.input_mode == InputMode::Editing;

    let feedback_height = match app.journal.phase {
        JournalPhase::Writing => 0,
        _ => 6,
    };
    let [prompt_area, editor_area, feedback_area, recent_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(feedback_height),
        Constraint::Length(5),
    ])
    .areas(area);

    let prompt_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .title(" Today's prompt (r for another) ");
    let prompt = Paragraph::new(Span::styled(
        app.journal.prompt,
        Style::default().fg(p.text).add_modifier(Modifier::ITALIC),
    ))
    .wrap(Wrap { trim: true })
    .block(prompt_block);
    frame.render_widget(prompt, prompt_area);

    let editor_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { p.muted }))
        .title(" Your entry ");
    let body = if editing {
        app.journal.content.with_cursor_marker('▏')
    } else {
        app.journal.content.value().to_string()
    };
    let editor = if body.is_empty() {
        Paragraph::new(Span::styled(
            "Press i to start writing...",
            Style::default().fg(p.muted),
        ))
    } else {
        Paragraph::new(body).style(Style::default().fg(p.text))
    };
    frame.render_widget(editor.wrap(Wrap { trim: false }).block(editor_block), editor_area);

    match &app.journal.phase {
        JournalPhase::Writing => {}
        JournalPhase::Reflecting => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.assistant))
                .title(" Ask Doc's Thought ");
            let text = Paragraph::new(Span::styled(
                format!("Entry saved. Reflecting{}", dots(app)),
                Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
            ))
            .block(block);
            frame.render_widget(text, feedback_area);
        }
        JournalPhase::Reflected(feedback) => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.assistant))
                .title(" Ask Doc's Thought ");
            let lines: Vec<Line> = feedback.lines().map(parse_markdown_line).collect();
            let text = Paragraph::new(lines)
                .style(Style::default().fg(p.text))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(text, feedback_area);
        }
        JournalPhase::ConfigError(message) => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.error))
                .title(" Entry saved ");
            let text = Paragraph::new(Span::styled(message.clone(), Style::default().fg(p.error)))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(text, feedback_area);
        }
    }

    let recent_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted))
        .title(" Recent entries ");
    let width = recent_area.width.saturating_sub(16) as usize;
    let items: Vec<ListItem> = app
        .history
        .journals()
        .iter()
        .take(3)
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<11}", format_date(entry.timestamp)),
                    Style::default().fg(p.muted),
                ),
                Span::styled(preview(&entry.content, width.max(10)), Style::default().fg(p.text)),
            ]))
        })
        .collect();
    if items.is_empty() {
        let empty = Paragraph::new(Span::styled("No entries yet.", Style::default().fg(p.muted)))
            .block(recent_block);
        frame.render_widget(empty, recent_area);
    } else {
        frame.render_widget(List::new(items).block(recent_block), recent_area);
    }
}

fn render_insights(app: &mut App, frame: &mut Frame, area: Rect) {
    let p = palette(app.theme);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .title(" Insights ");

    let moods = app.history.moods().len();
    let journals = app.history.journals().len();
    let counts = Line::from(Span::styled(
        format!("{} mood logs, {} journal entries", moods, journals),
        Style::default().fg(p.muted),
    ));

    let mut lines: Vec<Line> = Vec::new();
    match &app.insights {
        InsightsState::Idle if !app.has_wellness_data() => {
            lines.push(Line::from(Span::styled(
                "Nothing to analyze yet.",
                Style::default().fg(p.text).bold(),
            )));
            lines.push(Line::default());
            lines.push(Line::from(
                "Log a mood or write a journal entry, then come back for a gentle look at your patterns.",
            ));
        }
        InsightsState::Idle => {
            lines.push(counts);
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::raw("Press "),
                Span::styled("g", Style::default().fg(p.accent).bold()),
                Span::raw(" to generate insights from your logs."),
            ]));
        }
        InsightsState::Loading => {
            lines.push(counts);
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Analyzing your patterns{}", dots(app)),
                Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
            )));
        }
        InsightsState::Ready(text) => {
            for line in text.lines() {
                lines.push(parse_markdown_line(line));
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                INSIGHTS_DISCLAIMER,
                Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
            )));
        }
        InsightsState::Failed(message) => {
            lines.push(Line::from(Span::styled(
                "Analysis Failed",
                Style::default().fg(p.error).bold(),
            )));
            lines.push(Line::from(message.clone()));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Press r to try again.", Style::default().fg(p.muted))));
        }
        InsightsState::ConfigError(message) => {
            lines.push(Line::from(Span::styled(message.clone(), Style::default().fg(p.error))));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Press r to try again.", Style::default().fg(p.muted))));
        }
    }

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(p.text))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_resources(app: &mut App, frame: &mut Frame, area: Rect) {
    let p = palette(app.theme);

    let [list_area, detail_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(55),
    ])
    .areas(area);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .title(" Resources ");

    let items: Vec<ListItem> = app
        .resources
        .iter()
        .map(|r| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", r.category.as_str()), Style::default().fg(p.muted)),
                Span::raw(r.title),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(list_block)
        .style(Style::default().fg(p.text))
        .highlight_style(
            Style::default()
                .bg(p.accent)
                .fg(p.highlight_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let visible_height = list_area.height.saturating_sub(2) as usize;
    ensure_selected_visible(&mut app.resources_state, visible_height);
    frame.render_stateful_widget(list, list_area, &mut app.resources_state);

    let detail_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted))
        .title(" Details ");

    let detail = match app.selected_resource() {
        Some(r) => Paragraph::new(vec![
            Line::from(Span::styled(r.title, Style::default().fg(p.text).bold())),
            Line::from(Span::styled(r.category.as_str(), Style::default().fg(p.muted))),
            Line::default(),
            Line::from(r.description),
            Line::default(),
            Line::from(Span::styled(r.url, Style::default().fg(p.ok).add_modifier(Modifier::UNDERLINED))),
            Line::default(),
            Line::from(Span::styled("Enter opens the link in your browser.", Style::default().fg(p.muted))),
        ]),
        None => Paragraph::new(""),
    };
    frame.render_widget(
        detail.style(Style::default().fg(p.text)).wrap(Wrap { trim: true }).block(detail_block),
        detail_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("I hear **you** today");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "you");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_parse_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("a **b");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a **b");
        assert!(line
            .spans
            .iter()
            .all(|s| !s.style.add_modifier.contains(Modifier::BOLD)));
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("a longer entry here", 8), "a longer...");
        assert_eq!(preview("one\ntwo", 10), "one...");
    }

    #[test]
    fn test_ensure_selected_visible() {
        let mut state = ListState::default();
        state.select(Some(9));
        ensure_selected_visible(&mut state, 4);
        assert_eq!(state.offset(), 6);
        state.select(Some(2));
        ensure_selected_visible(&mut state, 4);
        assert_eq!(state.offset(), 2);
    }
}
