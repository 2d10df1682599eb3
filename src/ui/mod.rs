mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::screens::new_entry::EntryFocus;
use crate::screens::signin::SigninFocus;
use crate::screens::Screen;
use crate::theme::Theme;
use crate::validation::{self, CredentialField, EntryField};
use components::{FieldView, FIELD_HEIGHT};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(8),    // Screen
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    match app.screen {
        Screen::Signin => draw_signin(f, app, chunks[1]),
        Screen::NewEntry => draw_new_entry(f, app, chunks[1]),
        Screen::Journal => draw_journal(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f, &app.theme),
        Popup::Confirm => draw_confirm_popup(f, app),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    // Priority: status toast > loading > who is signed in
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(t.warning)))
    } else if !app.store.is_rehydrated() {
        Line::from(Span::styled("Loading journal…", Style::default().fg(t.text_dim)))
    } else {
        let mut spans = match app.signed_in_user() {
            Some(user) => vec![
                Span::styled("󰀄 ", Style::default().fg(t.accent)),
                Span::styled(user, Style::default().fg(t.text)),
                Span::styled(
                    format!(" │ {} entries", app.store.state().journal.entries.len()),
                    Style::default().fg(t.text_dim),
                ),
            ],
            None => vec![Span::styled("Not signed in", Style::default().fg(t.text_dim))],
        };
        if app.saving_paused() {
            spans.push(Span::styled(" │ saving paused", Style::default().fg(t.warning)));
        }
        Line::from(spans)
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// Bordered card centered in `area`, returning the inner region
fn card(f: &mut Frame, title: &str, width: u16, height: u16, theme: &Theme, area: Rect) -> Rect {
    let card_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    };
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title.to_uppercase()),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.inactive));
    let inner = block.inner(card_area);
    f.render_widget(block, card_area);
    inner
}

fn draw_signin(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let screen = &app.signin;
    let form = &screen.form;
    let inner = card(f, Screen::Signin.title(), 64, 2 * FIELD_HEIGHT + 7, t, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    components::text_input(
        f,
        &FieldView {
            label: "FULL NAME",
            value: &form.draft().full_name,
            placeholder: "Enter your full name",
            focused: screen.focus == SigninFocus::FullName,
            required: true,
            error: form.error(CredentialField::FullName),
        },
        t,
        rows[0],
    );
    components::password_input(
        f,
        &FieldView {
            label: "PASSWORD",
            value: &form.draft().password,
            placeholder: "Enter your password",
            focused: screen.focus == SigninFocus::Password,
            required: true,
            error: form.error(CredentialField::Password),
        },
        screen.show_password,
        screen.password_ok(),
        t,
        rows[1],
    );
    components::button(f, "LOGIN", screen.focus == SigninFocus::Login, t, rows[2]);
}

fn draw_new_entry(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let screen = &app.new_entry;
    let form = &screen.form;
    let draft = form.draft();
    let inner = card(f, Screen::NewEntry.title(), 96, area.height, t, area);

    // Fits an 80x24 terminal with every error row kept
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(1)
        .constraints([
            Constraint::Length(FIELD_HEIGHT), // Date
            Constraint::Length(FIELD_HEIGHT), // Moods
            Constraint::Length(FIELD_HEIGHT), // Title
            Constraint::Min(FIELD_HEIGHT),    // Content
            Constraint::Length(3),            // Save
        ])
        .split(inner);

    components::date_input(
        f,
        &FieldView {
            label: "Date",
            value: &draft.date,
            placeholder: "Select a date (YYYY-MM-DD, t = today)",
            focused: screen.focus == EntryFocus::Date,
            required: true,
            error: form.error(EntryField::Date),
        },
        validation::parse_date(&draft.date).ok(),
        t,
        rows[0],
    );
    components::mood_picker(
        f,
        screen.selected_mood(),
        screen.mood_cursor,
        screen.focus == EntryFocus::Mood,
        form.error(EntryField::Mood),
        t,
        rows[1],
    );
    components::text_input(
        f,
        &FieldView {
            label: "Title",
            value: &draft.title,
            placeholder: "Give the day a title",
            focused: screen.focus == EntryFocus::Title,
            required: true,
            error: form.error(EntryField::Title),
        },
        t,
        rows[2],
    );
    components::textarea(
        f,
        &FieldView {
            label: "Content",
            value: &draft.content,
            placeholder: "Say more about the day, how you felt or feel.",
            focused: screen.focus == EntryFocus::Content,
            required: true,
            error: form.error(EntryField::Content),
        },
        t,
        rows[3],
    );
    components::button(f, "SAVE", screen.focus == EntryFocus::Save, t, rows[4]);
}

fn draw_journal(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let journal = &app.store.state().journal;
    let entries = journal.sorted();

    let title = match journal.average_score() {
        Some(avg) => format!(" Journal │ average mood {:.1}/7 ", avg),
        None => " Journal ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(t.accent).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.accent));

    if entries.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No entries yet", Style::default().fg(t.text_dim))),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(t.text_dim)),
                Span::styled("n", Style::default().fg(t.accent)),
                Span::styled(" to write one", Style::default().fg(t.text_dim)),
            ]),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if inner.width > 80 {
            [Constraint::Percentage(40), Constraint::Percentage(60)]
        } else {
            [Constraint::Percentage(50), Constraint::Percentage(50)]
        })
        .split(inner);

    let items: Vec<ListItem> = entries
        .iter()
        .map(|e| {
            let mood = e.entry.mood;
            let color = if mood == crate::mood::MoodSmiley::Angry { t.danger } else { t.smiley };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", mood.glyph()), Style::default().fg(color)),
                Span::styled(
                    e.entry.date.format(&app.config.date_format).to_string(),
                    Style::default().fg(t.text_dim),
                ),
                Span::raw("  "),
                Span::styled(e.entry.title.clone(), Style::default().fg(t.text)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(t.bg_selected).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    state.select(Some(app.journal.selected));
    f.render_stateful_widget(list, columns[0], &mut state);

    if let Some(entry) = entries.get(app.journal.selected) {
        let mood = entry.entry.mood;
        let mut lines = vec![
            Line::from(Span::styled(
                entry.entry.title.clone(),
                Style::default().fg(t.header).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled(format!("{} {} ", mood.glyph(), mood.name()), Style::default().fg(t.smiley)),
                Span::styled(format!("({}/7)", mood.score()), Style::default().fg(t.text_dim)),
            ]),
            Line::from(""),
        ];
        lines.extend(
            entry
                .entry
                .content
                .lines()
                .map(|l| Line::styled(l.to_string(), Style::default().fg(t.text))),
        );

        let detail = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.journal.content_scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::LEFT)
                    .border_style(Style::default().fg(t.inactive)),
            );
        f.render_widget(detail, columns[1]);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let hints: Vec<(&str, &str)> = match app.screen {
        Screen::Signin => vec![
            ("Tab", "Next"),
            ("F2", "Login"),
            ("^R", "Show pwd"),
            ("^N", "New entry"),
            ("^J", "Journal"),
            ("F1", "Help"),
        ],
        Screen::NewEntry => vec![
            ("Tab", "Next"),
            ("←→", "Mood"),
            ("F2", "Save"),
            ("^J", "Journal"),
            ("^L", "Sign in"),
            ("F1", "Help"),
        ],
        Screen::Journal => vec![
            ("↑↓", "Nav"),
            ("n", "New"),
            ("d", "Del"),
            ("^O", "Sign out"),
            ("q", "Quit"),
            ("?", "Help"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else if area.width < 80 { 5 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(t.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(t.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, t: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 40 { 95 } else { 80 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(t.header).add_modifier(Modifier::BOLD)))
    };
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(t.accent)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Everywhere ═══"),
        key("Tab", "Next field (leaving a field checks it)"),
        key("Shift+Tab", "Previous field"),
        key("F2", "Submit the form"),
        key("Ctrl+N", "New entry"),
        key("Ctrl+J", "Journal"),
        key("Ctrl+L", "Sign in"),
        key("Ctrl+O", "Sign out"),
        key("Ctrl+U", "Clear the current field"),
        key("Ctrl+P", "Pause / resume saving"),
        key("Ctrl+Q", "Quit"),
        Line::from(""),
        section("═══ Sign in ═══"),
        key("Ctrl+R", "Show / hide password"),
        Line::from(vec![Span::styled(
            format!(
                "            8+ characters from A-Z a-z 0-9 {} with one of each",
                validation::PASSWORD_SYMBOLS
            ),
            Style::default().fg(t.text_dim),
        )]),
        Line::from(""),
        section("═══ New entry ═══"),
        key("t", "Date: today"),
        key("PgUp/PgDn", "Date: next / previous day"),
        key("←/→", "Mood: move"),
        key("Space", "Mood: select (1-7 pick directly)"),
        key("Enter", "Content: new line"),
        Line::from(""),
        section("═══ Journal ═══"),
        key("↑/↓ j/k", "Move"),
        key("PgUp/PgDn", "Scroll entry"),
        key("d", "Delete entry"),
        key("X", "Delete the whole journal"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(t.text_dim)),
            Span::styled("F1", Style::default().fg(t.accent)),
            Span::styled("/", Style::default().fg(t.text_dim)),
            Span::styled("Esc", Style::default().fg(t.accent)),
            Span::styled(" to close", Style::default().fg(t.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 moodscribe Help ", Style::default().fg(t.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let popup_area = centered_rect(40, 20, f.area());

    f.render_widget(Clear, popup_area);

    let message = app.status_message.as_deref().unwrap_or("Confirm?");

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(t.warning))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(t.success).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes   "),
            Span::styled("n", Style::default().fg(t.danger).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(t.warning)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.warning)),
    )
    .alignment(Alignment::Center);

    f.render_widget(confirm, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
