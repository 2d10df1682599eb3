//! Input widgets shared by the form screens
//!
//! Every field takes the same amount of room: a bordered 3-line box plus one
//! line underneath for its error message ([`FIELD_HEIGHT`]).

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::mood::{MoodSmiley, MOODS};
use crate::theme::Theme;
use crate::validation::FieldError;

pub const FIELD_HEIGHT: u16 = 4;

/// What a field shows, independent of its kind
pub struct FieldView<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    pub required: bool,
    pub error: Option<&'a FieldError>,
}

fn split_field(area: Rect) -> (Rect, Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (parts[0], parts[1])
}

fn field_block<'a>(view: &FieldView<'a>, theme: &Theme, suffix: Option<Span<'a>>) -> Block<'a> {
    let border = if view.error.is_some() {
        theme.danger
    } else if view.focused {
        theme.accent
    } else {
        theme.inactive
    };
    let label_style = if view.focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.header)
    };

    let mut title = vec![Span::styled(format!(" {}", view.label), label_style)];
    if view.required {
        title.push(Span::styled("*", Style::default().fg(theme.danger)));
    }
    title.push(Span::raw(" "));
    if let Some(suffix) = suffix {
        title.push(suffix);
        title.push(Span::raw(" "));
    }

    Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn draw_error(f: &mut Frame, error: Option<&FieldError>, theme: &Theme, area: Rect) {
    if let Some(err) = error {
        let line = Paragraph::new(Span::styled(format!(" {}", err), Style::default().fg(theme.danger)));
        f.render_widget(line, area);
    }
}

fn value_line<'a>(shown: String, view: &FieldView<'a>, theme: &Theme) -> Line<'a> {
    if shown.is_empty() && !view.focused {
        return Line::styled(view.placeholder.to_string(), Style::default().fg(theme.text_dim));
    }
    let mut spans = vec![Span::styled(shown, Style::default().fg(theme.text))];
    if view.focused {
        spans.push(Span::styled("_", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}

/// Single-line text input
pub fn text_input(f: &mut Frame, view: &FieldView, theme: &Theme, area: Rect) {
    let (input_area, error_area) = split_field(area);
    let input = Paragraph::new(value_line(view.value.to_string(), view, theme))
        .block(field_block(view, theme, None));
    f.render_widget(input, input_area);
    draw_error(f, view.error, theme, error_area);
}

/// Password input with a reveal toggle and a success marker
pub fn password_input(
    f: &mut Frame,
    view: &FieldView,
    reveal: bool,
    valid: bool,
    theme: &Theme,
    area: Rect,
) {
    let (input_area, error_area) = split_field(area);
    let shown = if reveal {
        view.value.to_string()
    } else {
        "•".repeat(view.value.chars().count())
    };

    let mut status = vec![Span::styled(
        if reveal { "󰈈 shown" } else { "󰈉 hidden" },
        Style::default().fg(theme.text_dim),
    )];
    if valid {
        status.push(Span::styled(" ✓", Style::default().fg(theme.success)));
    }

    let input = Paragraph::new(value_line(shown, view, theme))
        .block(field_block(view, theme, None).title_bottom(Line::from(status).right_aligned()));
    f.render_widget(input, input_area);
    draw_error(f, view.error, theme, error_area);
}

/// Date input; shows the weekday once the text parses
pub fn date_input(f: &mut Frame, view: &FieldView, parsed: Option<chrono::NaiveDate>, theme: &Theme, area: Rect) {
    let (input_area, error_area) = split_field(area);
    let hint = parsed.map(|d| {
        Span::styled(d.format("%A").to_string(), Style::default().fg(theme.text_dim))
    });
    let input = Paragraph::new(value_line(view.value.to_string(), view, theme))
        .block(field_block(view, theme, hint));
    f.render_widget(input, input_area);
    draw_error(f, view.error, theme, error_area);
}

/// Multi-line text area, scrolled so the last line stays visible
pub fn textarea(f: &mut Frame, view: &FieldView, theme: &Theme, area: Rect) {
    let (input_area, error_area) = split_field(area);

    let mut lines: Vec<Line> = if view.value.is_empty() && !view.focused {
        vec![Line::styled(view.placeholder.to_string(), Style::default().fg(theme.text_dim))]
    } else {
        view.value
            .split('\n')
            .map(|l| Line::styled(l.to_string(), Style::default().fg(theme.text)))
            .collect()
    };
    if view.focused {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled("█", Style::default().fg(theme.accent)));
        }
    }

    let visible = input_area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let chars = view.value.chars().count();
    let counter = Span::styled(format!("{} chars", chars), Style::default().fg(theme.text_dim));

    let input = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(field_block(view, theme, Some(counter)));
    f.render_widget(input, input_area);
    draw_error(f, view.error, theme, error_area);
}

/// Row of mood buttons. Exactly one (or none) is marked selected.
pub fn mood_picker(
    f: &mut Frame,
    selected: Option<MoodSmiley>,
    cursor: usize,
    focused: bool,
    error: Option<&FieldError>,
    theme: &Theme,
    area: Rect,
) {
    let (row_area, error_area) = split_field(area);
    let border = if error.is_some() {
        theme.danger
    } else if focused {
        theme.accent
    } else {
        theme.inactive
    };
    let block = Block::default()
        .title(Span::styled(
            " How are you feeling this day? ",
            Style::default().fg(if focused { theme.accent } else { theme.header }),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    // One row of at most 69 cells: glyph, space, name, single-space gaps
    let mut spans = Vec::new();
    for (i, mood) in MOODS.iter().enumerate() {
        let color = if *mood == MoodSmiley::Angry { theme.danger } else { theme.smiley };
        let mut style = Style::default().fg(color);
        if selected == Some(*mood) {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        if focused && i == cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!("{} {}", mood.glyph(), mood.name()), style));
    }

    let row = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(row, row_area);
    draw_error(f, error, theme, error_area);
}

/// Submit button
pub fn button(f: &mut Frame, label: &str, focused: bool, theme: &Theme, area: Rect) {
    let style = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(Span::styled(format!(" {} ", label), style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused { theme.accent } else { theme.inactive })),
        );
    f.render_widget(button, area);
}
