use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use supportdesk_core::{ChatRole, CATEGORIES, SENTIMENTS};
use crate::app::{App, InputMode, TurnError};

const SIDEBAR_WIDTH: u16 = 34;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after_open = &rest[start + 2..];
        let Some(len) = after_open.find("**") else {
            break;
        };

        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        let bold_text = &after_open[..len];
        if bold_text.is_empty() {
            // "****" is literal
            spans.push(Span::raw("****"));
        } else {
            spans.push(Span::styled(
                bold_text.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        rest = &after_open[len + 2..];
    }

    // Push any remaining text, including an unclosed **
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Rows a line takes once wrapped to `width` columns. Approximate: word
/// wrapping can need a row more than this.
fn wrapped_rows(line: &Line, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let line_width = u16::try_from(line.width()).unwrap_or(u16::MAX);
    line_width.div_ceil(width).max(1)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH.min(body_area.width / 3)),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_sidebar(app, frame, sidebar_area);
    render_chat_screen(app, frame, main_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Customer Message Analyzer ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("{} · {}", app.provider_label, app.model_label),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " MESSAGE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    match app.input_mode {
        InputMode::Editing => hints.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" analyze ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" normal mode ", label_style),
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" scroll ", label_style),
        ]),
        InputMode::Normal => {
            hints.extend(vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" C ", key_style),
                Span::styled(" clear history ", label_style),
            ]);
            if app.last_error.is_some() {
                hints.extend(vec![
                    Span::styled(" Esc ", key_style),
                    Span::styled(" dismiss error ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
        }
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(Span::styled("AI Customer Support", heading)),
        Line::default(),
        Line::from(Span::styled("About", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("This AI assistant analyzes customer messages and provides:"),
        Line::default(),
        Line::from(" 1: Category Classification"),
        Line::from(" 2: Sentiment Analysis"),
        Line::from(" 3: Auto-generated Reply"),
        Line::default(),
        Line::from(Span::styled("Categories", Style::default().add_modifier(Modifier::BOLD))),
    ];
    lines.extend(CATEGORIES.iter().map(|c| Line::from(Span::styled(format!(" • {}", c), dim))));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Sentiments", Style::default().add_modifier(Modifier::BOLD))));
    lines.push(Line::from(Span::styled(format!(" {}", SENTIMENTS.join(" · ")), dim)));
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(" C ", Style::default().bg(Color::DarkGray).fg(Color::White)),
        Span::raw(" Clear Chat History"),
    ]));
    lines.push(Line::from(Span::styled(
        format!(" {} messages in this session", app.history.len()),
        dim,
    )));

    let sidebar = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(sidebar, area);
}

fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let messages = app.history.messages();

    for (i, msg) in messages.iter().enumerate() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));

                // The newest reply may still be typing out
                let is_last = i + 1 == messages.len();
                let content = match app.typewriter.as_ref() {
                    Some(tw) if is_last && !tw.is_done() && tw.text() == msg.content => tw.frame(),
                    _ => msg.content.clone(),
                };
                for line in content.lines() {
                    lines.push(parse_markdown_line(line));
                }
                lines.push(Line::default());
            }
        }
    }

    if app.is_analyzing() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Analyzing message{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn error_lines(error: &TurnError) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    match error {
        TurnError::Decode(e) => {
            let mut lines = vec![
                Line::from(Span::styled("Model returned invalid JSON. Try again.", label)),
                Line::from(Span::styled(e.to_string(), Style::default().fg(Color::DarkGray))),
                Line::from(Span::styled("Raw response:", Style::default().add_modifier(Modifier::BOLD))),
            ];
            lines.extend(e.raw().lines().map(|l| Line::from(l.to_string())));
            lines
        }
        TurnError::Request(message) => vec![
            Line::from(Span::styled("Error:", label)),
            Line::from(message.clone()),
        ],
    }
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let error = app.last_error.as_ref().map(error_lines);
    let error_height = error
        .as_ref()
        .map(|lines| (lines.len() as u16 + 2).min(area.height / 3))
        .unwrap_or(0);

    let [chat_area, error_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(error_height),
        Constraint::Length(3),
    ])
    .areas(area);

    render_transcript(app, frame, chat_area);

    if let Some(lines) = error {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Last message failed (Esc in normal mode to dismiss) ");
        let panel = Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(panel, error_area);
    }

    render_input(app, frame, input_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let chat_text = if app.history.is_empty() && !app.is_analyzing() {
        app.max_chat_scroll = 0;
        Text::from(Span::styled(
            "Enter customer message here...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let lines = transcript_lines(app);
        let total_rows: u16 = lines
            .iter()
            .map(|line| wrapped_rows(line, inner_width))
            .fold(0u16, |acc, rows| acc.saturating_add(rows));
        app.max_chat_scroll = total_rows.saturating_sub(inner_height);
        Text::from(lines)
    };

    app.chat_height = inner_height;
    if app.follow_output {
        app.chat_scroll = app.max_chat_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(app.max_chat_scroll);
    }

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.is_analyzing() {
        " Customer message (waiting for analysis) "
    } else {
        " Customer message "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
