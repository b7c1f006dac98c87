use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{Alert, App, AppState, InputMode};
use crate::chat::{Message, MAX_DRAFT_CHARS};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const USER_COLOR: Color = Color::Rgb(0, 122, 255);

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Transcript
            Constraint::Length(3), // Input area
        ])
        .split(size);

    draw_title_bar(f, app, chunks[0]);
    draw_chat_area(f, app, chunks[1]);
    draw_input_area(f, app, chunks[2]);

    if let Some(alert) = app.alerts.front() {
        draw_alert(f, alert, size);
    }
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let (status, style) = match &app.state {
        AppState::Connecting => ("connecting...".to_string(), Style::default().fg(Color::Yellow)),
        AppState::Connected => ("connected".to_string(), Style::default().fg(Color::Green)),
        AppState::Degraded(reason) => (reason.clone(), Style::default().fg(Color::Yellow)),
        AppState::Unreachable => ("unreachable".to_string(), Style::default().fg(Color::Red)),
    };

    let title = Line::from(vec![
        Span::styled("S'all good Chat", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" | {} | ", app.server_url())),
        Span::styled(status, style),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(USER_COLOR));

    let paragraph = Paragraph::new(title)
        .block(block)
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn draw_chat_area(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Messages ")
        .style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = transcript_lines(
        app.screen.messages(),
        app.screen.is_busy(),
        app.spinner_frame,
        inner.width as usize,
    );

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No messages yet. Type a message and press Enter to send.",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    app.set_viewport(lines.len(), inner.height as usize);
    let (start, end) = visible_window(lines.len(), inner.height as usize, app.scroll_back);
    let visible: Vec<Line> = lines.drain(start..end).collect();

    f.render_widget(Paragraph::new(visible), inner);
}

/// Lays out the transcript in append order for a pane `width` columns wide.
///
/// User messages sit on the right, bot messages on the left, each wrapped to
/// at most 80% of the width. A spinner line follows the last message while a
/// send is in flight.
pub fn transcript_lines(
    messages: &[Message],
    busy: bool,
    spinner_frame: usize,
    width: usize,
) -> Vec<Line<'static>> {
    let bubble_width = (width * 4 / 5).max(1);
    let mut lines = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }

        let (who, alignment, text_style) = if message.is_user() {
            ("you", Alignment::Right, Style::default().fg(Color::White).bg(USER_COLOR))
        } else {
            ("bot", Alignment::Left, Style::default().fg(Color::Black).bg(Color::Gray))
        };

        let timestamp = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S");
        lines.push(
            Line::from(vec![
                Span::styled(format!("[{}] ", timestamp), Style::default().fg(Color::DarkGray)),
                Span::styled(who, Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)),
            ])
            .alignment(alignment),
        );

        for row in wrap_text(&message.text, bubble_width) {
            lines.push(Line::from(Span::styled(row, text_style)).alignment(alignment));
        }
    }

    if busy {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let frame = SPINNER[spinner_frame % SPINNER.len()];
        lines.push(
            Line::from(Span::styled(frame, Style::default().fg(USER_COLOR)))
                .alignment(Alignment::Center),
        );
    }

    lines
}

/// Greedy word wrap on display columns. Words wider than `width` are split
/// between characters; a single glyph wider than `width` gets a row of its own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.lines() {
        let mut row = String::new();
        let mut row_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();

            if row_width > 0 && row_width + 1 + word_width > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }

            if word_width > width {
                for c in word.chars() {
                    let char_width = c.width().unwrap_or(0);
                    if row_width > 0 && row_width + char_width > width {
                        rows.push(std::mem::take(&mut row));
                        row_width = 0;
                    }
                    row.push(c);
                    row_width += char_width;
                }
                continue;
            }

            if row_width > 0 {
                row.push(' ');
                row_width += 1;
            }
            row.push_str(word);
            row_width += word_width;
        }

        // Blank input lines stay blank rows.
        if row_width > 0 || paragraph.trim().is_empty() {
            rows.push(row);
        }
    }

    rows
}

/// First visible character and the cursor's column for a one-line input
/// `width` columns wide. Scrolls just far enough to keep the cursor in view.
pub fn input_window(text: &str, cursor: usize, width: usize) -> (usize, usize) {
    let before: Vec<usize> = text
        .chars()
        .take(cursor)
        .map(|c| c.width().unwrap_or(0))
        .collect();
    let room = width.saturating_sub(1);

    let mut offset = 0;
    let mut column: usize = before.iter().sum();
    while column > room && offset < before.len() {
        column -= before[offset];
        offset += 1;
    }
    (offset, column)
}

/// Which `[start, end)` slice of `total` lines fits in `height` rows when the
/// view is `scroll_back` lines above the bottom.
pub fn visible_window(total: usize, height: usize, scroll_back: usize) -> (usize, usize) {
    let max_back = total.saturating_sub(height);
    let end = total - scroll_back.min(max_back);
    (end.saturating_sub(height), end)
}

fn draw_input_area(f: &mut Frame, app: &App, area: Rect) {
    let busy = app.screen.is_busy();
    let can_send = app.screen.can_submit();

    let input_style = match app.input_mode {
        InputMode::Normal => Style::default().fg(Color::White),
        InputMode::Editing if busy => Style::default().fg(Color::DarkGray),
        InputMode::Editing => Style::default().fg(Color::Green),
    };

    let mode_indicator = match app.input_mode {
        InputMode::Normal => " [NORMAL] i=type, q=quit, Up/Down=scroll ".to_string(),
        InputMode::Editing => format!(
            " [INPUT] ESC=normal, ENTER=send  {}/{} ",
            app.screen.draft.char_count(),
            MAX_DRAFT_CHARS
        ),
    };

    let send_style = if can_send {
        Style::default().fg(Color::White).bg(USER_COLOR).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Black).bg(Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .title(mode_indicator)
        .title(
            ratatui::widgets::block::Title::from(Span::styled(" Send ", send_style))
                .alignment(Alignment::Right),
        )
        .style(input_style);

    let inner_width = area.width.saturating_sub(2) as usize;
    let (offset, column) = input_window(
        app.screen.draft.as_str(),
        app.screen.draft.cursor(),
        inner_width,
    );

    let input_text: String = app.screen.draft.as_str().chars().skip(offset).collect();

    let input_paragraph = if input_text.is_empty() {
        Paragraph::new(Span::styled("Type a message...", Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(input_text)
    }
    .block(input_block);

    f.render_widget(input_paragraph, area);

    if app.input_mode == InputMode::Editing && app.alerts.is_empty() && !busy {
        f.set_cursor(area.x + column as u16 + 1, area.y + 1);
    }
}

fn draw_alert(f: &mut Frame, alert: &Alert, size: Rect) {
    let area = centered_rect(60, 7, size);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", alert.title))
        .style(Style::default().fg(Color::Red));

    let text = vec![
        Line::from(Span::styled(alert.body.clone(), Style::default().fg(Color::White))),
        Line::default(),
        Line::from(Span::styled(
            "Enter to dismiss",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = ((u32::from(r.width) * u32::from(percent_x) / 100) as u16)
        .max(20)
        .min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap_text("the quick brown fox", 10), ["the quick", "brown fox"]);
        assert_eq!(wrap_text("abcdefghij", 4), ["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\nb", 10), ["a", "b"]);
        assert_eq!(wrap_text("a\n\nb", 10), ["a", "", "b"]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn wraps_wide_glyphs_by_display_width() {
        let text = "你好世界".repeat(8);
        let rows = wrap_text(&text, 30);

        assert!(rows.iter().all(|r| r.width() <= 30));
        assert_eq!(rows.concat(), text);
        assert_eq!(rows.len(), 3);
        assert_eq!(wrap_text("日本 語", 3), ["日", "本", "語"]);
        assert_eq!(wrap_text("日", 1), ["日"]);
    }

    #[test]
    fn input_window_counts_columns() {
        assert_eq!(input_window("hello", 5, 10), (0, 5));
        assert_eq!(input_window("abcdefghij", 10, 6), (5, 5));
        // Each glyph is two columns: only two fit before the cursor cell.
        assert_eq!(input_window("你好世界", 4, 6), (2, 4));
        assert_eq!(input_window("你好世界", 1, 6), (0, 2));
    }

    #[test]
    fn window_follows_tail_and_clamps_scroll_back() {
        assert_eq!(visible_window(30, 10, 0), (20, 30));
        assert_eq!(visible_window(30, 10, 5), (15, 25));
        assert_eq!(visible_window(30, 10, 500), (0, 10));
        assert_eq!(visible_window(4, 10, 3), (0, 4));
    }

    #[test]
    fn transcript_keeps_append_order_and_sides() {
        let messages = vec![Message::user("hello"), Message::bot("hi")];
        let lines = transcript_lines(&messages, false, 0, 40);

        let texts: Vec<String> = lines.iter().map(plain).collect();
        let hello = texts.iter().position(|t| t == "hello").unwrap();
        let hi = texts.iter().position(|t| t == "hi").unwrap();
        assert!(hello < hi);
        assert_eq!(lines[hello].alignment, Some(Alignment::Right));
        assert_eq!(lines[hi].alignment, Some(Alignment::Left));
    }

    #[test]
    fn spinner_follows_last_message_only_while_busy() {
        let messages = vec![Message::user("hello")];
        let idle = transcript_lines(&messages, false, 0, 40);
        let busy = transcript_lines(&messages, true, 3, 40);

        assert_eq!(busy.len(), idle.len() + 2);
        assert_eq!(plain(busy.last().unwrap()), SPINNER[3]);
    }

    #[test]
    fn rendering_is_repeatable() {
        let messages = vec![Message::user("one"), Message::bot("two"), Message::user("three")];
        let first = transcript_lines(&messages, false, 0, 30);
        let second = transcript_lines(&messages, false, 0, 30);
        assert_eq!(first, second);
    }
}
