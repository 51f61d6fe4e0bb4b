//! Console output pane and input line rendering

use crate::ui::app::ConsoleLog;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the console output pane
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    console: &ConsoleLog,
    program_name: &str,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Console: {} ", program_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

    if console.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let total_items = console.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    // Clamp scroll offset only if content exceeds visible area
    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = console
        .lines()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| {
            let style = if line.starts_with("*** ") {
                Style::default().fg(DEFAULT_THEME.comment)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            ListItem::new(line).style(style)
        })
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

/// Render the single-line input box; it is only live while the machine waits
pub fn render_input_line(frame: &mut Frame, area: Rect, input: &str, enabled: bool) {
    let (border_style, title) = if enabled {
        (
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
            " Input (Enter to send, Ctrl-D for end of input) ",
        )
    } else {
        (Style::default().fg(DEFAULT_THEME.border_normal), " Input ")
    };

    let text = if enabled {
        format!("{}_", input)
    } else {
        String::new()
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(DEFAULT_THEME.fg))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(paragraph, area);
}
