//! Machine state pane: registers, counters and live arrays
//!
//! While a fault is being shown, registers and counters come from the fault
//! snapshot so the pane matches the dump.

use crate::machine::Machine;
use crate::snapshot::Snapshot;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the machine pane
pub fn render_machine_pane(
    frame: &mut Frame,
    area: Rect,
    machine: Option<&Machine>,
    fault: Option<&Snapshot>,
    heap_scroll: &mut usize,
) {
    let block = Block::default()
        .title(" Machine ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

    let Some(machine) = machine else {
        let paragraph = Paragraph::new("(no program)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let snapshot = fault.cloned().unwrap_or_else(|| machine.snapshot());
    let label = Style::default().fg(DEFAULT_THEME.register);
    let value = Style::default().fg(DEFAULT_THEME.number);
    let muted = Style::default().fg(DEFAULT_THEME.comment);

    let mut lines: Vec<Line> = snapshot
        .registers
        .iter()
        .enumerate()
        .map(|(i, reg)| {
            Line::from(vec![
                Span::styled(format!("r{} ", i), label),
                Span::styled(format!("{:08x}", reg), value),
                Span::styled(format!(" {}", reg), muted),
            ])
        })
        .collect();

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("pc    ", label),
        Span::styled(snapshot.pc.to_string(), value),
    ]));
    lines.push(Line::from(vec![
        Span::styled("cycle ", label),
        Span::styled(snapshot.cycle.to_string(), value),
    ]));

    let next = match (fault, machine.next_instruction()) {
        (Some(_), _) => Span::styled(
            "faulted",
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        ),
        (None, Some(instruction)) => Span::styled(instruction.to_string(), value),
        (None, None) => Span::styled("-", muted),
    };
    lines.push(Line::from(vec![Span::styled("next  ", label), next]));

    let heap = machine.heap();
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("arrays ", label),
        Span::styled(heap.live_arrays().to_string(), value),
        Span::styled(format!(" live, {} platters", heap.live_platters()), muted),
    ]));
    lines.push(Line::from(vec![
        Span::styled("input  ", label),
        Span::styled(machine.pending_input().to_string(), value),
        Span::styled(
            if machine.is_input_closed() {
                " buffered, closed"
            } else {
                " buffered"
            },
            muted,
        ),
    ]));

    // Remaining rows list live arrays, scrollable
    let used = lines.len() + 2;
    let visible = (area.height as usize).saturating_sub(used);
    *heap_scroll = (*heap_scroll).min(heap.live_arrays().saturating_sub(1));

    lines.extend(
        heap.live()
            .skip(*heap_scroll)
            .take(visible)
            .map(|(id, len)| {
                Line::from(vec![
                    Span::styled(format!("  #{:<6}", id), label),
                    Span::styled(format!("{} platters", len), muted),
                ])
            }),
    );

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
