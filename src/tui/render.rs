
use super::state::PruneState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn draw(f: &mut Frame, state: &PruneState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0]);
    draw_roster(f, state, chunks[1]);
    draw_status(f, state, chunks[2]);
    draw_footer(f, chunks[3]);
}

fn draw_header(f: &mut Frame, state: &PruneState, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" #{} ", state.channel),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("{} of {} on roster", state.kept_count(), state.rows.len()),
            Style::default().fg(Color::Green),
        ),
    ]);
    let para = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title(" Questionator: review roster "));
    f.render_widget(para, area);
}

fn draw_roster(f: &mut Frame, state: &PruneState, area: Rect) {
    let name_w = area.width.saturating_sub(2 + 5 + 24) as usize;

    let rows: Vec<Row> = state
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let style = if r.removed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            let mark = if r.removed { "  x" } else { "" };
            let handle = r.username.as_deref().map(|u| format!("@{}", u)).unwrap_or_default();
            Row::new(vec![
                Cell::from(format!("{:>3}", i + 1)),
                Cell::from(fit_column(&r.name, name_w)),
                Cell::from(fit_column(&handle, 20)),
                Cell::from(mark).style(Style::default().fg(Color::Red)),
            ])
            .style(style)
        })
        .collect();

    let constraints = [
        Constraint::Length(4),
        Constraint::Min(10),
        Constraint::Length(20),
        Constraint::Length(3),
    ];
    let table = Table::new(rows, constraints)
        .header(
            Row::new(vec!["  #", "Name", "Handle", ""])
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(" Members "))
        .row_highlight_style(Style::default().bg(Color::DarkGray));
    let mut table_state = TableState::default();
    if !state.rows.is_empty() {
        table_state.select(Some(state.selected));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_status(f: &mut Frame, state: &PruneState, area: Rect) {
    let text = state.status.as_deref().unwrap_or("");
    let para = Paragraph::new(format!("  {}", text)).style(Style::default().fg(Color::Cyan));
    f.render_widget(para, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("  [j/k]", Style::default().fg(Color::Yellow)),
        Span::raw(" move  "),
        Span::styled("[Space/d]", Style::default().fg(Color::Yellow)),
        Span::raw(" remove/restore  "),
        Span::styled("[g/G]", Style::default().fg(Color::Yellow)),
        Span::raw(" top/bottom  "),
        Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
        Span::raw(" start  "),
        Span::styled("[q]", Style::default().fg(Color::Yellow)),
        Span::raw("uit  "),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Clip a member name or handle to a column `width` chars wide; a clipped
/// value ends in `…` so the operator can tell two long names apart.
fn fit_column(text: &str, width: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(width).collect();
    if chars.next().is_none() {
        return head;
    }
    match width {
        0 => String::new(),
        _ => head.chars().take(width - 1).chain(Some('…')).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::state::PruneRow;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_fit_column_keeps_names_that_fit() {
        assert_eq!(fit_column("Ada", 10), "Ada");
        assert_eq!(fit_column("Ada", 3), "Ada");
    }

    #[test]
    fn test_fit_column_clips_long_names() {
        assert_eq!(fit_column("Margaret Hamilton", 8), "Margare…");
        assert_eq!(fit_column("Grace", 1), "…");
        assert_eq!(fit_column("Grace", 0), "");
    }

    #[test]
    fn test_fit_column_counts_chars_not_bytes() {
        assert_eq!(fit_column("José Ñúñez García", 6), "José …");
        assert_eq!(fit_column("Ñúñez", 5), "Ñúñez");
    }

    #[test]
    fn test_draw_shows_channel_and_members() {
        let state = PruneState::new(
            "g39ds_platte",
            vec![
                PruneRow { name: "Ada Lovelace".to_string(), username: Some("ada".to_string()), removed: false },
                PruneRow { name: "Alan Turing".to_string(), username: None, removed: true },
            ],
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| draw(f, &state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("#g39ds_platte"));
        assert!(text.contains("1 of 2 on roster"));
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("@ada"));
    }
}
