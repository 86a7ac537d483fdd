use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::chart::terminal_color;
use crate::presenter::{format_grouped, Direction, PriceChange};
use crate::stream::connection::ConnectionState;

pub struct StatusBar<'a> {
    pub instrument: &'a str,
    pub connection: ConnectionState,
    pub tick_count: u64,
    pub change: Option<PriceChange>,
    pub last_update: Option<&'a str>,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let conn_color = match self.connection {
            ConnectionState::Subscribed => Color::Green,
            ConnectionState::Connecting => Color::Yellow,
            ConnectionState::Idle => Color::DarkGray,
            ConnectionState::Closed => Color::Red,
        };
        let sep = || Span::styled(" | ", Style::default().fg(Color::DarkGray));

        let mut spans = vec![
            Span::styled(
                " realtime-chart ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.instrument, Style::default().fg(Color::Cyan)),
            sep(),
            Span::styled(self.connection.label(), Style::default().fg(conn_color)),
            sep(),
            Span::styled(
                format!("ticks: {}", self.tick_count),
                Style::default().fg(Color::DarkGray),
            ),
        ];

        if let Some(change) = self.change {
            let arrow = match change.direction {
                Direction::Up => "▲",
                Direction::Down => "▼",
                Direction::Flat => "-",
            };
            let sign = if change.amount < 0.0 { "" } else { "+" };
            spans.push(sep());
            spans.push(Span::styled(
                format!(
                    "{} {} {}{} ({:+.2}%)",
                    format_grouped(change.last),
                    arrow,
                    sign,
                    format_grouped(change.amount),
                    change.percent
                ),
                Style::default()
                    .fg(terminal_color(change.color, Color::DarkGray))
                    .add_modifier(Modifier::BOLD),
            ));
        }

        if let Some(ts) = self.last_update {
            spans.push(sep());
            spans.push(Span::styled(
                format!("updated {}", ts),
                Style::default().fg(Color::DarkGray),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[R]", Style::default().fg(Color::Yellow)),
            Span::styled("eload config  ", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
