use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::presenter::{format_grouped, PlotDescription};

const LIVE_GLYPH: &str = "●";
const REFERENCE_GLYPH: &str = "╌";

/// Terminal rendering of a `PlotDescription`: live line, dashed reference
/// line, grouped price labels on the right edge, legend top-left.
pub struct PlotChart<'a> {
    plot: &'a PlotDescription,
}

impl<'a> PlotChart<'a> {
    pub fn new(plot: &'a PlotDescription) -> Self {
        Self { plot }
    }
}

/// Plot colours are CSS-style (`#1f77b4`, `red`); names the terminal does
/// not know fall back to `fallback`.
pub fn terminal_color(css: &str, fallback: Color) -> Color {
    css.trim().parse::<Color>().unwrap_or(fallback)
}

/// Map `value` into `0..rows` with row 0 at the top.
pub fn row_for(value: f64, min: f64, range: f64, rows: usize) -> usize {
    if rows <= 1 {
        return 0;
    }
    let normalized = ((value - min) / range).clamp(0.0, 1.0);
    let from_bottom = (normalized * (rows - 1) as f64).round() as usize;
    rows - 1 - from_bottom.min(rows - 1)
}

impl Widget for PlotChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.plot.layout.title.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        let live = self.plot.live();
        let reference = self.plot.reference();
        let live_color = terminal_color(&live.line.color, Color::Cyan);
        let ref_color = terminal_color(&reference.line.color, Color::Yellow);

        // Legend, top-left.
        let legend = Line::from(vec![
            Span::styled(LIVE_GLYPH, Style::default().fg(live_color)),
            Span::styled(format!(" {}  ", live.name), Style::default().fg(Color::White)),
            Span::styled(REFERENCE_GLYPH, Style::default().fg(ref_color)),
            Span::styled(format!(" {}", reference.name), Style::default().fg(Color::White)),
        ]);
        if inner.height > 0 {
            buf.set_line(inner.x, inner.y, &legend, inner.width);
        }

        // legend row + x-label row
        if inner.height < 4 || inner.width < 12 {
            return;
        }
        let rows = (inner.height - 2) as usize;
        let top = inner.y + 1;

        let ref_price = reference.y.first().copied();
        let mut min_price = live.y.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max_price = live.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if let Some(r) = ref_price {
            min_price = min_price.min(r);
            max_price = max_price.max(r);
        }
        if !min_price.is_finite() || !max_price.is_finite() {
            Paragraph::new("Waiting for ticks...")
                .style(Style::default().fg(Color::DarkGray))
                .render(Rect::new(inner.x, top, inner.width, 1), buf);
            return;
        }
        let range = max_price - min_price;
        let range = if range < 0.01 { 1.0 } else { range };

        let max_label = format_grouped(max_price);
        let min_label = format_grouped(min_price);
        let label_width = max_label.len().max(min_label.len()) as u16 + 1;
        let plot_width = inner.width.saturating_sub(label_width) as usize;
        if plot_width == 0 {
            return;
        }

        // Reference line first so live points draw over it.
        if let Some(r) = ref_price {
            let y = top + row_for(r, min_price, range, rows) as u16;
            for col in (0..plot_width).step_by(2) {
                buf.set_string(
                    inner.x + col as u16,
                    y,
                    REFERENCE_GLYPH,
                    Style::default().fg(ref_color),
                );
            }
        }

        // Newest points on the right; older ones scroll off when too narrow.
        let skip = live.y.len().saturating_sub(plot_width);
        for (col, &price) in live.y.iter().skip(skip).enumerate() {
            let y = top + row_for(price, min_price, range, rows) as u16;
            buf.set_string(
                inner.x + col as u16,
                y,
                LIVE_GLYPH,
                Style::default().fg(live_color),
            );
        }

        // Y labels on the right edge.
        let label_x = inner.x + plot_width as u16 + 1;
        let label_style = Style::default().fg(Color::DarkGray);
        buf.set_string(label_x, top, &max_label, label_style);
        buf.set_string(label_x, top + rows as u16 - 1, &min_label, label_style);
        if let Some(r) = ref_price {
            let y = top + row_for(r, min_price, range, rows) as u16;
            buf.set_string(
                label_x,
                y,
                format_grouped(r),
                Style::default().fg(ref_color).add_modifier(Modifier::BOLD),
            );
        }

        // X labels: first and last visible timestamps.
        let x_row = inner.y + inner.height - 1;
        if let Some(first) = live.x.get(skip) {
            buf.set_string(inner.x, x_row, first, label_style);
        }
        if let Some(last) = live.x.last() {
            let visible = live.x.len() - skip;
            let end_col = visible.min(plot_width) as u16;
            let x = (inner.x + end_col).saturating_sub(last.chars().count() as u16).max(inner.x);
            buf.set_string(x, x_row, last, label_style);
        }
    }
}

pub struct LoadingPanel;

impl Widget for LoadingPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new("Loading chart...")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .render(area, buf);
    }
}
