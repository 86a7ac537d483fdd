pub mod chart;
pub mod dashboard;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::presenter::RenderFrame;
use crate::stream::connection::ConnectionState;

use chart::{LoadingPanel, PlotChart};
use dashboard::{KeybindBar, StatusBar};

const MIN_CHART_ROWS: u16 = 6;

/// Everything the terminal host draws in one pass.
pub struct ChartView<'a> {
    pub frame: Option<&'a RenderFrame>,
    pub frame_height_px: Option<u32>,
    pub px_per_row: u32,
    pub instrument: &'a str,
    pub connection: ConnectionState,
    pub tick_count: u64,
    pub last_update: Option<&'a str>,
}

/// Terminal rows for a requested frame height in pixels.
pub fn rows_for_height(height_px: u32, px_per_row: u32) -> u16 {
    let rows = height_px / px_per_row.max(1);
    u16::try_from(rows).unwrap_or(u16::MAX).max(MIN_CHART_ROWS)
}

pub fn render(frame: &mut Frame, view: &ChartView) {
    let chart_rows = view
        .frame_height_px
        .map(|h| rows_for_height(h, view.px_per_row))
        .unwrap_or(MIN_CHART_ROWS);

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // status bar
            Constraint::Length(chart_rows), // chart
            Constraint::Min(0),
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    let change = view
        .frame
        .and_then(RenderFrame::plot)
        .and_then(|plot| plot.change);
    frame.render_widget(
        StatusBar {
            instrument: view.instrument,
            connection: view.connection,
            tick_count: view.tick_count,
            change,
            last_update: view.last_update,
        },
        outer[0],
    );

    match view.frame {
        Some(RenderFrame::Plot(plot)) => frame.render_widget(PlotChart::new(plot), outer[1]),
        Some(RenderFrame::Loading) | None => frame.render_widget(LoadingPanel, outer[1]),
    }

    frame.render_widget(KeybindBar, outer[3]);
}
