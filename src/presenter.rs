//! Builds the declarative plot description handed to the renderer.
//!
//! The description is rebuilt wholesale on every update and serializes to a
//! Plotly-compatible `{data, layout}` object. Reusing one plot instance on the
//! rendering side keeps updates flicker-free; nothing here diffs.

use serde::{Deserialize, Serialize};

use crate::model::price_point::PricePoint;
use crate::model::snapshot::ConfigSnapshot;

/// Intrinsic height of the loading placeholder, reported before the first
/// configuration arrives.
pub const LOADING_HEIGHT: u32 = 60;

pub const LIVE_SERIES_NAME: &str = "Price";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderFrame {
    Loading,
    Plot(PlotDescription),
}

impl RenderFrame {
    /// Height the host frame should size itself to.
    pub fn frame_height(&self) -> u32 {
        match self {
            RenderFrame::Loading => LOADING_HEIGHT,
            RenderFrame::Plot(plot) => plot.layout.height,
        }
    }

    pub fn plot(&self) -> Option<&PlotDescription> {
        match self {
            RenderFrame::Plot(plot) => Some(plot),
            RenderFrame::Loading => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotDescription {
    pub data: Vec<Trace>,
    pub layout: PlotLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<PriceChange>,
}

impl PlotDescription {
    pub fn live(&self) -> &Trace {
        &self.data[0]
    }

    pub fn reference(&self) -> &Trace {
        &self.data[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub line: LineStyle,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub dash: LineDash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotLayout {
    pub height: u32,
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub legend: Legend,
    pub hovermode: &'static str,
    pub showlegend: bool,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<AxisSide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    /// Korean market convention: rising red, falling blue.
    pub fn color(self) -> &'static str {
        match self {
            Direction::Up => "#FF4444",
            Direction::Down => "#4444FF",
            Direction::Flat => "#666666",
        }
    }
}

/// Last price measured against the reference price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub last: f64,
    pub amount: f64,
    pub percent: f64,
    pub direction: Direction,
    /// `direction.color()`, carried so hosts need no palette of their own.
    pub color: &'static str,
}

impl PriceChange {
    pub fn between(last: f64, reference: f64) -> Self {
        let amount = last - reference;
        let percent = if reference == 0.0 {
            0.0
        } else {
            amount / reference * 100.0
        };
        let direction = if percent > 0.0 {
            Direction::Up
        } else if percent < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        };
        Self {
            last,
            amount,
            percent,
            direction,
            color: direction.color(),
        }
    }
}

/// Colours and axis titles of the plot. Read from the `[chart]` config
/// section; anything left out falls back to the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub live_color: String,
    pub reference_color: String,
    pub x_title: String,
    pub y_title: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            live_color: "#1f77b4".to_string(),
            reference_color: "orange".to_string(),
            x_title: "Time".to_string(),
            y_title: "Price".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChartPresenter {
    style: ChartStyle,
}

impl ChartPresenter {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }

    /// Pure function of the latest configuration and a buffer copy.
    pub fn present(&self, config: Option<&ConfigSnapshot>, points: &[PricePoint]) -> RenderFrame {
        let Some(config) = config else {
            return RenderFrame::Loading;
        };

        let x: Vec<String> = points.iter().map(|p| p.time.clone()).collect();
        let y: Vec<f64> = points.iter().map(|p| p.price).collect();
        let reference = config.reference_price();

        let live = Trace {
            kind: "scatter",
            mode: "lines",
            name: LIVE_SERIES_NAME.to_string(),
            x: x.clone(),
            y,
            line: LineStyle {
                color: self.style.live_color.clone(),
                width: 2.0,
                dash: LineDash::Solid,
            },
            hovertemplate: "%{y:,.0f}<extra></extra>",
        };
        let reference_trace = Trace {
            kind: "scatter",
            mode: "lines",
            name: reference_label(reference),
            y: vec![reference; x.len()],
            x,
            line: LineStyle {
                color: self.style.reference_color.clone(),
                width: 1.0,
                dash: LineDash::Dash,
            },
            hovertemplate: "%{y:,.0f}<extra></extra>",
        };

        let layout = PlotLayout {
            height: config.height(),
            title: Title {
                text: title_text(config),
            },
            xaxis: Axis {
                title: Title {
                    text: self.style.x_title.clone(),
                },
                tickformat: None,
                side: None,
            },
            yaxis: Axis {
                title: Title {
                    text: self.style.y_title.clone(),
                },
                tickformat: Some(",d"),
                side: Some(AxisSide::Right),
            },
            legend: Legend {
                x: 0.0,
                y: 1.0,
                xanchor: "left",
                yanchor: "top",
            },
            hovermode: "x unified",
            showlegend: true,
            margin: Margin {
                l: 10,
                r: 10,
                t: 40,
                b: 40,
            },
        };

        let change = points
            .last()
            .map(|p| PriceChange::between(p.price, reference));

        RenderFrame::Plot(PlotDescription {
            data: vec![live, reference_trace],
            layout,
            change,
        })
    }
}

fn title_text(config: &ConfigSnapshot) -> String {
    if config.stock_name().trim().is_empty() {
        config.stock_code().to_string()
    } else {
        format!("{} ({})", config.stock_name(), config.stock_code())
    }
}

pub fn reference_label(reference: f64) -> String {
    format!("Avg {}", format_grouped(reference))
}

/// Round to an integer and group thousands with commas: `-1234567.6` ->
/// `-1,234,568`.
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
