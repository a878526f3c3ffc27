use crate::block::{Block, BlockKind};
use crate::error::Result;
use crate::geometry::{PixelSize, Size};

/// Pixel width contributed by one grid column.
pub const CHART_PX_PER_COL: u32 = 50;
/// Pixel height contributed by one grid row.
pub const CHART_PX_PER_ROW: u32 = 40;

/// One labeled sample. Charts have no user-supplied data path; every chart
/// block renders the same fixed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: &'static str,
    pub value: u32,
}

pub const SAMPLE_SERIES: [ChartPoint; 5] = [
    ChartPoint {
        label: "A",
        value: 30,
    },
    ChartPoint {
        label: "B",
        value: 80,
    },
    ChartPoint {
        label: "C",
        value: 45,
    },
    ChartPoint {
        label: "D",
        value: 60,
    },
    ChartPoint {
        label: "E",
        value: 20,
    },
];

/// Everything handed across the chart boundary: the chart flavour, its
/// series, and pixel dimensions derived from the block's grid span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: BlockKind,
    pub pixels: PixelSize,
    pub points: &'static [ChartPoint],
}

impl ChartSpec {
    /// Derive a spec for a chart block; image blocks carry no chart.
    pub fn for_block(block: &Block) -> Option<Self> {
        if !block.kind.is_chart() {
            return None;
        }
        Some(Self {
            kind: block.kind,
            pixels: PixelSize::new(
                u32::from(block.rect.w) * CHART_PX_PER_COL,
                u32::from(block.rect.h) * CHART_PX_PER_ROW,
            ),
            points: &SAMPLE_SERIES,
        })
    }
}

/// External collaborator seam: turns a spec into text for a terminal cell
/// area. The chart math behind each flavour belongs to the backend, not to
/// the board.
pub trait ChartBackend {
    fn render(&self, spec: &ChartSpec, area: Size) -> Result<String>;
}

/// Built-in text backend so the CLI driver has something to paint. Bars and
/// legends use ANSI colour; callers measure display width after stripping
/// escapes.
#[derive(Debug, Default)]
pub struct AnsiChartBackend;

const BAR_COLOR: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

impl ChartBackend for AnsiChartBackend {
    fn render(&self, spec: &ChartSpec, area: Size) -> Result<String> {
        let text = match spec.kind {
            BlockKind::BarChart => render_bars(spec.points, area),
            BlockKind::LineChart => render_line(spec.points, area),
            BlockKind::PieChart => render_pie(spec.points),
            BlockKind::Image => String::new(),
        };
        Ok(text)
    }
}

fn render_bars(points: &[ChartPoint], area: Size) -> String {
    let max = points.iter().map(|p| p.value).max().unwrap_or(1).max(1);
    let track = area.width.saturating_sub(8).max(4) as u32;
    points
        .iter()
        .map(|point| {
            let filled = (point.value * track / max) as usize;
            format!(
                "{} {}{}{} {}",
                point.label,
                BAR_COLOR,
                "█".repeat(filled.max(1)),
                RESET,
                point.value
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(points: &[ChartPoint], area: Size) -> String {
    let rows = area.height.max(2) as u32;
    let max = points.iter().map(|p| p.value).max().unwrap_or(1).max(1);
    let mut lines = Vec::with_capacity(rows as usize);
    for row in (0..rows).rev() {
        let threshold = max * row / rows;
        let line: String = points
            .iter()
            .map(|point| if point.value > threshold { " ● " } else { "   " })
            .collect();
        lines.push(line);
    }
    lines.push(points.iter().map(|p| format!(" {} ", p.label)).collect());
    lines.join("\n")
}

fn render_pie(points: &[ChartPoint]) -> String {
    let total: u32 = points.iter().map(|p| p.value).sum();
    let total = total.max(1);
    points
        .iter()
        .map(|point| {
            let pct = point.value * 100 / total;
            format!("{} {}{}{} {}%", point.label, BAR_COLOR, "◼", RESET, pct)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
