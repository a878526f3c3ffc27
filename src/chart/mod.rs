mod core;

pub use core::{
    AnsiChartBackend, CHART_PX_PER_COL, CHART_PX_PER_ROW, ChartBackend, ChartPoint, ChartSpec,
    SAMPLE_SERIES,
};
