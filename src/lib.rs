//! Gridboard: a block-dashboard editor core for the terminal.
//!
//! Blocks (image placeholders and bar/line/pie charts) live on a responsive
//! grid. The crate owns the state model — the block store, the viewport
//! tracker, and the layout synchronizer — and treats the interactive layout
//! engine and chart rendering as external collaborators behind typed seams.

pub mod block;
pub mod board;
pub mod chart;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod viewport;
pub mod width;

pub use block::{Block, BlockId, BlockKind, BlockStore, DEFAULT_SPAN, PLACEMENT_COLUMNS};
pub use board::driver::{BoardDriver, CELL_PX, DriverError, DriverResult};
pub use board::{Board, BoardConfig, BoardEvent};
pub use chart::{AnsiChartBackend, ChartBackend, ChartPoint, ChartSpec, SAMPLE_SERIES};
pub use error::{BoardError, Result};
pub use geometry::{AUTO_ROW, GridRect, PixelSize, Size};
pub use layout::{GridPacker, LayoutEntry, ParsedLayout, ReconcileReport, layout_view, parse_layout_payload, reconcile};
pub use logging::{FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult, MemorySink};
pub use metrics::{BoardMetrics, MetricSnapshot};
pub use render::{BoardRenderer, RendererSettings, TermRect};
pub use viewport::{ResizeRelay, ResizeSubscription, SharedResizeRelay, ViewportTracker, columns_for_width};
pub use width::display_width;
