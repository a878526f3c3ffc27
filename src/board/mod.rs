use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::block::{Block, BlockId, BlockKind, BlockStore};
use crate::chart::{AnsiChartBackend, ChartBackend, ChartSpec};
use crate::error::Result;
use crate::geometry::{GridRect, Size};
use crate::layout::{GridPacker, LayoutEntry, ReconcileReport, layout_view, parse_layout_payload, reconcile};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::BoardMetrics;
use crate::render::BoardRenderer;
use crate::viewport::{ResizeSubscription, SharedResizeRelay, ViewportTracker};

pub mod driver;

/// Configuration knobs for a board session.
#[derive(Clone)]
pub struct BoardConfig {
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Metrics accumulator for periodic snapshots.
    pub metrics: Option<Arc<Mutex<BoardMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "board::metrics".to_string(),
        }
    }
}

impl BoardConfig {
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(BoardMetrics::new())));
        }
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<BoardMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Discrete board mutations. Each one runs to completion before the next;
/// there is no concurrent dispatch.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    /// Toolbar action: append a block of the given kind.
    Add(BlockKind),
    /// Per-block action: remove by identity.
    Remove(BlockId),
    /// Typed layout-engine callback.
    LayoutChange(Vec<LayoutEntry>),
    /// Raw layout-engine callback, typed at the boundary before use.
    LayoutPayload(Value),
    /// New viewport width in pixels.
    Resize(u32),
}

/// The dashboard controller: block store, viewport tracker, and layout
/// synchronizer behind one dispatch surface.
pub struct Board {
    store: BlockStore,
    viewport: ViewportTracker,
    renderer: BoardRenderer,
    chart_backend: Box<dyn ChartBackend>,
    config: BoardConfig,
    subscription: Option<ResizeSubscription>,
    redraw_requested: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl Board {
    pub fn new(initial_width: u32) -> Self {
        Self {
            store: BlockStore::new(),
            viewport: ViewportTracker::new(initial_width),
            renderer: BoardRenderer::with_default(),
            chart_backend: Box::new(AnsiChartBackend),
            config: BoardConfig::default(),
            subscription: None,
            redraw_requested: true,
            start_instant: None,
            last_metrics_emit: None,
        }
    }

    pub fn with_chart_backend<B>(mut self, backend: B) -> Self
    where
        B: ChartBackend + 'static,
    {
        self.chart_backend = Box::new(backend);
        self
    }

    pub fn config_mut(&mut self) -> &mut BoardConfig {
        &mut self.config
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn columns(&self) -> u16 {
        self.viewport.columns()
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport.width()
    }

    /// Acquire a resize subscription on the relay. Replacing an earlier
    /// subscription drops it, which deregisters it from the relay.
    pub fn attach_resize_relay(&mut self, relay: &SharedResizeRelay) {
        self.subscription = Some(relay.subscribe());
    }

    /// Release the resize subscription explicitly. Dropping the board does
    /// the same.
    pub fn detach_resize_relay(&mut self) {
        self.subscription = None;
    }

    /// Apply the most recently published width, if any arrived since the
    /// last poll.
    pub fn poll_resize(&mut self) -> Result<()> {
        let latest = self.subscription.as_ref().and_then(|sub| sub.latest());
        if let Some(width) = latest {
            self.dispatch(BoardEvent::Resize(width))?;
        }
        Ok(())
    }

    pub fn dispatch(&mut self, event: BoardEvent) -> Result<()> {
        self.record_metric(|m| m.record_event());
        match event {
            BoardEvent::Add(kind) => self.handle_add(kind),
            BoardEvent::Remove(id) => self.handle_remove(id),
            BoardEvent::LayoutChange(entries) => {
                self.apply_layout(&entries);
            }
            BoardEvent::LayoutPayload(payload) => self.handle_payload(&payload)?,
            BoardEvent::Resize(width) => self.handle_resize(width),
        }
        self.maybe_emit_metrics();
        Ok(())
    }

    /// Resolve every auto-placed block to a concrete row through the
    /// built-in packer, feeding the result down the normal reconcile path.
    /// Stands in for an interactive layout engine's first placement pass.
    pub fn auto_place(&mut self) -> ReconcileReport {
        let packer = GridPacker::new(self.viewport.columns());
        let packed = packer.pack(&layout_view(&self.store));
        self.apply_layout(&packed)
    }

    fn handle_add(&mut self, kind: BlockKind) {
        let id = self.store.add(kind);
        self.record_metric(|m| m.record_add());
        self.redraw_requested = true;
        self.log(
            LogLevel::Info,
            "board::store",
            "block_added",
            [
                json_kv("id", json!(id.to_string())),
                json_kv("kind", json!(kind.label())),
            ],
        );
    }

    fn handle_remove(&mut self, id: BlockId) {
        let removed = self.store.remove(id);
        if removed {
            self.record_metric(|m| m.record_remove());
            self.redraw_requested = true;
        }
        self.log(
            LogLevel::Info,
            "board::store",
            "block_removed",
            [
                json_kv("id", json!(id.to_string())),
                json_kv("removed", json!(removed)),
            ],
        );
    }

    fn handle_payload(&mut self, payload: &Value) -> Result<()> {
        let parsed = parse_layout_payload(payload)?;
        for (id, reason) in &parsed.rejected {
            self.log(
                LogLevel::Warn,
                "board::layout",
                "entry_rejected",
                [
                    json_kv("id", json!(id)),
                    json_kv("reason", json!(reason)),
                ],
            );
        }
        self.apply_layout(&parsed.entries);
        Ok(())
    }

    fn apply_layout(&mut self, entries: &[LayoutEntry]) -> ReconcileReport {
        let report = reconcile(&mut self.store, entries);
        self.record_metric(|m| m.record_reconcile(report.dropped.len()));
        self.redraw_requested = true;

        for id in &report.dropped {
            self.log(
                LogLevel::Warn,
                "board::layout",
                "block_dropped",
                [json_kv("id", json!(id.to_string()))],
            );
        }
        for id in &report.unknown {
            self.log(
                LogLevel::Warn,
                "board::layout",
                "unknown_entry_skipped",
                [json_kv("id", json!(id))],
            );
        }
        self.log(
            LogLevel::Debug,
            "board::layout",
            "layout_reconciled",
            [
                json_kv("merged", json!(report.merged)),
                json_kv("dropped", json!(report.dropped.len())),
                json_kv("unknown", json!(report.unknown.len())),
            ],
        );
        report
    }

    fn handle_resize(&mut self, width: u32) {
        self.viewport.observe(width);
        self.record_metric(|m| m.record_resize());
        // Column width in terminal cells changes with the column count, so
        // every surface has to move.
        self.renderer.invalidate();
        self.redraw_requested = true;
        self.log(
            LogLevel::Info,
            "board::viewport",
            "resized",
            [
                json_kv("width_px", json!(width)),
                json_kv("columns", json!(self.viewport.columns())),
            ],
        );
    }

    pub fn render_if_needed(&mut self, writer: &mut impl std::io::Write, term: Size) -> Result<()> {
        if !self.redraw_requested {
            return Ok(());
        }
        self.redraw_requested = false;

        let columns = self.viewport.columns();
        let mut frames: Vec<(BlockId, GridRect, String)> = Vec::with_capacity(self.store.len());
        for block in self.store.iter() {
            let Some(area) = self.renderer.term_rect(&block.rect, term, columns) else {
                continue;
            };
            let content = compose_content(block, Size::new(area.width, area.height), self.chart_backend.as_ref())?;
            frames.push((block.id, block.rect, content));
        }

        let painted = self.renderer.render(writer, term, columns, &frames)?;
        if painted > 0 {
            self.record_metric(|m| m.record_render());
            self.log(
                LogLevel::Debug,
                "board::render",
                "frame_painted",
                [json_kv("surfaces", json!(painted))],
            );
        }
        Ok(())
    }

    /// Replay an explicit event sequence, painting after each one.
    pub fn run_scripted<I>(
        &mut self,
        writer: &mut impl std::io::Write,
        term: Size,
        events: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = BoardEvent>,
    {
        self.bootstrap();
        for event in events {
            self.dispatch(event)?;
            self.render_if_needed(writer, term)?;
        }
        self.finalize();
        Ok(())
    }

    fn bootstrap(&mut self) {
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.redraw_requested = true;
        self.log(
            LogLevel::Info,
            "board::session",
            "board_started",
            [
                json_kv("blocks", json!(self.store.len())),
                json_kv("columns", json!(self.viewport.columns())),
            ],
        );
    }

    fn finalize(&mut self) {
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log(
            LogLevel::Info,
            "board::session",
            "board_stopped",
            [json_kv("uptime_ms", json!(uptime_ms))],
        );
    }

    fn log<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, target, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn record_metric(&self, f: impl FnOnce(&mut BoardMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                f(&mut guard);
            }
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() || self.config.metrics_interval.is_zero() {
            return;
        }
        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => return,
            _ => self.last_metrics_emit = Some(now),
        }
        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();
        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let event = guard
                    .snapshot(uptime)
                    .to_log_event(&self.config.metrics_target);
                let _ = logger.log_event(event);
            }
        }
    }
}

fn compose_content(block: &Block, area: Size, backend: &dyn ChartBackend) -> Result<String> {
    let title = format!("[{}]", block.kind.label());
    let body = match ChartSpec::for_block(block) {
        Some(spec) => {
            let body_area = Size::new(area.width, area.height.saturating_sub(1));
            backend.render(&spec, body_area)?
        }
        None => "placeholder".to_string(),
    };
    Ok(format!("{}\n{}", title, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AUTO_ROW;
    use crate::logging::MemorySink;

    fn add_events(n: usize) -> Vec<BoardEvent> {
        (0..n).map(|_| BoardEvent::Add(BlockKind::BarChart)).collect()
    }

    #[test]
    fn adds_without_layout_events_keep_sentinel_rows() {
        let mut board = Board::new(1200);
        for event in add_events(4) {
            board.dispatch(event).unwrap();
        }
        for (idx, block) in board.store().iter().enumerate() {
            assert_eq!(block.rect.y, AUTO_ROW);
            assert_eq!(block.rect.x, ((idx as u16) * 2) % 12);
        }
    }

    #[test]
    fn auto_place_resolves_sentinels_via_reconcile() {
        let mut board = Board::new(1200);
        for event in add_events(3) {
            board.dispatch(event).unwrap();
        }
        let report = board.auto_place();
        assert_eq!(report.merged, 3);
        assert!(report.is_clean());
        assert!(board.store().iter().all(|b| b.rect.y != AUTO_ROW));
    }

    #[test]
    fn resize_recomputes_columns() {
        let mut board = Board::new(1200);
        assert_eq!(board.columns(), 12);
        board.dispatch(BoardEvent::Resize(800)).unwrap();
        assert_eq!(board.columns(), 8);
        assert_eq!(board.viewport_width(), 800);
    }

    #[test]
    fn subset_payload_drops_and_logs() {
        let sink = MemorySink::new();
        let mut board = Board::new(1200);
        board.config_mut().logger = Some(Logger::new(Arc::clone(&sink)));

        board.dispatch(BoardEvent::Add(BlockKind::Image)).unwrap();
        board.dispatch(BoardEvent::Add(BlockKind::PieChart)).unwrap();
        let keep = board.store().blocks()[1].clone();

        let payload = json!([
            { "i": keep.id.to_string(), "x": 0, "y": 0, "w": 4, "h": 2 }
        ]);
        board.dispatch(BoardEvent::LayoutPayload(payload)).unwrap();

        assert_eq!(board.store().len(), 1);
        let survivor = &board.store().blocks()[0];
        assert_eq!(survivor.id, keep.id);
        assert_eq!(survivor.kind, BlockKind::PieChart);
        assert_eq!(survivor.rect, GridRect::new(0, 0, 4, 2));

        let events = sink.events();
        assert!(events.iter().any(|e| e.message == "block_dropped"));
    }

    #[test]
    fn rejected_entries_are_logged_not_trusted() {
        let sink = MemorySink::new();
        let mut board = Board::new(1200);
        board.config_mut().logger = Some(Logger::new(Arc::clone(&sink)));

        board.dispatch(BoardEvent::Add(BlockKind::Image)).unwrap();
        let id = board.store().blocks()[0].id;
        let payload = json!([
            { "i": id.to_string(), "x": 0, "y": 0, "w": 3, "h": 3 },
            { "i": "bogus", "x": 0, "y": 0, "w": 0, "h": 0 }
        ]);
        board.dispatch(BoardEvent::LayoutPayload(payload)).unwrap();

        assert_eq!(board.store().len(), 1);
        assert!(sink.events().iter().any(|e| e.message == "entry_rejected"));
    }

    #[test]
    fn scripted_session_paints_placed_blocks() {
        let mut board = Board::new(1200);
        let mut out = Vec::new();
        board
            .run_scripted(
                &mut out,
                Size::new(120, 40),
                vec![BoardEvent::Add(BlockKind::BarChart)],
            )
            .unwrap();
        // Still auto-placed, nothing painted yet.
        assert!(out.is_empty());

        board.auto_place();
        let mut out = Vec::new();
        board.render_if_needed(&mut out, Size::new(120, 40)).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("[bar-chart]"));
    }

    #[test]
    fn store_size_tracks_adds_minus_removes() {
        let mut board = Board::new(1200);
        for event in add_events(6) {
            board.dispatch(event).unwrap();
        }
        let ids: Vec<BlockId> = board.store().iter().map(|b| b.id).collect();
        board.dispatch(BoardEvent::Remove(ids[0])).unwrap();
        board.dispatch(BoardEvent::Remove(ids[5])).unwrap();
        board
            .dispatch(BoardEvent::Remove(BlockId::from_raw(3)))
            .unwrap();
        assert_eq!(board.store().len(), 4);
    }

    #[test]
    fn relay_resize_flows_through_poll() {
        let relay = crate::viewport::ResizeRelay::new();
        let mut board = Board::new(500);
        board.attach_resize_relay(&relay);
        relay.publish(1300);
        board.poll_resize().unwrap();
        assert_eq!(board.columns(), 12);

        board.detach_resize_relay();
        assert_eq!(relay.subscriber_count(), 0);
        relay.publish(400);
        board.poll_resize().unwrap();
        assert_eq!(board.columns(), 12);
    }

    #[test]
    fn metrics_accumulate_over_dispatch() {
        let mut board = Board::new(1200);
        board.config_mut().enable_metrics();
        let handle = board.config_mut().metrics_handle().unwrap();

        board.dispatch(BoardEvent::Add(BlockKind::Image)).unwrap();
        let id = board.store().blocks()[0].id;
        board.dispatch(BoardEvent::Remove(id)).unwrap();
        board.dispatch(BoardEvent::Resize(700)).unwrap();

        let snap = handle.lock().unwrap().snapshot(Duration::ZERO);
        assert_eq!(snap.events, 3);
        assert_eq!(snap.blocks_added, 1);
        assert_eq!(snap.blocks_removed, 1);
        assert_eq!(snap.resizes, 1);
    }
}
