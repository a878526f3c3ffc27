use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated over a board session.
#[derive(Debug, Default, Clone)]
pub struct BoardMetrics {
    events: u64,
    blocks_added: u64,
    blocks_removed: u64,
    reconciles: u64,
    blocks_dropped: u64,
    resizes: u64,
    renders: u64,
}

impl BoardMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_add(&mut self) {
        self.blocks_added = self.blocks_added.saturating_add(1);
    }

    pub fn record_remove(&mut self) {
        self.blocks_removed = self.blocks_removed.saturating_add(1);
    }

    pub fn record_reconcile(&mut self, dropped: usize) {
        self.reconciles = self.reconciles.saturating_add(1);
        self.blocks_dropped = self.blocks_dropped.saturating_add(dropped as u64);
    }

    pub fn record_resize(&mut self) {
        self.resizes = self.resizes.saturating_add(1);
    }

    pub fn record_render(&mut self) {
        self.renders = self.renders.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            events: self.events,
            blocks_added: self.blocks_added,
            blocks_removed: self.blocks_removed,
            reconciles: self.reconciles,
            blocks_dropped: self.blocks_dropped,
            resizes: self.resizes,
            renders: self.renders,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub events: u64,
    pub blocks_added: u64,
    pub blocks_removed: u64,
    pub reconciles: u64,
    pub blocks_dropped: u64,
    pub resizes: u64,
    pub renders: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        let mut fields = LogFields::new();
        fields.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        fields.insert("events".to_string(), json!(self.events));
        fields.insert("blocks_added".to_string(), json!(self.blocks_added));
        fields.insert("blocks_removed".to_string(), json!(self.blocks_removed));
        fields.insert("reconciles".to_string(), json!(self.reconciles));
        fields.insert("blocks_dropped".to_string(), json!(self.blocks_dropped));
        fields.insert("resizes".to_string(), json!(self.resizes));
        fields.insert("renders".to_string(), json!(self.renders));
        LogEvent::with_fields(LogLevel::Info, target, "board_metrics", fields)
    }
}
