use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, RwLock};

/// Responsive column count for a viewport width in pixels. Both breakpoints
/// are strict greater-than: 1024 px itself still yields 8 columns, 768 px
/// still yields 4.
pub fn columns_for_width(width: u32) -> u16 {
    if width > 1024 {
        12
    } else if width > 768 {
        8
    } else {
        4
    }
}

/// Latest observed viewport width. Every observation recomputes columns
/// immediately; there is no debounce or hysteresis.
#[derive(Debug, Clone, Copy)]
pub struct ViewportTracker {
    width: u32,
}

impl ViewportTracker {
    pub fn new(initial_width: u32) -> Self {
        Self {
            width: initial_width,
        }
    }

    pub fn observe(&mut self, width: u32) {
        self.width = width;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn columns(&self) -> u16 {
        columns_for_width(self.width)
    }
}

/// Fan-out point for viewport width changes. Subscribers hold a
/// [`ResizeSubscription`] guard; dropping the guard deregisters the receiver
/// so remounting a board never leaks a stale listener.
#[derive(Default)]
pub struct ResizeRelay {
    senders: RwLock<HashMap<u64, Sender<u32>>>,
    next_id: AtomicU64,
}

pub type SharedResizeRelay = Arc<ResizeRelay>;

impl ResizeRelay {
    pub fn new() -> SharedResizeRelay {
        Arc::new(Self::default())
    }

    pub fn subscribe(self: &Arc<Self>) -> ResizeSubscription {
        let (tx, rx) = channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.senders.write() {
            guard.insert(id, tx);
        }
        ResizeSubscription {
            id,
            relay: Arc::clone(self),
            rx,
        }
    }

    /// Deliver a new width to every live subscriber. Receivers that vanished
    /// without dropping their guard are simply skipped.
    pub fn publish(&self, width: u32) {
        if let Ok(guard) = self.senders.read() {
            for sender in guard.values() {
                let _ = sender.send(width);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.read().map(|guard| guard.len()).unwrap_or(0)
    }

    fn unsubscribe(&self, id: u64) {
        if let Ok(mut guard) = self.senders.write() {
            guard.remove(&id);
        }
    }
}

/// Scoped resize listener. Alive: widths published on the relay queue up
/// here. Dropped: the relay forgets the receiver.
pub struct ResizeSubscription {
    id: u64,
    relay: SharedResizeRelay,
    rx: Receiver<u32>,
}

impl ResizeSubscription {
    /// Drain queued widths, returning only the most recent one.
    pub fn latest(&self) -> Option<u32> {
        let mut latest = None;
        while let Ok(width) = self.rx.try_recv() {
            latest = Some(width);
        }
        latest
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.relay.unsubscribe(self.id);
    }
}
