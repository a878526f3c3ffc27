use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::geometry::{AUTO_ROW, GridRect};

/// Default column/row span for freshly added blocks.
pub const DEFAULT_SPAN: u16 = 3;

/// Column constant used for initial x placement. Placement always staggers
/// against 12 columns even when the responsive column count is lower; the
/// layout engine repacks on the first pass.
pub const PLACEMENT_COLUMNS: u16 = 12;

/// Session-unique block identifier derived from the creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(u64);

impl BlockId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a block renders. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Image,
    BarChart,
    LineChart,
    PieChart,
}

impl BlockKind {
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Image => "image",
            BlockKind::BarChart => "bar-chart",
            BlockKind::LineChart => "line-chart",
            BlockKind::PieChart => "pie-chart",
        }
    }

    pub fn is_chart(&self) -> bool {
        !matches!(self, BlockKind::Image)
    }
}

/// A single placed widget on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub rect: GridRect,
}

/// Millisecond-timestamp id source. Two adds inside the same millisecond
/// bump past the collision, so ids stay unique and monotonically increasing
/// for the session.
#[derive(Debug, Default)]
struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn next(&mut self) -> BlockId {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        BlockId(id)
    }
}

/// Ordered collection of blocks. Geometry mutation happens only through the
/// layout synchronizer; the store itself exposes append and filter.
#[derive(Debug, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
    ids: IdGenerator,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new block: default 3×3 span, x staggered across the
    /// placement columns, row left to the layout engine via [`AUTO_ROW`].
    pub fn add(&mut self, kind: BlockKind) -> BlockId {
        let id = self.ids.next();
        let x = ((self.blocks.len() as u16).wrapping_mul(2)) % PLACEMENT_COLUMNS;
        self.blocks.push(Block {
            id,
            kind,
            rect: GridRect::new(x, AUTO_ROW, DEFAULT_SPAN, DEFAULT_SPAN),
        });
        id
    }

    /// Remove by identity. Absent ids are a no-op, not an error; survivor
    /// order is preserved.
    pub fn remove(&mut self, id: BlockId) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|block| block.id != id);
        self.blocks.len() != before
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn find_by_id_str(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id.to_string() == id)
    }

    pub fn newest(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Atomic swap used by the synchronizer: callers observe either the old
    /// set or the fully reconciled one, never a partial merge.
    pub(crate) fn replace_all(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_staggers_x_and_leaves_row_auto() {
        let mut store = BlockStore::new();
        for _ in 0..8 {
            store.add(BlockKind::Image);
        }
        for (idx, block) in store.iter().enumerate() {
            assert_eq!(block.rect.x, ((idx as u16) * 2) % PLACEMENT_COLUMNS);
            assert_eq!(block.rect.y, AUTO_ROW);
            assert_eq!(block.rect.w, DEFAULT_SPAN);
            assert_eq!(block.rect.h, DEFAULT_SPAN);
        }
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut store = BlockStore::new();
        let ids: Vec<_> = (0..64).map(|_| store.add(BlockKind::BarChart)).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn remove_filters_by_identity() {
        let mut store = BlockStore::new();
        let first = store.add(BlockKind::Image);
        let second = store.add(BlockKind::PieChart);
        assert!(store.remove(first));
        assert_eq!(store.len(), 1);
        assert_eq!(store.blocks()[0].id, second);
    }

    #[test]
    fn remove_absent_id_is_noop() {
        let mut store = BlockStore::new();
        store.add(BlockKind::LineChart);
        let before = store.blocks().to_vec();
        assert!(!store.remove(BlockId::from_raw(1)));
        assert_eq!(store.blocks(), before.as_slice());
    }

    #[test]
    fn add_then_remove_round_trips_by_value() {
        let mut store = BlockStore::new();
        store.add(BlockKind::Image);
        let before = store.blocks().to_vec();
        let id = store.add(BlockKind::BarChart);
        assert!(store.remove(id));
        assert_eq!(store.blocks(), before.as_slice());
    }

    #[test]
    fn size_tracks_adds_minus_removes() {
        let mut store = BlockStore::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.add(BlockKind::LineChart));
        }
        store.remove(ids[1]);
        store.remove(ids[3]);
        store.remove(BlockId::from_raw(7));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn kind_survives_round_trip_lookup() {
        let mut store = BlockStore::new();
        let id = store.add(BlockKind::PieChart);
        assert_eq!(store.get(id).unwrap().kind, BlockKind::PieChart);
        assert!(store.find_by_id_str(&id.to_string()).is_some());
    }
}
