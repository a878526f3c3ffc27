mod core;

pub use core::{Block, BlockId, BlockKind, BlockStore, DEFAULT_SPAN, PLACEMENT_COLUMNS};
