use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{Block, BlockStore};
use crate::error::{BoardError, Result};
use crate::geometry::{AUTO_ROW, GridRect};

/// One block's geometry as the layout engine sees it: id flattened to a
/// string, position and span in grid units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    #[serde(rename = "i")]
    pub id: String,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl LayoutEntry {
    pub fn from_block(block: &Block) -> Self {
        Self {
            id: block.id.to_string(),
            x: block.rect.x,
            y: block.rect.y,
            w: block.rect.w,
            h: block.rect.h,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }
}

/// Derive the engine-facing view of the store, in store order.
pub fn layout_view(store: &BlockStore) -> Vec<LayoutEntry> {
    store.iter().map(LayoutEntry::from_block).collect()
}

/// Outcome of typing a loose callback payload at the boundary. Entries that
/// fail validation land in `rejected` with a reason instead of being trusted
/// silently; the caller decides how loudly to complain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLayout {
    pub entries: Vec<LayoutEntry>,
    pub rejected: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct RawEntry {
    i: String,
    x: u64,
    y: u64,
    w: u64,
    h: u64,
}

/// Parse a layout-engine callback payload: a JSON array of
/// `{ i, x, y, w, h }` objects. A non-array payload is an error; individual
/// entries with missing fields, non-numeric values, zero spans, or
/// out-of-range positions are rejected entry by entry.
pub fn parse_layout_payload(payload: &Value) -> Result<ParsedLayout> {
    let items = payload
        .as_array()
        .ok_or(BoardError::MalformedLayoutPayload)?;

    let mut entries = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();

    for item in items {
        let label = item
            .get("i")
            .and_then(Value::as_str)
            .unwrap_or("<missing id>")
            .to_string();
        match serde_json::from_value::<RawEntry>(item.clone()) {
            Ok(raw) => match validate_entry(raw) {
                Ok(entry) => entries.push(entry),
                Err(reason) => rejected.push((label, reason)),
            },
            Err(err) => rejected.push((label, err.to_string())),
        }
    }

    Ok(ParsedLayout { entries, rejected })
}

fn validate_entry(raw: RawEntry) -> std::result::Result<LayoutEntry, String> {
    if raw.w == 0 || raw.h == 0 {
        return Err(format!("zero span {}x{}", raw.w, raw.h));
    }
    if raw.w > u16::MAX as u64 || raw.h > u16::MAX as u64 {
        return Err(format!("span {}x{} out of range", raw.w, raw.h));
    }
    if raw.x > u16::MAX as u64 {
        return Err(format!("column offset {} out of range", raw.x));
    }
    // Rows at or beyond the sentinel collapse onto it: the engine is asking
    // for auto placement either way.
    let y = raw.y.min(AUTO_ROW as u64) as u16;
    Ok(LayoutEntry {
        id: raw.i,
        x: raw.x as u16,
        y,
        w: raw.w as u16,
        h: raw.h as u16,
    })
}
