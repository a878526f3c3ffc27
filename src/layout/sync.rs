use crate::block::{Block, BlockId, BlockStore};
use crate::layout::LayoutEntry;

/// What a reconcile pass did, for the caller's logs and metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Blocks whose geometry was merged from the payload.
    pub merged: usize,
    /// Store blocks absent from the payload, dropped from the store.
    pub dropped: Vec<BlockId>,
    /// Payload ids with no matching store block, skipped.
    pub unknown: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.unknown.is_empty()
    }
}

/// Merge a full engine layout back into the store.
///
/// Membership of the result equals the payload's membership: each entry is
/// matched to a store block by id string, geometry merged, `kind` preserved,
/// result ordered by the payload. Store blocks the payload does not mention
/// are dropped; payload ids the store does not know are skipped. The store
/// is swapped wholesale, so observers see the old set or the reconciled set,
/// never a partial merge.
pub fn reconcile(store: &mut BlockStore, entries: &[LayoutEntry]) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut next = Vec::with_capacity(entries.len());

    for entry in entries {
        match store.find_by_id_str(&entry.id) {
            Some(block) => {
                next.push(Block {
                    id: block.id,
                    kind: block.kind,
                    rect: entry.rect(),
                });
                report.merged += 1;
            }
            None => report.unknown.push(entry.id.clone()),
        }
    }

    for block in store.iter() {
        let survives = entries.iter().any(|entry| entry.id == block.id.to_string());
        if !survives {
            report.dropped.push(block.id);
        }
    }

    store.replace_all(next);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::geometry::GridRect;

    fn entry(id: &str, x: u16, y: u16, w: u16, h: u16) -> LayoutEntry {
        LayoutEntry {
            id: id.to_string(),
            x,
            y,
            w,
            h,
        }
    }

    #[test]
    fn merges_geometry_and_preserves_kind() {
        let mut store = BlockStore::new();
        let id = store.add(BlockKind::PieChart);
        let report = reconcile(&mut store, &[entry(&id.to_string(), 4, 2, 6, 5)]);

        assert_eq!(report.merged, 1);
        assert!(report.is_clean());
        let block = store.get(id).unwrap();
        assert_eq!(block.kind, BlockKind::PieChart);
        assert_eq!(block.rect, GridRect::new(4, 2, 6, 5));
    }

    #[test]
    fn subset_payload_drops_unmentioned_blocks() {
        let mut store = BlockStore::new();
        let keep = store.add(BlockKind::Image);
        let lose = store.add(BlockKind::BarChart);

        let report = reconcile(&mut store, &[entry(&keep.to_string(), 0, 0, 3, 3)]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.blocks()[0].id, keep);
        assert_eq!(report.dropped, vec![lose]);
        assert!(report.unknown.is_empty());
    }

    #[test]
    fn unknown_payload_ids_are_skipped_not_created() {
        let mut store = BlockStore::new();
        let id = store.add(BlockKind::LineChart);

        let report = reconcile(
            &mut store,
            &[
                entry("999", 0, 0, 2, 2),
                entry(&id.to_string(), 1, 1, 3, 3),
            ],
        );

        assert_eq!(store.len(), 1);
        assert_eq!(report.unknown, vec!["999".to_string()]);
        assert_eq!(report.merged, 1);
    }

    #[test]
    fn result_order_follows_payload_order() {
        let mut store = BlockStore::new();
        let a = store.add(BlockKind::Image);
        let b = store.add(BlockKind::Image);

        reconcile(
            &mut store,
            &[
                entry(&b.to_string(), 0, 0, 3, 3),
                entry(&a.to_string(), 3, 0, 3, 3),
            ],
        );

        assert_eq!(store.blocks()[0].id, b);
        assert_eq!(store.blocks()[1].id, a);
    }

    #[test]
    fn empty_payload_empties_the_store() {
        let mut store = BlockStore::new();
        let a = store.add(BlockKind::Image);
        let b = store.add(BlockKind::BarChart);

        let report = reconcile(&mut store, &[]);

        assert!(store.is_empty());
        assert_eq!(report.dropped, vec![a, b]);
    }
}
