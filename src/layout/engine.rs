use crate::geometry::{AUTO_ROW, GridRect};
use crate::layout::LayoutEntry;

/// Minimal vertical packer standing in for an interactive layout engine.
///
/// Entries with a concrete row are kept where they are (clamped to the
/// column count); entries still carrying [`AUTO_ROW`] are assigned the first
/// row where they fit without overlapping anything already placed. Output
/// preserves input order and feeds the normal reconcile path, so scripted
/// and interactive use share one code path. Drag physics and compaction are
/// out of scope.
#[derive(Debug, Clone, Copy)]
pub struct GridPacker {
    columns: u16,
}

impl GridPacker {
    pub fn new(columns: u16) -> Self {
        Self {
            columns: columns.max(1),
        }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn pack(&self, entries: &[LayoutEntry]) -> Vec<LayoutEntry> {
        let mut placed: Vec<GridRect> = Vec::with_capacity(entries.len());
        let mut out = Vec::with_capacity(entries.len());

        for entry in entries {
            let w = entry.w.min(self.columns).max(1);
            let x = entry.x.min(self.columns - w);
            let rect = if entry.y == AUTO_ROW {
                self.first_free_row(x, w, entry.h, &placed)
            } else {
                GridRect::new(x, entry.y, w, entry.h)
            };
            placed.push(rect);
            out.push(LayoutEntry {
                id: entry.id.clone(),
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
            });
        }

        out
    }

    fn first_free_row(&self, x: u16, w: u16, h: u16, placed: &[GridRect]) -> GridRect {
        let mut y: u16 = 0;
        loop {
            let candidate = GridRect::new(x, y, w, h);
            match placed.iter().find(|rect| rect.intersects(&candidate)) {
                Some(hit) => y = hit.bottom(),
                None => return candidate,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto(id: &str, x: u16, w: u16, h: u16) -> LayoutEntry {
        LayoutEntry {
            id: id.to_string(),
            x,
            y: AUTO_ROW,
            w,
            h,
        }
    }

    #[test]
    fn resolves_sentinel_rows_without_overlap() {
        let packer = GridPacker::new(12);
        let packed = packer.pack(&[auto("a", 0, 3, 3), auto("b", 0, 3, 3), auto("c", 2, 3, 3)]);

        assert!(packed.iter().all(|e| e.y != AUTO_ROW));
        for i in 0..packed.len() {
            for j in (i + 1)..packed.len() {
                assert!(
                    !packed[i].rect().intersects(&packed[j].rect()),
                    "{} overlaps {}",
                    packed[i].id,
                    packed[j].id
                );
            }
        }
    }

    #[test]
    fn stacks_same_column_entries_downward() {
        let packer = GridPacker::new(12);
        let packed = packer.pack(&[auto("a", 0, 3, 3), auto("b", 0, 3, 3)]);
        assert_eq!(packed[0].y, 0);
        assert_eq!(packed[1].y, 3);
    }

    #[test]
    fn disjoint_columns_share_the_top_row() {
        let packer = GridPacker::new(12);
        let packed = packer.pack(&[auto("a", 0, 3, 3), auto("b", 6, 3, 3)]);
        assert_eq!(packed[0].y, 0);
        assert_eq!(packed[1].y, 0);
    }

    #[test]
    fn clamps_to_narrow_column_counts() {
        let packer = GridPacker::new(4);
        let packed = packer.pack(&[auto("a", 10, 3, 3), auto("b", 0, 6, 2)]);
        assert_eq!(packed[0].x, 1);
        assert_eq!(packed[1].w, 4);
        assert_eq!(packed[1].x, 0);
    }

    #[test]
    fn concrete_rows_are_left_in_place() {
        let packer = GridPacker::new(12);
        let fixed = LayoutEntry {
            id: "fixed".to_string(),
            x: 2,
            y: 5,
            w: 3,
            h: 3,
        };
        let packed = packer.pack(&[fixed.clone()]);
        assert_eq!(packed[0], fixed);
    }
}
