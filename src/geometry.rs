/// Row value meaning "let the layout engine pick the next free row".
pub const AUTO_ROW: u16 = u16::MAX;

/// Block geometry measured in grid units (columns across, rows down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl GridRect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// True while the row still carries the auto-placement sentinel.
    pub fn is_auto_placed(&self) -> bool {
        self.y == AUTO_ROW
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    /// Column-and-row overlap test. Auto-placed rects never overlap anything;
    /// they have no concrete row yet.
    pub fn intersects(&self, other: &GridRect) -> bool {
        if self.is_auto_placed() || other.is_auto_placed() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Integer size measured in terminal character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Pixel dimensions handed across the chart boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
