use std::collections::HashMap;
use std::io::Write;

use blake3::Hash;

use crate::block::BlockId;
use crate::error::Result;
use crate::geometry::{GridRect, Size};
use crate::width::display_width;

/// Renderer knobs: how many terminal rows one grid row occupies, plus an
/// optional cursor park position after a frame.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub row_cells: u16,
    pub restore_cursor: Option<(u16, u16)>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            row_cells: 2,
            restore_cursor: None,
        }
    }
}

/// Terminal-cell rectangle a block surface occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone)]
struct Surface {
    rect: TermRect,
    hash: Hash,
}

/// Cursor-addressed ANSI painter with per-block dirty tracking. A block is
/// repainted only when its terminal rect or content hash changed since the
/// last frame; vacated rects are blanked.
pub struct BoardRenderer {
    settings: RendererSettings,
    surfaces: HashMap<BlockId, Surface>,
}

impl BoardRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            surfaces: HashMap::new(),
        }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    /// Map a grid rect onto terminal cells for the given terminal width and
    /// column count. Blocks still awaiting placement have no surface.
    pub fn term_rect(&self, rect: &GridRect, term: Size, columns: u16) -> Option<TermRect> {
        if rect.is_auto_placed() {
            return None;
        }
        let cell_w = (term.width / columns.max(1)).max(1);
        Some(TermRect {
            x: rect.x.saturating_mul(cell_w),
            y: rect.y.saturating_mul(self.settings.row_cells),
            width: rect.w.saturating_mul(cell_w),
            height: rect.h.saturating_mul(self.settings.row_cells),
        })
    }

    /// Paint one frame. `frames` carries every live block's grid rect and
    /// pre-shaped content; the renderer decides what actually needs ink.
    /// Returns the number of surfaces painted (blanked rects included).
    pub fn render(
        &mut self,
        writer: &mut impl Write,
        term: Size,
        columns: u16,
        frames: &[(BlockId, GridRect, String)],
    ) -> Result<usize> {
        let mut painted = 0;

        // Blank surfaces whose block vanished since the last frame.
        let dead: Vec<BlockId> = self
            .surfaces
            .keys()
            .filter(|id| !frames.iter().any(|(fid, _, _)| fid == *id))
            .copied()
            .collect();
        for id in dead {
            if let Some(surface) = self.surfaces.remove(&id) {
                blank_rect(writer, surface.rect)?;
                painted += 1;
            }
        }

        for (id, rect, content) in frames {
            let Some(term_rect) = self.term_rect(rect, term, columns) else {
                continue;
            };
            let hash = blake3::hash(content.as_bytes());
            let unchanged = self
                .surfaces
                .get(id)
                .map(|s| s.rect == term_rect && s.hash == hash)
                .unwrap_or(false);
            if unchanged {
                continue;
            }
            if let Some(old) = self.surfaces.get(id) {
                if old.rect != term_rect {
                    blank_rect(writer, old.rect)?;
                }
            }
            paint_surface(writer, term_rect, content)?;
            self.surfaces.insert(
                *id,
                Surface {
                    rect: term_rect,
                    hash,
                },
            );
            painted += 1;
        }

        if let Some((row, col)) = self.settings.restore_cursor {
            write!(writer, "\x1b[{};{}H", row + 1, col + 1)?;
        }
        writer.flush()?;
        Ok(painted)
    }

    /// Forget all painted surfaces, forcing a full repaint next frame.
    pub fn invalidate(&mut self) {
        self.surfaces.clear();
    }
}

fn paint_surface(writer: &mut impl Write, rect: TermRect, content: &str) -> Result<()> {
    if rect.width == 0 || rect.height == 0 {
        return Ok(());
    }

    let mut lines: Vec<String> = content.lines().map(|line| line.to_string()).collect();
    lines.truncate(rect.height as usize);
    while lines.len() < rect.height as usize {
        lines.push(String::new());
    }

    for (offset, line) in lines.iter_mut().enumerate() {
        fit_line(line, rect.width);
        write!(writer, "\x1b[{};{}H", rect.y + offset as u16 + 1, rect.x + 1)?;
        write!(writer, "{}", line)?;
    }
    Ok(())
}

fn blank_rect(writer: &mut impl Write, rect: TermRect) -> Result<()> {
    let blank = " ".repeat(rect.width as usize);
    for offset in 0..rect.height {
        write!(writer, "\x1b[{};{}H", rect.y + offset + 1, rect.x + 1)?;
        write!(writer, "{}", blank)?;
    }
    Ok(())
}

/// Pad or truncate to the surface width, measuring after ANSI stripping.
fn fit_line(line: &mut String, width: u16) {
    while (display_width(line) as u16) > width {
        line.pop();
    }
    let mut display = display_width(line) as u16;
    while display < width {
        line.push(' ');
        display += 1;
    }
}
