use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;

use crate::block::BlockKind;
use crate::board::{Board, BoardEvent};
use crate::error::BoardError;
use crate::geometry::Size;
use crate::viewport::{ResizeRelay, SharedResizeRelay};

pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("board error: {0}")]
    Board(#[from] BoardError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Pixel width one terminal cell stands in for, so terminal resizes map onto
/// the pixel breakpoints (a 129-column terminal crosses the 1024 px line).
pub const CELL_PX: u32 = 8;

/// Terminal driver owning a [`Board`]: raw mode and alternate screen are
/// acquired on entry and released on every exit path. Keys, toolbar style:
/// `i`/`b`/`l`/`p` add image/bar/line/pie blocks, `x` removes the newest
/// block, `q` or Esc quits.
pub struct BoardDriver {
    board: Board,
    relay: SharedResizeRelay,
    tick: Duration,
}

impl BoardDriver {
    pub fn new(mut board: Board) -> Self {
        let relay = ResizeRelay::new();
        board.attach_resize_relay(&relay);
        Self {
            board,
            relay,
            tick: Duration::from_millis(200),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn run(mut self) -> DriverResult<()> {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.run_inner(&mut stdout);
        self.exit(&mut stdout);
        result
    }

    fn run_inner(&mut self, stdout: &mut impl Write) -> DriverResult<()> {
        let (cols, rows) = terminal::size()?;
        let mut term = Size::new(cols, rows);
        self.relay.publish(u32::from(cols) * CELL_PX);
        self.board.poll_resize()?;
        self.board.auto_place();
        self.board.render_if_needed(stdout, term)?;

        loop {
            if !event::poll(self.tick)? {
                continue;
            }
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('i') => self.add(BlockKind::Image)?,
                        KeyCode::Char('b') => self.add(BlockKind::BarChart)?,
                        KeyCode::Char('l') => self.add(BlockKind::LineChart)?,
                        KeyCode::Char('p') => self.add(BlockKind::PieChart)?,
                        KeyCode::Char('x') => self.remove_newest()?,
                        _ => {}
                    }
                }
                CrosstermEvent::Resize(cols, rows) => {
                    term = Size::new(cols, rows);
                    self.relay.publish(u32::from(cols) * CELL_PX);
                    self.board.poll_resize()?;
                    self.board.auto_place();
                }
                _ => {}
            }
            self.board.render_if_needed(stdout, term)?;
        }
        Ok(())
    }

    fn add(&mut self, kind: BlockKind) -> DriverResult<()> {
        self.board.dispatch(BoardEvent::Add(kind))?;
        self.board.auto_place();
        Ok(())
    }

    fn remove_newest(&mut self) -> DriverResult<()> {
        if let Some(id) = self.board.store().newest().map(|b| b.id) {
            self.board.dispatch(BoardEvent::Remove(id))?;
        }
        Ok(())
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode().map_err(|err| DriverError::Terminal(err.to_string()))?;
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, Show, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}
