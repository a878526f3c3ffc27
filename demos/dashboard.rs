//! Interactive dashboard demo.
//!
//! Keys: `i` add image, `b` add bar chart, `l` add line chart, `p` add pie
//! chart, `x` remove the newest block, `q`/Esc quit. Resize the terminal to
//! watch the column count cross the responsive breakpoints.

use gridboard::{Board, BoardDriver, DriverResult, FileSink, Logger};

fn main() -> DriverResult<()> {
    let mut board = Board::new(1200);
    if let Ok(sink) = FileSink::new("gridboard-demo.log", 512 * 1024) {
        board.config_mut().logger = Some(Logger::new(sink));
        board.config_mut().enable_metrics();
    }
    BoardDriver::new(board).run()
}
