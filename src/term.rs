use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{ensure, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

use crate::config::GameConfig;
use crate::coords::Coords;
use crate::simulation::Renderer;

pub type TermInt = u16;

const CELL_CHAR: char = '█';
const WALL_CHAR: char = '░';

/// Terminal drawing surface for the board. Drawing goes to a `Frame`;
/// `present` writes out what changed.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    scale: TermInt,
    origin: (TermInt, TermInt),
    frame: Frame,
    current_msg: Option<Message>,
}

/// Off-screen board covering every cell from `(0, 0)` to `(width, height)`,
/// walls included, plus what the terminal is known to show for each cell.
pub struct Frame {
    width: i32,
    height: i32,
    cells: Vec<Option<Color>>,
    shown: Vec<Option<Option<Color>>>, // None when the cell on screen is unknown
}

struct Message {
    top_left: (TermInt, TermInt),
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;

        let (cols, rows) = config.screen_size()?;
        ensure!(
            cols <= width && rows <= height,
            "terminal is {}x{} but the board needs {}x{}; shrink the board or the scale",
            width, height, cols, rows
        );

        let origin = ((width - cols) / 2, (height - rows) / 2);

        Ok(TermManager {
            width,
            height,
            stdout: stdout(),
            scale: config.scale,
            origin,
            frame: Frame::new(config.width, config.height),
            current_msg: None,
        })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error setting raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.clear_screen()
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error unsetting raw mode")?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking)?;
        execute!(self.stdout, LeaveAlternateScreen).context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    /// Waits up to `timeout` for the first key, then drains whatever else is queued.
    pub fn read_key_events(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait)? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
            wait = Duration::from_millis(0);
        }

        Ok(events)
    }

    /// Writes the changed part of the frame to the terminal.
    pub fn present(&mut self) -> Result<()> {
        for (pos, cell) in self.frame.take_changes() {
            self.print_cell(pos, cell)?;
        }

        queue!(self.stdout, style::ResetColor)?;
        self.flush()
    }

    /// Crosses out the given cells, drawn over whatever is on screen.
    pub fn mark_cells(&mut self, cells: impl IntoIterator<Item = Coords>, ch: char) -> Result<()> {
        for pos in cells {
            if let Some((col, row)) = self.screen_pos(pos) {
                let text: String = std::iter::repeat(ch).take(self.scale as usize).collect();
                queue!(self.stdout, cursor::MoveTo(col, row), style::ResetColor, style::Print(text))?;
                self.frame.invalidate(pos);
            }
        }
        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        queue!(self.stdout, style::ResetColor)?;

        // Print the top and bottom empty lines
        let blank = " ".repeat(msg_width as usize);
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            queue!(self.stdout, cursor::MoveTo(top_left.0, *y), style::Print(&blank))?;
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            queue!(self.stdout, cursor::MoveTo(top_left.0, y), style::Print(padded_line))?;
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    /// Blanks the message box and redraws the board cells it covered.
    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        let blank = " ".repeat(msg.width() as usize);
        queue!(self.stdout, style::ResetColor)?;
        for y_diff in 0..msg.height() {
            let (x, y) = (msg.top_left().0, msg.top_left().1 + y_diff);
            queue!(self.stdout, cursor::MoveTo(x, y), style::Print(&blank))?;
        }

        for pos in self.frame.positions() {
            if let Some((col, row)) = self.screen_pos(pos) {
                if msg.covers(col, row, self.scale) {
                    self.frame.invalidate(pos);
                }
            }
        }

        self.present()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    ///////////////////////////////////////////////////////////////////////////

    fn clear_screen(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.frame.invalidate_all();
        Ok(())
    }

    fn screen_pos(&self, pos: Coords) -> Option<(TermInt, TermInt)> {
        if !self.frame.contains(pos) {
            return None;
        }
        let x = TermInt::try_from(pos.x).ok()?;
        let y = TermInt::try_from(pos.y).ok()?;
        let col = x.checked_mul(self.scale)?.checked_add(self.origin.0)?;
        let row = y.checked_add(self.origin.1)?;
        Some((col, row))
    }

    fn print_cell(&mut self, pos: Coords, cell: Option<Color>) -> Result<()> {
        let (col, row) = match self.screen_pos(pos) {
            Some(p) => p,
            None => return Ok(()),
        };

        let (ch, color) = match cell {
            Some(color) => (CELL_CHAR, color),
            None if self.frame.is_wall(pos) => (WALL_CHAR, Color::DarkGrey),
            None => (' ', Color::Reset),
        };

        let text: String = std::iter::repeat(ch).take(self.scale as usize).collect();
        queue!(
            self.stdout,
            cursor::MoveTo(col, row),
            style::SetForegroundColor(color),
            style::Print(text)
        )?;
        Ok(())
    }
}

impl Renderer for TermManager {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn draw_point(&mut self, pos: Coords, color: Color) {
        self.frame.draw_point(pos, color);
    }
}

impl Frame {
    pub fn new(width: i32, height: i32) -> Self {
        let cells = (width.max(0) as usize + 1) * (height.max(0) as usize + 1);
        Frame { width, height, cells: vec![None; cells], shown: vec![None; cells] }
    }

    pub fn contains(&self, pos: Coords) -> bool {
        (0..=self.width).contains(&pos.x) && (0..=self.height).contains(&pos.y)
    }

    pub fn is_wall(&self, pos: Coords) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x == self.width || pos.y == self.height
    }

    pub fn positions(&self) -> impl Iterator<Item = Coords> {
        let width = self.width;
        (0..=self.height).flat_map(move |y| (0..=width).map(move |x| Coords::new(x, y)))
    }

    /// Forgets what the terminal shows at `pos`, so the next changes include it.
    pub fn invalidate(&mut self, pos: Coords) {
        if self.contains(pos) {
            let i = self.index(pos);
            self.shown[i] = None;
        }
    }

    pub fn invalidate_all(&mut self) {
        for cell in self.shown.iter_mut() {
            *cell = None;
        }
    }

    /// Cells that differ from the screen, now considered shown.
    pub fn take_changes(&mut self) -> Vec<(Coords, Option<Color>)> {
        let mut changes = vec![];
        for pos in self.positions() {
            let i = self.index(pos);
            if self.shown[i] != Some(self.cells[i]) {
                self.shown[i] = Some(self.cells[i]);
                changes.push((pos, self.cells[i]));
            }
        }
        changes
    }

    fn index(&self, pos: Coords) -> usize {
        (self.width as usize + 1) * pos.y as usize + pos.x as usize
    }
}

impl Renderer for Frame {
    fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = None;
        }
    }

    fn draw_point(&mut self, pos: Coords, color: Color) {
        if self.contains(pos) {
            let i = self.index(pos);
            self.cells[i] = Some(color);
        }
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: (TermInt, TermInt)) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> (TermInt, TermInt) {
        self.top_left
    }

    /// Whether a board cell `scale` columns wide starting at `(col, row)` overlaps the box.
    pub fn covers(&self, col: TermInt, row: TermInt, scale: TermInt) -> bool {
        let (left, top) = self.top_left;
        (top..top + self.height).contains(&row)
            && col < left + self.width
            && col + scale > left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_changes_cover_the_whole_frame() {
        let mut frame = Frame::new(4, 3);
        frame.draw_point(Coords::new(2, 2), Color::Red);

        let changes = frame.take_changes();
        assert_eq!(changes.len(), 5 * 4);
        assert!(changes.contains(&(Coords::new(2, 2), Some(Color::Red))));
        assert!(changes.contains(&(Coords::new(0, 0), None)));
        assert!(frame.take_changes().is_empty());
    }

    #[test]
    fn clearing_blanks_the_previous_board() {
        let mut frame = Frame::new(8, 8);
        frame.draw_point(Coords::new(3, 4), Color::Red);
        frame.draw_point(Coords::new(4, 4), Color::Blue);
        frame.take_changes();

        frame.clear();
        frame.draw_point(Coords::new(4, 4), Color::Blue);
        assert_eq!(frame.take_changes(), vec![(Coords::new(3, 4), None)]);
    }

    #[test]
    fn invalidated_cells_are_written_again() {
        let mut frame = Frame::new(8, 8);
        frame.draw_point(Coords::new(1, 1), Color::Green);
        frame.take_changes();

        frame.invalidate(Coords::new(1, 1));
        frame.invalidate(Coords::new(-1, 20)); // off the board, ignored
        assert_eq!(frame.take_changes(), vec![(Coords::new(1, 1), Some(Color::Green))]);
    }

    #[test]
    fn ignores_points_off_the_frame() {
        let mut frame = Frame::new(8, 8);
        frame.take_changes();
        frame.draw_point(Coords::new(-1, 3), Color::Red);
        frame.draw_point(Coords::new(9, 3), Color::Red);
        assert!(frame.take_changes().is_empty());
        assert!(frame.is_wall(Coords::new(8, 3)));
        assert!(!frame.is_wall(Coords::new(7, 3)));
    }

    #[test]
    fn message_covers_overlapping_cells() {
        let msg = Message::new(10, 4, (20, 5));

        assert!(msg.covers(20, 5, 2));
        assert!(msg.covers(29, 8, 2));
        assert!(msg.covers(19, 6, 2)); // straddles the left edge
        assert!(!msg.covers(18, 6, 2));
        assert!(!msg.covers(30, 6, 2));
        assert!(!msg.covers(22, 4, 2));
        assert!(!msg.covers(22, 9, 2));
    }
}
