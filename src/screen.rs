//! the terminal surface.

use {
    crate::style::{Palette, Style, StyleName},
    crossterm::{
        ExecutableCommand, QueueableCommand, cursor,
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
        style::{self, Stylize},
        terminal::{self, ClearType},
    },
    std::{
        collections::VecDeque,
        io::{self, Write},
        time::Duration,
    },
    tracing::trace,
};

/// a piece of text placed on the screen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
    pub text: String,
    pub style: StyleName,
}

/// everything drawn during one cycle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Frame {
    cells: Vec<Cell>,
}

/// a key press the dashboard responds to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    Up,
    Down,
    Quit,
    Other,
}

/// a place the dashboard can draw to and read keys from.
pub trait Surface {
    /// returns the size of the surface, as `(cols, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// replaces the contents of the surface with `frame`.
    fn present(&mut self, frame: &Frame, palette: &Palette) -> io::Result<()>;

    /// waits up to `timeout` for a key press.
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}

/// the real terminal, driven by crossterm.
///
/// the terminal is restored when this is dropped.
pub struct Terminal {
    stdout: io::Stdout,
}

/// a scripted surface that records what it is shown.
#[derive(Default)]
pub struct MockSurface {
    size: (u16, u16),
    script: VecDeque<MockInput>,
    /// each presented frame, rendered as lines of text.
    pub screens: Vec<Vec<String>>,
}

/// one scripted wait for input.
#[derive(Clone, Copy, Debug)]
pub enum MockInput {
    Key(Key),
    /// the wait times out.
    Idle,
    /// the surface is resized, which ends the wait without a key.
    Resize(u16, u16),
}

// === impl Cell ===

impl Cell {
    /// returns the part of this cell that fits on a `cols` by `rows` screen.
    ///
    /// cells that start off the screen are skipped entirely, and cells that run past the right
    /// edge are clipped.
    pub fn visible(&self, cols: u16, rows: u16) -> Option<&str> {
        let Self { row, col, text, .. } = self;

        if *row >= rows || *col >= cols {
            return None;
        }

        let room = usize::from(cols - col);
        let end = text
            .char_indices()
            .nth(room)
            .map_or(text.len(), |(i, _)| i);

        Some(&text[..end])
    }
}

// === impl Frame ===

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: u16, col: u16, text: impl Into<String>, style: StyleName) {
        self.cells.push(Cell {
            row,
            col,
            text: text.into(),
            style,
        })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// renders this frame as plain text on a `cols` by `rows` screen.
    pub fn lines(&self, cols: u16, rows: u16) -> Vec<String> {
        let mut screen = vec![vec![' '; usize::from(cols)]; usize::from(rows)];

        for cell in &self.cells {
            let Some(text) = cell.visible(cols, rows) else {
                continue;
            };
            let line = &mut screen[usize::from(cell.row)];
            for (x, c) in (usize::from(cell.col)..).zip(text.chars()) {
                line[x] = c;
            }
        }

        screen
            .into_iter()
            .map(|line| line.into_iter().collect::<String>().trim_end().to_owned())
            .collect()
    }
}

// === impl Key ===

impl From<KeyEvent> for Key {
    fn from(KeyEvent { code, modifiers, .. }: KeyEvent) -> Self {
        match code {
            KeyCode::Up => Self::Up,
            KeyCode::Down => Self::Down,
            KeyCode::Char('q' | 'Q') => Self::Quit,
            // raw mode swallows the interrupt signal.
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Self::Quit,
            _ => Self::Other,
        }
    }
}

// === impl Terminal ===

impl Terminal {
    /// puts the terminal into raw mode on the alternate screen.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        let entered = stdout
            .execute(terminal::EnterAlternateScreen)
            .and_then(|stdout| stdout.execute(cursor::Hide))
            .map(drop);
        if let Err(error) = entered {
            let _ = terminal::disable_raw_mode();
            return Err(error);
        }

        Ok(Self { stdout })
    }
}

impl Surface for Terminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn present(&mut self, frame: &Frame, palette: &Palette) -> io::Result<()> {
        let (cols, rows) = self.size()?;
        let Self { stdout } = self;

        stdout.queue(terminal::Clear(ClearType::All))?;
        for cell in frame.cells() {
            let Some(text) = cell.visible(cols, rows) else {
                trace!(row = cell.row, col = cell.col, "skipping cell outside of the terminal");
                continue;
            };

            let Style { fg, bg, bold } = palette.get(cell.style);
            let mut content = text.with(fg).on(bg);
            if bold {
                content = content.bold();
            }

            // in this loop we are more efficient by not flushing the buffer.
            stdout
                .queue(cursor::MoveTo(cell.col, cell.row))?
                .queue(style::PrintStyledContent(content))?;
        }

        stdout.flush()
    }

    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key.into())),
            _ => Ok(None),
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let Self { stdout } = self;

        let _ = stdout.execute(cursor::Show);
        let _ = stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// === impl MockSurface ===

impl MockSurface {
    pub fn new(cols: u16, rows: u16, script: impl IntoIterator<Item = MockInput>) -> Self {
        Self {
            size: (cols, rows),
            script: script.into_iter().collect(),
            screens: Vec::new(),
        }
    }

    /// the most recently presented screen.
    pub fn last_screen(&self) -> &[String] {
        self.screens
            .last()
            .map(Vec::as_slice)
            .expect("a frame should have been presented")
    }
}

impl Surface for MockSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.size)
    }

    fn present(&mut self, frame: &Frame, _: &Palette) -> io::Result<()> {
        let (cols, rows) = self.size;
        self.screens.push(frame.lines(cols, rows));
        Ok(())
    }

    fn next_key(&mut self, _: Duration) -> io::Result<Option<Key>> {
        let input = self
            .script
            .pop_front()
            .expect("mock script should not be empty");

        Ok(match input {
            MockInput::Key(key) => Some(key),
            MockInput::Idle => None,
            MockInput::Resize(cols, rows) => {
                self.size = (cols, rows);
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: u16, col: u16, text: &str) -> Cell {
        Cell {
            row,
            col,
            text: text.to_owned(),
            style: StyleName::Row,
        }
    }

    #[test]
    fn fits() {
        assert_eq!(cell(0, 0, "hello").visible(10, 1), Some("hello"));
    }

    #[test]
    fn clipped_at_the_right_edge() {
        assert_eq!(cell(0, 3, "hello").visible(6, 1), Some("hel"));
        assert_eq!(cell(0, 0, "ñandú").visible(3, 1), Some("ñan"));
    }

    #[test]
    fn below_the_screen_is_skipped() {
        assert_eq!(cell(24, 0, "hello").visible(80, 24), None);
    }

    #[test]
    fn right_of_the_screen_is_skipped() {
        assert_eq!(cell(0, 80, "hello").visible(80, 24), None);
    }

    #[test]
    fn lines() {
        let mut frame = Frame::new();
        frame.push(0, 0, "abc", StyleName::Info);
        frame.push(0, 4, "defgh", StyleName::Info);
        frame.push(1, 2, "x", StyleName::Row);
        frame.push(5, 0, "gone", StyleName::Row);

        assert_eq!(frame.lines(7, 3), ["abc def", "  x", ""]);
    }

    #[test]
    fn keys() {
        let key = |code| Key::from(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(key(KeyCode::Up), Key::Up);
        assert_eq!(key(KeyCode::Down), Key::Down);
        assert_eq!(key(KeyCode::Char('q')), Key::Quit);
        assert_eq!(key(KeyCode::Char('Q')), Key::Quit);
        assert_eq!(key(KeyCode::Char('c')), Key::Other);
        assert_eq!(key(KeyCode::PageDown), Key::Other);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Key::from(ctrl_c), Key::Quit);
    }
}
