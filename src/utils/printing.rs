//! Incremental terminal rendering for streamed replies.
//!
//! Chat deltas arrive a few characters at a time, so markdown in them keeps
//! changing meaning as it grows. The printer re-renders the whole accumulated
//! buffer on every push, anchored at the position where printing started.

use std::io::{stdout, Write};
use termimad::crossterm::terminal::Clear;
use termimad::crossterm::terminal::ClearType::FromCursorDown;
use termimad::crossterm::{cursor, ExecutableCommand};
use termimad::{FmtLine, FmtText, MadSkin};

/// Renders a growing markdown buffer at a fixed cursor anchor.
///
/// Activate before the first push, deactivate when the stream ends. The anchor
/// is the cursor position at activation; every print restores it, clears
/// downwards and re-renders the whole buffer.
pub struct IncrementalMarkdownPrinter {
    pub skin: MadSkin,
    pub wrap_width: Option<usize>,
    buffer: String,
    cursor_anchor: Option<(u16, u16)>,
    activated: bool,
    hide_cursor: bool,
}

impl Default for IncrementalMarkdownPrinter {
    fn default() -> Self {
        Self {
            skin: MadSkin::default(),
            wrap_width: None,
            buffer: String::new(),
            cursor_anchor: None,
            activated: false,
            hide_cursor: false,
        }
    }
}

impl IncrementalMarkdownPrinter {
    pub fn activated(&self) -> bool {
        self.activated
    }

    pub fn activate(&mut self, hide_cursor: bool) {
        if self.activated {
            eprintln!("IncrementalMarkdownPrinter is already activated");
            return;
        }
        self.activated = true;
        self.buffer.clear();
        self.cursor_anchor = Some(cursor::position().unwrap());
        if hide_cursor {
            stdout().execute(cursor::Hide).unwrap();
        }
        self.hide_cursor = hide_cursor;
    }

    pub fn deactivate(&mut self) {
        if !self.activated {
            eprintln!("IncrementalMarkdownPrinter is already deactivated");
            return;
        }
        self.activated = false;
        self.cursor_anchor = None;
        if self.hide_cursor {
            stdout().execute(cursor::Show).unwrap();
        }
    }

    /// Append a streamed chunk and re-render the whole buffer.
    pub fn push_and_print(&mut self, chunk: &str) {
        assert!(self.activated, "IncrementalMarkdownPrinter must be activated before printing");
        self.buffer.push_str(chunk);
        self.print();
    }

    fn print(&mut self) {
        let cursor_anchor = self.cursor_anchor.unwrap();
        let rendered = FmtText::from(&self.skin, &self.buffer, self.wrap_width);
        let line_width: Vec<usize> = rendered.lines.iter().map(FmtLine::visible_length).collect();
        let text = format!("{}", rendered);
        // restore cursor position to anchor and clear previous output
        stdout()
            .execute(cursor::MoveTo(cursor_anchor.0, cursor_anchor.1)).unwrap()
            .execute(Clear(FromCursorDown)).unwrap();
        let rows = line_width.len() as u16;
        let columns = line_width.last().copied().unwrap_or(0) as u16;
        print!("{}", text);
        stdout().flush().unwrap();
        // The cursor position is relative to the terminal, not the screen/history,
        // so the anchor floats when the output scrolls; re-derive it from where
        // the cursor ended up.
        let mut new_cursor_anchor = cursor::position().unwrap();
        if new_cursor_anchor.0 > columns {
            new_cursor_anchor.0 -= columns;
        } else {
            new_cursor_anchor.0 = 0;
        }
        if new_cursor_anchor.1 > rows {
            new_cursor_anchor.1 -= rows;
        } else {
            new_cursor_anchor.1 = 0;
        }
        self.cursor_anchor = Some(new_cursor_anchor);
    }
}

impl Drop for IncrementalMarkdownPrinter {
    fn drop(&mut self) {
        if self.activated {
            self.deactivate();
        }
    }
}
