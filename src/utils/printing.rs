//! Render model output as markdown in the terminal, redrawing in place while a reply streams in.

use std::io::{self, stdout, IsTerminal, Write};
use anyhow::Result;
use futures::StreamExt;
use termimad::crossterm::{cursor, ExecutableCommand};
use termimad::crossterm::terminal::Clear;
use termimad::crossterm::terminal::ClearType::FromCursorDown;
use termimad::{FmtLine, FmtText, MadSkin};

use crate::utils::llm::TextStream;

struct Rendered {
    text: String,
    line_widths: Vec<usize>,
}

impl Rendered {
    fn new(skin: &MadSkin, markdown: &str, wrap_width: Option<usize>) -> Self {
        let fmt_text = FmtText::from(skin, markdown, wrap_width);
        Self {
            text: fmt_text.to_string(),
            line_widths: fmt_text.lines.iter().map(FmtLine::visible_length).collect(),
        }
    }
}

/// Accumulates markdown chunks and redraws everything received so far from a fixed cursor position.
pub struct StreamingMarkdownPrinter {
    pub skin: MadSkin,
    pub wrap_width: Option<usize>,
    buffer: String,
    anchor: Option<(u16, u16)>,
    hide_cursor: bool,
}

impl Default for StreamingMarkdownPrinter {
    fn default() -> Self {
        Self {
            skin: MadSkin::default(),
            wrap_width: None,
            buffer: String::new(),
            anchor: None,
            hide_cursor: false,
        }
    }
}

impl StreamingMarkdownPrinter {
    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    /// Remember the current cursor position as the place to redraw from.
    pub fn activate(&mut self, hide_cursor: bool) -> io::Result<()> {
        if self.is_active() {
            return Ok(());
        }
        self.anchor = Some(cursor::position()?);
        if hide_cursor {
            stdout().execute(cursor::Hide)?;
        }
        self.hide_cursor = hide_cursor;
        Ok(())
    }

    pub fn deactivate(&mut self) -> io::Result<()> {
        if self.anchor.take().is_some() && self.hide_cursor {
            stdout().execute(cursor::Show)?;
        }
        self.hide_cursor = false;
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn push_and_print(&mut self, chunk: &str) -> io::Result<()> {
        self.buffer.push_str(chunk);
        let rendered = Rendered::new(&self.skin, &self.buffer, self.wrap_width);
        self.redraw(&rendered)
    }

    fn redraw(&mut self, rendered: &Rendered) -> io::Result<()> {
        let Some((column, row)) = self.anchor else {
            return Err(io::Error::new(io::ErrorKind::Other, "printer must be activated before printing"));
        };
        let mut out = stdout();
        out.execute(cursor::MoveTo(column, row))?
            .execute(Clear(FromCursorDown))?;
        write!(out, "{}", rendered.text)?;
        out.flush()?;
        // the position is relative to the visible screen, so move the anchor back by what was just printed
        let rows = rendered.line_widths.len() as u16;
        let columns = rendered.line_widths.last().copied().unwrap_or(0) as u16;
        let (end_column, end_row) = cursor::position()?;
        self.anchor = Some((end_column.saturating_sub(columns), end_row.saturating_sub(rows)));
        Ok(())
    }
}

impl Drop for StreamingMarkdownPrinter {
    fn drop(&mut self) {
        let _ = self.deactivate();
    }
}

/// Print `markdown` once.
pub fn print_markdown(markdown: &str) {
    MadSkin::default().print_text(markdown);
}

/// Print a streamed reply as it arrives. Returns the full text.
///
/// Markdown is redrawn in place on a terminal. Otherwise chunks are written as they come.
pub async fn print_stream(stream: TextStream) -> Result<String> {
    if !stdout().is_terminal() {
        return write_stream(stream, &mut stdout()).await;
    }
    let mut stream = stream;
    let mut printer = StreamingMarkdownPrinter::default();
    printer.activate(true)?;
    while let Some(chunk) = stream.next().await {
        printer.push_and_print(&chunk?)?;
    }
    printer.deactivate()?;
    println!();
    Ok(printer.text().to_string())
}

/// Write chunks to `out` unrendered, then a newline.
async fn write_stream(mut stream: TextStream, out: &mut impl Write) -> Result<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        write!(out, "{}", chunk)?;
        out.flush()?;
        text.push_str(&chunk);
    }
    writeln!(out)?;
    Ok(text)
}
