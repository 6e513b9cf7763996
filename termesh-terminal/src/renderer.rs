/// Writes composed frames to a terminal
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use termesh_core::Frame;

/// Color band for a ramp glyph (darkest to lightest)
fn glyph_color(c: char) -> Color {
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

/// Queues frames row by row, switching color only between density bands
#[derive(Debug, Default)]
pub struct FrameWriter;

impl FrameWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn draw<W: Write>(&self, writer: &mut W, frame: &Frame) -> std::io::Result<()> {
        let mut current: Option<Color> = None;

        for (y, row) in frame.rows.iter().enumerate() {
            // Raw mode: position each row explicitly instead of relying on newlines
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for c in row.chars() {
                let color = glyph_color(c);
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    /// Overlay a status line on the first row
    pub fn draw_status<W: Write>(&self, writer: &mut W, status: &str, width: usize) -> std::io::Result<()> {
        let line: String = status.chars().take(width).collect();
        writer.queue(cursor::MoveTo(0, 0))?;
        writer.queue(SetForegroundColor(Color::Yellow))?;
        writer.queue(Print(line))?;
        writer.queue(ResetColor)?;
        Ok(())
    }
}
