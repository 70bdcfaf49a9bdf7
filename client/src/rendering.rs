use shared::Frame;
use std::io::{self, Write};

/// Draws frames as plain text on a terminal
pub struct Renderer<W: Write> {
    out: W,
    frames_drawn: u32,
}

impl Renderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frames_drawn: 0,
        }
    }

    pub fn render(&mut self, frame: &Frame) -> io::Result<()> {
        self.out.write_all(format_frame(frame).as_bytes())?;
        self.out.flush()?;
        self.frames_drawn += 1;
        Ok(())
    }

    pub fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "! {}", message)?;
        self.out.flush()
    }

    pub fn frames_drawn(&self) -> u32 {
        self.frames_drawn
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

pub fn format_frame(frame: &Frame) -> String {
    let rule = "─".repeat(48);
    let mut text = format!("{}\n[{}]\n{}\n\n", rule, frame.image, frame.title);

    for (index, button) in frame.buttons.iter().enumerate() {
        text.push_str(&format!("  {}) {}\n", index + 1, button.label));
    }
    text.push_str("> ");
    text
}
