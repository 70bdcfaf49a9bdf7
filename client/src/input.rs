//! Turns typed lines into client commands

use log::debug;

/// What the player asked for on one line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Press the numbered button (1-based)
    Press(u8),
    /// Drop the saved state and go back to the landing frame
    Restart,
    Quit,
}

/// Parses player input against the buttons currently on screen
pub struct InputManager {
    presses_sent: u32,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self { presses_sent: 0 }
    }

    /// Returns `None` for blank or unrecognised lines. Button numbers above
    /// `button_count` are still sent: the server decides what they mean.
    pub fn parse(&mut self, line: &str, button_count: usize) -> Option<Command> {
        let line = line.trim();

        let command = match line.to_ascii_lowercase().as_str() {
            "" => return None,
            "q" | "quit" | "exit" => Command::Quit,
            "r" | "restart" => Command::Restart,
            other => match other.parse::<u8>() {
                Ok(button) => {
                    if button as usize > button_count {
                        debug!("Button {} is not on screen, sending anyway", button);
                    }
                    Command::Press(button)
                }
                Err(_) => return None,
            },
        };

        if let Command::Press(_) = command {
            self.presses_sent += 1;
        }
        Some(command)
    }

    pub fn presses_sent(&self) -> u32 {
        self.presses_sent
    }
}
