use std::fmt;
use std::io::{self, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crossterm::{execute, Command};

use crate::error::{AppError, Result};

/// Write-only access to the system clipboard.
pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// OSC 52 "set clipboard" escape sequence.
struct SetClipboard<'a>(&'a str);

impl Command for SetClipboard<'_> {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b]52;c;{}\x07", STANDARD.encode(self.0))
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "clipboard needs an ANSI terminal",
        ))
    }
}

/// Copies through the terminal with an OSC 52 escape sequence, which also
/// works over SSH as long as the terminal emulator honours it.
#[derive(Debug, Default)]
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, SetClipboard(text)).map_err(|e| AppError::Clipboard(e.to_string()))?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_carries_base64_payload() {
        let mut out = String::new();
        SetClipboard("A site about examples.").write_ansi(&mut out).unwrap();
        assert_eq!(out, "\x1b]52;c;QSBzaXRlIGFib3V0IGV4YW1wbGVzLg==\x07");
    }

    #[test]
    fn empty_text_clears_with_empty_payload() {
        let mut out = String::new();
        SetClipboard("").write_ansi(&mut out).unwrap();
        assert_eq!(out, "\x1b]52;c;\x07");
    }
}
