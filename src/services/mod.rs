mod clipboard;
mod theme;

pub use clipboard::{Clipboard, TerminalClipboard};
pub use theme::{Theme, ThemeStore};
