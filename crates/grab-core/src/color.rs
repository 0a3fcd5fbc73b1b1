//! ANSI colouring for terminal output.

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Yellow,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
        }
    }
}

/// Wraps `text` in the escape sequence for `color` and a reset.
pub fn paint(text: &str, color: Color) -> String {
    format!("{}{}{}", color.code(), text, RESET)
}
