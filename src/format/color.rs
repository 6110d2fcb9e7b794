//! ANSI escape composition for labels, identifiers and unit words.

const ESCAPE: &str = "\x1b";

/// SGR code closing every styled segment
const RESET_CODE: u8 = 0;

/// Text style, written as the first SGR parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Reset = 0,
    Bold = 1,
}

/// Standard foreground colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black = 30,
    Red = 31,
    Green = 32,
    Yellow = 33,
    Blue = 34,
    Magenta = 35,
    Cyan = 36,
    White = 37,
}

/// Wrap `text` in a style and optional foreground color
pub fn colorize(text: &str, style: Style, color: Option<Color>) -> String {
    let params = match color {
        Some(color) => format!("{};{}", style as u8, color as u8),
        None => (style as u8).to_string(),
    };

    format!("{ESCAPE}[{params}m{text}{ESCAPE}[{RESET_CODE}m")
}

pub fn green_bold(text: &str) -> String {
    colorize(text, Style::Bold, Some(Color::Green))
}

pub fn green(text: &str) -> String {
    colorize(text, Style::Reset, Some(Color::Green))
}

pub fn bold(text: &str) -> String {
    colorize(text, Style::Bold, None)
}

pub fn yellow_bold(text: &str) -> String {
    colorize(text, Style::Bold, Some(Color::Yellow))
}

pub fn yellow(text: &str) -> String {
    colorize(text, Style::Reset, Some(Color::Yellow))
}

pub fn cyan(text: &str) -> String {
    colorize(text, Style::Reset, Some(Color::Cyan))
}

#[cfg(test)]
pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip "[...m"
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
