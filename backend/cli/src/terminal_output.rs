//! Terminal output for the console surface: ANSI styling with a plain fallback.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

/// Wrap `text` in a style when color is on.
pub fn paint(style: &str, text: &str, color: bool) -> String {
    if color {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// One reply line as shown on the console. Ephemeral replies are dimmed and
/// tagged with the author they are meant for.
pub fn format_reply(author: &str, text: &str, ephemeral: bool, color: bool) -> String {
    let tag = if ephemeral {
        paint(DIM, &format!("(only {author})"), color)
    } else {
        paint(GREEN, "bot", color)
    };
    text.lines()
        .map(|line| format!("{tag} {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_error(text: &str, color: bool) -> String {
    if color {
        format!("{RED}{BOLD}✖{RESET} {text}")
    } else {
        format!("ERROR: {text}")
    }
}

pub fn format_note(text: &str, color: bool) -> String {
    if color {
        format!("{CYAN}{BOLD}ℹ{RESET} {text}")
    } else {
        format!("INFO: {text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply_prefixes_each_line() {
        assert_eq!(format_reply("amy", "a\nb", false, false), "bot a\nbot b");
        assert_eq!(format_reply("amy", "x", true, false), "(only amy) x");
    }

    #[test]
    fn colored_output_is_wrapped() {
        assert_eq!(paint(CYAN, "hi", true), "\x1b[36mhi\x1b[0m");
        assert_eq!(format_error("boom", false), "ERROR: boom");
        assert!(format_note("n", true).starts_with(CYAN));
    }
}
