use std::io::Write as _;

use neuro_chat_core::conversation::{Message, Role};
use owo_colors::OwoColorize;

pub const BAR_CHAR: &str = "▎";

/// Returns the name shown in front of a message.
#[inline]
pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Bot",
    }
}

/// Formats a message as bubble lines, without colors.
///
/// The speaker goes on the first line. Continuation lines are indented
/// so the text stays aligned.
pub fn bubble_lines(role: Role, content: &str) -> Vec<String> {
    let prefix = format!("{}: ", speaker(role));
    let indent = " ".repeat(prefix.len());
    let mut lines: Vec<String> = content
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 {
                format!("{prefix}{line}")
            } else {
                format!("{indent}{line}")
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(prefix.trim_end().to_owned());
    }
    lines
}

pub fn print_message(message: &Message) {
    for line in bubble_lines(message.role(), message.content()) {
        match message.role() {
            Role::User => {
                println!("{}{}", BAR_CHAR.bright_blue(), line.bright_white())
            }
            Role::Assistant => {
                println!("{}{}", BAR_CHAR.bright_yellow(), line.bright_white())
            }
        }
    }
}

/// Opens an assistant bubble that is filled by streamed deltas.
pub fn start_streamed_reply() {
    print!(
        "{}{}",
        BAR_CHAR.bright_yellow(),
        format!("{}: ", speaker(Role::Assistant)).bright_white()
    );
    flush();
}

pub fn print_delta(delta: &str) {
    print!("{}", delta.bright_white());
    flush();
}

pub fn print_notice(notice: &str) {
    println!("{}{}", BAR_CHAR.bright_green(), notice.dimmed());
}

pub fn print_error(error: &str) {
    println!("{}{}", BAR_CHAR.bright_red(), error.red());
}

pub fn flush() {
    std::io::stdout().flush().ok();
}
