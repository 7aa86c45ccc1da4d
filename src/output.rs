//! Colored console notices.
//!
//! Thin wrappers over stdout/stderr for the user-facing progress and
//! status lines. Diagnostics that are not part of the command's visible
//! output go through `tracing` instead.

use std::io;

use crossterm::ExecutableCommand;
use crossterm::cursor::MoveUp;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};

/// Print a plain progress message.
pub fn info(message: &str) {
    println!("{message}");
}

/// Print a success message in green.
pub fn success(message: &str) {
    println!("{}", message.green());
}

/// Print a warning in yellow.
pub fn warning(message: &str) {
    println!("{}", message.yellow());
}

/// Print an error in red, to stderr.
pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

/// Print an empty line.
pub fn blank() {
    println!();
}

/// Replace the previous line with a plain message. Used to collapse a
/// "Starting .." line into its completion notice.
pub fn info_replace(message: &str) {
    clear_previous_line();
    info(message);
}

fn clear_previous_line() {
    // Not being able to move the cursor (e.g. piped output) only costs
    // the replace effect, so the result is ignored.
    let mut stdout = io::stdout();
    let _ = stdout
        .execute(MoveUp(1))
        .and_then(|out| out.execute(Clear(ClearType::CurrentLine)));
}
