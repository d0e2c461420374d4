//! UI utilities for the client.

use std::io::Write;

/// Prompt shown by the input reader
pub const PROMPT: &str = "gambit> ";

/// Redisplay the prompt after printing session output
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
