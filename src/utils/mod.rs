pub mod path;
pub mod prompt;
pub mod stats;

use std::thread;
use std::time::Duration;

pub use prompt::{AutoConfirm, Prompter, ScriptedPrompter};

/// Readability pause between stages; zero skips it.
pub fn pace(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
