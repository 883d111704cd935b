use std::collections::VecDeque;
use std::io::{self, Write};

/// Yes/no confirmation capability injected into the interactive stages.
pub trait Prompter {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

impl<F> Prompter for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self(question))
    }
}

/// Gives the same answer to every question, for `--yes` and unattended runs.
pub struct AutoConfirm(pub bool);

impl Prompter for AutoConfirm {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(self.0)
    }
}

/// Replays a fixed list of answers and keeps every question it was asked.
/// Once the answers run out it keeps saying "no".
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            // stdin closed; nobody is there to answer
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
