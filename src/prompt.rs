use console::style;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::ExportError;

/// One question put to the user
#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    /// Flag that supplies this value, used in `MissingInput` errors
    pub flag: &'a str,
    pub text: &'a str,
    /// Answer used for an empty reply
    pub default: Option<&'a str>,
    /// No sensible answer exists without the user
    pub required: bool,
}

impl<'a> Prompt<'a> {
    pub fn new(flag: &'a str, text: &'a str) -> Self {
        Self {
            flag,
            text,
            default: None,
            required: false,
        }
    }

    pub fn with_default(mut self, default: &'a str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn resolve(&self, answer: &str) -> String {
        let trimmed = answer.trim();
        match (trimmed.is_empty(), self.default) {
            (true, Some(default)) => default.to_string(),
            _ => trimmed.to_string(),
        }
    }
}

/// Source of answers for the export session
pub trait Prompter {
    /// Ask a question. Empty replies resolve to the prompt default.
    fn ask(&mut self, prompt: &Prompt) -> Result<String, ExportError>;

    /// Yes/no question
    fn confirm(&mut self, text: &str, default: bool) -> Result<bool, ExportError>;
}

fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Reads answers line by line from stdin
pub struct TerminalPrompter<R> {
    input: R,
}

impl TerminalPrompter<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> TerminalPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// None on end of input
    fn read_answer(&mut self) -> Result<Option<String>, ExportError> {
        io::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            println!();
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead> Prompter for TerminalPrompter<R> {
    fn ask(&mut self, prompt: &Prompt) -> Result<String, ExportError> {
        match prompt.default {
            Some(default) if !default.is_empty() => {
                print!("{} {}: ", style(prompt.text).bold(), style(format!("({})", default)).dim())
            }
            _ => print!("{}: ", style(prompt.text).bold()),
        }

        match self.read_answer()? {
            Some(line) => Ok(prompt.resolve(&line)),
            None if prompt.required => Err(ExportError::MissingInput(prompt.flag.to_string())),
            None => Ok(prompt.resolve("")),
        }
    }

    fn confirm(&mut self, text: &str, default: bool) -> Result<bool, ExportError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            print!("{} {} ", style(text).bold(), hint);
            let Some(line) = self.read_answer()? else {
                return Ok(default);
            };
            match parse_yes_no(&line, default) {
                Some(answer) => return Ok(answer),
                None => println!("{}", style("Please answer y or n.").yellow()),
            }
        }
    }
}

/// Answers questions from a fixed queue.
///
/// Once the queue is empty every question gets its default, and required
/// questions fail with `MissingInput`. An empty scripted prompter is how
/// `--non-interactive` runs are driven.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// No answers at all: defaults only
    pub fn unattended() -> Self {
        Self::default()
    }

    /// Flags of every question asked so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &Prompt) -> Result<String, ExportError> {
        self.asked.push(prompt.flag.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(prompt.resolve(&answer)),
            None if prompt.required => Err(ExportError::MissingInput(prompt.flag.to_string())),
            None => Ok(prompt.resolve("")),
        }
    }

    fn confirm(&mut self, _text: &str, default: bool) -> Result<bool, ExportError> {
        self.asked.push("confirm".to_string());
        // Unrecognized answers are skipped, like a terminal re-ask
        while let Some(answer) = self.answers.pop_front() {
            if let Some(confirmed) = parse_yes_no(&answer, default) {
                return Ok(confirmed);
            }
        }
        Ok(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_in_order() {
        let mut prompter = ScriptedPrompter::new(["webp", "", "640x480"]);
        let format = Prompt::new("--format", "Format").with_default("gif");
        assert_eq!(prompter.ask(&format).unwrap(), "webp");
        assert_eq!(prompter.ask(&format).unwrap(), "gif");
        assert_eq!(prompter.ask(&Prompt::new("--resize", "Resize")).unwrap(), "640x480");
        assert_eq!(prompter.asked(), ["--format", "--format", "--resize"]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_unattended_uses_defaults() {
        let mut prompter = ScriptedPrompter::unattended();
        let format = Prompt::new("--format", "Format").with_default("gif");
        assert_eq!(prompter.ask(&format).unwrap(), "gif");
        assert_eq!(prompter.ask(&Prompt::new("--resize", "Resize")).unwrap(), "");
        assert!(prompter.confirm("Go?", true).unwrap());
    }

    #[test]
    fn test_unattended_required_prompt_fails() {
        let mut prompter = ScriptedPrompter::unattended();
        let group = Prompt::new("--group", "Group").with_default("1").required();
        match prompter.ask(&group) {
            Err(ExportError::MissingInput(flag)) => assert_eq!(flag, "--group"),
            other => panic!("expected MissingInput, got {:?}", other),
        }
    }

    #[test]
    fn test_scripted_confirm() {
        let mut prompter = ScriptedPrompter::new(["n", "YES", "maybe", "n", "what"]);
        assert!(!prompter.confirm("Go?", true).unwrap());
        assert!(prompter.confirm("Go?", false).unwrap());
        assert!(!prompter.confirm("Go?", true).unwrap());
        assert_eq!(prompter.remaining(), 1);
        assert!(prompter.confirm("Go?", true).unwrap());
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_scripted_and_terminal_confirm_agree() {
        let mut scripted = ScriptedPrompter::new(["maybe", "y"]);
        let mut terminal = TerminalPrompter::new(io::Cursor::new("maybe\ny\n"));
        assert!(scripted.confirm("Go?", false).unwrap());
        assert!(terminal.confirm("Go?", false).unwrap());
    }

    #[test]
    fn test_terminal_prompter_reads_lines() {
        let input = io::Cursor::new("  webp \n\ny\n");
        let mut prompter = TerminalPrompter::new(input);
        let format = Prompt::new("--format", "Format").with_default("gif");
        assert_eq!(prompter.ask(&format).unwrap(), "webp");
        assert_eq!(prompter.ask(&format).unwrap(), "gif");
        assert!(prompter.confirm("Go?", false).unwrap());
    }

    #[test]
    fn test_terminal_prompter_end_of_input() {
        let mut prompter = TerminalPrompter::new(io::Cursor::new(""));
        assert!(prompter.confirm("Go?", true).unwrap());
        let group = Prompt::new("--group", "Group").required();
        assert!(matches!(
            prompter.ask(&group),
            Err(ExportError::MissingInput(_))
        ));
        let resize = Prompt::new("--resize", "Resize");
        assert_eq!(prompter.ask(&resize).unwrap(), "");
    }
}
