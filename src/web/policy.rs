//! Disambiguation policies
//!
//! The resolver asks a policy whenever a spoken name is not an exact key.
//! The console policy talks to the operator; the scripted one replays
//! answers supplied up front.

use crate::utils::MatchCandidate;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Operator's answer to a numbered candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index into the candidate list
    Pick(usize),
    All,
    Skip,
    Invalid,
}

/// Parse a menu answer for a list of `count` candidates
///
/// Numbers are one-based. Empty input and "n" skip; "a" selects all.
pub fn parse_choice(input: &str, count: usize) -> Choice {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "" | "n" => Choice::Skip,
        "a" => Choice::All,
        digits if digits.chars().all(|c| c.is_ascii_digit()) => match digits.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Choice::Pick(n - 1),
            _ => Choice::Invalid,
        },
        _ => Choice::Invalid,
    }
}

/// Decides what to do with fuzzy candidates
pub trait DisambiguationPolicy {
    /// Yes/no for a single candidate
    fn confirm(&mut self, original: &str, candidate: &MatchCandidate) -> bool;

    /// Pick among several candidates, best first
    fn choose(&mut self, original: &str, candidates: &[MatchCandidate]) -> Choice;

    /// Operator-facing status line
    fn notify(&mut self, _message: &str) {}
}

/// Interactive operator console over any reader/writer pair
pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Print `prompt` and read one line; `None` on end of input
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn say(&mut self, message: &str) {
        if let Err(e) = writeln!(self.writer, "{}", message) {
            warn!("Console write failed: {}", e);
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn answer(&mut self, prompt: &str) -> String {
        match self.ask(prompt) {
            Ok(Some(line)) => line.trim().to_lowercase(),
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Console read failed: {}", e);
                String::new()
            }
        }
    }
}

impl<R: BufRead, W: Write> DisambiguationPolicy for Console<R, W> {
    fn confirm(&mut self, original: &str, candidate: &MatchCandidate) -> bool {
        let prompt = format!(
            "Did you mean '{}' instead of '{}'? (y/n): ",
            candidate.key, original
        );
        self.answer(&prompt) == "y"
    }

    fn choose(&mut self, original: &str, candidates: &[MatchCandidate]) -> Choice {
        self.say(&format!("Multiple matches found for '{}':", original));
        for (i, candidate) in candidates.iter().enumerate() {
            self.say(&format!(
                "  {}. {}  ({:.0}% match)",
                i + 1,
                candidate.key,
                candidate.score * 100.0
            ));
        }

        let input = self.answer("Enter number to open, 'a' for all, or 'n' to skip: ");
        let choice = parse_choice(&input, candidates.len());
        if choice == Choice::Invalid {
            self.say("Invalid choice, skipping.");
        }
        choice
    }

    fn notify(&mut self, message: &str) {
        self.say(message);
    }
}

/// Replays pre-supplied answers; records what it was asked
#[derive(Debug, Default)]
pub struct ScriptedPolicy {
    answers: VecDeque<String>,
    /// Candidate keys offered, one entry per question
    pub asked: Vec<Vec<String>>,
    pub notices: Vec<String>,
}

impl ScriptedPolicy {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn next_answer(&mut self) -> String {
        self.answers.pop_front().unwrap_or_default().trim().to_lowercase()
    }
}

impl DisambiguationPolicy for ScriptedPolicy {
    fn confirm(&mut self, _original: &str, candidate: &MatchCandidate) -> bool {
        self.asked.push(vec![candidate.key.clone()]);
        self.next_answer() == "y"
    }

    fn choose(&mut self, _original: &str, candidates: &[MatchCandidate]) -> Choice {
        self.asked
            .push(candidates.iter().map(|c| c.key.clone()).collect());
        let answer = self.next_answer();
        parse_choice(&answer, candidates.len())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
