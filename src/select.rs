//! Resolving one profile from user input.
//!
//! The prompt is single shot: an unknown token ends the selection with
//! [`AppError::InvalidSelection`] instead of asking again.
use std::{
    io::{self, BufRead, Write},
    path::Path,
    sync::mpsc,
    thread,
    time::Duration,
};

use anyhow::bail;

use crate::{
    console::Console,
    error::AppError,
    interrupt::Interrupt,
    profile::{Profile, ProfileSet},
};

pub const PROMPT_TEXT: &str = "Select profile (number or name): ";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What the user answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Chosen(String),
    Cancelled,
}

#[derive(Debug)]
pub enum Selection<'a> {
    Resolved(&'a Profile),
    Cancelled,
}

pub trait Prompt {
    /// Present `profiles` and return the user's raw answer.
    fn ask<W: Write>(
        &mut self,
        console: &mut Console<W>,
        profiles: &ProfileSet,
    ) -> anyhow::Result<PromptOutcome>;
}

/// Resolve a literal profile name, or a 1-based position in the displayed
/// list. Exact names take precedence over positions.
pub fn resolve_token<'a>(profiles: &'a ProfileSet, token: &str) -> Result<&'a Profile, AppError> {
    let token = token.trim();
    profiles
        .get(token)
        .or_else(|| {
            token
                .parse::<usize>()
                .ok()
                .and_then(|position| profiles.position(position))
        })
        .ok_or_else(|| AppError::InvalidSelection {
            input: token.to_string(),
        })
}

/// Ask once and resolve the answer against `profiles`.
pub fn select<'a, P: Prompt, W: Write>(
    prompt: &mut P,
    console: &mut Console<W>,
    profiles: &'a ProfileSet,
    config_path: &Path,
) -> Result<Selection<'a>, AppError> {
    if profiles.is_empty() {
        return Err(AppError::NoProfiles {
            path: config_path.to_path_buf(),
        });
    }

    match prompt.ask(console, profiles).map_err(AppError::Prompt)? {
        PromptOutcome::Cancelled => Ok(Selection::Cancelled),
        PromptOutcome::Chosen(token) => resolve_token(profiles, &token).map(Selection::Resolved),
    }
}

/// Plain prompt for when stdin or stdout is not a terminal: prints the table
/// and reads one line.
pub struct LinePrompt {
    reader: Option<Box<dyn BufRead + Send>>,
    interrupt: Interrupt,
}

impl LinePrompt {
    pub fn stdin(interrupt: Interrupt) -> Self {
        Self::with_reader(io::BufReader::new(io::stdin()), interrupt)
    }

    pub fn with_reader(reader: impl BufRead + Send + 'static, interrupt: Interrupt) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            interrupt,
        }
    }
}

impl Prompt for LinePrompt {
    fn ask<W: Write>(
        &mut self,
        console: &mut Console<W>,
        profiles: &ProfileSet,
    ) -> anyhow::Result<PromptOutcome> {
        let Some(mut reader) = self.reader.take() else {
            bail!("prompt input was already consumed");
        };

        console.profile_table(profiles)?;
        console.prompt(PROMPT_TEXT)?;

        // Read on a helper thread so an interrupt can end the wait.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut line = String::new();
            let read = reader.read_line(&mut line).map(|n| (n, line));
            let _ = tx.send(read);
        });

        loop {
            if self.interrupt.take() {
                console.line("")?;
                return Ok(PromptOutcome::Cancelled);
            }
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok((0, _))) => {
                    console.line("")?;
                    return Ok(PromptOutcome::Cancelled);
                }
                Ok(Ok((_, line))) => return Ok(PromptOutcome::Chosen(line.trim().to_string())),
                Ok(Err(err)) => return Err(err.into()),
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => bail!("prompt reader stopped"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    struct Scripted(Option<PromptOutcome>);

    impl Prompt for Scripted {
        fn ask<W: Write>(
            &mut self,
            _console: &mut Console<W>,
            _profiles: &ProfileSet,
        ) -> anyhow::Result<PromptOutcome> {
            match self.0.take() {
                Some(outcome) => Ok(outcome),
                None => bail!("asked twice"),
            }
        }
    }

    fn profiles() -> ProfileSet {
        ["web", "api", "db"]
            .into_iter()
            .map(|name| Profile::new(name, format!("{name}.example.com")))
            .collect()
    }

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), false)
    }

    #[test]
    fn tokens_resolve_by_name_or_position() {
        let profiles = profiles();

        let name = |token: &str| {
            resolve_token(&profiles, token)
                .map(|profile| profile.name.clone())
                .ok()
        };

        assert_eq!(name("web").as_deref(), Some("web"));
        assert_eq!(name(" 1 ").as_deref(), Some("api"));
        assert_eq!(name("3").as_deref(), Some("web"));

        for bad in ["0", "4", "-1", "prod", ""] {
            let err = resolve_token(&profiles, bad).expect_err("token is invalid");
            assert!(matches!(err, AppError::InvalidSelection { .. }), "token {bad:?}");
        }
    }

    #[test]
    fn exact_name_beats_position() {
        let profiles: ProfileSet = [
            Profile::new("2", "two"),
            Profile::new("a", "a"),
            Profile::new("b", "b"),
        ]
        .into_iter()
        .collect();

        let profile = resolve_token(&profiles, "2").expect("name matches");
        assert_eq!(profile.host, "two");
    }

    #[test]
    fn empty_set_cannot_be_selected_from() {
        let mut prompt = Scripted(Some(PromptOutcome::Chosen("web".to_string())));
        let err = select(
            &mut prompt,
            &mut console(),
            &ProfileSet::new(),
            Path::new("config.yml"),
        )
        .expect_err("nothing to select");
        assert!(matches!(err, AppError::NoProfiles { .. }));
        assert!(prompt.0.is_some(), "prompt must not be shown");
    }

    #[test]
    fn unknown_answer_is_an_invalid_selection() {
        let profiles = profiles();
        let mut prompt = Scripted(Some(PromptOutcome::Chosen("prod".to_string())));

        let err = select(&mut prompt, &mut console(), &profiles, Path::new("config.yml"))
            .expect_err("prod is not a profile");
        assert_eq!(err.to_string(), "invalid selection: 'prod'");
    }

    #[test]
    fn cancelled_prompt_resolves_nothing() {
        let profiles = profiles();
        let mut prompt = Scripted(Some(PromptOutcome::Cancelled));

        let selection = select(&mut prompt, &mut console(), &profiles, Path::new("config.yml"))
            .expect("cancel is not an error");
        assert!(matches!(selection, Selection::Cancelled));
    }

    #[test]
    fn line_prompt_reads_one_answer() {
        let profiles = profiles();
        let mut console = console();
        let mut prompt = LinePrompt::with_reader(Cursor::new("2\n"), Interrupt::default());

        let outcome = prompt.ask(&mut console, &profiles).expect("prompt reads");
        assert_eq!(outcome, PromptOutcome::Chosen("2".to_string()));

        let output = String::from_utf8(console.into_inner()).expect("output is utf-8");
        assert!(output.contains("Total profiles: 3"));
        assert!(output.ends_with(PROMPT_TEXT));
    }

    #[test]
    fn line_prompt_end_of_input_cancels() {
        let mut prompt = LinePrompt::with_reader(Cursor::new(""), Interrupt::default());
        let outcome = prompt.ask(&mut console(), &profiles()).expect("prompt reads");
        assert_eq!(outcome, PromptOutcome::Cancelled);
    }

    #[test]
    fn line_prompt_interrupt_cancels() {
        let interrupt = Interrupt::default();
        interrupt.trigger();
        let mut prompt = LinePrompt::with_reader(io::empty(), interrupt.clone());

        let outcome = prompt.ask(&mut console(), &profiles()).expect("prompt returns");
        assert_eq!(outcome, PromptOutcome::Cancelled);
        assert!(!interrupt.is_set());
    }
}
