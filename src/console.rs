//! Output sink for everything the tool prints. One `Console` is built in
//! `main` and handed by reference to whatever needs to write.
use std::io::{self, IsTerminal, Stdout, Write};

use crossterm::style::{StyledContent, Stylize};
use unicode_width::UnicodeWidthStr;

use crate::profile::{Profile, ProfileSet};

pub(crate) const TABLE_HEADER: [&str; 5] = ["#", "Name", "Connection", "Description", "Tags"];
const NO_DESCRIPTION: &str = "No description";
const NO_TAGS: &str = "-";

pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl Console<Stdout> {
    /// Console on stdout, colored when stdout is a terminal.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = out.is_terminal();
        Self::new(out, color)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        self.styled_line(text.green().bold())
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        self.styled_line(text.yellow())
    }

    pub fn warn(&mut self, text: &str) -> io::Result<()> {
        self.styled_line(text.yellow().bold())
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        self.styled_line(text.red().bold())
    }

    pub fn hint(&mut self, text: &str) -> io::Result<()> {
        self.styled_line(text.cyan())
    }

    pub fn dim(&mut self, text: &str) -> io::Result<()> {
        self.styled_line(text.dim())
    }

    /// Write `text` without a newline and flush, for prompts.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        self.styled(text.bold())?;
        self.out.flush()
    }

    /// Numbered table of `profiles` in name order, then the total.
    pub fn profile_table(&mut self, profiles: &ProfileSet) -> io::Result<()> {
        let rows: Vec<[String; 5]> = profiles
            .iter()
            .enumerate()
            .map(|(index, profile)| table_row(index + 1, profile))
            .collect();

        let mut widths = TABLE_HEADER.map(|title| title.width());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        self.line("")?;
        self.success("Available SSH Profiles")?;
        let header = format_row(&TABLE_HEADER, &widths);
        self.styled_line(header.as_str().magenta().bold())?;
        for row in &rows {
            self.line(&format_row(row, &widths))?;
        }
        self.dim(&format!("Total profiles: {}", profiles.len()))?;
        self.line("")
    }

    fn styled(&mut self, content: StyledContent<&str>) -> io::Result<()> {
        if self.color {
            write!(self.out, "{content}")
        } else {
            write!(self.out, "{}", content.content())
        }
    }

    fn styled_line(&mut self, content: StyledContent<&str>) -> io::Result<()> {
        self.styled(content)?;
        writeln!(self.out)
    }
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        let cell = cell.as_ref();
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.width()) + 2));
    }
    line.trim_end().to_string()
}

/// Cells of one table row, in `TABLE_HEADER` order.
pub(crate) fn table_row(position: usize, profile: &Profile) -> [String; 5] {
    [
        position.to_string(),
        profile.name.clone(),
        profile.connection(),
        profile
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        if profile.tags.is_empty() {
            NO_TAGS.to_string()
        } else {
            profile.tags.join(", ")
        },
    ]
}
