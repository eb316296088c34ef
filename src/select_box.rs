use std::io::Write;

use crate::console::{table_row, Console, TABLE_HEADER};
use crate::input::InputBuffer;
use crate::profile::{Profile, ProfileSet};
use crate::select::{Prompt, PromptOutcome, PROMPT_TEXT};
use crate::terminal::Terminal;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use unicode_width::UnicodeWidthStr;

use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};

const INFO_TEXT: &str =
    "(Esc) quit | (↑) move up | (↓) move down | (Enter) connect | type a name or number";

/// Interactive table picker drawn inline below the cursor.
pub struct SelectBox {
    data: Vec<Profile>,
    state: TableState,
    column_widths: [u16; 5],
    input_buffer: InputBuffer,
    matcher: SkimMatcherV2,
}

impl SelectBox {
    pub fn new(profiles: &ProfileSet) -> Self {
        let data: Vec<Profile> = profiles.iter().cloned().collect();
        let mut column_widths = TABLE_HEADER.map(|title| title.width() as u16);
        for (i, profile) in data.iter().enumerate() {
            for (width, cell) in column_widths.iter_mut().zip(table_row(i + 1, profile)) {
                *width = (*width).max(cell.width() as u16);
            }
        }
        Self {
            column_widths,
            state: TableState::default().with_selected(0),
            input_buffer: InputBuffer::new(PROMPT_TEXT),
            matcher: SkimMatcherV2::default(),
            data,
        }
    }

    fn select(&mut self, terminal: &mut Terminal<impl Write>) -> anyhow::Result<PromptOutcome> {
        loop {
            self.draw(terminal)?;
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(outcome) = self.handle_key(key) {
                    // clear the picker before the ssh client takes over
                    terminal.clear()?;
                    return Ok(outcome);
                }
            }
        }
    }

    /// Apply one key press; `Some` once the prompt is answered.
    fn handle_key(&mut self, key: KeyEvent) -> Option<PromptOutcome> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(PromptOutcome::Cancelled)
            }
            KeyCode::Esc => {
                if self.input_buffer.token().is_empty() {
                    Some(PromptOutcome::Cancelled)
                } else {
                    self.input_buffer.reset();
                    None
                }
            }
            KeyCode::Up => {
                self.input_buffer.reset();
                self.up();
                None
            }
            KeyCode::Down => {
                self.input_buffer.reset();
                self.down();
                None
            }
            KeyCode::Enter => {
                let token = self.input_buffer.token();
                if !token.is_empty() {
                    return Some(PromptOutcome::Chosen(token.to_string()));
                }
                // If no profile is highlighted, do nothing
                self.state
                    .selected()
                    .and_then(|i| self.data.get(i))
                    .map(|profile| PromptOutcome::Chosen(profile.name.clone()))
            }
            _ => {
                self.input_buffer.handle_event(Event::Key(key));
                self.follow_input();
                None
            }
        }
    }

    /// Move the highlight to the row the typed token points at: its position
    /// if it is a number, else the best fuzzy match on the name.
    fn follow_input(&mut self) {
        let token = self.input_buffer.token();
        if token.is_empty() {
            return;
        }

        if let Ok(position) = token.parse::<usize>() {
            if (1..=self.data.len()).contains(&position) {
                self.state.select(Some(position - 1));
                return;
            }
        }

        let best = self
            .data
            .iter()
            .enumerate()
            .filter_map(|(i, profile)| {
                self.matcher
                    .fuzzy_match(&profile.name, token)
                    .map(|score| (score, i))
            })
            .max_by_key(|(score, i)| (*score, std::cmp::Reverse(*i)));
        if let Some((_, i)) = best {
            self.state.select(Some(i));
        }
    }

    fn draw(&mut self, terminal: &mut Terminal<impl Write>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            self.ui(frame);
        })?;
        Ok(())
    }

    fn rows(&self) -> Vec<Row<'static>> {
        let token = self.input_buffer.token();
        self.data
            .iter()
            .enumerate()
            .map(|(i, profile)| {
                let indices = if token.is_empty() {
                    Vec::new()
                } else {
                    self.matcher
                        .fuzzy_indices(&profile.name, token)
                        .map(|(_, indices)| indices)
                        .unwrap_or_default()
                };
                let [position, name, connection, description, tags] = table_row(i + 1, profile);
                Row::new(vec![
                    Cell::from(position),
                    Cell::from(Line::from(highlight_spans(&name, &indices))),
                    Cell::from(connection),
                    Cell::from(description),
                    Cell::from(tags),
                ])
            })
            .collect()
    }

    fn ui(&mut self, f: &mut Frame) {
        let header = Row::new(TABLE_HEADER.map(|title| {
            Cell::from(title).style(Style::default().add_modifier(Modifier::UNDERLINED))
        }))
        .style(Style::default().add_modifier(Modifier::BOLD));

        let [position, name, connection, description, tags] = self.column_widths;
        let table = Table::new(
            self.rows(),
            [
                Constraint::Length(position + 1),
                Constraint::Length(name + 1),
                Constraint::Min(connection + 1),
                Constraint::Min(description + 1),
                Constraint::Min(tags),
            ],
        )
        .header(header)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_spacing(HighlightSpacing::Always);

        let input = Paragraph::new(
            Text::from(self.input_buffer.line()).style(Style::default().fg(Color::Cyan)),
        );
        let info = Paragraph::new(Line::from(INFO_TEXT)).centered();

        let recs = Layout::vertical([
            Constraint::Min(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.size());

        f.render_stateful_widget(table, recs[0], &mut self.state);
        f.render_widget(input, recs[1]);
        f.render_widget(info, recs[2]);

        f.set_cursor(
            recs[1].x + self.input_buffer.visual_cursor() as u16,
            recs[1].y,
        );
    }

    fn up(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.data.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i))
    }

    fn down(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.data.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i))
    }
}

impl Default for SelectBox {
    fn default() -> Self {
        Self::new(&ProfileSet::new())
    }
}

impl Prompt for SelectBox {
    fn ask<W: Write>(
        &mut self,
        _console: &mut Console<W>,
        profiles: &ProfileSet,
    ) -> anyhow::Result<PromptOutcome> {
        *self = Self::new(profiles);
        if self.data.is_empty() {
            return Ok(PromptOutcome::Cancelled);
        }
        // header, rows, input line, help line
        let height = self.data.len() as u16 + 3;
        let mut terminal = Terminal::inline(height)?;
        self.select(&mut terminal)
    }
}

fn highlight_spans<'b>(input: &str, indices: &[usize]) -> Vec<Span<'b>> {
    let mut spans = Vec::new();
    let mut current_segment = String::new();
    let mut index_set: Vec<usize> = indices.to_vec();
    index_set.sort_unstable();
    index_set.dedup();

    let highlight_style = Style::default()
        .fg(Color::Rgb(250, 0, 0))
        .bg(Color::Rgb(0xFF, 0xFC, 0x67))
        .add_modifier(Modifier::BOLD);
    for (i, c) in input.chars().enumerate() {
        if index_set.binary_search(&i).is_ok() {
            if !current_segment.is_empty() {
                spans.push(Span::raw(current_segment.clone()));
                current_segment.clear();
            }
            spans.push(Span::styled(c.to_string(), highlight_style));
        } else {
            current_segment.push(c);
        }
    }

    if !current_segment.is_empty() {
        spans.push(Span::raw(current_segment));
    }

    spans
}
