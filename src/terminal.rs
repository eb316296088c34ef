use std::{
    io::{stdout, Stdout, Write},
    ops::{Deref, DerefMut},
};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use ratatui::{self, backend::CrosstermBackend, TerminalOptions, Viewport};

type TerminalBackend<W> = ratatui::Terminal<CrosstermBackend<W>>;

pub struct Terminal<W: Write> {
    inner: TerminalBackend<W>,
}

impl Terminal<Stdout> {
    pub fn inline(height: u16) -> anyhow::Result<Self> {
        enable_raw_mode()?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = match ratatui::Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        ) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                return Err(err.into());
            }
        };

        Ok(Self { inner: terminal })
    }
}

impl<W: Write> Deref for Terminal<W> {
    type Target = TerminalBackend<W>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<W: Write> DerefMut for Terminal<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        let _ = self.inner.show_cursor();
        let _ = disable_raw_mode();
    }
}
